use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

/// Owned backing storage of every packet view in this crate.
pub type PacketData = Vec<u8>;

/// Marker for the buffer-backed packet views.
pub trait Packet {}

pub const ARP_ETHER_TYPE: u16 = 0x0806;
pub const IPV4_ETHER_TYPE: u16 = 0x0800;

/// Largest frame a TUN/TAP interface hands us by default.
pub const DEFAULT_MTU: usize = 1500;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct MacAddr {
    pub bytes: [u8; 6],
}

impl MacAddr {
    pub fn new(bytes: [u8; 6]) -> MacAddr {
        MacAddr { bytes }
    }

    pub fn broadcast() -> MacAddr {
        MacAddr { bytes: [0xff; 6] }
    }

    pub fn is_broadcast(&self) -> bool {
        self.bytes == [0xff; 6]
    }
}

impl TryFrom<&[u8]> for MacAddr {
    type Error = &'static str;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let bytes = <[u8; 6]>::try_from(bytes).map_err(|_| "MAC address must be 6 bytes")?;
        Ok(MacAddr { bytes })
    }
}

/// Accepts `aa:bb:cc:dd:ee:ff` and `aa-bb-cc-dd-ee-ff`.
impl FromStr for MacAddr {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let separator = if s.contains('-') { '-' } else { ':' };
        let mut bytes = [0u8; 6];
        let mut count = 0;
        for part in s.split(separator) {
            if count == 6 {
                return Err("MAC address has more than 6 octets");
            }
            if part.len() != 2 {
                return Err("MAC address octets must be two hex digits");
            }
            bytes[count] =
                u8::from_str_radix(part, 16).map_err(|_| "MAC address octet is not hex")?;
            count += 1;
        }
        if count != 6 {
            return Err("MAC address has fewer than 6 octets");
        }
        Ok(MacAddr { bytes })
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let b = &self.bytes;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

/// IP protocol numbers we care about, see
/// https://www.iana.org/assignments/protocol-numbers/protocol-numbers.xhtml
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IpProtocol {
    ICMP,
    TCP,
    UDP,
    Other(u8),
}

impl From<u8> for IpProtocol {
    fn from(protocol: u8) -> Self {
        match protocol {
            1 => IpProtocol::ICMP,
            6 => IpProtocol::TCP,
            17 => IpProtocol::UDP,
            other => IpProtocol::Other(other),
        }
    }
}

impl From<IpProtocol> for u8 {
    fn from(protocol: IpProtocol) -> Self {
        match protocol {
            IpProtocol::ICMP => 1,
            IpProtocol::TCP => 6,
            IpProtocol::UDP => 17,
            IpProtocol::Other(other) => other,
        }
    }
}

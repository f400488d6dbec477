use mimic_packets::{LinkType, MacAddr, ETHERNET_HEADER_LEN};
pub use mimic_packets::DEFAULT_MTU;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Interface names are limited to IFNAMSIZ (16) bytes, including the trailing NUL.
pub const MAX_INTERFACE_NAME_LEN: usize = 15;

pub const DEFAULT_PREFIX_LEN: u8 = 24;

pub const DEFAULT_PACING: Duration = Duration::from_millis(100);

/// Smallest MTU every IPv4 link has to support, RFC 791.
pub const MIN_MTU: usize = 68;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid interface name {0:?}")]
    InvalidInterfaceName(String),

    #[error("invalid IPv4 address {0:?}")]
    InvalidIpv4Addr(String),

    #[error("invalid hardware address {0:?}")]
    InvalidMacAddr(String),

    #[error("invalid prefix length {0:?}, expected 0 to 32")]
    InvalidPrefixLen(String),

    #[error("invalid MTU {0:?}, expected {} to 65535", MIN_MTU)]
    InvalidMtu(String),

    #[error("invalid pacing interval {0:?}, expected milliseconds")]
    InvalidPacing(String),
}

fn parse_ipv4(addr: &str) -> Result<Ipv4Addr, ConfigError> {
    Ipv4Addr::from_str(addr.trim()).map_err(|_| ConfigError::InvalidIpv4Addr(addr.to_string()))
}

/// The host we pretend to be on a TAP link: ARP replies and the Ethernet source of every reply
/// carry these addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Identity {
    pub hardware_addr: MacAddr,
    pub protocol_addr: Ipv4Addr,
}

impl Identity {
    pub fn new(hardware_addr: MacAddr, protocol_addr: Ipv4Addr) -> Self {
        Identity {
            hardware_addr,
            protocol_addr,
        }
    }

    pub fn parse(hardware_addr: &str, protocol_addr: &str) -> Result<Self, ConfigError> {
        let hardware_addr = MacAddr::from_str(hardware_addr.trim())
            .map_err(|_| ConfigError::InvalidMacAddr(hardware_addr.to_string()))?;
        Ok(Identity::new(hardware_addr, parse_ipv4(protocol_addr)?))
    }
}

/// Name of the device to create and the address it is given once it is up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterfaceConfig {
    pub name: String,
    pub address: Ipv4Addr,
    pub prefix_len: u8,
}

impl InterfaceConfig {
    pub fn parse(name: &str, address: &str, prefix_len: &str) -> Result<Self, ConfigError> {
        if name.is_empty()
            || name.len() > MAX_INTERFACE_NAME_LEN
            || name
                .chars()
                .any(|c| c == '/' || c == '\0' || c.is_whitespace())
        {
            return Err(ConfigError::InvalidInterfaceName(name.to_string()));
        }

        let prefix = prefix_len
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|prefix| *prefix <= 32)
            .ok_or_else(|| ConfigError::InvalidPrefixLen(prefix_len.to_string()))?;

        Ok(InterfaceConfig {
            name: name.to_string(),
            address: parse_ipv4(address)?,
            prefix_len: prefix,
        })
    }

    pub fn netmask(&self) -> Ipv4Addr {
        let mask = u32::MAX
            .checked_shl(32 - u32::from(self.prefix_len))
            .unwrap_or(0);
        Ipv4Addr::from(mask)
    }
}

/// TAP devices exchange Ethernet frames and answer ARP on behalf of an `Identity`. TUN devices
/// exchange bare IPv4 packets and only answer pings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    Tap(Identity),
    Tun,
}

impl Variant {
    pub fn link_type(&self) -> LinkType {
        match self {
            Variant::Tap(_) => LinkType::Ethernet,
            Variant::Tun => LinkType::Ipv4,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Variant::Tap(identity) => Some(identity),
            Variant::Tun => None,
        }
    }
}

/// Everything the responder needs, validated before the device is opened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponderConfig {
    pub interface: InterfaceConfig,
    pub variant: Variant,
    pub pacing: Option<Duration>,
    pub mtu: usize,
}

impl ResponderConfig {
    pub fn new(interface: InterfaceConfig, variant: Variant) -> Self {
        ResponderConfig {
            interface,
            variant,
            pacing: Some(DEFAULT_PACING),
            mtu: DEFAULT_MTU,
        }
    }

    pub fn with_pacing(mut self, pacing: Option<Duration>) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_mtu(mut self, mtu: usize) -> Self {
        self.mtu = mtu;
        self
    }

    /// Largest frame a read can return: the MTU plus the link header on TAP devices.
    pub fn frame_capacity(&self) -> usize {
        match self.variant {
            Variant::Tap(_) => self.mtu + ETHERNET_HEADER_LEN,
            Variant::Tun => self.mtu,
        }
    }
}

/// Milliseconds between loop iterations, `0` turns pacing off.
pub fn parse_pacing(millis: &str) -> Result<Option<Duration>, ConfigError> {
    match millis.trim().parse::<u64>() {
        Ok(0) => Ok(None),
        Ok(millis) => Ok(Some(Duration::from_millis(millis))),
        Err(_) => Err(ConfigError::InvalidPacing(millis.to_string())),
    }
}

pub fn parse_mtu(mtu: &str) -> Result<usize, ConfigError> {
    mtu.trim()
        .parse::<usize>()
        .ok()
        .filter(|mtu| (MIN_MTU..=usize::from(u16::MAX)).contains(mtu))
        .ok_or_else(|| ConfigError::InvalidMtu(mtu.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_identity() {
        let identity = Identity::parse("02:00:00:00:00:01", "10.0.0.1").unwrap();
        assert_eq!(identity.hardware_addr, MacAddr::new([2, 0, 0, 0, 0, 1]));
        assert_eq!(identity.protocol_addr, Ipv4Addr::new(10, 0, 0, 1));

        assert_eq!(
            Identity::parse("02:00:00:00:00", "10.0.0.1"),
            Err(ConfigError::InvalidMacAddr("02:00:00:00:00".to_string()))
        );
        assert_eq!(
            Identity::parse("02:00:00:00:00:01", "10.0.0.256"),
            Err(ConfigError::InvalidIpv4Addr("10.0.0.256".to_string()))
        );
    }

    #[test]
    fn parse_interface() {
        let interface = InterfaceConfig::parse("tap0", "10.0.0.254", "24").unwrap();
        assert_eq!(interface.name, "tap0");
        assert_eq!(interface.address, Ipv4Addr::new(10, 0, 0, 254));
        assert_eq!(interface.netmask(), Ipv4Addr::new(255, 255, 255, 0));

        for name in &["", "a/b", "tap 0", "averyveryverylongname"] {
            assert_eq!(
                InterfaceConfig::parse(name, "10.0.0.1", "24"),
                Err(ConfigError::InvalidInterfaceName(name.to_string()))
            );
        }
        assert_eq!(
            InterfaceConfig::parse("tun0", "10.0.0.1", "33"),
            Err(ConfigError::InvalidPrefixLen("33".to_string()))
        );
        assert!(InterfaceConfig::parse("tun0", "fe80::1", "24").is_err());
    }

    #[test]
    fn netmask_edges() {
        let mut interface = InterfaceConfig::parse("tun0", "10.0.0.1", "0").unwrap();
        assert_eq!(interface.netmask(), Ipv4Addr::new(0, 0, 0, 0));
        interface.prefix_len = 32;
        assert_eq!(interface.netmask(), Ipv4Addr::new(255, 255, 255, 255));
        interface.prefix_len = 20;
        assert_eq!(interface.netmask(), Ipv4Addr::new(255, 255, 240, 0));
    }

    #[test]
    fn pacing_and_mtu() {
        assert_eq!(parse_pacing("0"), Ok(None));
        assert_eq!(parse_pacing("250"), Ok(Some(Duration::from_millis(250))));
        assert!(parse_pacing("-1").is_err());
        assert!(parse_pacing("fast").is_err());

        assert_eq!(parse_mtu("1500"), Ok(1500));
        assert!(parse_mtu("67").is_err());
        assert!(parse_mtu("65536").is_err());
    }

    #[test]
    fn frame_capacity_depends_on_variant() {
        let interface = InterfaceConfig::parse("tap0", "10.0.0.254", "24").unwrap();
        let identity = Identity::parse("02:00:00:00:00:01", "10.0.0.1").unwrap();

        let tap = ResponderConfig::new(interface.clone(), Variant::Tap(identity));
        assert_eq!(tap.frame_capacity(), 1514);
        assert_eq!(tap.pacing, Some(DEFAULT_PACING));
        assert_eq!(tap.variant.identity(), Some(&identity));

        let tun = ResponderConfig::new(interface, Variant::Tun)
            .with_mtu(9000)
            .with_pacing(None);
        assert_eq!(tun.frame_capacity(), 9000);
        assert_eq!(tun.variant.link_type(), LinkType::Ipv4);
        assert!(tun.pacing.is_none());
    }
}

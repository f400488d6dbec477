use crate::*;
use std::borrow::Cow;
use std::convert::{TryFrom, TryInto};
use std::net::Ipv4Addr;

pub const IPV4_MIN_HEADER_LEN: usize = 20;
pub const IPV4_MAX_OPTIONS_LEN: usize = 40;

#[derive(Clone, Debug)]
pub struct Ipv4Packet {
    pub data: PacketData,
    pub layer2_offset: Option<usize>,
    pub layer3_offset: usize,
    pub payload_offset: usize,
}

impl Packet for Ipv4Packet {}

impl Ipv4Packet {
    /// Wraps `data` as an IPv4 packet starting at `layer3_offset`. Bytes past the total length
    /// field are link padding and are dropped from the buffer.
    pub fn from_buffer(
        mut data: PacketData,
        layer2_offset: Option<usize>,
        layer3_offset: usize,
    ) -> Result<Ipv4Packet, &'static str> {
        // Header of Ethernet Frame: 14 bytes
        // Header of IPv4 Frame: 20 bytes
        if data.len() < layer3_offset + IPV4_MIN_HEADER_LEN {
            return Err("Data is too short to be an IPv4 Packet");
        }

        // Check version number
        let version: u8 = (data[layer3_offset] & 0xF0) >> 4;
        if version != 4 {
            return Err("Packet has incorrect version, is not Ipv4Packet");
        }

        // This is the header length in 32bit words
        let ihl = (data[layer3_offset] & 0x0F) as usize;
        if ihl < 5 {
            return Err("Packet has an IHL shorter than the minimum header");
        }

        // TotalLen is the 3rd and 4th byte of the IP Header
        let total_len = u16::from_be_bytes(
            data[layer3_offset + 2..=layer3_offset + 3]
                .try_into()
                .unwrap(),
        ) as usize;
        if total_len < ihl * 4 || data.len() < total_len + layer3_offset {
            return Err("Packet has invalid total length field");
        }
        data.truncate(layer3_offset + total_len);

        Ok(Ipv4Packet {
            data,
            layer2_offset,
            layer3_offset,
            payload_offset: layer3_offset + (ihl * 4),
        })
    }

    /// Returns a 20 byte header with no options and no payload. Everything but the version,
    /// IHL and total length is zero.
    pub fn empty() -> Ipv4Packet {
        let mut data = vec![0; IPV4_MIN_HEADER_LEN];
        data[0] = 0x45;
        data[3] = IPV4_MIN_HEADER_LEN as u8;
        Ipv4Packet {
            data,
            layer2_offset: None,
            layer3_offset: 0,
            payload_offset: IPV4_MIN_HEADER_LEN,
        }
    }

    /// Builds a new IPv4 packet carrying `icmp` as its payload, with the protocol field set to
    /// ICMP. Any layers the ICMP message was wrapped in are not carried over.
    pub fn encap_icmp(icmp: Icmpv4Packet) -> Ipv4Packet {
        let mut packet = Ipv4Packet::empty();
        packet.set_protocol(IpProtocol::ICMP);
        packet.set_payload(&icmp.data[icmp.layer4_offset..]);
        packet
    }

    pub fn src_addr(&self) -> Ipv4Addr {
        let data: [u8; 4] = self.data[self.layer3_offset + 12..self.layer3_offset + 16]
            .try_into()
            .unwrap();
        Ipv4Addr::from(data)
    }

    pub fn set_src_addr(&mut self, addr: Ipv4Addr) {
        self.data[self.layer3_offset + 12..self.layer3_offset + 16].copy_from_slice(&addr.octets());
    }

    pub fn dest_addr(&self) -> Ipv4Addr {
        let data: [u8; 4] = self.data[self.layer3_offset + 16..self.layer3_offset + 20]
            .try_into()
            .unwrap();
        Ipv4Addr::from(data)
    }

    pub fn set_dest_addr(&mut self, addr: Ipv4Addr) {
        self.data[self.layer3_offset + 16..self.layer3_offset + 20].copy_from_slice(&addr.octets());
    }

    pub fn version(&self) -> u8 {
        self.data[self.layer3_offset] >> 4
    }

    pub fn ihl(&self) -> u8 {
        self.data[self.layer3_offset] & 0x0F
    }

    /// Header length in bytes.
    pub fn header_len(&self) -> usize {
        self.ihl() as usize * 4
    }

    pub fn set_ihl(&mut self, header_length: usize) {
        self.data[self.layer3_offset] &= 0xF0; // Clear least sig 4 bits
        self.data[self.layer3_offset] |= 0x0F & ((header_length / 4) as u8);
        self.payload_offset = self.layer3_offset + header_length;
    }

    pub fn payload(&self) -> Cow<[u8]> {
        Cow::from(&self.data[self.payload_offset..])
    }

    /// Replaces the payload and rewrites the total length field. The caller is responsible for
    /// keeping the total length below 65536.
    pub fn set_payload(&mut self, payload: &[u8]) {
        let payload_len = payload.len();

        self.data.truncate(self.payload_offset);

        let total_len = ((payload_len + self.header_len()) as u16).to_be_bytes();
        self.data[self.layer3_offset + 2..=self.layer3_offset + 3].copy_from_slice(&total_len);

        self.data.reserve_exact(payload_len);
        self.data.extend(payload);
    }

    pub fn options(&self) -> Option<Cow<[u8]>> {
        if self.ihl() <= 5 {
            return None;
        }
        Some(Cow::from(
            &self.data[self.layer3_offset + IPV4_MIN_HEADER_LEN..self.payload_offset],
        ))
    }

    /// Sets the options of the Ipv4 packet to the provided array, also
    /// sets the IHL field of the packet, the total length, and the internal payload_offset
    /// field.
    /// Note: The user should provide options that are padded to a 32bit length.
    pub fn set_options(&mut self, options: &[u8]) {
        let payload = self.data.split_off(self.payload_offset);
        self.data.truncate(self.layer3_offset + IPV4_MIN_HEADER_LEN);
        self.data.reserve_exact(payload.len() + options.len());
        self.data.extend(options);
        self.set_ihl(options.len() + IPV4_MIN_HEADER_LEN);
        self.set_payload(&payload);
    }

    pub fn protocol(&self) -> IpProtocol {
        IpProtocol::from(self.data[self.layer3_offset + 9])
    }

    pub fn set_protocol(&mut self, protocol: IpProtocol) {
        self.data[self.layer3_offset + 9] = u8::from(protocol);
    }

    pub fn total_len(&self) -> u16 {
        u16::from_be_bytes(
            self.data[self.layer3_offset + 2..=self.layer3_offset + 3]
                .try_into()
                .unwrap(),
        )
    }

    pub fn ttl(&self) -> u8 {
        self.data[self.layer3_offset + 8]
    }

    pub fn set_ttl(&mut self, ttl: u8) {
        self.data[self.layer3_offset + 8] = ttl;
    }

    pub fn checksum(&self) -> u16 {
        u16::from_be_bytes(
            self.data[self.layer3_offset + 10..=self.layer3_offset + 11]
                .try_into()
                .unwrap(),
        )
    }

    /// The whole second header byte, DSCP and ECN together.
    pub fn type_of_service(&self) -> u8 {
        self.data[self.layer3_offset + 1]
    }

    pub fn set_type_of_service(&mut self, tos: u8) {
        self.data[self.layer3_offset + 1] = tos;
    }

    pub fn identification(&self) -> u16 {
        u16::from_be_bytes(
            self.data[self.layer3_offset + 4..=self.layer3_offset + 5]
                .try_into()
                .unwrap(),
        )
    }

    pub fn set_identification(&mut self, id: u16) {
        self.data[self.layer3_offset + 4..=self.layer3_offset + 5].copy_from_slice(&id.to_be_bytes());
    }

    pub fn fragment_offset(&self) -> u16 {
        u16::from_be_bytes([
            self.data[self.layer3_offset + 6] & 0x1F,
            self.data[self.layer3_offset + 7],
        ])
    }

    /// Returns tuple of (Don't Fragment, More Fragments)
    pub fn flags(&self) -> (bool, bool) {
        let df = (self.data[self.layer3_offset + 6] & 0x40) != 0;
        let mf = (self.data[self.layer3_offset + 6] & 0x20) != 0;
        (df, mf)
    }

    /// Writes the flags and the 13 bit fragment offset in one go, they share a 16 bit field.
    pub fn set_flags_and_fragment_offset(&mut self, flags: (bool, bool), fragment_offset: u16) {
        let (df, mf) = flags;
        let mut field = fragment_offset & 0x1FFF;
        if df {
            field |= 0x4000;
        }
        if mf {
            field |= 0x2000;
        }
        self.data[self.layer3_offset + 6..=self.layer3_offset + 7]
            .copy_from_slice(&field.to_be_bytes());
    }

    /// True for any piece of a fragmented datagram, first fragment included.
    pub fn is_fragment(&self) -> bool {
        let (_, more_fragments) = self.flags();
        more_fragments || self.fragment_offset() != 0
    }

    /// Verifies the IP header checksum.
    pub fn validate_checksum(&self) -> bool {
        verify_checksum(&self.data[self.layer3_offset..self.payload_offset])
    }

    /// Calculates what the checksum should be set to given the current header
    pub fn calculate_checksum(&self) -> u16 {
        let mut header = self.data[self.layer3_offset..self.payload_offset].to_vec();
        header[10] = 0;
        header[11] = 0;
        internet_checksum(&header)
    }

    /// Sets checksum field to valid value
    pub fn set_checksum(&mut self) {
        let new_checksum = self.calculate_checksum();
        self.data[self.layer3_offset + 10..=self.layer3_offset + 11]
            .copy_from_slice(&new_checksum.to_be_bytes());
    }
}

/// Ipv4Packets are considered the same if they have the same data from the layer 3
/// header and onward. This function does not consider the data before the start of
/// the IPv4 header.
impl PartialEq for Ipv4Packet {
    fn eq(&self, other: &Self) -> bool {
        self.data[self.layer3_offset..] == other.data[other.layer3_offset..]
    }
}

impl Eq for Ipv4Packet {}

/// Returns Ipv4 payload type, reads the header information to get the type
/// of IpProtocol payload is included.
pub fn get_ipv4_payload_type(
    data: &[u8],
    layer3_offset: usize,
) -> Result<IpProtocol, &'static str> {
    if data.len() <= layer3_offset + 9 || (data[layer3_offset] & 0xF0) != 0x40 {
        // Either data isn't big enough, or the version field does not indicate this is
        // an Ipv4 packet.
        return Err("Is not an Ipv4 packet");
    }
    Ok(IpProtocol::from(data[layer3_offset + 9]))
}

impl TryFrom<EthernetFrame> for Ipv4Packet {
    type Error = &'static str;

    fn try_from(frame: EthernetFrame) -> Result<Self, Self::Error> {
        if frame.ether_type() != IPV4_ETHER_TYPE {
            return Err("Frame does not have IPv4 ether type");
        }
        Ipv4Packet::from_buffer(frame.data, Some(frame.layer2_offset), frame.payload_offset)
    }
}

/// Decoded IPv4 header. `ihl`, `total_len` and `checksum` describe the packet this header was
/// read from; they are recomputed whenever the header is serialized again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ipv4Header {
    pub version: u8,
    pub ihl: u8,
    pub type_of_service: u8,
    pub total_len: u16,
    pub identification: u16,
    pub dont_fragment: bool,
    pub more_fragments: bool,
    pub fragment_offset: u16,
    pub ttl: u8,
    pub protocol: IpProtocol,
    pub checksum: u16,
    pub src_addr: Ipv4Addr,
    pub dest_addr: Ipv4Addr,
    pub options: Vec<u8>,
}

impl From<&Ipv4Packet> for Ipv4Header {
    fn from(packet: &Ipv4Packet) -> Self {
        let (dont_fragment, more_fragments) = packet.flags();
        Ipv4Header {
            version: packet.version(),
            ihl: packet.ihl(),
            type_of_service: packet.type_of_service(),
            total_len: packet.total_len(),
            identification: packet.identification(),
            dont_fragment,
            more_fragments,
            fragment_offset: packet.fragment_offset(),
            ttl: packet.ttl(),
            protocol: packet.protocol(),
            checksum: packet.checksum(),
            src_addr: packet.src_addr(),
            dest_addr: packet.dest_addr(),
            options: packet
                .options()
                .map(|options| options.into_owned())
                .unwrap_or_default(),
        }
    }
}

impl Ipv4Header {
    /// Writes every field that is not derived from the byte layout into `packet`. Options, IHL,
    /// total length and checksum are left to the caller.
    pub fn emit(&self, packet: &mut Ipv4Packet) {
        packet.set_type_of_service(self.type_of_service);
        packet.set_identification(self.identification);
        packet.set_flags_and_fragment_offset(
            (self.dont_fragment, self.more_fragments),
            self.fragment_offset,
        );
        packet.set_ttl(self.ttl);
        packet.set_protocol(self.protocol);
        packet.set_src_addr(self.src_addr);
        packet.set_dest_addr(self.dest_addr);
    }
}

use crate::*;
use std::borrow::Cow;
use std::convert::{TryFrom, TryInto};

/// Type, code, checksum and the four "rest of header" bytes.
pub const ICMPV4_HEADER_LEN: usize = 8;

/// ICMPv4 message types, only the echo pair is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Icmpv4Type {
    EchoReply,
    EchoRequest,
    Other(u8),
}

impl From<u8> for Icmpv4Type {
    fn from(msg_type: u8) -> Self {
        match msg_type {
            0 => Icmpv4Type::EchoReply,
            8 => Icmpv4Type::EchoRequest,
            other => Icmpv4Type::Other(other),
        }
    }
}

impl From<Icmpv4Type> for u8 {
    fn from(msg_type: Icmpv4Type) -> Self {
        match msg_type {
            Icmpv4Type::EchoReply => 0,
            Icmpv4Type::EchoRequest => 8,
            Icmpv4Type::Other(other) => other,
        }
    }
}

///
/// ICMPv4 message as described in RFC 792 https://tools.ietf.org/html/rfc792
///
///  0                   1                   2                   3
/// |     Type      |     Code      |          Checksum             |
/// |           Identifier          |        Sequence Number        |
/// |     Data ...
///
/// Identifier and sequence number only mean something for echo messages, for other types they
/// read whatever the "rest of header" holds.
///
#[derive(Clone, Debug)]
pub struct Icmpv4Packet {
    pub data: PacketData,
    pub layer2_offset: Option<usize>,
    pub layer3_offset: Option<usize>,
    pub layer4_offset: usize,
    pub payload_offset: usize,
}

impl Packet for Icmpv4Packet {}

impl Icmpv4Packet {
    pub fn from_buffer(
        data: PacketData,
        layer2_offset: Option<usize>,
        layer3_offset: Option<usize>,
        layer4_offset: usize,
    ) -> Result<Icmpv4Packet, &'static str> {
        if data.len() < layer4_offset + ICMPV4_HEADER_LEN {
            return Err("Message too short to contain an ICMP header");
        }

        if let Some(layer3_offset) = layer3_offset {
            if get_ipv4_payload_type(&data, layer3_offset)? != IpProtocol::ICMP {
                return Err("Protocol is incorrect, since it isn't ICMP");
            }
        }

        Ok(Icmpv4Packet {
            data,
            layer2_offset,
            layer3_offset,
            layer4_offset,
            payload_offset: layer4_offset + ICMPV4_HEADER_LEN,
        })
    }

    /// Make an empty ICMP message, with no layer 3 header nor payload.
    pub fn empty() -> Icmpv4Packet {
        Icmpv4Packet {
            data: vec![0; ICMPV4_HEADER_LEN],
            layer2_offset: None,
            layer3_offset: None,
            layer4_offset: 0,
            payload_offset: ICMPV4_HEADER_LEN,
        }
    }

    pub fn msg_type(&self) -> Icmpv4Type {
        Icmpv4Type::from(self.data[self.layer4_offset])
    }

    pub fn set_msg_type(&mut self, msg_type: Icmpv4Type) -> &mut Self {
        self.data[self.layer4_offset] = u8::from(msg_type);
        self
    }

    pub fn code(&self) -> u8 {
        self.data[self.layer4_offset + 1]
    }

    pub fn set_code(&mut self, code: u8) -> &mut Self {
        self.data[self.layer4_offset + 1] = code;
        self
    }

    pub fn checksum(&self) -> u16 {
        u16::from_be_bytes(
            self.data[self.layer4_offset + 2..=self.layer4_offset + 3]
                .try_into()
                .unwrap(),
        )
    }

    pub fn identifier(&self) -> u16 {
        u16::from_be_bytes(
            self.data[self.layer4_offset + 4..=self.layer4_offset + 5]
                .try_into()
                .unwrap(),
        )
    }

    pub fn set_identifier(&mut self, identifier: u16) -> &mut Self {
        self.data[self.layer4_offset + 4..=self.layer4_offset + 5]
            .copy_from_slice(&identifier.to_be_bytes());
        self
    }

    pub fn sequence(&self) -> u16 {
        u16::from_be_bytes(
            self.data[self.layer4_offset + 6..=self.layer4_offset + 7]
                .try_into()
                .unwrap(),
        )
    }

    pub fn set_sequence(&mut self, sequence: u16) -> &mut Self {
        self.data[self.layer4_offset + 6..=self.layer4_offset + 7]
            .copy_from_slice(&sequence.to_be_bytes());
        self
    }

    pub fn payload(&self) -> Cow<[u8]> {
        Cow::from(&self.data[self.payload_offset..])
    }

    /// Set payload of the ICMP message, does not change checksum.
    /// Don't forget to update the length field of the IP packet that contains this.
    pub fn set_payload(&mut self, payload: &[u8]) -> &mut Self {
        self.data.truncate(self.payload_offset);
        self.data.reserve_exact(payload.len());
        self.data.extend(payload);
        self
    }

    /// Checksum over the ICMP header and payload, computed with the checksum field zeroed.
    pub fn calculate_checksum(&self) -> u16 {
        let mut message = self.data[self.layer4_offset..].to_vec();
        message[2] = 0;
        message[3] = 0;
        internet_checksum(&message)
    }

    pub fn set_checksum(&mut self) -> &mut Self {
        let checksum = self.calculate_checksum();
        self.data[self.layer4_offset + 2..=self.layer4_offset + 3]
            .copy_from_slice(&checksum.to_be_bytes());
        self
    }

    pub fn validate_checksum(&self) -> bool {
        verify_checksum(&self.data[self.layer4_offset..])
    }
}

impl TryFrom<Ipv4Packet> for Icmpv4Packet {
    type Error = &'static str;

    fn try_from(packet: Ipv4Packet) -> Result<Self, Self::Error> {
        Icmpv4Packet::from_buffer(
            packet.data,
            packet.layer2_offset,
            Some(packet.layer3_offset),
            packet.payload_offset,
        )
    }
}

/// Decoded ICMPv4 message. `checksum` is what was received and is never reused on output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Icmpv4Message {
    pub msg_type: Icmpv4Type,
    pub code: u8,
    pub checksum: u16,
    pub identifier: u16,
    pub sequence: u16,
    pub payload: Vec<u8>,
}

impl From<&Icmpv4Packet> for Icmpv4Message {
    fn from(packet: &Icmpv4Packet) -> Self {
        Icmpv4Message {
            msg_type: packet.msg_type(),
            code: packet.code(),
            checksum: packet.checksum(),
            identifier: packet.identifier(),
            sequence: packet.sequence(),
            payload: packet.payload().into_owned(),
        }
    }
}

impl Icmpv4Message {
    /// Builds a standalone ICMP message with a freshly computed checksum.
    pub fn to_packet(&self) -> Icmpv4Packet {
        let mut packet = Icmpv4Packet::empty();
        packet
            .set_msg_type(self.msg_type)
            .set_code(self.code)
            .set_identifier(self.identifier)
            .set_sequence(self.sequence)
            .set_payload(&self.payload)
            .set_checksum();
        packet
    }
}

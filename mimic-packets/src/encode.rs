use crate::*;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("cannot serialize layer stack {0}")]
    UnsupportedStack(String),

    #[error("IPv4 header has version {0}, expected 4")]
    InvalidVersion(u8),

    #[error("IPv4 options are {0} bytes, must be a multiple of 4 and at most 40")]
    InvalidOptions(usize),

    #[error("IPv4 total length {0} exceeds 65535")]
    TooLarge(usize),
}

impl LayerStack {
    /// Serializes the stack outermost layer first. Lengths and checksums are always computed
    /// from the bytes being written: the ICMP checksum first, then the IPv4 total length and
    /// header checksum. Whatever values the decoded headers carried for those fields are
    /// ignored.
    ///
    /// Ethernet frames are zero-padded to `ETHERNET_MIN_FRAME_LEN`; bare IPv4 packets are not.
    ///
    /// Only the shapes a reply can take are accepted: Ethernet/ARP, Ethernet/IPv4/ICMPv4 and
    /// IPv4/ICMPv4.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        match self.layers() {
            [Layer::Ethernet(ethernet), Layer::Arp(arp)] => Ok(encode_arp(ethernet, arp)),
            [Layer::Ethernet(ethernet), Layer::Ipv4(ipv4), Layer::Icmpv4(icmp)] => {
                let packet = encode_ipv4_icmp(ipv4, icmp)?;
                let mut frame = EthernetFrame::encap_ipv4(packet);
                frame.set_src_mac(ethernet.src_mac);
                frame.set_dest_mac(ethernet.dest_mac);
                frame.pad();
                Ok(frame.data)
            }
            [Layer::Ipv4(ipv4), Layer::Icmpv4(icmp)] => Ok(encode_ipv4_icmp(ipv4, icmp)?.data),
            layers => Err(EncodeError::UnsupportedStack(describe(layers))),
        }
    }
}

fn encode_arp(ethernet: &EthernetHeader, arp: &ArpMessage) -> Vec<u8> {
    let mut arp_frame = arp.to_frame();
    let frame = arp_frame.frame_mut();
    frame.set_src_mac(ethernet.src_mac);
    frame.set_dest_mac(ethernet.dest_mac);
    frame.set_ether_type(ARP_ETHER_TYPE);
    frame.pad();
    arp_frame.frame().data
}

fn encode_ipv4_icmp(ipv4: &Ipv4Header, icmp: &Icmpv4Message) -> Result<Ipv4Packet, EncodeError> {
    if ipv4.version != 4 {
        return Err(EncodeError::InvalidVersion(ipv4.version));
    }
    let options_len = ipv4.options.len();
    if options_len % 4 != 0 || options_len > IPV4_MAX_OPTIONS_LEN {
        return Err(EncodeError::InvalidOptions(options_len));
    }
    let total_len = IPV4_MIN_HEADER_LEN + options_len + ICMPV4_HEADER_LEN + icmp.payload.len();
    if total_len > usize::from(u16::MAX) {
        return Err(EncodeError::TooLarge(total_len));
    }

    let mut packet = Ipv4Packet::encap_icmp(icmp.to_packet());
    ipv4.emit(&mut packet);
    // The payload carries ICMP whatever protocol number the header was read with.
    packet.set_protocol(IpProtocol::ICMP);
    if options_len > 0 {
        packet.set_options(&ipv4.options);
    }
    packet.set_checksum();
    Ok(packet)
}

fn describe(layers: &[Layer]) -> String {
    let names: Vec<&str> = layers
        .iter()
        .map(|layer| match layer {
            Layer::Ethernet(_) => "Ethernet",
            Layer::Arp(_) => "ARP",
            Layer::Ipv4(_) => "IPv4",
            Layer::Icmpv4(_) => "ICMPv4",
        })
        .collect();
    format!("[{}]", names.join(", "))
}

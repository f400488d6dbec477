use crate::*;
use std::convert::TryFrom;

/// Which header a raw frame starts with. TAP devices hand over Ethernet frames, TUN devices
/// hand over bare IPv4 packets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkType {
    Ethernet,
    Ipv4,
}

/// One decoded protocol layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Layer {
    Ethernet(EthernetHeader),
    Arp(ArpMessage),
    Ipv4(Ipv4Header),
    Icmpv4(Icmpv4Message),
}

/// Decoded layers of one frame, outermost first. A layer is only present if its bytes parsed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayerStack {
    layers: Vec<Layer>,
}

impl LayerStack {
    pub fn new() -> LayerStack {
        LayerStack { layers: Vec::new() }
    }

    pub fn push(&mut self, layer: Layer) -> &mut Self {
        self.layers.push(layer);
        self
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn ethernet(&self) -> Option<&EthernetHeader> {
        self.layers.iter().find_map(|layer| match layer {
            Layer::Ethernet(header) => Some(header),
            _ => None,
        })
    }

    pub fn arp(&self) -> Option<&ArpMessage> {
        self.layers.iter().find_map(|layer| match layer {
            Layer::Arp(message) => Some(message),
            _ => None,
        })
    }

    pub fn ipv4(&self) -> Option<&Ipv4Header> {
        self.layers.iter().find_map(|layer| match layer {
            Layer::Ipv4(header) => Some(header),
            _ => None,
        })
    }

    pub fn icmpv4(&self) -> Option<&Icmpv4Message> {
        self.layers.iter().find_map(|layer| match layer {
            Layer::Icmpv4(message) => Some(message),
            _ => None,
        })
    }
}

impl From<Vec<Layer>> for LayerStack {
    fn from(layers: Vec<Layer>) -> Self {
        LayerStack { layers }
    }
}

/// Decodes as many layers of `data` as can be recognised, starting with `link`. Decoding stops
/// quietly at the first layer that is unknown, truncated or malformed; `data` is never modified.
pub fn decode(data: &[u8], link: LinkType) -> LayerStack {
    let mut stack = LayerStack::new();
    match link {
        LinkType::Ethernet => {
            if let Ok(frame) = EthernetFrame::from_buffer(data.to_vec(), 0) {
                decode_ethernet(frame, &mut stack);
            }
        }
        LinkType::Ipv4 => {
            if let Ok(packet) = Ipv4Packet::from_buffer(data.to_vec(), None, 0) {
                decode_ipv4(packet, &mut stack);
            }
        }
    }
    stack
}

fn decode_ethernet(frame: EthernetFrame, stack: &mut LayerStack) {
    stack.push(Layer::Ethernet(EthernetHeader::from(&frame)));

    match frame.ether_type() {
        ARP_ETHER_TYPE => {
            if let Ok(message) = ArpFrame::try_from(frame)
                .and_then(|arp_frame| ArpMessage::try_from(&arp_frame))
            {
                stack.push(Layer::Arp(message));
            }
        }
        IPV4_ETHER_TYPE => {
            if let Ok(packet) = Ipv4Packet::try_from(frame) {
                decode_ipv4(packet, stack);
            }
        }
        _ => {}
    }
}

fn decode_ipv4(packet: Ipv4Packet, stack: &mut LayerStack) {
    stack.push(Layer::Ipv4(Ipv4Header::from(&packet)));

    // Reassembly is not supported, so no fragment carries a readable upper layer.
    if packet.is_fragment() {
        return;
    }

    if packet.protocol() == IpProtocol::ICMP {
        if let Ok(message) = Icmpv4Packet::try_from(packet) {
            stack.push(Layer::Icmpv4(Icmpv4Message::from(&message)));
        }
    }
}

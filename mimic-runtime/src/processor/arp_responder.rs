use crate::classifier::ArpRequest;
use crate::config::Identity;
use crate::processor::Processor;
use mimic_packets::*;

/// Answers ARP requests as if `identity` were a host on the link.
///
/// Every request is answered, whichever protocol address it asks for, so anything resolved
/// through the TAP device resolves to the configured hardware address.
pub struct ArpResponder {
    identity: Identity,
}

impl ArpResponder {
    pub fn new(identity: Identity) -> Self {
        ArpResponder { identity }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}

impl Processor for ArpResponder {
    type Input = ArpRequest;
    type Output = LayerStack;

    fn process(&mut self, request: Self::Input) -> Option<Self::Output> {
        let ethernet = EthernetHeader {
            src_mac: self.identity.hardware_addr,
            dest_mac: request.arp.sender_hardware_addr,
            ether_type: ARP_ETHER_TYPE,
        };
        let arp = ArpMessage {
            operation: ArpOp::Reply,
            sender_hardware_addr: self.identity.hardware_addr,
            sender_protocol_addr: self.identity.protocol_addr,
            target_hardware_addr: request.arp.sender_hardware_addr,
            target_protocol_addr: request.arp.sender_protocol_addr,
        };

        let mut reply = LayerStack::new();
        reply.push(Layer::Ethernet(ethernet)).push(Layer::Arp(arp));
        Some(reply)
    }
}

use crate::classifier::Classifier;
use mimic_packets::*;

/// An ARP request together with the Ethernet header it arrived in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArpRequest {
    pub ethernet: EthernetHeader,
    pub arp: ArpMessage,
}

/// An ICMPv4 echo request. `ethernet` is only present when the frame came from a TAP device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EchoRequest {
    pub ethernet: Option<EthernetHeader>,
    pub ipv4: Ipv4Header,
    pub icmp: Icmpv4Message,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    Arp(ArpRequest),
    Echo(EchoRequest),
    NoAction,
}

/// Sorts decoded frames into the requests we know how to answer. ARP replies, non-echo ICMP and
/// anything that did not decode far enough all end up as `NoAction`.
#[derive(Default)]
pub struct RequestClassifier {}

impl RequestClassifier {
    pub fn new() -> Self {
        RequestClassifier {}
    }
}

impl Classifier for RequestClassifier {
    type Packet = LayerStack;
    type Class = Request;

    fn classify(&self, stack: &Self::Packet) -> Self::Class {
        match stack.layers() {
            [Layer::Ethernet(ethernet), Layer::Arp(arp)] if arp.operation == ArpOp::Request => {
                Request::Arp(ArpRequest {
                    ethernet: *ethernet,
                    arp: *arp,
                })
            }
            [Layer::Ethernet(ethernet), Layer::Ipv4(ipv4), Layer::Icmpv4(icmp)]
                if icmp.msg_type == Icmpv4Type::EchoRequest =>
            {
                Request::Echo(EchoRequest {
                    ethernet: Some(*ethernet),
                    ipv4: ipv4.clone(),
                    icmp: icmp.clone(),
                })
            }
            [Layer::Ipv4(ipv4), Layer::Icmpv4(icmp)] if icmp.msg_type == Icmpv4Type::EchoRequest => {
                Request::Echo(EchoRequest {
                    ethernet: None,
                    ipv4: ipv4.clone(),
                    icmp: icmp.clone(),
                })
            }
            _ => Request::NoAction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn ethernet(ether_type: u16) -> EthernetHeader {
        EthernetHeader {
            src_mac: MacAddr::new([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]),
            dest_mac: MacAddr::broadcast(),
            ether_type,
        }
    }

    fn arp(operation: ArpOp) -> ArpMessage {
        ArpMessage {
            operation,
            sender_hardware_addr: MacAddr::new([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]),
            sender_protocol_addr: Ipv4Addr::new(10, 0, 0, 5),
            target_hardware_addr: MacAddr::new([0; 6]),
            target_protocol_addr: Ipv4Addr::new(10, 0, 0, 1),
        }
    }

    fn ipv4() -> Ipv4Header {
        Ipv4Header {
            version: 4,
            ihl: 5,
            type_of_service: 0,
            total_len: 32,
            identification: 0,
            dont_fragment: false,
            more_fragments: false,
            fragment_offset: 0,
            ttl: 64,
            protocol: IpProtocol::ICMP,
            checksum: 0,
            src_addr: Ipv4Addr::new(10, 0, 0, 5),
            dest_addr: Ipv4Addr::new(10, 0, 0, 1),
            options: vec![],
        }
    }

    fn icmp(msg_type: Icmpv4Type, code: u8) -> Icmpv4Message {
        Icmpv4Message {
            msg_type,
            code,
            checksum: 0,
            identifier: 1,
            sequence: 1,
            payload: b"ping".to_vec(),
        }
    }

    #[test]
    fn arp_request() {
        let stack = LayerStack::from(vec![
            Layer::Ethernet(ethernet(ARP_ETHER_TYPE)),
            Layer::Arp(arp(ArpOp::Request)),
        ]);
        match RequestClassifier::new().classify(&stack) {
            Request::Arp(request) => {
                assert_eq!(request.arp, arp(ArpOp::Request));
                assert_eq!(request.ethernet, ethernet(ARP_ETHER_TYPE));
            }
            other => panic!("expected an ARP request, got {:?}", other),
        }
    }

    #[test]
    fn arp_reply_is_no_action() {
        let stack = LayerStack::from(vec![
            Layer::Ethernet(ethernet(ARP_ETHER_TYPE)),
            Layer::Arp(arp(ArpOp::Reply)),
        ]);
        assert_eq!(RequestClassifier::new().classify(&stack), Request::NoAction);
    }

    #[test]
    fn arp_without_ethernet_is_no_action() {
        let stack = LayerStack::from(vec![Layer::Arp(arp(ArpOp::Request))]);
        assert_eq!(RequestClassifier::new().classify(&stack), Request::NoAction);
    }

    #[test]
    fn echo_request_with_and_without_ethernet() {
        let classifier = RequestClassifier::new();

        let bare = LayerStack::from(vec![
            Layer::Ipv4(ipv4()),
            Layer::Icmpv4(icmp(Icmpv4Type::EchoRequest, 0)),
        ]);
        match classifier.classify(&bare) {
            Request::Echo(request) => assert!(request.ethernet.is_none()),
            other => panic!("expected an echo request, got {:?}", other),
        }

        let framed = LayerStack::from(vec![
            Layer::Ethernet(ethernet(IPV4_ETHER_TYPE)),
            Layer::Ipv4(ipv4()),
            Layer::Icmpv4(icmp(Icmpv4Type::EchoRequest, 0)),
        ]);
        match classifier.classify(&framed) {
            Request::Echo(request) => {
                assert_eq!(request.ethernet, Some(ethernet(IPV4_ETHER_TYPE)));
                assert_eq!(request.icmp.payload, b"ping".to_vec());
            }
            other => panic!("expected an echo request, got {:?}", other),
        }
    }

    #[test]
    fn echo_code_is_not_checked() {
        let stack = LayerStack::from(vec![
            Layer::Ipv4(ipv4()),
            Layer::Icmpv4(icmp(Icmpv4Type::EchoRequest, 9)),
        ]);
        assert!(matches!(
            RequestClassifier::new().classify(&stack),
            Request::Echo(_)
        ));
    }

    #[test]
    fn other_icmp_is_no_action() {
        let classifier = RequestClassifier::new();
        for msg_type in &[
            Icmpv4Type::EchoReply,
            Icmpv4Type::Other(3),
            Icmpv4Type::Other(11),
        ] {
            let stack = LayerStack::from(vec![
                Layer::Ipv4(ipv4()),
                Layer::Icmpv4(icmp(*msg_type, 0)),
            ]);
            assert_eq!(classifier.classify(&stack), Request::NoAction);
        }
    }

    #[test]
    fn partial_stacks_are_no_action() {
        let classifier = RequestClassifier::new();
        assert_eq!(classifier.classify(&LayerStack::new()), Request::NoAction);
        assert_eq!(
            classifier.classify(&LayerStack::from(vec![Layer::Ethernet(ethernet(0x86dd))])),
            Request::NoAction
        );
        assert_eq!(
            classifier.classify(&LayerStack::from(vec![Layer::Ipv4(ipv4())])),
            Request::NoAction
        );
    }
}

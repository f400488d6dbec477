use crate::classifier::EchoRequest;
use crate::processor::Processor;
use mimic_packets::*;

/// Turns an echo request around: addresses are swapped at every layer that is present, while
/// identifier, sequence and payload go back untouched. The remaining IPv4 fields, TTL included,
/// are carried through; lengths and checksums are left for the encoder to recompute.
#[derive(Default)]
pub struct EchoResponder {}

impl EchoResponder {
    pub fn new() -> Self {
        EchoResponder {}
    }
}

impl Processor for EchoResponder {
    type Input = EchoRequest;
    type Output = LayerStack;

    fn process(&mut self, request: Self::Input) -> Option<Self::Output> {
        let mut reply = LayerStack::new();

        if let Some(ethernet) = request.ethernet {
            reply.push(Layer::Ethernet(EthernetHeader {
                src_mac: ethernet.dest_mac,
                dest_mac: ethernet.src_mac,
                ether_type: IPV4_ETHER_TYPE,
            }));
        }

        let mut ipv4 = request.ipv4;
        std::mem::swap(&mut ipv4.src_addr, &mut ipv4.dest_addr);
        reply.push(Layer::Ipv4(ipv4));

        reply.push(Layer::Icmpv4(Icmpv4Message {
            msg_type: Icmpv4Type::EchoReply,
            code: 0,
            checksum: 0,
            identifier: request.icmp.identifier,
            sequence: request.icmp.sequence,
            payload: request.icmp.payload,
        }));

        Some(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{self, Rng};
    use std::convert::TryFrom;
    use std::net::Ipv4Addr;

    fn request(ethernet: Option<EthernetHeader>, payload: &[u8]) -> EchoRequest {
        EchoRequest {
            ethernet,
            ipv4: Ipv4Header {
                version: 4,
                ihl: 5,
                type_of_service: 0,
                total_len: 28 + payload.len() as u16,
                identification: 0x4242,
                dont_fragment: true,
                more_fragments: false,
                fragment_offset: 0,
                ttl: 63,
                protocol: IpProtocol::ICMP,
                checksum: 0x1234,
                src_addr: Ipv4Addr::new(10, 0, 0, 5),
                dest_addr: Ipv4Addr::new(10, 0, 0, 1),
                options: vec![],
            },
            icmp: Icmpv4Message {
                msg_type: Icmpv4Type::EchoRequest,
                code: 0,
                checksum: 0x5678,
                identifier: 1,
                sequence: 1,
                payload: payload.to_vec(),
            },
        }
    }

    #[test]
    fn reply_without_link_layer() {
        let reply = EchoResponder::new()
            .process(request(None, b"ping"))
            .unwrap();
        assert_eq!(reply.len(), 2);
        assert!(reply.ethernet().is_none());

        let ipv4 = reply.ipv4().unwrap();
        assert_eq!(ipv4.src_addr, Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(ipv4.dest_addr, Ipv4Addr::new(10, 0, 0, 5));
        assert_eq!(ipv4.ttl, 63);
        assert_eq!(ipv4.identification, 0x4242);

        let icmp = reply.icmpv4().unwrap();
        assert_eq!(icmp.msg_type, Icmpv4Type::EchoReply);
        assert_eq!(icmp.code, 0);
        assert_eq!(icmp.identifier, 1);
        assert_eq!(icmp.sequence, 1);
        assert_eq!(icmp.payload, b"ping".to_vec());
    }

    #[test]
    fn reply_swaps_ethernet() {
        let ethernet = EthernetHeader {
            src_mac: MacAddr::new([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]),
            dest_mac: MacAddr::new([2, 0, 0, 0, 0, 1]),
            ether_type: IPV4_ETHER_TYPE,
        };
        let reply = EchoResponder::new()
            .process(request(Some(ethernet), b""))
            .unwrap();
        assert_eq!(reply.len(), 3);

        let swapped = reply.ethernet().unwrap();
        assert_eq!(swapped.src_mac, ethernet.dest_mac);
        assert_eq!(swapped.dest_mac, ethernet.src_mac);
        assert_eq!(swapped.ether_type, IPV4_ETHER_TYPE);
    }

    #[test]
    fn encoded_replies_echo_random_requests() {
        let mut responder = EchoResponder::new();
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let len = rng.gen_range(0, 1472);
            let mut payload = vec![0; len];
            rng.fill(&mut payload[..]);

            let mut echo = request(None, &payload);
            echo.icmp.identifier = rng.gen();
            echo.icmp.sequence = rng.gen();
            echo.ipv4.src_addr = Ipv4Addr::from(rng.gen::<u32>());
            echo.ipv4.dest_addr = Ipv4Addr::from(rng.gen::<u32>());

            let bytes = responder.process(echo.clone()).unwrap().encode().unwrap();
            let packet = Ipv4Packet::from_buffer(bytes, None, 0).unwrap();
            assert!(packet.validate_checksum());
            assert_eq!(packet.src_addr(), echo.ipv4.dest_addr);
            assert_eq!(packet.dest_addr(), echo.ipv4.src_addr);
            assert_eq!(usize::from(packet.total_len()), 28 + len);

            let icmp = Icmpv4Packet::try_from(packet).unwrap();
            assert!(icmp.validate_checksum());
            assert_eq!(icmp.msg_type(), Icmpv4Type::EchoReply);
            assert_eq!(icmp.identifier(), echo.icmp.identifier);
            assert_eq!(icmp.sequence(), echo.icmp.sequence);
            assert_eq!(icmp.payload().as_ref(), payload.as_slice());
        }
    }
}

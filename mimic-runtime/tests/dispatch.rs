use mimic_packets::*;
use mimic_runtime::utils::test::{MemorySink, MemorySource};
use mimic_runtime::*;
use std::convert::TryFrom;
use std::io;
use std::net::Ipv4Addr;

fn tap_config() -> ResponderConfig {
    ResponderConfig::new(
        InterfaceConfig::parse("tap0", "10.0.0.254", "24").unwrap(),
        Variant::Tap(Identity::parse("02:00:00:00:00:01", "10.0.0.1").unwrap()),
    )
    .with_pacing(None)
}

fn tun_config() -> ResponderConfig {
    ResponderConfig::new(
        InterfaceConfig::parse("tun0", "10.0.0.254", "24").unwrap(),
        Variant::Tun,
    )
    .with_pacing(None)
}

fn arp_request() -> Vec<u8> {
    vec![
        0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff, 0x08, 0x06, 0x00,
        0x01, 0x08, 0x00, 0x06, 0x04, 0x00, 0x01, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff, 10, 0, 0, 5,
        0, 0, 0, 0, 0, 0, 10, 0, 0, 1,
    ]
}

fn echo_request() -> Vec<u8> {
    let mut packet = vec![
        0x45, 0x00, 0x00, 0x20, 0x1c, 0x46, 0x40, 0x00, 0x40, 0x01, 0x00, 0x00, 10, 0, 0, 5, 10,
        0, 0, 1, 0x08, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, b'p', b'i', b'n', b'g',
    ];
    let icmp_checksum = internet_checksum(&packet[20..]);
    packet[22..24].copy_from_slice(&icmp_checksum.to_be_bytes());
    let ip_checksum = internet_checksum(&packet[..20]);
    packet[10..12].copy_from_slice(&ip_checksum.to_be_bytes());
    packet
}

fn ethernet(dest: [u8; 6], src: [u8; 6], ether_type: u16, payload: &[u8]) -> Vec<u8> {
    let mut frame = dest.to_vec();
    frame.extend_from_slice(&src);
    frame.extend_from_slice(&ether_type.to_be_bytes());
    frame.extend_from_slice(payload);
    frame
}

#[test]
fn arp_request_over_tap() {
    let source: MemorySource = vec![arp_request()].into_iter().collect();
    let mut dispatcher = Dispatcher::from_config(source, MemorySink::new(), &tap_config());

    assert_eq!(dispatcher.poll_once(), Outcome::Replied);

    let (_, sink, _) = dispatcher.into_parts();
    let frames = sink.into_frames();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].len(), ETHERNET_MIN_FRAME_LEN);
    assert_eq!(
        &frames[0][..42],
        &[
            0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff, 0x02, 0x00, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06,
            0x00, 0x01, 0x08, 0x00, 0x06, 0x04, 0x00, 0x02, 0x02, 0x00, 0x00, 0x00, 0x00, 0x01,
            10, 0, 0, 1, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff, 10, 0, 0, 5,
        ][..]
    );
    assert!(frames[0][42..].iter().all(|&b| b == 0));
}

#[test]
fn echo_request_over_tun() {
    let source: MemorySource = vec![echo_request()].into_iter().collect();
    let mut dispatcher = Dispatcher::from_config(source, MemorySink::new(), &tun_config());

    assert_eq!(dispatcher.poll_once(), Outcome::Replied);
    assert_eq!(dispatcher.stats().echo_replies, 1);

    let reply = dispatcher.sink().frames()[0].clone();
    let packet = Ipv4Packet::from_buffer(reply, None, 0).unwrap();
    assert_eq!(packet.src_addr(), Ipv4Addr::new(10, 0, 0, 1));
    assert_eq!(packet.dest_addr(), Ipv4Addr::new(10, 0, 0, 5));
    assert_eq!(packet.total_len(), 32);
    assert_eq!(packet.ttl(), 64);
    assert!(packet.validate_checksum());

    let icmp = Icmpv4Packet::try_from(packet).unwrap();
    assert_eq!(icmp.msg_type(), Icmpv4Type::EchoReply);
    assert_eq!(icmp.code(), 0);
    assert_eq!(icmp.identifier(), 1);
    assert_eq!(icmp.sequence(), 1);
    assert_eq!(icmp.payload().as_ref(), b"ping");
    assert!(icmp.validate_checksum());
}

#[test]
fn echo_request_over_tap() {
    let request = ethernet(
        [2, 0, 0, 0, 0, 1],
        [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff],
        IPV4_ETHER_TYPE,
        &echo_request(),
    );
    let source: MemorySource = vec![request].into_iter().collect();
    let mut dispatcher = Dispatcher::from_config(source, MemorySink::new(), &tap_config());
    assert_eq!(dispatcher.poll_once(), Outcome::Replied);

    let reply = &dispatcher.sink().frames()[0];
    // 14 + 20 + 8 + 4 bytes, zero-filled to the Ethernet minimum
    assert_eq!(reply.len(), ETHERNET_MIN_FRAME_LEN);
    assert_eq!(&reply[0..6], &[0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
    assert_eq!(&reply[6..12], &[2, 0, 0, 0, 0, 1]);

    let stack = decode(reply, LinkType::Ethernet);
    match stack.layers() {
        [Layer::Ethernet(_), Layer::Ipv4(ipv4), Layer::Icmpv4(icmp)] => {
            assert_eq!(ipv4.src_addr, Ipv4Addr::new(10, 0, 0, 1));
            assert_eq!(ipv4.dest_addr, Ipv4Addr::new(10, 0, 0, 5));
            assert_eq!(icmp.msg_type, Icmpv4Type::EchoReply);
            assert_eq!(icmp.payload, b"ping".to_vec());
        }
        other => panic!("unexpected reply layers {:?}", other),
    }
}

#[test]
fn padded_frames_are_answered() {
    let mut request = arp_request();
    request.resize(60, 0);
    let source: MemorySource = vec![request].into_iter().collect();
    let mut dispatcher = Dispatcher::from_config(source, MemorySink::new(), &tap_config());
    assert_eq!(dispatcher.poll_once(), Outcome::Replied);
    assert_eq!(dispatcher.sink().frames()[0].len(), ETHERNET_MIN_FRAME_LEN);
}

#[test]
fn non_requests_write_nothing() {
    let mut arp_reply = arp_request();
    arp_reply[21] = 2;

    let mut unreachable = echo_request();
    unreachable[20] = 3;

    let mut echo_reply = echo_request();
    echo_reply[20] = 0;

    let ipv6 = ethernet([2, 0, 0, 0, 0, 1], [0xaa; 6], 0x86dd, &[0x60; 40]);

    let frames = vec![
        arp_reply,
        ethernet([2, 0, 0, 0, 0, 1], [0xaa; 6], IPV4_ETHER_TYPE, &unreachable),
        ethernet([2, 0, 0, 0, 0, 1], [0xaa; 6], IPV4_ETHER_TYPE, &echo_reply),
        ipv6,
        vec![],
        vec![0x08, 0x06],
    ];
    let count = frames.len();
    let source: MemorySource = frames.into_iter().collect();
    let mut dispatcher = Dispatcher::from_config(source, MemorySink::new(), &tap_config());

    for _ in 0..count {
        assert_eq!(dispatcher.poll_once(), Outcome::NoReply);
    }
    assert!(dispatcher.sink().frames().is_empty());
    assert_eq!(dispatcher.stats().frames_received, count as u64);
    assert_eq!(dispatcher.stats().ignored, count as u64);
}

#[test]
fn tun_ignores_arp() {
    let source: MemorySource = vec![arp_request()].into_iter().collect();
    let mut dispatcher = Dispatcher::from_config(source, MemorySink::new(), &tun_config());
    assert_eq!(dispatcher.poll_once(), Outcome::NoReply);
    assert_eq!(dispatcher.stats().ignored, 1);
}

#[test]
fn failures_do_not_stop_the_loop() {
    let mut source = MemorySource::new();
    source
        .push_error(io::ErrorKind::Interrupted)
        .push_frame(echo_request())
        .push_frame(echo_request());
    let mut sink = MemorySink::new();
    sink.fail_next(1);

    let mut dispatcher = Dispatcher::from_config(source, sink, &tun_config());
    assert_eq!(dispatcher.poll_once(), Outcome::ReadFailed);
    assert_eq!(dispatcher.poll_once(), Outcome::WriteFailed);
    assert_eq!(dispatcher.poll_once(), Outcome::Replied);
    assert_eq!(dispatcher.poll_once(), Outcome::ReadFailed);
    assert_eq!(dispatcher.source().remaining(), 0);

    assert_eq!(
        *dispatcher.stats(),
        Stats {
            frames_received: 2,
            echo_replies: 2,
            read_errors: 2,
            write_errors: 1,
            ..Stats::default()
        }
    );
    assert_eq!(dispatcher.sink().frames().len(), 1);
}

#[test]
fn each_reply_matches_its_request() {
    let requests: Vec<Vec<u8>> = (0..20u16)
        .map(|sequence| {
            let mut icmp = Icmpv4Packet::empty();
            icmp.set_msg_type(Icmpv4Type::EchoRequest)
                .set_identifier(0x77)
                .set_sequence(sequence)
                .set_payload(&sequence.to_be_bytes())
                .set_checksum();
            let mut ip = Ipv4Packet::encap_icmp(icmp);
            ip.set_ttl(64);
            ip.set_src_addr(Ipv4Addr::new(192, 168, 0, sequence as u8));
            ip.set_dest_addr(Ipv4Addr::new(10, 0, 0, 1));
            ip.set_checksum();
            ip.data
        })
        .collect();
    let source: MemorySource = requests.into_iter().collect();
    let mut dispatcher = Dispatcher::from_config(source, MemorySink::new(), &tun_config());
    while dispatcher.source().remaining() > 0 {
        dispatcher.poll_once();
    }

    for (sequence, reply) in dispatcher.sink().frames().iter().enumerate() {
        let stack = decode(reply, LinkType::Ipv4);
        let icmp = stack.icmpv4().unwrap();
        assert_eq!(usize::from(icmp.sequence), sequence);
        assert_eq!(icmp.payload, (sequence as u16).to_be_bytes().to_vec());
        assert_eq!(
            stack.ipv4().unwrap().dest_addr,
            Ipv4Addr::new(192, 168, 0, sequence as u8)
        );
    }
    assert_eq!(dispatcher.sink().frames().len(), 20);
}

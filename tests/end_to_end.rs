use std::net::Ipv4Addr;

use ustack::config::InterfaceConfig;
use ustack::net::arp::{ArpMessage, OPCODE_REQUEST};
use ustack::net::ethernet::{
    EthernetFrame, EthernetHeader, ETHERNET_BROADCAST, ETHERTYPE_ARP, ETHERTYPE_IPV4,
};
use ustack::net::{InternetDatagram, NetworkInterface, Router};
use ustack::tcp::{TcpReceiver, TcpSender, TcpSenderMessage, Wrap32};
use ustack::{ByteStream, Reassembler};

const RTO: u64 = 1000;
const CAPACITY: u64 = 4096;

fn connection(isn: u32) -> (TcpSender, TcpReceiver) {
    let sender = TcpSender::new(ByteStream::new(CAPACITY), Wrap32::new(isn), RTO);
    let receiver = TcpReceiver::new(Reassembler::new(ByteStream::new(CAPACITY)));
    (sender, receiver)
}

fn push_collect(sender: &mut TcpSender) -> Vec<TcpSenderMessage> {
    let mut sent = Vec::new();
    sender.push(|msg| sent.push(msg.clone()));
    sent
}

/// Deliver every segment to the receiver and feed the resulting ack back.
fn exchange(sender: &mut TcpSender, receiver: &mut TcpReceiver, segments: &[TcpSenderMessage]) {
    for segment in segments {
        receiver.receive(segment);
    }
    sender.receive(&receiver.send());
}

#[test]
fn clean_transfer_with_fin() {
    let (mut tx, mut rx) = connection(12345);

    // handshake: SYN out, ack back
    let syn = push_collect(&mut tx);
    assert_eq!(syn.len(), 1);
    assert!(syn[0].syn());
    exchange(&mut tx, &mut rx, &syn);
    assert_eq!(tx.sequence_numbers_in_flight(), 0);

    // stream some data and close
    tx.writer().push(b"hello, network stack");
    tx.writer().close();
    let segments = push_collect(&mut tx);
    exchange(&mut tx, &mut rx, &segments);

    assert_eq!(tx.sequence_numbers_in_flight(), 0);
    let mut reader = rx.reader();
    assert_eq!(reader.read(64), b"hello, network stack");
    assert!(reader.is_finished());
}

#[test]
fn lost_segment_is_retransmitted_and_reassembled() {
    let (mut tx, mut rx) = connection(7);

    let syn = push_collect(&mut tx);
    exchange(&mut tx, &mut rx, &syn);

    tx.writer().push(b"abcdefgh");
    let segments = push_collect(&mut tx);
    assert_eq!(segments.len(), 1);

    // the segment is lost; the ack does not move
    tx.tick(RTO - 1, |_| {});
    assert_eq!(tx.consecutive_retransmissions(), 0);

    let mut retransmits = Vec::new();
    tx.tick(1, |msg| retransmits.push(msg.clone()));
    assert_eq!(retransmits.len(), 1);
    assert_eq!(tx.consecutive_retransmissions(), 1);

    // retransmission gets through
    exchange(&mut tx, &mut rx, &retransmits);
    assert_eq!(tx.sequence_numbers_in_flight(), 0);
    assert_eq!(tx.consecutive_retransmissions(), 0);
    assert_eq!(rx.reader().read(8), b"abcdefgh");
}

#[test]
fn out_of_order_delivery_is_reordered() {
    let (mut tx, mut rx) = connection(99);

    let syn = push_collect(&mut tx);
    exchange(&mut tx, &mut rx, &syn);

    tx.writer().push(&[b'a'; 1500]);
    tx.writer().push(&[b'b'; 500]);
    let segments = push_collect(&mut tx);
    assert!(segments.len() >= 2);

    // deliver in reverse order
    for segment in segments.iter().rev() {
        rx.receive(segment);
    }
    tx.receive(&rx.send());

    assert_eq!(tx.sequence_numbers_in_flight(), 0);
    let mut expected = vec![b'a'; 1500];
    expected.extend_from_slice(&[b'b'; 500]);
    assert_eq!(rx.reader().read(2000), expected);
}

#[test]
fn rst_tears_down_both_directions() {
    let (mut tx, mut rx) = connection(3);

    let syn = push_collect(&mut tx);
    exchange(&mut tx, &mut rx, &syn);

    // an error on the outbound stream surfaces as RST on the next segment
    tx.writer().set_error();
    let rst = tx.make_empty_message();
    assert!(rst.rst());

    rx.receive(&rst);
    assert!(rx.has_error());
    assert!(rx.send().rst);
}

fn host_interface(last_octet: u8) -> NetworkInterface {
    NetworkInterface::new(InterfaceConfig {
        name: format!("host{last_octet}"),
        ethernet_address: [0x02, 0, 0, 0, 0xaa, last_octet],
        ip_address: Ipv4Addr::new(192, 168, last_octet, 2),
    })
}

/// Answer the broadcast ARP request in `frame` on behalf of `ip`/`mac`.
fn answer_arp(frame: &EthernetFrame, ip: Ipv4Addr, mac: [u8; 6]) -> EthernetFrame {
    assert_eq!(frame.header.ether_type, ETHERTYPE_ARP);
    let request = ArpMessage::parse(&frame.payload).unwrap();
    assert_eq!(request.opcode, OPCODE_REQUEST);
    assert_eq!(request.target_ip_address, u32::from(ip));

    let reply = ArpMessage {
        opcode: ustack::net::arp::OPCODE_REPLY,
        sender_ethernet_address: mac,
        sender_ip_address: u32::from(ip),
        target_ethernet_address: request.sender_ethernet_address,
        target_ip_address: request.sender_ip_address,
        ..ArpMessage::default()
    };
    EthernetFrame {
        header: EthernetHeader {
            dst: request.sender_ethernet_address,
            src: mac,
            ether_type: ETHERTYPE_ARP,
        },
        payload: reply.serialize(),
    }
}

#[test]
fn datagram_crosses_a_router_between_two_networks() {
    // host A (192.168.1.2) -- eth0 router eth1 -- host B (192.168.2.2)
    let mut host_a = host_interface(1);
    let host_b_ip = Ipv4Addr::new(192, 168, 2, 2);
    let host_b_mac = [0x02, 0, 0, 0, 0xaa, 2];

    let mut router = Router::new();
    let eth0 = router.add_interface(NetworkInterface::new(InterfaceConfig {
        name: "eth0".to_string(),
        ethernet_address: [0x02, 0, 0, 0, 0xbb, 0],
        ip_address: Ipv4Addr::new(192, 168, 1, 1),
    }));
    let eth1 = router.add_interface(NetworkInterface::new(InterfaceConfig {
        name: "eth1".to_string(),
        ethernet_address: [0x02, 0, 0, 0, 0xbb, 1],
        ip_address: Ipv4Addr::new(192, 168, 2, 1),
    }));
    router.add_route(Ipv4Addr::new(192, 168, 1, 0), 24, None, eth0);
    router.add_route(Ipv4Addr::new(192, 168, 2, 0), 24, None, eth1);

    // host A sends via its gateway; resolve the gateway MAC first
    let dgram = InternetDatagram::new(
        host_a.ip_address(),
        host_b_ip,
        64,
        b"across the router".to_vec(),
    )
    .unwrap();
    host_a
        .send_datagram(dgram, Ipv4Addr::new(192, 168, 1, 1))
        .unwrap();

    let arp_request = host_a.poll_frame().expect("arp request for the gateway");
    router.interface_mut(eth0).recv_frame(arp_request);
    let gateway_reply = router.interface_mut(eth0).poll_frame().expect("arp reply");
    host_a.recv_frame(gateway_reply);

    // the datagram now reaches the router and is forwarded toward host B
    let ip_frame = host_a.poll_frame().expect("flushed datagram");
    assert_eq!(ip_frame.header.ether_type, ETHERTYPE_IPV4);
    router.interface_mut(eth0).recv_frame(ip_frame);
    router.route();

    // eth1 does not know host B yet: it asks, host B answers
    let arp_request = router.interface_mut(eth1).poll_frame().expect("arp request");
    assert_eq!(arp_request.header.dst, ETHERNET_BROADCAST);
    let reply = answer_arp(&arp_request, host_b_ip, host_b_mac);
    router.interface_mut(eth1).recv_frame(reply);

    let delivery = router.interface_mut(eth1).poll_frame().expect("delivery");
    assert_eq!(delivery.header.dst, host_b_mac);
    let delivered = InternetDatagram::parse(&delivery.payload).unwrap();
    assert_eq!(delivered.payload, b"across the router");
    assert_eq!(delivered.header.time_to_live, 63);
}

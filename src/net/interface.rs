use std::collections::{HashMap, VecDeque};
use std::io;
use std::net::Ipv4Addr;

use tracing::{debug, trace, warn};

use crate::config::InterfaceConfig;

use super::arp::{ArpMessage, OPCODE_REPLY, OPCODE_REQUEST};
use super::datagram::InternetDatagram;
use super::ethernet::{
    EthernetAddress, EthernetFrame, EthernetHeader, ETHERNET_BROADCAST, ETHERTYPE_ARP,
    ETHERTYPE_IPV4,
};

/// How long a learned IP-to-Ethernet mapping stays valid.
pub const ARP_ENTRY_TTL_MS: u64 = 30_000;

/// Minimum spacing between ARP requests for the same IP; also the grace
/// period after which unresolved pending datagrams are dropped.
pub const ARP_REQUEST_INTERVAL_MS: u64 = 5_000;

#[derive(Debug, Clone, Copy)]
struct ArpEntry {
    mac: EthernetAddress,
    learned_at_ms: u64,
}

/// Adapts IP datagrams onto a (simulated) Ethernet link.
///
/// Outbound datagrams whose next hop has a cached Ethernet address go out
/// immediately; the rest wait in per-IP queues while an ARP request is
/// resolved. Inbound frames are demultiplexed into received datagrams and
/// ARP processing. Time advances only through [`NetworkInterface::tick`].
#[derive(Debug)]
pub struct NetworkInterface {
    name: String,
    ethernet_address: EthernetAddress,
    ip_address: Ipv4Addr,
    now_ms: u64,
    arp_table: HashMap<u32, ArpEntry>,
    pending: HashMap<u32, VecDeque<InternetDatagram>>,
    arp_requests: HashMap<u32, u64>,
    frames_out: VecDeque<EthernetFrame>,
    datagrams_received: VecDeque<InternetDatagram>,
}

impl NetworkInterface {
    pub fn new(config: InterfaceConfig) -> Self {
        debug!(
            name = %config.name,
            mac = ?config.ethernet_address,
            ip = %config.ip_address,
            "network interface up"
        );
        NetworkInterface {
            name: config.name,
            ethernet_address: config.ethernet_address,
            ip_address: config.ip_address,
            now_ms: 0,
            arp_table: HashMap::new(),
            pending: HashMap::new(),
            arp_requests: HashMap::new(),
            frames_out: VecDeque::new(),
            datagrams_received: VecDeque::new(),
        }
    }

    /// Send `dgram` toward `next_hop`, resolving its Ethernet address via
    /// ARP first if necessary.
    pub fn send_datagram(
        &mut self,
        dgram: InternetDatagram,
        next_hop: Ipv4Addr,
    ) -> io::Result<()> {
        let next_hop_ip = u32::from(next_hop);

        if let Some(entry) = self.arp_table.get(&next_hop_ip) {
            let dst = entry.mac;
            let payload = dgram.serialize()?;
            self.push_frame(dst, ETHERTYPE_IPV4, payload);
            return Ok(());
        }

        self.pending.entry(next_hop_ip).or_default().push_back(dgram);

        // at most one request per target IP per interval
        if let Some(&sent_at) = self.arp_requests.get(&next_hop_ip) {
            if self.now_ms - sent_at < ARP_REQUEST_INTERVAL_MS {
                return Ok(());
            }
        }

        trace!(name = %self.name, target = %next_hop, "sending arp request");
        let request = ArpMessage {
            opcode: OPCODE_REQUEST,
            sender_ethernet_address: self.ethernet_address,
            sender_ip_address: u32::from(self.ip_address),
            target_ip_address: next_hop_ip,
            ..ArpMessage::default()
        };
        self.push_frame(ETHERNET_BROADCAST, ETHERTYPE_ARP, request.serialize());
        self.arp_requests.insert(next_hop_ip, self.now_ms);
        Ok(())
    }

    /// Accept one frame off the wire. Frames not addressed to this
    /// interface and payloads that fail to parse are dropped silently.
    pub fn recv_frame(&mut self, frame: EthernetFrame) {
        if frame.header.dst != self.ethernet_address && frame.header.dst != ETHERNET_BROADCAST {
            return;
        }

        match frame.header.ether_type {
            ETHERTYPE_IPV4 => {
                if let Ok(dgram) = InternetDatagram::parse(&frame.payload) {
                    self.datagrams_received.push_back(dgram);
                }
            }
            ETHERTYPE_ARP => {
                if let Ok(arp) = ArpMessage::parse(&frame.payload) {
                    if arp.supported() {
                        self.handle_arp(arp);
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_arp(&mut self, arp: ArpMessage) {
        debug!(
            name = %self.name,
            ip = %Ipv4Addr::from(arp.sender_ip_address),
            mac = ?arp.sender_ethernet_address,
            "learned arp mapping"
        );
        self.arp_table.insert(
            arp.sender_ip_address,
            ArpEntry {
                mac: arp.sender_ethernet_address,
                learned_at_ms: self.now_ms,
            },
        );

        // release everything that was waiting on this resolution
        if let Some(queue) = self.pending.remove(&arp.sender_ip_address) {
            for dgram in queue {
                match dgram.serialize() {
                    Ok(payload) => {
                        self.push_frame(arp.sender_ethernet_address, ETHERTYPE_IPV4, payload)
                    }
                    Err(err) => warn!(name = %self.name, %err, "dropping unserializable datagram"),
                }
            }
        }

        if arp.opcode == OPCODE_REQUEST && arp.target_ip_address == u32::from(self.ip_address) {
            let reply = ArpMessage {
                opcode: OPCODE_REPLY,
                sender_ethernet_address: self.ethernet_address,
                sender_ip_address: u32::from(self.ip_address),
                target_ethernet_address: arp.sender_ethernet_address,
                target_ip_address: arp.sender_ip_address,
                ..ArpMessage::default()
            };
            self.push_frame(arp.sender_ethernet_address, ETHERTYPE_ARP, reply.serialize());
        }
    }

    /// Advance time: expire stale ARP entries, and drop pending queues
    /// whose ARP request went unanswered for the full interval.
    pub fn tick(&mut self, ms_since_last_tick: u64) {
        self.now_ms += ms_since_last_tick;
        let now = self.now_ms;

        self.arp_table.retain(|ip, entry| {
            let keep = now - entry.learned_at_ms < ARP_ENTRY_TTL_MS;
            if !keep {
                trace!(ip = %Ipv4Addr::from(*ip), "arp entry expired");
            }
            keep
        });

        let expired: Vec<u32> = self
            .arp_requests
            .iter()
            .filter(|(_, &sent_at)| now - sent_at >= ARP_REQUEST_INTERVAL_MS)
            .map(|(&ip, _)| ip)
            .collect();
        for ip in expired {
            self.arp_requests.remove(&ip);
            if self.pending.remove(&ip).is_some() {
                trace!(ip = %Ipv4Addr::from(ip), "dropping datagrams pending unresolved arp");
            }
        }
    }

    fn push_frame(&mut self, dst: EthernetAddress, ether_type: u16, payload: Vec<u8>) {
        self.frames_out.push_back(EthernetFrame {
            header: EthernetHeader {
                dst,
                src: self.ethernet_address,
                ether_type,
            },
            payload,
        });
    }

    /// Next frame ready to go out on the wire, if any.
    pub fn poll_frame(&mut self) -> Option<EthernetFrame> {
        self.frames_out.pop_front()
    }

    /// Datagrams received and parsed, awaiting the next layer up.
    pub fn datagrams_received(&mut self) -> &mut VecDeque<InternetDatagram> {
        &mut self.datagrams_received
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ethernet_address(&self) -> EthernetAddress {
        self.ethernet_address
    }

    pub fn ip_address(&self) -> Ipv4Addr {
        self.ip_address
    }
}

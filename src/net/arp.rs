use std::io;

use super::ethernet::{EthernetAddress, ETHERTYPE_IPV4};

pub const OPCODE_REQUEST: u16 = 1;
pub const OPCODE_REPLY: u16 = 2;

const HTYPE_ETHERNET: u16 = 1;
const ARP_MESSAGE_LEN: usize = 28;

/// The 28-byte ARP message for IPv4 over Ethernet (RFC 826).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArpMessage {
    pub hardware_type: u16,
    pub protocol_type: u16,
    pub hardware_size: u8,
    pub protocol_size: u8,
    pub opcode: u16,
    pub sender_ethernet_address: EthernetAddress,
    pub sender_ip_address: u32,
    pub target_ethernet_address: EthernetAddress,
    pub target_ip_address: u32,
}

impl Default for ArpMessage {
    fn default() -> Self {
        ArpMessage {
            hardware_type: HTYPE_ETHERNET,
            protocol_type: ETHERTYPE_IPV4,
            hardware_size: 6,
            protocol_size: 4,
            opcode: 0,
            sender_ethernet_address: EthernetAddress::default(),
            sender_ip_address: 0,
            target_ethernet_address: EthernetAddress::default(),
            target_ip_address: 0,
        }
    }
}

impl ArpMessage {
    pub fn parse(buf: &[u8]) -> io::Result<Self> {
        if buf.len() < ARP_MESSAGE_LEN {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "arp message truncated",
            ));
        }
        let mut sender_mac = EthernetAddress::default();
        let mut target_mac = EthernetAddress::default();
        sender_mac.copy_from_slice(&buf[8..14]);
        target_mac.copy_from_slice(&buf[18..24]);
        Ok(ArpMessage {
            hardware_type: u16::from_be_bytes([buf[0], buf[1]]),
            protocol_type: u16::from_be_bytes([buf[2], buf[3]]),
            hardware_size: buf[4],
            protocol_size: buf[5],
            opcode: u16::from_be_bytes([buf[6], buf[7]]),
            sender_ethernet_address: sender_mac,
            sender_ip_address: u32::from_be_bytes([buf[14], buf[15], buf[16], buf[17]]),
            target_ethernet_address: target_mac,
            target_ip_address: u32::from_be_bytes([buf[24], buf[25], buf[26], buf[27]]),
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(ARP_MESSAGE_LEN);
        out.extend_from_slice(&self.hardware_type.to_be_bytes());
        out.extend_from_slice(&self.protocol_type.to_be_bytes());
        out.push(self.hardware_size);
        out.push(self.protocol_size);
        out.extend_from_slice(&self.opcode.to_be_bytes());
        out.extend_from_slice(&self.sender_ethernet_address);
        out.extend_from_slice(&self.sender_ip_address.to_be_bytes());
        out.extend_from_slice(&self.target_ethernet_address);
        out.extend_from_slice(&self.target_ip_address.to_be_bytes());
        out
    }

    /// Whether this is a message the interface knows how to handle:
    /// IPv4-over-Ethernet with a request or reply opcode.
    pub fn supported(&self) -> bool {
        self.hardware_type == HTYPE_ETHERNET
            && self.protocol_type == ETHERTYPE_IPV4
            && self.hardware_size == 6
            && self.protocol_size == 4
            && (self.opcode == OPCODE_REQUEST || self.opcode == OPCODE_REPLY)
    }
}

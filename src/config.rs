use std::net::Ipv4Addr;

use crate::net::ethernet::EthernetAddress;
use crate::tcp::seqno::Wrap32;

/// Default capacity of the outbound and inbound byte streams.
pub const DEFAULT_CAPACITY: u64 = 64_000;

/// Largest payload a single TCP segment may carry.
pub const MAX_PAYLOAD_SIZE: usize = 1000;

/// Default retransmission timeout before any measurement.
pub const TIMEOUT_DEFAULT_MS: u64 = 1000;

/// Per-connection TCP parameters.
#[derive(Debug, Clone)]
pub struct TcpConfig {
    /// Initial value of the retransmission timeout.
    pub rt_timeout_ms: u64,
    /// Capacity of the inbound (receive) stream.
    pub recv_capacity: u64,
    /// Capacity of the outbound (send) stream.
    pub send_capacity: u64,
    /// Fixed initial sequence number; `None` picks a random one.
    pub fixed_isn: Option<Wrap32>,
}

impl Default for TcpConfig {
    fn default() -> Self {
        TcpConfig {
            rt_timeout_ms: TIMEOUT_DEFAULT_MS,
            recv_capacity: DEFAULT_CAPACITY,
            send_capacity: DEFAULT_CAPACITY,
            fixed_isn: None,
        }
    }
}

impl TcpConfig {
    /// The ISN to use for a new connection: the configured one, or a fresh
    /// random value per connection.
    pub fn isn(&self) -> Wrap32 {
        self.fixed_isn.unwrap_or_else(Wrap32::random)
    }
}

/// Identity of one network interface.
#[derive(Debug, Clone)]
pub struct InterfaceConfig {
    pub name: String,
    pub ethernet_address: EthernetAddress,
    pub ip_address: Ipv4Addr,
}

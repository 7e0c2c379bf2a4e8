use std::net::Ipv4Addr;

use tracing::{debug, trace, warn};

use super::datagram::InternetDatagram;
use super::interface::NetworkInterface;

#[derive(Debug, Clone)]
struct Route {
    prefix: u32,
    prefix_len: u8,
    next_hop: Option<Ipv4Addr>,
    interface_index: usize,
}

impl Route {
    fn matches(&self, dst: u32) -> bool {
        self.prefix_len == 0 || (dst ^ self.prefix) >> (32 - self.prefix_len) == 0
    }
}

/// An IPv4 router: a set of interfaces plus a longest-prefix-match
/// routing table.
#[derive(Debug, Default)]
pub struct Router {
    interfaces: Vec<NetworkInterface>,
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Router::default()
    }

    /// Attach an interface; returns its index for use in routes.
    pub fn add_interface(&mut self, interface: NetworkInterface) -> usize {
        self.interfaces.push(interface);
        self.interfaces.len() - 1
    }

    pub fn interface_mut(&mut self, index: usize) -> &mut NetworkInterface {
        &mut self.interfaces[index]
    }

    pub fn interface_count(&self) -> usize {
        self.interfaces.len()
    }

    /// Append a route. `next_hop` of `None` means the network is directly
    /// attached and the datagram's own destination is the next hop.
    pub fn add_route(
        &mut self,
        prefix: Ipv4Addr,
        prefix_len: u8,
        next_hop: Option<Ipv4Addr>,
        interface_index: usize,
    ) {
        debug_assert!(prefix_len <= 32);
        debug!(
            %prefix,
            prefix_len,
            next_hop = ?next_hop,
            interface_index,
            "adding route"
        );
        self.routes.push(Route {
            prefix: u32::from(prefix),
            prefix_len,
            next_hop,
            interface_index,
        });
    }

    /// Drain every interface's received datagrams and forward each one.
    pub fn route(&mut self) {
        for i in 0..self.interfaces.len() {
            while let Some(mut dgram) = self.interfaces[i].datagrams_received().pop_front() {
                if dgram.header.time_to_live <= 1 {
                    trace!(dst = %dgram.destination(), "ttl expired, dropping");
                    continue;
                }
                dgram.header.time_to_live -= 1;
                dgram.header.header_checksum = dgram.header.calc_header_checksum();

                let dst = u32::from(dgram.destination());
                let mut best: Option<&Route> = None;
                for route in &self.routes {
                    // later insertion wins on equal prefix length
                    if route.matches(dst) && best.map_or(true, |b| route.prefix_len >= b.prefix_len)
                    {
                        best = Some(route);
                    }
                }

                let (next_hop, out) = match best {
                    Some(route) => (
                        route.next_hop.unwrap_or_else(|| Ipv4Addr::from(dst)),
                        route.interface_index,
                    ),
                    None => {
                        trace!(dst = %dgram.destination(), "no route, dropping");
                        continue;
                    }
                };

                if let Err(err) = self.interfaces[out].send_datagram(dgram, next_hop) {
                    warn!(%err, interface_index = out, "failed to forward datagram");
                }
            }
        }
    }
}

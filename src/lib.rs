//! A user-space TCP/IP stack core.
//!
//! The crate is a layered pipeline driven entirely by its caller:
//! application bytes flow through a bounded [`ByteStream`], the
//! [`tcp::TcpSender`] and [`tcp::TcpReceiver`] turn them into and out of
//! segments (reassembled on the inbound side by the [`Reassembler`]), and
//! the [`net::NetworkInterface`] and [`net::Router`] move IP datagrams over
//! a simulated Ethernet link layer with ARP resolution.
//!
//! There is no internal concurrency or clock: every component is advanced
//! by explicit calls, and time moves only through each component's
//! `tick(ms_since_last_tick)`.

pub mod byte_stream;
pub mod config;
pub mod net;
pub mod reassembler;
pub mod tcp;

pub use byte_stream::ByteStream;
pub use reassembler::Reassembler;

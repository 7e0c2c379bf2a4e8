pub mod arp;
pub mod datagram;
pub mod ethernet;
pub mod interface;
pub mod router;

pub use arp::ArpMessage;
pub use datagram::InternetDatagram;
pub use ethernet::{EthernetAddress, EthernetFrame, EthernetHeader};
pub use interface::NetworkInterface;
pub use router::Router;

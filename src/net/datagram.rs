use std::io;
use std::net::Ipv4Addr;

use etherparse::{IpNumber, Ipv4Header, Ipv4HeaderSlice};

/// An IPv4 datagram: parsed header plus payload bytes.
#[derive(Debug, Clone)]
pub struct InternetDatagram {
    pub header: Ipv4Header,
    pub payload: Vec<u8>,
}

impl InternetDatagram {
    /// Build a datagram with a fresh header around `payload`.
    pub fn new(src: Ipv4Addr, dst: Ipv4Addr, ttl: u8, payload: Vec<u8>) -> io::Result<Self> {
        let header = Ipv4Header::new(
            payload.len() as u16,
            ttl,
            IpNumber::TCP,
            src.octets(),
            dst.octets(),
        )
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
        Ok(InternetDatagram { header, payload })
    }

    pub fn parse(buf: &[u8]) -> io::Result<Self> {
        let slice = Ipv4HeaderSlice::from_slice(buf)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        let header = slice.to_header();
        let header_len = slice.slice().len();
        let payload_len = header
            .payload_len()
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?
            as usize;
        let payload = buf[header_len..]
            .get(..payload_len)
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "ipv4 payload truncated"))?
            .to_vec();
        Ok(InternetDatagram { header, payload })
    }

    pub fn serialize(&self) -> io::Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.header.header_len() + self.payload.len());
        self.header
            .write(&mut out)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
        out.extend_from_slice(&self.payload);
        Ok(out)
    }

    pub fn destination(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.header.destination)
    }

    pub fn source(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.header.source)
    }
}

use std::io;

/// An Ethernet (hardware) address.
pub type EthernetAddress = [u8; 6];

/// Destination address of broadcast frames.
pub const ETHERNET_BROADCAST: EthernetAddress = [0xff; 6];

pub const ETHERTYPE_IPV4: u16 = 0x0800;
pub const ETHERTYPE_ARP: u16 = 0x0806;

pub const ETHERNET_HEADER_LEN: usize = 14;

/// The 14-byte Ethernet II header: destination, source, EtherType.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetHeader {
    pub dst: EthernetAddress,
    pub src: EthernetAddress,
    pub ether_type: u16,
}

impl EthernetHeader {
    pub fn parse(buf: &[u8]) -> io::Result<Self> {
        if buf.len() < ETHERNET_HEADER_LEN {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "ethernet header truncated",
            ));
        }
        let mut dst = EthernetAddress::default();
        let mut src = EthernetAddress::default();
        dst.copy_from_slice(&buf[0..6]);
        src.copy_from_slice(&buf[6..12]);
        Ok(EthernetHeader {
            dst,
            src,
            ether_type: u16::from_be_bytes([buf[12], buf[13]]),
        })
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.dst);
        out.extend_from_slice(&self.src);
        out.extend_from_slice(&self.ether_type.to_be_bytes());
    }
}

/// An Ethernet frame: header plus opaque payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EthernetFrame {
    pub header: EthernetHeader,
    pub payload: Vec<u8>,
}

impl EthernetFrame {
    pub fn parse(buf: &[u8]) -> io::Result<Self> {
        let header = EthernetHeader::parse(buf)?;
        Ok(EthernetFrame {
            header,
            payload: buf[ETHERNET_HEADER_LEN..].to_vec(),
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(ETHERNET_HEADER_LEN + self.payload.len());
        self.header.write(&mut out);
        out.extend_from_slice(&self.payload);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_roundtrip() {
        let frame = EthernetFrame {
            header: EthernetHeader {
                dst: [1, 2, 3, 4, 5, 6],
                src: [7, 8, 9, 10, 11, 12],
                ether_type: ETHERTYPE_ARP,
            },
            payload: b"payload".to_vec(),
        };
        let bytes = frame.serialize();
        assert_eq!(bytes.len(), ETHERNET_HEADER_LEN + 7);
        assert_eq!(EthernetFrame::parse(&bytes).unwrap(), frame);
    }

    #[test]
    fn short_buffer_is_rejected() {
        assert!(EthernetHeader::parse(&[0u8; 13]).is_err());
        assert!(EthernetFrame::parse(b"short").is_err());
    }
}

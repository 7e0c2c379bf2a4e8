use bitflags::bitflags;

use super::seqno::Wrap32;

bitflags! {
    /// Control flags carried by a TCP segment.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct TcpFlags: u8 {
        const SYN = 0b001;
        const FIN = 0b010;
        const RST = 0b100;
    }
}

/// A segment from sender to receiver: sequence number, control flags, and
/// payload. SYN and FIN each occupy one sequence number; payload bytes
/// occupy their length.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TcpSenderMessage {
    pub seqno: Wrap32,
    pub flags: TcpFlags,
    pub payload: Vec<u8>,
}

impl TcpSenderMessage {
    pub fn syn(&self) -> bool {
        self.flags.contains(TcpFlags::SYN)
    }

    pub fn fin(&self) -> bool {
        self.flags.contains(TcpFlags::FIN)
    }

    pub fn rst(&self) -> bool {
        self.flags.contains(TcpFlags::RST)
    }

    /// How many sequence numbers this segment occupies.
    pub fn sequence_length(&self) -> u64 {
        self.payload.len() as u64 + u64::from(self.syn()) + u64::from(self.fin())
    }
}

/// The acknowledgment flowing back from receiver to sender: cumulative
/// ackno (absent until the first SYN is seen), advertised window, and the
/// reset flag.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TcpReceiverMessage {
    pub ackno: Option<Wrap32>,
    pub window_size: u16,
    pub rst: bool,
}

use crate::byte_stream::Reader;
use crate::reassembler::Reassembler;

use super::messages::{TcpReceiverMessage, TcpSenderMessage};
use super::seqno::Wrap32;

/// Receive side of a connection: turns inbound segments into reassembler
/// insertions and produces the cumulative acknowledgment and window.
#[derive(Debug)]
pub struct TcpReceiver {
    reassembler: Reassembler,
    isn: Option<Wrap32>,
}

impl TcpReceiver {
    pub fn new(reassembler: Reassembler) -> Self {
        TcpReceiver {
            reassembler,
            isn: None,
        }
    }

    /// Process one inbound segment.
    ///
    /// Segments arriving before the first SYN are dropped unless they carry
    /// SYN themselves; the SYN's sequence number becomes the ISN. RST marks
    /// the inbound stream as errored.
    pub fn receive(&mut self, msg: &TcpSenderMessage) {
        if msg.rst() {
            self.reassembler.set_error();
            return;
        }

        let isn = match self.isn {
            Some(isn) => isn,
            None => {
                if !msg.syn() {
                    return;
                }
                self.isn = Some(msg.seqno);
                msg.seqno
            }
        };

        let abs_seqno = msg.seqno.unwrap(isn, self.reassembler.bytes_pushed());
        if abs_seqno == 0 && !msg.syn() {
            // payload claiming the sequence number of the SYN itself
            return;
        }

        // The SYN occupies the seqno before stream index 0, so stream index
        // = absolute seqno - 1, except on the SYN segment itself.
        let first_index = abs_seqno + u64::from(msg.syn()) - 1;
        self.reassembler.insert(first_index, &msg.payload, msg.fin());
    }

    /// The acknowledgment to advertise right now.
    pub fn send(&self) -> TcpReceiverMessage {
        let window_size = self
            .reassembler
            .available_capacity()
            .min(u64::from(u16::MAX)) as u16;

        // ackno covers the SYN, every pushed byte, and the FIN once the
        // stream is closed
        let ackno = self.isn.map(|isn| {
            isn + self.reassembler.bytes_pushed() + 1 + u64::from(self.reassembler.is_closed())
        });

        TcpReceiverMessage {
            ackno,
            window_size,
            rst: self.reassembler.has_error(),
        }
    }

    pub fn reassembler(&self) -> &Reassembler {
        &self.reassembler
    }

    pub fn reader(&mut self) -> Reader<'_> {
        self.reassembler.reader()
    }

    pub fn has_error(&self) -> bool {
        self.reassembler.has_error()
    }
}

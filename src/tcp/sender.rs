use std::collections::BTreeMap;

use crate::byte_stream::{ByteStream, Writer};
use crate::config::MAX_PAYLOAD_SIZE;

use super::messages::{TcpFlags, TcpReceiverMessage, TcpSenderMessage};
use super::seqno::Wrap32;

/// A transmitted segment awaiting cumulative acknowledgment.
#[derive(Debug, Clone)]
struct OutstandingSegment {
    message: TcpSenderMessage,
    retransmissions: u64,
}

/// Send side of a connection.
///
/// Reads from its input stream and fragments the bytes into segments that
/// fit both the peer's advertised window and [`MAX_PAYLOAD_SIZE`]. Every
/// transmitted segment stays in an ordered map keyed by absolute sequence
/// number until cumulatively acknowledged; the oldest one is retransmitted
/// whenever the retransmission timer expires, with exponential backoff
/// while the peer advertises a non-zero window.
#[derive(Debug)]
pub struct TcpSender {
    input: ByteStream,
    isn: Wrap32,
    initial_rto_ms: u64,
    rto_ms: u64,
    time_since_oldest_ms: u64,
    next_seqno: Wrap32,
    last_ackno: Wrap32,
    window_size: u16,
    syn_sent: bool,
    fin_sent: bool,
    outstanding: BTreeMap<u64, OutstandingSegment>,
}

impl TcpSender {
    pub fn new(input: ByteStream, isn: Wrap32, initial_rto_ms: u64) -> Self {
        TcpSender {
            input,
            isn,
            initial_rto_ms,
            rto_ms: initial_rto_ms,
            time_since_oldest_ms: 0,
            next_seqno: isn,
            last_ackno: isn,
            // before the first ack, probe with a one-sequence-number window
            window_size: 1,
            syn_sent: false,
            fin_sent: false,
            outstanding: BTreeMap::new(),
        }
    }

    /// Fill the peer's window with segments read from the input stream.
    pub fn push(&mut self, mut transmit: impl FnMut(&TcpSenderMessage)) {
        let checkpoint = self.input.bytes_pushed();
        let window = u64::from(self.window_size).max(1);
        let window_end = (self.last_ackno + window).unwrap(self.isn, checkpoint);
        let mut capacity = window_end.saturating_sub(self.next_seqno.unwrap(self.isn, checkpoint));

        while capacity > 0 {
            let mut flags = TcpFlags::empty();
            if !self.syn_sent {
                flags |= TcpFlags::SYN;
                self.syn_sent = true;
            }

            let payload_cap = capacity - u64::from(flags.contains(TcpFlags::SYN));
            let payload = self
                .input
                .read(payload_cap.min(MAX_PAYLOAD_SIZE as u64) as usize);

            // FIN rides along once the stream is finished, as long as the
            // window has room beyond the payload; otherwise it waits
            if !self.fin_sent && self.input.is_finished() && (payload.len() as u64) < capacity {
                flags |= TcpFlags::FIN;
                self.fin_sent = true;
            }

            flags.set(TcpFlags::RST, self.input.has_error());

            let message = TcpSenderMessage {
                seqno: self.next_seqno,
                flags,
                payload,
            };
            let len = message.sequence_length();
            if len == 0 {
                break;
            }

            // restart the timer when the in-flight set was empty
            if self.outstanding.is_empty() {
                self.time_since_oldest_ms = 0;
                self.rto_ms = self.initial_rto_ms;
            }

            transmit(&message);
            let abs_seqno = self.next_seqno.unwrap(self.isn, checkpoint);
            self.outstanding.insert(
                abs_seqno,
                OutstandingSegment {
                    message,
                    retransmissions: 0,
                },
            );

            self.next_seqno = self.next_seqno + len;
            capacity = capacity.saturating_sub(len);

            if flags.contains(TcpFlags::FIN) {
                break;
            }
        }
    }

    /// Process the peer's acknowledgment and window update.
    pub fn receive(&mut self, msg: &TcpReceiverMessage) {
        self.window_size = msg.window_size;

        if msg.rst {
            self.input.set_error();
            return;
        }

        let ackno = match msg.ackno {
            Some(ackno) => ackno,
            None => return,
        };

        let checkpoint = self.input.bytes_pushed();
        let abs_ackno = ackno.unwrap(self.isn, checkpoint);
        if abs_ackno > self.next_seqno.unwrap(self.isn, checkpoint) {
            // acknowledges data never sent
            return;
        }
        self.last_ackno = ackno;

        let mut progressed = false;
        while let Some((&seg_start, seg)) = self.outstanding.iter().next() {
            if seg_start + seg.message.sequence_length() > abs_ackno {
                break;
            }
            self.outstanding.remove(&seg_start);
            progressed = true;
        }

        if progressed {
            self.rto_ms = self.initial_rto_ms;
            self.time_since_oldest_ms = 0;
            if let Some(oldest) = self.outstanding.values_mut().next() {
                oldest.retransmissions = 0;
            }
        }
    }

    /// Advance the retransmission timer by `ms_since_last_tick`,
    /// retransmitting the oldest outstanding segment on expiry.
    pub fn tick(&mut self, ms_since_last_tick: u64, mut transmit: impl FnMut(&TcpSenderMessage)) {
        self.time_since_oldest_ms += ms_since_last_tick;

        let oldest = match self.outstanding.values_mut().next() {
            Some(oldest) => oldest,
            None => return,
        };

        if self.time_since_oldest_ms >= self.rto_ms {
            transmit(&oldest.message);
            oldest.retransmissions += 1;

            // no backoff while the peer advertises a zero window: the
            // probe's timeout must not grow during persist
            if self.window_size > 0 {
                self.rto_ms *= 2;
            }
            self.time_since_oldest_ms = 0;
        }
    }

    /// A zero-length segment at the current sequence number, for pure acks
    /// and RSTs.
    pub fn make_empty_message(&self) -> TcpSenderMessage {
        let mut flags = TcpFlags::empty();
        flags.set(TcpFlags::RST, self.input.has_error());
        TcpSenderMessage {
            seqno: self.next_seqno,
            flags,
            payload: Vec::new(),
        }
    }

    pub fn sequence_numbers_in_flight(&self) -> u64 {
        self.outstanding
            .values()
            .map(|seg| seg.message.sequence_length())
            .sum()
    }

    pub fn consecutive_retransmissions(&self) -> u64 {
        self.outstanding
            .values()
            .map(|seg| seg.retransmissions)
            .max()
            .unwrap_or(0)
    }

    pub fn isn(&self) -> Wrap32 {
        self.isn
    }

    pub fn input(&self) -> &ByteStream {
        &self.input
    }

    pub fn writer(&mut self) -> Writer<'_> {
        self.input.writer()
    }

    pub fn has_error(&self) -> bool {
        self.input.has_error()
    }
}

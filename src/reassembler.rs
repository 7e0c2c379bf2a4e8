use std::collections::BTreeMap;

use crate::byte_stream::{ByteStream, Reader, Writer};

/// Rebuilds a contiguous byte stream out of fragments that may arrive out
/// of order, overlapping, or duplicated.
///
/// Fragments that land beyond the window dictated by the output stream's
/// remaining capacity are dropped, so buffered-plus-pending bytes never
/// exceed the stream capacity. Pending runs are kept non-overlapping and
/// non-adjacent; where a new fragment overlaps a pending run, the bytes
/// already held win (the protocol guarantees both carry the same content).
#[derive(Debug)]
pub struct Reassembler {
    output: ByteStream,
    pending: BTreeMap<u64, Vec<u8>>,
    last_received: bool,
    stream_size: u64,
}

impl Reassembler {
    pub fn new(output: ByteStream) -> Self {
        Reassembler {
            output,
            pending: BTreeMap::new(),
            last_received: false,
            stream_size: 0,
        }
    }

    /// Insert the fragment `data` starting at absolute stream index
    /// `first_index`. `is_last` marks the fragment that ends the stream.
    pub fn insert(&mut self, first_index: u64, data: &[u8], is_last: bool) {
        if is_last && !self.last_received {
            self.last_received = true;
            self.stream_size = first_index + data.len() as u64;
        }

        let next_index = self.output.bytes_pushed();
        let first_unacceptable = next_index + self.output.available_capacity();

        if data.is_empty()
            || first_index >= first_unacceptable
            || first_index.saturating_add(data.len() as u64) <= next_index
        {
            self.close_if_done();
            return;
        }

        // Trim to the window [next_index, first_unacceptable).
        let mut start = first_index;
        let mut run = data.to_vec();
        if start < next_index {
            run.drain(..(next_index - start) as usize);
            start = next_index;
        }
        if start + run.len() as u64 > first_unacceptable {
            run.truncate((first_unacceptable - start) as usize);
        }

        // Coalesce with a pending run ending at or after our start.
        if let Some((&prev_start, prev_run)) = self.pending.range(..=start).next_back() {
            let prev_end = prev_start + prev_run.len() as u64;
            if prev_end >= start {
                if start + run.len() as u64 > prev_end {
                    let suffix = run.split_off((prev_end - start) as usize);
                    let mut merged = self.pending.remove(&prev_start).unwrap_or_default();
                    merged.extend_from_slice(&suffix);
                    run = merged;
                } else {
                    run = self.pending.remove(&prev_start).unwrap_or_default();
                }
                start = prev_start;
            }
        }

        // Absorb every pending run our extended run now reaches.
        let mut end = start + run.len() as u64;
        while let Some((&seg_start, _)) = self.pending.range(start..).next() {
            if seg_start > end {
                break;
            }
            let seg = self.pending.remove(&seg_start).unwrap_or_default();
            let seg_end = seg_start + seg.len() as u64;
            if seg_end > end {
                run.extend_from_slice(&seg[(end - seg_start) as usize..]);
                end = start + run.len() as u64;
            }
        }
        self.pending.insert(start, run);

        // Drain the in-order prefix into the output stream.
        while let Some((&seg_start, _)) = self.pending.iter().next() {
            if seg_start != self.output.bytes_pushed() {
                break;
            }
            let seg = self.pending.remove(&seg_start).unwrap_or_default();
            self.output.push(&seg);
        }

        self.close_if_done();
    }

    fn close_if_done(&mut self) {
        if self.last_received && self.output.bytes_pushed() == self.stream_size {
            self.output.close();
        }
    }

    /// Total bytes held in pending runs, not yet written to the output.
    pub fn count_bytes_pending(&self) -> u64 {
        self.pending.values().map(|run| run.len() as u64).sum()
    }

    pub fn bytes_pushed(&self) -> u64 {
        self.output.bytes_pushed()
    }

    pub fn available_capacity(&self) -> u64 {
        self.output.available_capacity()
    }

    pub fn is_closed(&self) -> bool {
        self.output.is_closed()
    }

    pub fn has_error(&self) -> bool {
        self.output.has_error()
    }

    pub fn set_error(&mut self) {
        self.output.set_error();
    }

    pub fn output(&self) -> &ByteStream {
        &self.output
    }

    pub fn reader(&mut self) -> Reader<'_> {
        self.output.reader()
    }

    pub fn writer(&mut self) -> Writer<'_> {
        self.output.writer()
    }
}

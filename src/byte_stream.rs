use std::collections::VecDeque;

/// A bounded in-order byte stream.
///
/// Bytes are pushed on the write side and popped on the read side in FIFO
/// order. The writer may close the stream to signal the end of input; once
/// the stream is closed and drained the reader sees it as finished. Either
/// side may flag an error, and both flags are sticky.
#[derive(Debug)]
pub struct ByteStream {
    capacity: u64,
    buffer: VecDeque<u8>,
    bytes_pushed: u64,
    bytes_popped: u64,
    closed: bool,
    error: bool,
}

impl ByteStream {
    pub fn new(capacity: u64) -> Self {
        ByteStream {
            capacity,
            buffer: VecDeque::new(),
            bytes_pushed: 0,
            bytes_popped: 0,
            closed: false,
            error: false,
        }
    }

    /// Append as much of `data` as fits in the remaining capacity.
    /// The truncated suffix is dropped; pushing to a closed stream is a no-op.
    pub fn push(&mut self, data: &[u8]) {
        if self.closed || data.is_empty() {
            return;
        }
        let n = (data.len() as u64).min(self.available_capacity()) as usize;
        self.buffer.extend(&data[..n]);
        self.bytes_pushed += n as u64;
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn available_capacity(&self) -> u64 {
        self.capacity - self.buffer.len() as u64
    }

    pub fn bytes_pushed(&self) -> u64 {
        self.bytes_pushed
    }

    /// A contiguous view of buffered bytes. Non-empty whenever
    /// `bytes_buffered() > 0`, but may be shorter than the full buffer.
    pub fn peek(&self) -> &[u8] {
        self.buffer.as_slices().0
    }

    /// Discard `n` buffered bytes. A no-op when `n` is zero or exceeds the
    /// number of bytes buffered.
    pub fn pop(&mut self, n: u64) {
        if n == 0 || n > self.buffer.len() as u64 {
            return;
        }
        drop(self.buffer.drain(..n as usize));
        self.bytes_popped += n;
    }

    /// Drain and return up to `n` buffered bytes.
    pub fn read(&mut self, n: usize) -> Vec<u8> {
        let n = n.min(self.buffer.len());
        let out: Vec<u8> = self.buffer.drain(..n).collect();
        self.bytes_popped += n as u64;
        out
    }

    pub fn is_finished(&self) -> bool {
        self.closed && self.buffer.is_empty()
    }

    pub fn bytes_buffered(&self) -> u64 {
        self.bytes_pushed - self.bytes_popped
    }

    pub fn bytes_popped(&self) -> u64 {
        self.bytes_popped
    }

    pub fn set_error(&mut self) {
        self.error = true;
    }

    pub fn has_error(&self) -> bool {
        self.error
    }

    pub fn reader(&mut self) -> Reader<'_> {
        Reader { stream: self }
    }

    pub fn writer(&mut self) -> Writer<'_> {
        Writer { stream: self }
    }
}

/// Write half of a [`ByteStream`].
pub struct Writer<'a> {
    stream: &'a mut ByteStream,
}

impl Writer<'_> {
    pub fn push(&mut self, data: &[u8]) {
        self.stream.push(data);
    }

    pub fn close(&mut self) {
        self.stream.close();
    }

    pub fn is_closed(&self) -> bool {
        self.stream.is_closed()
    }

    pub fn available_capacity(&self) -> u64 {
        self.stream.available_capacity()
    }

    pub fn bytes_pushed(&self) -> u64 {
        self.stream.bytes_pushed()
    }

    pub fn set_error(&mut self) {
        self.stream.set_error();
    }

    pub fn has_error(&self) -> bool {
        self.stream.has_error()
    }
}

/// Read half of a [`ByteStream`].
pub struct Reader<'a> {
    stream: &'a mut ByteStream,
}

impl Reader<'_> {
    pub fn peek(&self) -> &[u8] {
        self.stream.peek()
    }

    pub fn pop(&mut self, n: u64) {
        self.stream.pop(n);
    }

    pub fn read(&mut self, n: usize) -> Vec<u8> {
        self.stream.read(n)
    }

    pub fn is_finished(&self) -> bool {
        self.stream.is_finished()
    }

    pub fn bytes_buffered(&self) -> u64 {
        self.stream.bytes_buffered()
    }

    pub fn bytes_popped(&self) -> u64 {
        self.stream.bytes_popped()
    }

    pub fn set_error(&mut self) {
        self.stream.set_error();
    }

    pub fn has_error(&self) -> bool {
        self.stream.has_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_pop_in_order() {
        let mut stream = ByteStream::new(16);
        stream.push(b"hello");
        assert_eq!(stream.bytes_pushed(), 5);
        assert_eq!(stream.bytes_buffered(), 5);
        assert_eq!(stream.peek(), b"hello");

        stream.pop(2);
        assert_eq!(stream.peek(), b"llo");
        assert_eq!(stream.bytes_popped(), 2);
        assert_eq!(stream.bytes_buffered(), 3);
    }

    #[test]
    fn push_truncates_to_capacity() {
        let mut stream = ByteStream::new(4);
        stream.push(b"abcdef");
        assert_eq!(stream.bytes_pushed(), 4);
        assert_eq!(stream.available_capacity(), 0);
        assert_eq!(stream.peek(), b"abcd");

        // popping opens capacity again
        stream.pop(2);
        assert_eq!(stream.available_capacity(), 2);
        stream.push(b"ef");
        assert_eq!(stream.read(4), b"cdef");
    }

    #[test]
    fn push_after_close_is_ignored() {
        let mut stream = ByteStream::new(8);
        stream.push(b"ab");
        stream.close();
        stream.push(b"cd");
        assert_eq!(stream.bytes_pushed(), 2);
        assert!(stream.is_closed());
    }

    #[test]
    fn pop_out_of_range_is_a_noop() {
        let mut stream = ByteStream::new(8);
        stream.push(b"abc");
        stream.pop(4);
        assert_eq!(stream.bytes_buffered(), 3);
        stream.pop(0);
        assert_eq!(stream.bytes_buffered(), 3);
        stream.pop(3);
        assert_eq!(stream.bytes_buffered(), 0);
    }

    #[test]
    fn finished_after_close_and_drain() {
        let mut stream = ByteStream::new(8);
        stream.push(b"abc");
        stream.close();
        assert!(!stream.is_finished());
        stream.pop(3);
        assert!(stream.is_finished());
    }

    #[test]
    fn error_flag_is_sticky() {
        let mut stream = ByteStream::new(8);
        assert!(!stream.has_error());
        stream.set_error();
        assert!(stream.has_error());
        stream.push(b"ab");
        assert!(stream.has_error());
    }

    #[test]
    fn read_drains_up_to_n() {
        let mut stream = ByteStream::new(8);
        stream.push(b"abcde");
        assert_eq!(stream.read(3), b"abc");
        assert_eq!(stream.read(10), b"de");
        assert_eq!(stream.bytes_popped(), 5);
    }

    #[test]
    fn views_share_the_stream() {
        let mut stream = ByteStream::new(8);
        stream.writer().push(b"hi");
        assert_eq!(stream.reader().bytes_buffered(), 2);
        stream.writer().close();
        assert_eq!(stream.reader().read(2), b"hi");
        assert!(stream.reader().is_finished());
    }
}

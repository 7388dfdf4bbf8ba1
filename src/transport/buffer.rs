//! Reusable inbound buffer.

/// Fixed-capacity receive buffer.
///
/// Allocated once per session and cleared between reads, never grown. It
/// holds at most one read's worth of data; [`InboundBuffer::take`] hands a
/// right-sized copy to the caller.
#[derive(Debug)]
pub struct InboundBuffer {
    buf: Box<[u8]>,
    len: usize,
}

impl InboundBuffer {
    /// Create a buffer with the given capacity.
    ///
    /// The capacity is at least one byte: a zero-length read would be
    /// indistinguishable from EOF.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0u8; capacity.max(1)].into_boxed_slice(),
            len: 0,
        }
    }

    /// Buffer capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Number of bytes currently held.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the buffer holds no data.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Clear the buffer and expose its full capacity for the next read.
    pub fn prepare(&mut self) -> &mut [u8] {
        self.len = 0;
        &mut self.buf
    }

    /// Record that the last read filled `len` bytes.
    pub fn fill(&mut self, len: usize) {
        self.len = len.min(self.buf.len());
    }

    /// Copy out the held bytes and clear the buffer.
    pub fn take(&mut self) -> Vec<u8> {
        let data = self.buf[..self.len].to_vec();
        self.len = 0;
        data
    }
}

//! Sliding window over the last eight bytes of a gzip member.
//!
//! The trailer cannot be located until the stream ends, and the final write
//! may carry anywhere from zero to eight of its bytes. [`TrailerBuffer`]
//! therefore keeps the tail of everything seen so far: a chunk of eight or
//! more bytes replaces the window outright, a shorter chunk shifts the
//! window left by its length and is spliced in at the end.

use crate::gzip::TRAILER_LEN;

/// Fixed-size shift buffer holding the most recent [`TRAILER_LEN`] bytes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TrailerBuffer {
    bytes: [u8; TRAILER_LEN],
    filled: usize,
}

impl TrailerBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bytes: [0; TRAILER_LEN],
            filled: 0,
        }
    }

    /// Records `chunk` as the newest bytes of the stream.
    pub fn push(&mut self, chunk: &[u8]) {
        let n = chunk.len();
        if n >= TRAILER_LEN {
            self.bytes.copy_from_slice(&chunk[n - TRAILER_LEN..]);
        } else if n > 0 {
            self.bytes.copy_within(n.., 0);
            self.bytes[TRAILER_LEN - n..].copy_from_slice(chunk);
        }
        self.filled = (self.filled + n).min(TRAILER_LEN);
    }

    /// Returns `true` once at least [`TRAILER_LEN`] bytes have been pushed.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.filled == TRAILER_LEN
    }

    /// Returns the valid tail bytes, oldest first.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[TRAILER_LEN - self.filled..]
    }

    /// CRC32 field: the first four trailer bytes, little-endian.
    #[must_use]
    pub const fn crc32(&self) -> u32 {
        u32::from_le_bytes([self.bytes[0], self.bytes[1], self.bytes[2], self.bytes[3]])
    }

    /// ISIZE field: the last four trailer bytes, little-endian.
    #[must_use]
    pub const fn isize(&self) -> u32 {
        u32::from_le_bytes([self.bytes[4], self.bytes[5], self.bytes[6], self.bytes[7]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAIL: [u8; 8] = [0x78, 0x56, 0x34, 0x12, 0x0B, 0x00, 0x00, 0x00];

    #[test]
    fn long_chunk_replaces_window() {
        let mut buf = TrailerBuffer::new();
        let mut chunk = b"prefix bytes".to_vec();
        chunk.extend_from_slice(&TAIL);
        buf.push(&chunk);
        assert!(buf.is_full());
        assert_eq!(buf.as_slice(), TAIL);
        assert_eq!(buf.crc32(), 0x12345678);
        assert_eq!(buf.isize(), 11);
    }

    #[test]
    fn every_split_of_the_final_write_reassembles() {
        let mut stream = b"deflate payload".to_vec();
        stream.extend_from_slice(&TAIL);
        for last in 0..=TRAILER_LEN {
            let cut = stream.len() - last;
            let mut buf = TrailerBuffer::new();
            buf.push(&stream[..cut]);
            buf.push(&stream[cut..]);
            assert_eq!(buf.as_slice(), TAIL, "final write of {last} bytes");
        }
    }

    #[test]
    fn single_byte_writes_reassemble() {
        let mut stream = b"xy".to_vec();
        stream.extend_from_slice(&TAIL);
        let mut buf = TrailerBuffer::new();
        for byte in &stream {
            buf.push(std::slice::from_ref(byte));
        }
        assert_eq!(buf.as_slice(), TAIL);
    }

    #[test]
    fn partial_fill_reports_only_seen_bytes() {
        let mut buf = TrailerBuffer::new();
        buf.push(b"abc");
        assert!(!buf.is_full());
        assert_eq!(buf.as_slice(), b"abc");
        buf.push(b"");
        assert_eq!(buf.as_slice(), b"abc");
        buf.push(b"defgh");
        assert!(buf.is_full());
        assert_eq!(buf.as_slice(), b"abcdefgh");
    }
}

//! Read buffer with an explicit, restorable cursor.
//!
//! The parsers consume tokens by advancing a read position over an
//! already-filled in-memory buffer. On any failed or incomplete parse the
//! cursor is rewound to where the call started, so the connection layer can
//! append more bytes and retry from scratch without losing data.

use bytes::{BufMut, BytesMut};

/// An in-memory byte buffer with a read cursor.
///
/// Bytes before the cursor have been consumed; bytes at and after it are
/// still unread. Appending more data never disturbs the cursor.
#[derive(Debug, Default)]
pub struct ReadBuffer {
    data: BytesMut,
    rpos: usize,
}

impl ReadBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        ReadBuffer {
            data: BytesMut::new(),
            rpos: 0,
        }
    }

    /// Create a buffer pre-filled with `bytes`, cursor at the start.
    pub fn from_slice(bytes: &[u8]) -> Self {
        let mut data = BytesMut::with_capacity(bytes.len());
        data.put_slice(bytes);
        ReadBuffer { data, rpos: 0 }
    }

    /// Append more bytes at the write end.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.data.put_slice(bytes);
    }

    /// Unread portion of the buffer.
    pub fn unread(&self) -> &[u8] {
        &self.data[self.rpos..]
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.rpos
    }

    /// True when no unread bytes are left.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Next unread byte without consuming it.
    pub fn peek(&self) -> Option<u8> {
        self.data.get(self.rpos).copied()
    }

    /// Current cursor position, for later [`rewind`](Self::rewind).
    pub fn read_pos(&self) -> usize {
        self.rpos
    }

    /// Consume `n` unread bytes.
    ///
    /// # Panics
    /// Panics if `n` exceeds the unread length (debug builds only).
    pub fn advance(&mut self, n: usize) {
        debug_assert!(n <= self.remaining(), "advance past write position");
        self.rpos += n;
    }

    /// Restore the cursor to a position previously returned by
    /// [`read_pos`](Self::read_pos).
    pub fn rewind(&mut self, pos: usize) {
        debug_assert!(pos <= self.data.len(), "rewind past write position");
        self.rpos = pos;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_and_remaining() {
        let mut buf = ReadBuffer::from_slice(b"hello");
        assert_eq!(buf.remaining(), 5);
        assert_eq!(buf.peek(), Some(b'h'));

        buf.advance(3);
        assert_eq!(buf.unread(), b"lo");
        assert_eq!(buf.peek(), Some(b'l'));

        buf.advance(2);
        assert!(buf.is_empty());
        assert_eq!(buf.peek(), None);
    }

    #[test]
    fn test_rewind_restores_cursor() {
        let mut buf = ReadBuffer::from_slice(b"abcdef");
        let mark = buf.read_pos();
        buf.advance(4);
        assert_eq!(buf.unread(), b"ef");

        buf.rewind(mark);
        assert_eq!(buf.unread(), b"abcdef");
    }

    #[test]
    fn test_extend_keeps_cursor() {
        let mut buf = ReadBuffer::from_slice(b"par");
        buf.advance(1);
        buf.extend(b"tial");
        assert_eq!(buf.unread(), b"artial");
    }
}

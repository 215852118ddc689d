//! Fixed-capacity frame buffer.
//!
//! Backed by a `[u8; N]` array so a parser never allocates. The write
//! cursor never passes `N`: `try_push` refuses the byte once full, and
//! `push_clamped` keeps overwriting the last slot so the newest byte
//! (usually the terminator) survives truncation.

use std::ops::Index;

/// The push was refused because the buffer is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overflow;

/// Bounded append-only byte buffer with a write cursor.
#[derive(Clone)]
pub struct FrameBuffer<const N: usize> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> FrameBuffer<N> {
    const NON_EMPTY: () = assert!(N > 0, "frame buffer capacity must be non-zero");

    /// Create an empty buffer.
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NON_EMPTY;
        Self {
            buf: [0u8; N],
            len: 0,
        }
    }

    /// Maximum number of bytes the buffer can hold.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of buffered bytes (the write cursor).
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if the buffer is full.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Buffered bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Byte at `index`, if it has been written.
    #[inline]
    pub fn get(&self, index: usize) -> Option<u8> {
        self.as_slice().get(index).copied()
    }

    /// Reset the cursor. Contents are left in place and overwritten later.
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Append a byte, or report `Overflow` and drop it when full.
    #[inline]
    pub fn try_push(&mut self, byte: u8) -> Result<(), Overflow> {
        if self.len == N {
            return Err(Overflow);
        }
        self.buf[self.len] = byte;
        self.len += 1;
        Ok(())
    }

    /// Append a byte; when full, overwrite the last slot instead.
    ///
    /// Returns `true` if the write was clamped.
    #[inline]
    pub fn push_clamped(&mut self, byte: u8) -> bool {
        match self.try_push(byte) {
            Ok(()) => false,
            Err(Overflow) => {
                self.buf[N - 1] = byte;
                true
            }
        }
    }
}

impl<const N: usize> Default for FrameBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Index<usize> for FrameBuffer<N> {
    type Output = u8;

    fn index(&self, index: usize) -> &u8 {
        &self.as_slice()[index]
    }
}

impl<const N: usize> std::fmt::Debug for FrameBuffer<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("capacity", &N)
            .field("data", &self.as_slice())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_until_full() {
        let mut buffer = FrameBuffer::<4>::new();
        for b in 1..=4 {
            assert!(buffer.try_push(b).is_ok());
        }
        assert!(buffer.is_full());
        assert_eq!(buffer.try_push(5), Err(Overflow));
        assert_eq!(buffer.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_push_clamped_overwrites_last_slot() {
        let mut buffer = FrameBuffer::<3>::new();
        assert!(!buffer.push_clamped(b'<'));
        assert!(!buffer.push_clamped(b'A'));
        assert!(!buffer.push_clamped(b'1'));
        assert!(buffer.push_clamped(b'2'));
        assert!(buffer.push_clamped(b'>'));

        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.as_slice(), b"<A>");
    }

    #[test]
    fn test_clear_resets_cursor() {
        let mut buffer = FrameBuffer::<8>::new();
        buffer.try_push(1).unwrap();
        buffer.try_push(2).unwrap();
        buffer.clear();

        assert!(buffer.is_empty());
        assert_eq!(buffer.get(0), None);
        buffer.try_push(9).unwrap();
        assert_eq!(buffer[0], 9);
    }
}

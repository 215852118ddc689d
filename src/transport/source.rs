//! Byte source adapters.
//!
//! - [`StreamSource`]: bytes from a serial stream, appended as reads
//!   complete and consumed one at a time.
//! - [`PacketSource`]: the payload of one received radio packet, cut to
//!   the platform's maximum packet size.

use bytes::{Buf, Bytes, BytesMut};

use super::ByteSource;

/// Maximum payload of an RFM95-class LoRa packet.
pub const DEFAULT_MAX_PACKET_LEN: usize = 251;

/// Buffered serial input.
///
/// Uses `bytes::BytesMut` so consuming from the front never shifts memory.
#[derive(Debug, Default)]
pub struct StreamSource {
    buffer: BytesMut,
}

impl StreamSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create an empty source with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    /// Append freshly read bytes.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Number of unread bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if all bytes have been read.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Drop all unread bytes.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl ByteSource for StreamSource {
    fn available(&self) -> bool {
        !self.buffer.is_empty()
    }

    fn read_byte(&mut self) -> Option<u8> {
        if self.buffer.has_remaining() {
            Some(self.buffer.get_u8())
        } else {
            None
        }
    }
}

/// One received radio packet.
///
/// Loading a new packet replaces whatever was left of the previous one;
/// the radio hands over whole packets, never a continuation.
#[derive(Debug, Clone)]
pub struct PacketSource {
    packet: Bytes,
    max_len: usize,
}

impl PacketSource {
    /// Create an empty source truncating packets to `max_len`.
    pub fn new(max_len: usize) -> Self {
        Self {
            packet: Bytes::new(),
            max_len,
        }
    }

    /// Load a received packet, truncating it to the maximum packet size.
    pub fn load(&mut self, packet: Bytes) {
        if !self.packet.is_empty() {
            tracing::trace!(
                unread = self.packet.len(),
                "previous packet not fully consumed"
            );
        }
        let len = packet.len().min(self.max_len);
        if len < packet.len() {
            tracing::debug!(
                received = packet.len(),
                max = self.max_len,
                "truncating oversized packet"
            );
        }
        self.packet = packet.slice(..len);
    }

    /// Copy a received packet out of a driver buffer and load it.
    pub fn load_from_slice(&mut self, packet: &[u8]) {
        let len = packet.len().min(self.max_len);
        self.load(Bytes::copy_from_slice(&packet[..len]));
    }

    /// Unread bytes of the current packet.
    pub fn remaining(&self) -> usize {
        self.packet.len()
    }

    /// Maximum packet size.
    pub fn max_len(&self) -> usize {
        self.max_len
    }
}

impl Default for PacketSource {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PACKET_LEN)
    }
}

impl ByteSource for PacketSource {
    fn available(&self) -> bool {
        self.packet.has_remaining()
    }

    fn read_byte(&mut self) -> Option<u8> {
        if self.packet.has_remaining() {
            Some(self.packet.get_u8())
        } else {
            None
        }
    }
}

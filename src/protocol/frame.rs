//! Completed frames and the sink that receives them.
//!
//! A [`Frame`] borrows the parser's buffer, so it is only valid until the
//! next byte is fed. Sinks that need to keep a frame must copy it.

use super::wire_format::{LENGTH_OFFSET, OPCODE_OFFSET, RAW_HEADER_SIZE};
use crate::writer::Outbound;

/// A complete frame, markers included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame<'a> {
    /// Marker-terminated ASCII command, e.g. `<A12>`.
    Ascii(&'a [u8]),
    /// Length-prefixed raw sub-frame: SOP, opcode, length, payload.
    Raw(&'a [u8]),
}

impl<'a> Frame<'a> {
    /// All bytes of the frame.
    #[inline]
    pub fn bytes(&self) -> &'a [u8] {
        match *self {
            Frame::Ascii(b) | Frame::Raw(b) => b,
        }
    }

    /// Check if this is a raw sub-frame.
    #[inline]
    pub fn is_raw(&self) -> bool {
        matches!(self, Frame::Raw(_))
    }

    /// The opcode byte (offset 1), if present.
    #[inline]
    pub fn opcode(&self) -> Option<u8> {
        self.bytes().get(OPCODE_OFFSET).copied()
    }

    /// Declared total length of a raw frame.
    pub fn declared_len(&self) -> Option<usize> {
        match *self {
            Frame::Raw(b) => b.get(LENGTH_OFFSET).map(|&n| n as usize),
            Frame::Ascii(_) => None,
        }
    }

    /// Payload of a raw frame (everything after the 3-byte header).
    pub fn raw_payload(&self) -> Option<&'a [u8]> {
        match *self {
            Frame::Raw(b) => b.get(RAW_HEADER_SIZE..),
            Frame::Ascii(_) => None,
        }
    }
}

/// Receiver for completed frames.
///
/// Called synchronously from the byte that completed the frame. `out` is
/// the outbound side of the same link, so a handler can queue a reply.
/// Handlers must not block: they delay both input and flush ticks.
pub trait FrameSink {
    /// Handle one completed frame.
    fn on_frame(&mut self, frame: Frame<'_>, out: &mut dyn Outbound);
}

impl<F> FrameSink for F
where
    F: FnMut(Frame<'_>, &mut dyn Outbound),
{
    fn on_frame(&mut self, frame: Frame<'_>, out: &mut dyn Outbound) {
        self(frame, out)
    }
}

/// Build a [`FrameSink`] from a closure, pinning down its signature.
pub fn sink_fn<F>(f: F) -> F
where
    F: FnMut(Frame<'_>, &mut dyn Outbound),
{
    f
}

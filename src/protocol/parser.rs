//! Byte-level framing state machine.
//!
//! Consumes one byte at a time and recognises two encodings that share a
//! stream:
//! - `CollectingAscii`: started by SOP, ended by EOP
//! - `CollectingRaw`: entered when the opcode byte (offset 1) falls in the
//!   raw range once 3 bytes are buffered; ended by length (offset 2)
//!
//! There is no look-ahead, so chunk boundaries never affect the result.
//! Malformed input is never an error: the frame is abandoned and the next
//! SOP resynchronises.
//!
//! # Example
//!
//! ```
//! use radiolink::protocol::FrameParser;
//!
//! let mut parser = FrameParser::<64>::default();
//! let mut seen = Vec::new();
//! parser.feed_all(b"noise<A1>", |frame| seen.push(frame.bytes().to_vec()));
//!
//! assert_eq!(seen, vec![b"<A1>".to_vec()]);
//! ```

use super::frame::{Frame, FrameSink};
use super::frame_buffer::FrameBuffer;
use super::wire_format::{
    Markers, DEFAULT_FRAME_CAPACITY, LENGTH_OFFSET, OPCODE_OFFSET, RAW_HEADER_SIZE,
};
use crate::writer::Outbound;

/// Framing mode of a parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Between frames; everything but SOP is discarded.
    Idle,
    /// Inside an ASCII frame, waiting for EOP.
    CollectingAscii,
    /// Inside a raw frame, waiting for the declared length.
    CollectingRaw,
}

/// Framing state machine over a fixed `N`-byte frame buffer.
///
/// One instance per link; state must never be shared between links.
#[derive(Debug, Clone)]
pub struct FrameParser<const N: usize = DEFAULT_FRAME_CAPACITY> {
    buffer: FrameBuffer<N>,
    mode: Mode,
    markers: Markers,
    /// Declared length of the raw frame being collected.
    raw_len: usize,
}

impl<const N: usize> FrameParser<N> {
    /// Create a parser with the given markers.
    pub fn new(markers: Markers) -> Self {
        Self {
            buffer: FrameBuffer::new(),
            mode: Mode::Idle,
            markers,
            raw_len: 0,
        }
    }

    /// Feed one byte; returns the frame it completed, if any.
    pub fn feed(&mut self, byte: u8) -> Option<Frame<'_>> {
        if self.mode != Mode::CollectingRaw && byte == self.markers.sop {
            if self.mode == Mode::CollectingAscii {
                tracing::trace!(
                    discarded = self.buffer.len(),
                    "start marker inside frame, resynchronising"
                );
            }
            self.buffer.clear();
            self.mode = Mode::CollectingAscii;
        }

        match self.mode {
            Mode::Idle => None,
            Mode::CollectingAscii => self.collect_ascii(byte),
            Mode::CollectingRaw => self.collect_raw(byte),
        }
    }

    /// Feed one byte and hand a completed frame to `sink`.
    pub fn handle_byte<S>(&mut self, byte: u8, sink: &mut S, out: &mut dyn Outbound)
    where
        S: FrameSink + ?Sized,
    {
        if let Some(frame) = self.feed(byte) {
            sink.on_frame(frame, out);
        }
    }

    /// Feed a chunk of bytes, calling `on_frame` for every completed frame.
    pub fn feed_all<F>(&mut self, bytes: &[u8], mut on_frame: F)
    where
        F: FnMut(Frame<'_>),
    {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte) {
                on_frame(frame);
            }
        }
    }

    fn collect_ascii(&mut self, byte: u8) -> Option<Frame<'_>> {
        let clamped = self.buffer.push_clamped(byte);
        if clamped {
            tracing::trace!(capacity = N, "ascii frame truncated");
        }

        if !clamped
            && self.buffer.len() == RAW_HEADER_SIZE
            && self.markers.is_raw_opcode(self.buffer[OPCODE_OFFSET])
        {
            return self.enter_raw();
        }

        if byte == self.markers.eop {
            self.mode = Mode::Idle;
            return Some(Frame::Ascii(self.buffer.as_slice()));
        }
        None
    }

    fn enter_raw(&mut self) -> Option<Frame<'_>> {
        let declared = self.buffer[LENGTH_OFFSET] as usize;

        if declared > N {
            tracing::debug!(declared, capacity = N, "raw frame too long, dropping");
            self.mode = Mode::Idle;
            return None;
        }
        if declared < RAW_HEADER_SIZE {
            tracing::debug!(declared, "raw frame shorter than its header, dropping");
            self.mode = Mode::Idle;
            return None;
        }

        self.raw_len = declared;
        if declared == RAW_HEADER_SIZE {
            self.mode = Mode::Idle;
            return Some(Frame::Raw(self.buffer.as_slice()));
        }
        self.mode = Mode::CollectingRaw;
        None
    }

    fn collect_raw(&mut self, byte: u8) -> Option<Frame<'_>> {
        if self.buffer.try_push(byte).is_err() {
            // raw_len <= N, so this only happens if the state was tampered with
            self.mode = Mode::Idle;
            return None;
        }
        if self.buffer.len() >= self.raw_len {
            self.mode = Mode::Idle;
            return Some(Frame::Raw(self.buffer.as_slice()));
        }
        None
    }

    /// Current framing mode.
    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Markers this parser recognises.
    #[inline]
    pub fn markers(&self) -> Markers {
        self.markers
    }

    /// Bytes collected for the frame in progress.
    #[inline]
    pub fn pending(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    /// Frame buffer capacity.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Abandon any frame in progress and return to `Idle`.
    ///
    /// There is no built-in timeout; a watchdog above the link can call this.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.mode = Mode::Idle;
        self.raw_len = 0;
    }
}

impl<const N: usize> Default for FrameParser<N> {
    fn default() -> Self {
        Self::new(Markers::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Run `input` through a fresh parser, collecting `(is_raw, bytes)`.
    fn collect<const N: usize>(parser: &mut FrameParser<N>, input: &[u8]) -> Vec<(bool, Vec<u8>)> {
        let mut frames = Vec::new();
        parser.feed_all(input, |frame| frames.push((frame.is_raw(), frame.bytes().to_vec())));
        frames
    }

    #[test]
    fn test_single_ascii_frame() {
        let mut parser = FrameParser::<64>::default();
        let frames = collect(&mut parser, b"<A1>");

        assert_eq!(frames, vec![(false, b"<A1>".to_vec())]);
        assert_eq!(parser.mode(), Mode::Idle);
    }

    #[test]
    fn test_noise_between_frames_discarded() {
        let mut parser = FrameParser::<64>::default();
        let frames = collect(&mut parser, b"xx<A>garbage\r\n<B2>zz");

        assert_eq!(
            frames,
            vec![(false, b"<A>".to_vec()), (false, b"<B2>".to_vec())]
        );
    }

    #[test]
    fn test_start_marker_restarts_frame() {
        let mut parser = FrameParser::<64>::default();
        let frames = collect(&mut parser, b"<AB<C1>");

        assert_eq!(frames, vec![(false, b"<C1>".to_vec())]);
    }

    #[test]
    fn test_raw_frame_completes_on_length() {
        let mut parser = FrameParser::<64>::default();
        let input = [0x3C, 0x12, 0x05, 0xDE, 0xAD, b'>', b'x'];
        let frames = collect(&mut parser, &input);

        assert_eq!(frames, vec![(true, vec![0x3C, 0x12, 0x05, 0xDE, 0xAD])]);
        assert_eq!(parser.mode(), Mode::Idle);
    }

    #[test]
    fn test_raw_payload_may_contain_markers() {
        let mut parser = FrameParser::<64>::default();
        let input = [b'<', 0x11, 0x06, b'<', b'>', b'<'];
        let frames = collect(&mut parser, &input);

        assert_eq!(frames, vec![(true, input.to_vec())]);
    }

    #[test]
    fn test_third_byte_eop_does_not_terminate_raw_header() {
        let mut parser = FrameParser::<64>::default();
        // length byte happens to be '>' (62): must be read as a length
        parser.feed_all(&[b'<', 0x13, b'>'], |_| panic!("no frame expected"));
        assert_eq!(parser.mode(), Mode::CollectingRaw);
    }

    #[test]
    fn test_raw_length_over_capacity_dropped() {
        let mut parser = FrameParser::<16>::default();
        let mut input = vec![b'<', 0x12, 17];
        input.extend_from_slice(&[0xAA; 20]);
        input.extend_from_slice(b"<Z9>");

        let frames = collect(&mut parser, &input);
        assert_eq!(frames, vec![(false, b"<Z9>".to_vec())]);
    }

    #[test]
    fn test_raw_length_equal_to_capacity_accepted() {
        let mut parser = FrameParser::<8>::default();
        let input = [b'<', 0x14, 8, 1, 2, 3, 4, 5];
        let frames = collect(&mut parser, &input);

        assert_eq!(frames, vec![(true, input.to_vec())]);
    }

    #[test]
    fn test_raw_header_only_frame() {
        let mut parser = FrameParser::<64>::default();
        let frames = collect(&mut parser, &[b'<', 0x11, 3]);

        assert_eq!(frames, vec![(true, vec![b'<', 0x11, 3])]);
    }

    #[test]
    fn test_raw_length_below_header_dropped() {
        let mut parser = FrameParser::<64>::default();
        let frames = collect(&mut parser, &[b'<', 0x11, 2, b'x', b'>']);

        assert!(frames.is_empty());
        assert_eq!(parser.mode(), Mode::Idle);
    }

    #[test]
    fn test_truncated_frame_never_completes() {
        let mut parser = FrameParser::<64>::default();
        let frames = collect(&mut parser, b"<A123");

        assert!(frames.is_empty());
        assert_eq!(parser.mode(), Mode::CollectingAscii);
        assert_eq!(parser.pending(), b"<A123");
    }

    #[test]
    fn test_overlong_ascii_frame_keeps_terminator() {
        let mut parser = FrameParser::<8>::default();
        let frames = collect(&mut parser, b"<A123456789>");

        assert_eq!(frames.len(), 1);
        let (raw, bytes) = &frames[0];
        assert!(!raw);
        assert_eq!(bytes.len(), 8);
        assert_eq!(bytes.first(), Some(&b'<'));
        assert_eq!(bytes.last(), Some(&b'>'));
    }

    #[test]
    fn test_custom_markers() {
        let mut parser = FrameParser::<32>::new(Markers::new(b'{', b'}'));
        let frames = collect(&mut parser, b"<A>{M1}");

        assert_eq!(frames, vec![(false, b"{M1}".to_vec())]);
    }

    #[test]
    fn test_clear_abandons_frame() {
        let mut parser = FrameParser::<64>::default();
        parser.feed_all(&[b'<', 0x12, 10, 1, 2], |_| {});
        assert_eq!(parser.mode(), Mode::CollectingRaw);

        parser.clear();

        assert_eq!(parser.mode(), Mode::Idle);
        assert!(parser.pending().is_empty());
        assert_eq!(collect(&mut parser, b"<A>"), vec![(false, b"<A>".to_vec())]);
    }

    #[test]
    fn test_byte_at_a_time_matches_single_chunk() {
        let input: Vec<u8> = [
            &b"junk<A1>"[..],
            &[b'<', 0x12, 0x05, 0xDE, 0xAD],
            &b"<#7=90><B>"[..],
        ]
        .concat();

        let mut whole = FrameParser::<64>::default();
        let expected = collect(&mut whole, &input);

        let mut split = FrameParser::<64>::default();
        let mut actual = Vec::new();
        for byte in &input {
            actual.extend(collect(&mut split, std::slice::from_ref(byte)));
        }

        assert_eq!(expected.len(), 4);
        assert_eq!(actual, expected);
    }
}

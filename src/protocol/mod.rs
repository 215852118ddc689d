//! Protocol module - wire format, framing, and frame types.
//!
//! This module implements the link's byte-level framing:
//! - SOP/EOP markers and the raw-opcode range
//! - Fixed-capacity frame buffer
//! - Framing state machine for interleaved ASCII and raw frames

mod frame;
mod frame_buffer;
mod parser;
mod wire_format;

pub use frame::{sink_fn, Frame, FrameSink};
pub use frame_buffer::{FrameBuffer, Overflow};
pub use parser::{FrameParser, Mode};
pub use wire_format::{
    Markers, DEFAULT_EOP, DEFAULT_FRAME_CAPACITY, DEFAULT_SOP, LENGTH_OFFSET, OPCODE_OFFSET,
    RAW_HEADER_SIZE, RAW_OPCODES,
};

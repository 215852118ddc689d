//! Wire format constants and marker configuration.
//!
//! Two encodings share one byte stream:
//!
//! ```text
//! ASCII:  ┌─────┬────────┬─────────────┬─────┐
//!         │ SOP │ opcode │ payload ... │ EOP │
//!         └─────┴────────┴─────────────┴─────┘
//!
//! Raw:    ┌─────┬────────────────┬────────┬──────────────────────┐
//!         │ SOP │ opcode (0x11..=│ length │ (length - 3) bytes   │
//!         │     │ 0x14 default)  │ total  │                      │
//!         └─────┴────────────────┴────────┴──────────────────────┘
//! ```
//!
//! A raw frame has no terminator; it completes once `length` bytes
//! (header included) have been collected.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Default start-of-packet marker.
pub const DEFAULT_SOP: u8 = b'<';

/// Default end-of-packet marker.
pub const DEFAULT_EOP: u8 = b'>';

/// Opcodes that switch a frame into raw (length-prefixed) mode.
pub const RAW_OPCODES: RangeInclusive<u8> = 0x11..=0x14;

/// Number of header bytes in a raw frame (SOP, opcode, length).
pub const RAW_HEADER_SIZE: usize = 3;

/// Frame-relative offset of the opcode byte.
pub const OPCODE_OFFSET: usize = 1;

/// Frame-relative offset of the raw length byte.
pub const LENGTH_OFFSET: usize = 2;

/// Default frame buffer capacity.
pub const DEFAULT_FRAME_CAPACITY: usize = 64;

/// Marker bytes and the raw-opcode range used by one parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Markers {
    /// Start-of-packet byte.
    pub sop: u8,
    /// End-of-packet byte (ASCII frames only).
    pub eop: u8,
    /// First opcode of the raw range (inclusive).
    pub raw_first: u8,
    /// Last opcode of the raw range (inclusive).
    pub raw_last: u8,
}

impl Markers {
    /// Create markers with the default raw-opcode range.
    pub const fn new(sop: u8, eop: u8) -> Self {
        Self {
            sop,
            eop,
            raw_first: *RAW_OPCODES.start(),
            raw_last: *RAW_OPCODES.end(),
        }
    }

    /// Replace the raw-opcode range.
    pub const fn with_raw_opcodes(mut self, first: u8, last: u8) -> Self {
        self.raw_first = first;
        self.raw_last = last;
        self
    }

    /// Check whether an opcode selects raw mode.
    #[inline]
    pub fn is_raw_opcode(&self, opcode: u8) -> bool {
        (self.raw_first..=self.raw_last).contains(&opcode)
    }
}

impl Default for Markers {
    fn default() -> Self {
        Self::new(DEFAULT_SOP, DEFAULT_EOP)
    }
}

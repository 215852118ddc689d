//! Link configuration.
//!
//! Loaded from JSON; every field is optional and falls back to the values
//! the firmware ships with.
//!
//! ```json
//! {
//!   "sop": "<",
//!   "eop": ">",
//!   "raw_first": 17,
//!   "raw_last": 20,
//!   "greedy": true,
//!   "max_flush_interval_ms": 250
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LinkError, Result};
use crate::handler::{Command, CommandTable};
use crate::protocol::{Markers, DEFAULT_EOP, DEFAULT_SOP, RAW_OPCODES};
use crate::writer::DEFAULT_MAX_FLUSH_INTERVAL_MS;

/// Default bound on bytes consumed by one greedy poll.
pub const DEFAULT_GREEDY_LIMIT: usize = 64;

/// Default period of the async driver's housekeeping tick.
pub const DEFAULT_TICK_MS: u64 = 5;

/// Settings for one link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Start-of-packet marker.
    pub sop: char,
    /// End-of-packet marker.
    pub eop: char,
    /// First raw opcode (inclusive).
    pub raw_first: u8,
    /// Last raw opcode (inclusive).
    pub raw_last: u8,
    /// Skip the start marker before matching a command character.
    pub has_start_marker: bool,
    /// Drain all available input per poll instead of one byte.
    pub greedy: bool,
    /// Most bytes a greedy poll consumes before ticking the batcher.
    pub greedy_limit: usize,
    /// Housekeeping period of the async driver, in ms.
    pub tick_ms: u64,
    /// How long output may sit in the holding buffer, in ms.
    pub max_flush_interval_ms: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            sop: char::from(DEFAULT_SOP),
            eop: char::from(DEFAULT_EOP),
            raw_first: *RAW_OPCODES.start(),
            raw_last: *RAW_OPCODES.end(),
            has_start_marker: true,
            greedy: false,
            greedy_limit: DEFAULT_GREEDY_LIMIT,
            tick_ms: DEFAULT_TICK_MS,
            max_flush_interval_ms: DEFAULT_MAX_FLUSH_INTERVAL_MS,
        }
    }
}

impl LinkConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        tracing::debug!(path = %path.display(), "loaded link config");
        Ok(config)
    }

    /// Check the settings are usable.
    pub fn validate(&self) -> Result<()> {
        for (name, c) in [("sop", self.sop), ("eop", self.eop)] {
            if !c.is_ascii() {
                return Err(LinkError::Config(format!("{name} must be ASCII, got {c:?}")));
            }
        }
        if self.sop == self.eop {
            return Err(LinkError::Config(format!(
                "sop and eop must differ, both are {:?}",
                self.sop
            )));
        }
        if self.raw_first > self.raw_last {
            return Err(LinkError::Config(format!(
                "raw opcode range is empty: {:#04x}..={:#04x}",
                self.raw_first, self.raw_last
            )));
        }
        let markers = self.markers();
        if markers.is_raw_opcode(markers.sop) || markers.is_raw_opcode(markers.eop) {
            return Err(LinkError::Config(
                "markers must lie outside the raw opcode range".into(),
            ));
        }
        if self.greedy_limit == 0 {
            return Err(LinkError::Config("greedy_limit must be at least 1".into()));
        }
        if self.tick_ms == 0 {
            return Err(LinkError::Config("tick_ms must be at least 1".into()));
        }
        Ok(())
    }

    /// Marker bytes for the parser.
    ///
    /// Only meaningful after [`validate`](Self::validate) has accepted the
    /// markers as ASCII.
    pub fn markers(&self) -> Markers {
        Markers::new(ascii_byte(self.sop), ascii_byte(self.eop))
            .with_raw_opcodes(self.raw_first, self.raw_last)
    }

    /// Command table over `commands`, skipping the start marker if
    /// `has_start_marker` is set.
    pub fn command_table<'a, C>(&self, commands: &'a [Command<C>]) -> CommandTable<'a, C> {
        if self.has_start_marker {
            CommandTable::with_start_marker(commands)
        } else {
            CommandTable::new(commands)
        }
    }

    /// Housekeeping tick as a `Duration`.
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Set the start and end markers.
    pub fn markers_chars(mut self, sop: char, eop: char) -> Self {
        self.sop = sop;
        self.eop = eop;
        self
    }

    /// Set the raw opcode range.
    pub fn raw_opcodes(mut self, first: u8, last: u8) -> Self {
        self.raw_first = first;
        self.raw_last = last;
        self
    }

    /// Set whether command matching skips a leading start marker.
    pub fn has_start_marker(mut self, skip: bool) -> Self {
        self.has_start_marker = skip;
        self
    }

    /// Enable greedy draining, consuming at most `limit` bytes per poll.
    pub fn greedy(mut self, limit: usize) -> Self {
        self.greedy = true;
        self.greedy_limit = limit;
        self
    }

    /// Set the housekeeping tick period.
    pub fn tick(mut self, period: Duration) -> Self {
        self.tick_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the maximum flush interval.
    ///
    /// Default: 10 000 ms
    pub fn max_flush_interval_ms(mut self, ms: u32) -> Self {
        self.max_flush_interval_ms = ms;
        self
    }
}

fn ascii_byte(c: char) -> u8 {
    u8::try_from(c).unwrap_or(b'?')
}

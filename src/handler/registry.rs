//! Command dispatch table.
//!
//! Maps the first character of an ASCII frame (after an optional start
//! marker) to a handler. Descriptors are scanned in declaration order and
//! the first match wins, so a digit wildcard placed before a letter that
//! happens to be a digit would shadow it. Keeping the order sensible is up
//! to whoever writes the table.
//!
//! # Example
//!
//! ```
//! use radiolink::handler::{Command, CommandTable};
//! use radiolink::writer::Outbound;
//!
//! #[derive(Default)]
//! struct Arm {
//!     last_joint: Option<u8>,
//! }
//!
//! fn on_joint(arm: &mut Arm, frame: &[u8], _out: &mut dyn Outbound) {
//!     arm.last_joint = Some(frame[1] - b'0');
//! }
//!
//! fn on_ping(_arm: &mut Arm, _frame: &[u8], out: &mut dyn Outbound) {
//!     out.append(b"<pong>");
//! }
//!
//! const COMMANDS: &[Command<Arm>] = &[
//!     Command::new(b'P', on_ping),
//!     Command::new(b'#', on_joint),
//! ];
//!
//! let table = CommandTable::with_start_marker(COMMANDS);
//! # struct Sink(Vec<u8>);
//! # impl Outbound for Sink {
//! #     fn append(&mut self, b: &[u8]) { self.0.extend_from_slice(b) }
//! #     fn flush(&mut self) -> radiolink::Result<()> { Ok(()) }
//! #     fn send_now(&mut self, _: &[u8]) -> radiolink::Result<()> { Ok(()) }
//! #     fn set_max_flush_interval(&mut self, _: u32) {}
//! # }
//! let mut arm = Arm::default();
//! let mut out = Sink(Vec::new());
//!
//! assert!(table.dispatch(b"<3=90>", &mut arm, &mut out));
//! assert_eq!(arm.last_joint, Some(3));
//! assert!(!table.dispatch(b"<?>", &mut arm, &mut out));
//! ```

use crate::writer::Outbound;

/// Handler bound to a command: application context, full frame, outbound.
pub type Handler<C> = fn(&mut C, &[u8], &mut dyn Outbound);

/// Which command characters a descriptor accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// Exactly this byte.
    Exact(u8),
    /// Any ASCII decimal digit.
    Digit,
}

impl Selector {
    /// Character that stands for the digit wildcard in command tables.
    pub const DIGIT_WILDCARD: u8 = b'#';

    /// Selector for a table character; `'#'` means "any digit".
    pub const fn from_char(c: u8) -> Self {
        if c == Self::DIGIT_WILDCARD {
            Selector::Digit
        } else {
            Selector::Exact(c)
        }
    }

    /// Check whether `c` selects this descriptor.
    #[inline]
    pub fn matches(&self, c: u8) -> bool {
        match *self {
            Selector::Exact(m) => c == m,
            Selector::Digit => c.is_ascii_digit(),
        }
    }
}

/// Immutable command descriptor.
pub struct Command<C> {
    /// Match specification.
    pub selector: Selector,
    /// Bound handler.
    pub handler: Handler<C>,
}

impl<C> Command<C> {
    /// Descriptor for a table character (`'#'` for any digit).
    pub const fn new(c: u8, handler: Handler<C>) -> Self {
        Self {
            selector: Selector::from_char(c),
            handler,
        }
    }

    /// Descriptor matching exactly `c`, even if it is `'#'`.
    pub const fn exact(c: u8, handler: Handler<C>) -> Self {
        Self {
            selector: Selector::Exact(c),
            handler,
        }
    }

    /// Descriptor matching any ASCII digit.
    pub const fn digit(handler: Handler<C>) -> Self {
        Self {
            selector: Selector::Digit,
            handler,
        }
    }
}

impl<C> Clone for Command<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Command<C> {}

impl<C> std::fmt::Debug for Command<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("selector", &self.selector)
            .finish_non_exhaustive()
    }
}

/// Ordered, non-owning view over a command table.
pub struct CommandTable<'a, C> {
    commands: &'a [Command<C>],
    has_start_marker: bool,
}

impl<'a, C> CommandTable<'a, C> {
    /// Table for frames whose first byte is the command character.
    pub const fn new(commands: &'a [Command<C>]) -> Self {
        Self {
            commands,
            has_start_marker: false,
        }
    }

    /// Table for frames that begin with a start marker to be skipped.
    pub const fn with_start_marker(commands: &'a [Command<C>]) -> Self {
        Self {
            commands,
            has_start_marker: true,
        }
    }

    /// First descriptor that accepts `frame`, if any.
    pub fn find(&self, frame: &[u8]) -> Option<&'a Command<C>> {
        let skip = usize::from(self.has_start_marker);
        let c = *frame.get(skip)?;
        self.commands.iter().find(|cmd| cmd.selector.matches(c))
    }

    /// Run the first matching handler with the full frame.
    ///
    /// Returns `false` if nothing matched; the frame is then dropped.
    /// Unknown commands are expected on a shared channel, so this is not
    /// an error.
    pub fn dispatch(&self, frame: &[u8], ctx: &mut C, out: &mut dyn Outbound) -> bool {
        match self.find(frame) {
            Some(cmd) => {
                (cmd.handler)(ctx, frame, out);
                true
            }
            None => {
                tracing::trace!(frame = ?String::from_utf8_lossy(frame), "no command matched");
                false
            }
        }
    }

    /// Number of descriptors.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the table has no descriptors.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Check if a leading start marker is skipped before matching.
    pub fn has_start_marker(&self) -> bool {
        self.has_start_marker
    }
}

impl<C> Clone for CommandTable<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for CommandTable<'_, C> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;

    #[derive(Default)]
    struct Calls {
        hits: Vec<(&'static str, Vec<u8>)>,
    }

    #[derive(Default)]
    struct NullOut {
        appended: Vec<u8>,
    }

    impl Outbound for NullOut {
        fn append(&mut self, bytes: &[u8]) {
            self.appended.extend_from_slice(bytes);
        }
        fn flush(&mut self) -> Result<()> {
            Ok(())
        }
        fn send_now(&mut self, _bytes: &[u8]) -> Result<()> {
            Ok(())
        }
        fn set_max_flush_interval(&mut self, _ms: u32) {}
    }

    fn on_a(calls: &mut Calls, frame: &[u8], _out: &mut dyn Outbound) {
        calls.hits.push(("A", frame.to_vec()));
    }

    fn on_b(calls: &mut Calls, frame: &[u8], out: &mut dyn Outbound) {
        calls.hits.push(("B", frame.to_vec()));
        out.append(b"<b-ok>");
    }

    fn on_digit(calls: &mut Calls, frame: &[u8], _out: &mut dyn Outbound) {
        calls.hits.push(("#", frame.to_vec()));
    }

    const TABLE: &[Command<Calls>] = &[
        Command::new(b'A', on_a),
        Command::new(b'B', on_b),
        Command::new(b'#', on_digit),
    ];

    #[test]
    fn test_exact_match_wins_over_later_wildcard() {
        let table = CommandTable::with_start_marker(TABLE);
        let mut calls = Calls::default();
        let mut out = NullOut::default();

        assert!(table.dispatch(b"<A1>", &mut calls, &mut out));
        assert_eq!(calls.hits, vec![("A", b"<A1>".to_vec())]);
    }

    #[test]
    fn test_handler_gets_full_frame_and_outbound() {
        let table = CommandTable::with_start_marker(TABLE);
        let mut calls = Calls::default();
        let mut out = NullOut::default();

        table.dispatch(b"<Bx=1>", &mut calls, &mut out);

        assert_eq!(calls.hits, vec![("B", b"<Bx=1>".to_vec())]);
        assert_eq!(out.appended, b"<b-ok>");
    }

    #[test]
    fn test_digit_wildcard_accepts_only_digits() {
        let selector = Selector::from_char(b'#');
        assert_eq!(selector, Selector::Digit);
        for c in 0u8..=255 {
            assert_eq!(selector.matches(c), (b'0'..=b'9').contains(&c), "byte {c}");
        }
    }

    #[test]
    fn test_digit_frames_dispatch_to_wildcard() {
        let table = CommandTable::with_start_marker(TABLE);
        let mut calls = Calls::default();
        let mut out = NullOut::default();

        for frame in [&b"<0>"[..], b"<5=120>", b"<9>"] {
            assert!(table.dispatch(frame, &mut calls, &mut out));
        }
        assert!(calls.hits.iter().all(|(name, _)| *name == "#"));
        assert_eq!(calls.hits.len(), 3);
    }

    #[test]
    fn test_unmatched_frame_dropped() {
        let table = CommandTable::with_start_marker(TABLE);
        let mut calls = Calls::default();
        let mut out = NullOut::default();

        assert!(!table.dispatch(b"<Z>", &mut calls, &mut out));
        assert!(!table.dispatch(b"<", &mut calls, &mut out));
        assert!(!table.dispatch(b"", &mut calls, &mut out));
        assert!(calls.hits.is_empty());
    }

    #[test]
    fn test_wildcard_first_shadows_digit_letters() {
        const SHADOWED: &[Command<Calls>] = &[
            Command::digit(on_digit),
            Command::exact(b'7', on_a),
        ];
        let table = CommandTable::with_start_marker(SHADOWED);
        let mut calls = Calls::default();
        let mut out = NullOut::default();

        table.dispatch(b"<7>", &mut calls, &mut out);
        assert_eq!(calls.hits[0].0, "#");
    }

    #[test]
    fn test_without_start_marker() {
        let table = CommandTable::new(TABLE);
        let mut calls = Calls::default();
        let mut out = NullOut::default();

        assert!(!table.has_start_marker());
        assert!(table.dispatch(b"A", &mut calls, &mut out));
        // '<' is now the command character and matches nothing
        assert!(!table.dispatch(b"<A>", &mut calls, &mut out));
        assert_eq!(calls.hits.len(), 1);
    }

    #[test]
    fn test_exact_hash_descriptor() {
        const HASH: &[Command<Calls>] = &[Command::exact(b'#', on_a)];
        let table = CommandTable::with_start_marker(HASH);
        let mut calls = Calls::default();
        let mut out = NullOut::default();

        assert!(table.dispatch(b"<#>", &mut calls, &mut out));
        assert!(!table.dispatch(b"<1>", &mut calls, &mut out));
        assert_eq!(table.len(), 1);
    }
}

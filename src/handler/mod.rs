//! Handler module - command dispatch for completed frames.
//!
//! Provides:
//! - [`CommandTable`] - ordered, first-match-wins table of commands
//! - [`Command`] - one descriptor: a [`Selector`] and a [`Handler`]
//! - [`Router`] - [`FrameSink`](crate::protocol::FrameSink) sending ASCII
//!   frames through a table and raw frames to their own handler
//!
//! Tables are plain slices, so they can be `const` and live in flash on
//! small targets.

mod registry;
mod router;

pub use registry::{Command, CommandTable, Handler, Selector};
pub use router::Router;

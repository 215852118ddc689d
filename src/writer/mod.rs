//! Outbound side of a link.
//!
//! - [`Batcher`] - fixed holding buffer with size- and time-based flushing
//! - [`Outbound`] - what frame handlers see of it
//! - [`spawn_writer_task`] - tokio writer task that turns flushed batches
//!   into writes on an `AsyncWrite`
//!
//! # Example
//!
//! ```
//! use radiolink::transport::ManualClock;
//! use radiolink::writer::Batcher;
//!
//! let clock = ManualClock::default();
//! let mut sent: Vec<Vec<u8>> = Vec::new();
//! let mut batcher: Batcher<_, _, 32> = Batcher::new(&mut sent, clock.clone())
//!     .with_max_flush_interval(100);
//!
//! batcher.append(b"<P1=90>");
//! batcher.append(b"<P2=45>");
//! clock.advance(100);
//! batcher.tick();
//! drop(batcher);
//!
//! assert_eq!(sent, vec![b"<P1=90><P2=45>".to_vec()]);
//! ```

mod batcher;
mod task;

pub use batcher::{BatchState, Batcher, DEFAULT_HOLDING_CAPACITY, DEFAULT_MAX_FLUSH_INTERVAL_MS};
pub use task::{
    spawn_writer_task, spawn_writer_task_default, WriterConfig, WriterHandle,
    DEFAULT_CHANNEL_CAPACITY, DEFAULT_MAX_BATCH,
};

use crate::error::Result;

/// Outbound capability handed to frame and command handlers.
pub trait Outbound {
    /// Queue bytes for the next batched transmission. Never fails.
    fn append(&mut self, bytes: &[u8]);

    /// Queue the bytes of a string.
    fn append_str(&mut self, s: &str) {
        self.append(s.as_bytes());
    }

    /// Send everything queued now.
    fn flush(&mut self) -> Result<()>;

    /// Send `bytes` immediately, outside the batch.
    fn send_now(&mut self, bytes: &[u8]) -> Result<()>;

    /// Change how long queued bytes may wait before a tick sends them.
    fn set_max_flush_interval(&mut self, ms: u32);
}

//! Outbound batching buffer.
//!
//! Small application writes accumulate in a fixed holding buffer and go
//! out as one transmission when either:
//! - the next write would not fit (eager flush before the write), or
//! - `tick()` sees the maximum flush interval has elapsed.
//!
//! ```text
//!            append            append / tick (< interval)
//!   Empty ───────────► Accumulating ◄──────┐
//!     ▲                     │  └───────────┘
//!     └──────── flush ──────┘
//! ```
//!
//! On a radio every packet carries fixed framing cost, so fewer larger
//! sends win over many tiny ones at the price of latency.

use super::Outbound;
use crate::error::Result;
use crate::transport::{Clock, Transport};

/// Default holding buffer capacity.
pub const DEFAULT_HOLDING_CAPACITY: usize = 64;

/// Default maximum time held bytes wait before a tick flushes them.
pub const DEFAULT_MAX_FLUSH_INTERVAL_MS: u32 = 10_000;

/// State of the holding buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    /// Nothing held; the flush timer tracks "now".
    Empty,
    /// Bytes held, waiting for a flush.
    Accumulating,
}

/// Holding buffer with size- and time-based flushing.
///
/// Single writer: one batcher per link, driven from the link's control loop.
pub struct Batcher<T, K, const N: usize = DEFAULT_HOLDING_CAPACITY> {
    transport: T,
    clock: K,
    buf: [u8; N],
    len: usize,
    last_flush: u32,
    max_flush_interval: u32,
    flushes: u64,
}

impl<T, K, const N: usize> Batcher<T, K, N>
where
    T: Transport,
    K: Clock,
{
    const NON_EMPTY: () = assert!(N > 0, "holding buffer capacity must be non-zero");

    /// Create an empty batcher with the default flush interval.
    pub fn new(transport: T, clock: K) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NON_EMPTY;
        let last_flush = clock.now_ms();
        Self {
            transport,
            clock,
            buf: [0u8; N],
            len: 0,
            last_flush,
            max_flush_interval: DEFAULT_MAX_FLUSH_INTERVAL_MS,
            flushes: 0,
        }
    }

    /// Set the maximum flush interval.
    pub fn with_max_flush_interval(mut self, ms: u32) -> Self {
        self.max_flush_interval = ms;
        self
    }

    /// Copy `bytes` into the holding buffer.
    ///
    /// Never fails: if the bytes do not fit, whatever is held is flushed
    /// first. A write longer than the whole buffer goes out in
    /// capacity-sized transmissions and only its tail is held.
    ///
    /// Capacity here is the smaller of `N` and the transport's maximum
    /// packet length, so no flush is ever longer than one packet.
    pub fn append(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let cap = self.effective_capacity();
        if self.len + bytes.len() > cap && self.len > 0 {
            self.flush_logged();
        }

        let mut rest = bytes;
        while rest.len() > cap {
            let (head, tail) = rest.split_at(cap);
            if let Err(e) = self.transmit(head) {
                tracing::warn!(error = %e, len = head.len(), "oversized write: send failed");
            }
            rest = tail;
        }

        if self.len == 0 {
            self.last_flush = self.clock.now_ms();
        }
        self.buf[self.len..self.len + rest.len()].copy_from_slice(rest);
        self.len += rest.len();
    }

    /// Append the UTF-8 bytes of `s`.
    pub fn append_str(&mut self, s: &str) {
        self.append(s.as_bytes());
    }

    /// Periodic timer check.
    ///
    /// Flushes once held bytes have waited the maximum interval. While empty
    /// the timer is pinned to "now", so idle time never counts.
    pub fn tick(&mut self) {
        let now = self.clock.now_ms();
        if self.len == 0 {
            self.last_flush = now;
            return;
        }
        if now.wrapping_sub(self.last_flush) >= self.max_flush_interval {
            tracing::trace!(held = self.len, "flush interval elapsed");
            self.flush_logged();
        }
    }

    /// Send everything held as one transmission.
    ///
    /// Best effort: the buffer is emptied and the timer re-armed whether or
    /// not the transport confirmed. Nothing is sent if nothing is held.
    pub fn flush(&mut self) -> Result<()> {
        let result = if self.len > 0 {
            let sent = self.transport.transmit(&self.buf[..self.len]);
            if sent.is_ok() {
                self.flushes += 1;
            }
            sent
        } else {
            Ok(())
        };
        self.len = 0;
        self.last_flush = self.clock.now_ms();
        result
    }

    /// Send `bytes` immediately, bypassing the holding buffer.
    ///
    /// Held bytes are not flushed first, so this can overtake them.
    pub fn send_now(&mut self, bytes: &[u8]) -> Result<()> {
        self.transmit(bytes)
    }

    fn transmit(&mut self, bytes: &[u8]) -> Result<()> {
        self.transport.transmit(bytes)?;
        self.flushes += 1;
        Ok(())
    }

    fn flush_logged(&mut self) {
        let held = self.len;
        if let Err(e) = self.flush() {
            tracing::warn!(error = %e, dropped = held, "flush failed");
        }
    }

    /// Current state.
    pub fn state(&self) -> BatchState {
        if self.len == 0 {
            BatchState::Empty
        } else {
            BatchState::Accumulating
        }
    }

    /// Bytes waiting to be sent.
    #[inline]
    pub fn held(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Number of held bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if nothing is held.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Holding buffer capacity.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Bytes that may be held at once: `N`, or less if the transport's
    /// packets are smaller.
    #[inline]
    pub fn effective_capacity(&self) -> usize {
        N.min(self.transport.max_packet_len().max(1))
    }

    /// Timestamp of the last flush (or of the last idle tick).
    #[inline]
    pub fn last_flush(&self) -> u32 {
        self.last_flush
    }

    /// Maximum flush interval in milliseconds.
    #[inline]
    pub fn max_flush_interval(&self) -> u32 {
        self.max_flush_interval
    }

    /// Change the maximum flush interval.
    pub fn set_max_flush_interval(&mut self, ms: u32) {
        self.max_flush_interval = ms;
    }

    /// Number of confirmed transmissions.
    #[inline]
    pub fn flush_count(&self) -> u64 {
        self.flushes
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable access to the transport, e.g. to receive on a shared radio.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

impl<T, K, const N: usize> Outbound for Batcher<T, K, N>
where
    T: Transport,
    K: Clock,
{
    fn append(&mut self, bytes: &[u8]) {
        Batcher::append(self, bytes);
    }

    fn flush(&mut self) -> Result<()> {
        Batcher::flush(self)
    }

    fn send_now(&mut self, bytes: &[u8]) -> Result<()> {
        Batcher::send_now(self, bytes)
    }

    fn set_max_flush_interval(&mut self, ms: u32) {
        Batcher::set_max_flush_interval(self, ms);
    }
}

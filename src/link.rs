//! Link driver.
//!
//! A [`Link`] owns one parser and one batcher and interleaves draining input
//! with flush-timer checks. Multiple links (say, serial and radio on a
//! bridge) are simply multiple `Link` values.
//!
//! ```text
//! ByteSource ─► FrameParser ─► FrameSink (handlers) ─► Outbound ─► Batcher ─► Transport
//!                                                                    ▲
//!                                               poll() ── tick() ────┘
//! ```
//!
//! In greedy mode each poll consumes up to `greedy_limit` bytes before it
//! ticks the batcher, so an endless input stream cannot starve the flush
//! timer.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::MissedTickBehavior;

use crate::config::LinkConfig;
use crate::error::Result;
use crate::protocol::{FrameParser, FrameSink, DEFAULT_FRAME_CAPACITY};
use crate::transport::{ByteSource, Clock, StreamSource, Transport};
use crate::writer::{Batcher, DEFAULT_HOLDING_CAPACITY};

/// Size of the read buffer used by [`run_stream`].
const READ_CHUNK: usize = 256;

/// Shortest housekeeping period [`run_stream`] accepts.
const MIN_TICK: Duration = Duration::from_millis(1);

/// One framed link: parser, batcher and drain policy.
pub struct Link<T, K, const F: usize = DEFAULT_FRAME_CAPACITY, const B: usize = DEFAULT_HOLDING_CAPACITY>
{
    parser: FrameParser<F>,
    batcher: Batcher<T, K, B>,
    greedy: bool,
    greedy_limit: usize,
}

impl<T, K, const F: usize, const B: usize> Link<T, K, F, B>
where
    T: Transport,
    K: Clock,
{
    /// Build a link; `config` is validated first.
    pub fn new(config: &LinkConfig, transport: T, clock: K) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            parser: FrameParser::new(config.markers()),
            batcher: Batcher::new(transport, clock)
                .with_max_flush_interval(config.max_flush_interval_ms),
            greedy: config.greedy,
            greedy_limit: config.greedy_limit,
        })
    }

    /// Consume available input, then give the batcher its timer check.
    ///
    /// Reads one byte, or up to `greedy_limit` bytes in greedy mode.
    /// Returns the number of bytes consumed.
    pub fn poll<S, H>(&mut self, source: &mut S, sink: &mut H) -> usize
    where
        S: ByteSource + ?Sized,
        H: FrameSink + ?Sized,
    {
        let budget = if self.greedy { self.greedy_limit } else { 1 };
        let mut consumed = 0;
        while consumed < budget && source.available() {
            let Some(byte) = source.read_byte() else {
                break;
            };
            consumed += 1;
            self.parser.handle_byte(byte, sink, &mut self.batcher);
        }
        self.batcher.tick();
        consumed
    }

    /// Poll until `source` is empty.
    pub fn drain<S, H>(&mut self, source: &mut S, sink: &mut H) -> usize
    where
        S: ByteSource + ?Sized,
        H: FrameSink + ?Sized,
    {
        let mut total = 0;
        while source.available() {
            let n = self.poll(source, sink);
            if n == 0 {
                break;
            }
            total += n;
        }
        total
    }

    /// Timer check without reading input.
    pub fn tick(&mut self) {
        self.batcher.tick();
    }

    /// Send whatever output is held.
    pub fn flush(&mut self) -> Result<()> {
        self.batcher.flush()
    }

    /// Check if the link drains greedily.
    pub fn is_greedy(&self) -> bool {
        self.greedy
    }

    /// The framing state machine.
    pub fn parser(&self) -> &FrameParser<F> {
        &self.parser
    }

    /// The outbound batcher.
    pub fn batcher(&self) -> &Batcher<T, K, B> {
        &self.batcher
    }

    /// Mutable access to the outbound batcher, for application output.
    pub fn batcher_mut(&mut self) -> &mut Batcher<T, K, B> {
        &mut self.batcher
    }
}

/// Drive `link` from an async reader until it reaches EOF.
///
/// Reads land in a [`StreamSource`] and are drained through
/// [`Link::poll`]; a separate `tick` interval keeps the flush timer
/// running while the reader is idle. Held output is flushed on EOF.
/// A zero `tick` is raised to 1 ms.
pub async fn run_stream<R, T, K, H, const F: usize, const B: usize>(
    mut reader: R,
    link: &mut Link<T, K, F, B>,
    sink: &mut H,
    tick: Duration,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    T: Transport,
    K: Clock,
    H: FrameSink + ?Sized,
{
    let mut source = StreamSource::with_capacity(READ_CHUNK);
    let mut buf = [0u8; READ_CHUNK];
    let mut ticker = tokio::time::interval(tick.max(MIN_TICK));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            read = reader.read(&mut buf) => {
                let n = read?;
                if n == 0 {
                    tracing::debug!("input closed");
                    return link.flush();
                }
                source.extend(&buf[..n]);
                link.drain(&mut source, sink);
            }
            _ = ticker.tick() => link.tick(),
        }
    }
}

//! Dedicated writer task for host-side links.
//!
//! The link core is synchronous: `Transport::transmit` must return once
//! the send is accepted. On a host the physical write is async, so
//! flushed batches are handed to a writer task over a bounded channel and
//! "accepted" means queued.
//!
//! # Architecture
//!
//! ```text
//! Batcher::flush ─► WriterHandle (Transport) ─► mpsc::Sender<Bytes> ─► Writer Task ─► AsyncWrite
//! ```
//!
//! The task coalesces whatever batches are already queued into one
//! vectored write.

use std::io::IoSlice;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{LinkError, Result};
use crate::transport::Transport;

/// Default channel capacity (batches, not bytes).
pub const DEFAULT_CHANNEL_CAPACITY: usize = 32;

/// Default maximum batches coalesced into one write.
pub const DEFAULT_MAX_BATCH: usize = 16;

/// Configuration for the writer task.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Channel capacity for queued batches.
    pub channel_capacity: usize,
    /// Maximum batches coalesced into one write.
    pub max_batch: usize,
    /// Largest single transmission accepted; longer ones are truncated.
    pub max_packet_len: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            max_batch: DEFAULT_MAX_BATCH,
            max_packet_len: usize::MAX,
        }
    }
}

/// Handle for queueing batches to the writer task.
///
/// Cheaply cloneable; implements [`Transport`] so a `Batcher` can own one.
#[derive(Debug, Clone)]
pub struct WriterHandle {
    tx: mpsc::Sender<Bytes>,
    /// Queued but not yet written batches.
    pending: Arc<AtomicUsize>,
    max_packet_len: usize,
}

impl WriterHandle {
    fn new(tx: mpsc::Sender<Bytes>, pending: Arc<AtomicUsize>, max_packet_len: usize) -> Self {
        Self {
            tx,
            pending,
            max_packet_len,
        }
    }

    /// Queue a batch, waiting for channel space.
    pub async fn send(&self, batch: Bytes) -> Result<()> {
        let batch = self.truncate(batch);
        self.pending.fetch_add(1, Ordering::AcqRel);
        self.tx.send(batch).await.map_err(|_| {
            self.pending.fetch_sub(1, Ordering::Release);
            LinkError::ConnectionClosed
        })
    }

    /// Queue a batch without waiting.
    ///
    /// Returns `Err(Backpressure)` if the channel is full.
    pub fn try_send(&self, batch: Bytes) -> Result<()> {
        let batch = self.truncate(batch);
        self.pending.fetch_add(1, Ordering::AcqRel);
        self.tx.try_send(batch).map_err(|e| {
            self.pending.fetch_sub(1, Ordering::Release);
            match e {
                mpsc::error::TrySendError::Full(_) => LinkError::Backpressure,
                mpsc::error::TrySendError::Closed(_) => LinkError::ConnectionClosed,
            }
        })
    }

    /// Number of batches queued but not yet written.
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    fn truncate(&self, batch: Bytes) -> Bytes {
        if batch.len() > self.max_packet_len {
            tracing::debug!(
                len = batch.len(),
                max = self.max_packet_len,
                "truncating transmission to packet size"
            );
            batch.slice(..self.max_packet_len)
        } else {
            batch
        }
    }
}

impl Transport for WriterHandle {
    fn transmit(&mut self, bytes: &[u8]) -> Result<()> {
        self.try_send(Bytes::copy_from_slice(bytes))
    }

    fn max_packet_len(&self) -> usize {
        self.max_packet_len
    }
}

/// Spawn the writer task and return a handle for queueing batches.
///
/// The task ends cleanly once every handle is dropped.
pub fn spawn_writer_task<W>(writer: W, config: WriterConfig) -> (WriterHandle, JoinHandle<Result<()>>)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
    let pending = Arc::new(AtomicUsize::new(0));

    let handle = WriterHandle::new(tx, pending.clone(), config.max_packet_len);
    let task = tokio::spawn(writer_loop(rx, writer, pending, config.max_batch.max(1)));

    (handle, task)
}

/// Spawn the writer task with default configuration.
pub fn spawn_writer_task_default<W>(writer: W) -> (WriterHandle, JoinHandle<Result<()>>)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    spawn_writer_task(writer, WriterConfig::default())
}

async fn writer_loop<W>(
    mut rx: mpsc::Receiver<Bytes>,
    mut writer: W,
    pending: Arc<AtomicUsize>,
    max_batch: usize,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut queued = Vec::with_capacity(max_batch);
    loop {
        let Some(first) = rx.recv().await else {
            return Ok(());
        };

        queued.clear();
        queued.push(first);
        while queued.len() < max_batch {
            match rx.try_recv() {
                Ok(batch) => queued.push(batch),
                Err(_) => break,
            }
        }

        let count = queued.len();
        let result = write_batches(&mut writer, &queued).await;
        pending.fetch_sub(count, Ordering::Release);
        if let Err(e) = result {
            tracing::error!(error = %e, "writer task stopped");
            return Err(e);
        }
    }
}

/// Write all batches, continuing after partial vectored writes.
async fn write_batches<W>(writer: &mut W, batches: &[Bytes]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let total: usize = batches.iter().map(Bytes::len).sum();
    let mut written = 0;

    while written < total {
        let slices = remaining_slices(batches, written);
        let n = writer.write_vectored(&slices).await?;
        if n == 0 {
            return Err(LinkError::Io(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                "write_vectored returned 0",
            )));
        }
        written += n;
    }

    writer.flush().await?;
    Ok(())
}

/// Build IoSlices for the bytes after the first `skip`.
fn remaining_slices(batches: &[Bytes], skip: usize) -> Vec<IoSlice<'_>> {
    let mut slices = Vec::with_capacity(batches.len());
    let mut offset = 0;

    for batch in batches {
        let end = offset + batch.len();
        if skip < end && !batch.is_empty() {
            let start = skip.saturating_sub(offset);
            slices.push(IoSlice::new(&batch[start..]));
        }
        offset = end;
    }

    slices
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;
    use tokio::io::{duplex, AsyncReadExt};

    #[test]
    fn test_writer_config_default() {
        let config = WriterConfig::default();
        assert_eq!(config.channel_capacity, DEFAULT_CHANNEL_CAPACITY);
        assert_eq!(config.max_batch, DEFAULT_MAX_BATCH);
        assert_eq!(config.max_packet_len, usize::MAX);
    }

    #[test]
    fn test_remaining_slices_no_skip() {
        let batches = vec![Bytes::from_static(b"<A>"), Bytes::from_static(b"<B2>")];
        let slices = remaining_slices(&batches, 0);
        assert_eq!(slices.len(), 2);
    }

    #[test]
    fn test_remaining_slices_mid_batch() {
        let batches = vec![Bytes::from_static(b"<A>"), Bytes::from_static(b"<B2>")];
        let slices = remaining_slices(&batches, 4);
        assert_eq!(slices.len(), 1);
        assert_eq!(&*slices[0], b"B2>");
    }

    #[tokio::test]
    async fn test_write_batches_concatenates() {
        let mut buf = Cursor::new(Vec::new());
        let batches = vec![Bytes::from_static(b"<A1>"), Bytes::from_static(b"<B>")];

        write_batches(&mut buf, &batches).await.unwrap();

        assert_eq!(buf.into_inner(), b"<A1><B>");
    }

    #[tokio::test]
    async fn test_transmit_reaches_stream() {
        let (client, mut server) = duplex(1024);
        let (mut handle, _task) = spawn_writer_task_default(client);

        handle.transmit(b"<OK>").unwrap();
        handle.transmit(b"<P1=90>").unwrap();

        let mut buf = vec![0u8; 11];
        server.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"<OK><P1=90>");
    }

    #[tokio::test]
    async fn test_transmit_truncates_to_packet_len() {
        let (client, mut server) = duplex(1024);
        let config = WriterConfig {
            max_packet_len: 4,
            ..WriterConfig::default()
        };
        let (mut handle, task) = spawn_writer_task(client, config);

        assert_eq!(handle.max_packet_len(), 4);
        handle.transmit(b"<ABCDEF>").unwrap();
        drop(handle);
        task.await.unwrap().unwrap();

        let mut out = Vec::new();
        server.read_to_end(&mut out).await.unwrap();
        assert_eq!(out, b"<ABC");
    }

    #[tokio::test]
    async fn test_try_send_full_channel_is_backpressure() {
        let (tx, _rx) = mpsc::channel::<Bytes>(1);
        let handle = WriterHandle::new(tx, Arc::new(AtomicUsize::new(0)), usize::MAX);

        handle.try_send(Bytes::from_static(b"a")).unwrap();
        let result = handle.try_send(Bytes::from_static(b"b"));

        assert!(matches!(result, Err(LinkError::Backpressure)));
        assert_eq!(handle.pending_count(), 1);
    }

    #[tokio::test]
    async fn test_send_after_task_gone_is_closed() {
        let (tx, rx) = mpsc::channel::<Bytes>(4);
        drop(rx);
        let handle = WriterHandle::new(tx, Arc::new(AtomicUsize::new(0)), usize::MAX);

        let result = handle.send(Bytes::from_static(b"x")).await;
        assert!(matches!(result, Err(LinkError::ConnectionClosed)));
        assert_eq!(handle.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_pending_drains() {
        let (client, mut server) = duplex(4096);
        let (handle, _task) = spawn_writer_task_default(client);

        for i in 0..5u8 {
            handle.send(Bytes::copy_from_slice(&[b'<', b'0' + i, b'>'])).await.unwrap();
        }

        let mut buf = vec![0u8; 15];
        server.read_exact(&mut buf).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(&buf, b"<0><1><2><3><4>");
        assert_eq!(handle.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_writer_shutdown_on_channel_close() {
        let (client, _server) = duplex(4096);
        let (handle, task) = spawn_writer_task_default(client);

        drop(handle);

        let result = task.await.unwrap();
        assert!(result.is_ok());
    }
}

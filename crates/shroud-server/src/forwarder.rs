//! Delivery of shuffled batches to the analyzer.
//!
//! [`ChannelAnalyzer`] is the dispatcher's sink: it only enqueues.
//! [`forward_batches`] runs as a single task that owns the analyzer
//! connection and writes each batch as one `Batch` frame.
//!
//! The forwarder exits once every `ChannelAnalyzer` is dropped and the queue
//! is empty, so shutting down the dispatcher first lets it drain.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use bytes::Bytes;
use shroud_core::{Analyzer, Ciphertext, ShuffledBatch};
use shroud_proto::Frame;
use tokio::{io::AsyncWrite, sync::mpsc};

use crate::{ServerError, framing::write_frame};

/// Analyzer sink that hands batches to the forwarding task.
///
/// The channel is unbounded so `send` never blocks while the dispatcher
/// holds a policy lock. A stalled analyzer therefore grows the queue.
#[derive(Debug, Clone)]
pub struct ChannelAnalyzer {
    tx: mpsc::UnboundedSender<ShuffledBatch>,
    backlog: Backlog,
}

impl ChannelAnalyzer {
    /// Create the sink and the receiver for [`forward_batches`].
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ShuffledBatch>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, backlog: Backlog::default() }, rx)
    }

    /// Gauge of batches enqueued here and not yet written by the forwarder.
    pub fn backlog(&self) -> Backlog {
        self.backlog.clone()
    }
}

impl Analyzer for ChannelAnalyzer {
    fn send(&self, batch: ShuffledBatch) {
        let policy = batch.policy();
        // Counted before enqueueing so the forwarder never decrements first
        self.backlog.0.fetch_add(1, Ordering::AcqRel);
        if self.tx.send(batch).is_err() {
            self.backlog.0.fetch_sub(1, Ordering::AcqRel);
            tracing::warn!(%policy, "forwarder stopped, dropping batch");
        }
    }
}

/// Shared count of batches queued for, or in flight to, the analyzer.
#[derive(Debug, Clone, Default)]
pub struct Backlog(Arc<AtomicUsize>);

impl Backlog {
    /// Batches not yet written.
    pub fn get(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }
}

/// Write every batch from `rx` to `writer` until all senders are gone.
///
/// Returns the number of batches written. `backlog` must come from the
/// [`ChannelAnalyzer`] paired with `rx`; it drops by one per written batch.
///
/// # Errors
///
/// Stops at the first write failure. Batches still queued are lost and
/// remain counted in `backlog`.
pub async fn forward_batches<W>(
    mut rx: mpsc::UnboundedReceiver<ShuffledBatch>,
    writer: &mut W,
    backlog: Backlog,
) -> Result<u64, ServerError>
where
    W: AsyncWrite + Unpin,
{
    let mut forwarded = 0;
    while let Some(batch) = rx.recv().await {
        let (policy, ciphertexts) = batch.into_parts();
        let entries: Vec<Bytes> = ciphertexts.into_iter().map(Ciphertext::into_bytes).collect();
        let frame = Frame::batch(policy.metric_id, policy.day_index, &entries)?;

        write_frame(writer, &frame).await?;
        backlog.0.fetch_sub(1, Ordering::AcqRel);
        forwarded += 1;
        tracing::debug!(%policy, batch_size = entries.len(), "forwarded batch");
    }
    Ok(forwarded)
}

//! Aggregate upload progress across one multipart batch.

use bytes::Bytes;
use futures::{stream, Stream, StreamExt};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

// Chunk granularity for progress reporting. Small enough that the bar
// moves smoothly, large enough to stay off the hot path.
const REPORT_CHUNK_BYTES: usize = 64 * 1024;

/// Counts bytes handed to the transport and publishes the aggregate
/// percentage over a watch channel. Last write wins; readers only ever
/// care about the latest value.
#[derive(Clone)]
pub struct ProgressCounter {
    total: u64,
    sent: Arc<AtomicU64>,
    tx: watch::Sender<f64>,
}

impl ProgressCounter {
    pub fn new(total: u64, tx: watch::Sender<f64>) -> Self {
        tx.send_replace(0.0);
        Self {
            total,
            sent: Arc::new(AtomicU64::new(0)),
            tx,
        }
    }

    /// Records `n` more bytes sent and publishes the new percentage.
    /// Percentages are non-decreasing until [`reset`](Self::reset).
    pub fn record(&self, n: u64) {
        let sent = self.sent.fetch_add(n, Ordering::Relaxed) + n;
        let percent = if self.total == 0 {
            0.0
        } else {
            (sent as f64 / self.total as f64 * 100.0).min(100.0)
        };
        self.tx.send_replace(percent);
    }

    /// Drops back to zero once the transfer finishes, successfully or
    /// not, so no stale bar survives the attempt.
    pub fn reset(&self) {
        self.tx.send_replace(0.0);
    }

    /// Wraps one file payload as a chunked byte stream that ticks the
    /// counter as the transport pulls it.
    pub fn wrap(&self, payload: Bytes) -> impl Stream<Item = Result<Bytes, std::io::Error>> {
        let counter = self.clone();
        let mut chunks = Vec::with_capacity(payload.len() / REPORT_CHUNK_BYTES + 1);
        let mut offset = 0;
        while offset < payload.len() {
            let end = (offset + REPORT_CHUNK_BYTES).min(payload.len());
            chunks.push(payload.slice(offset..end));
            offset = end;
        }
        stream::iter(chunks).map(move |chunk| {
            counter.record(chunk.len() as u64);
            Ok::<_, std::io::Error>(chunk)
        })
    }
}

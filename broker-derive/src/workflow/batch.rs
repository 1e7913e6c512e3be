//! Batch driver
//!
//! Splits records into chunks and derives each chunk on the tokio blocking
//! pool, at most `workers` chunks at a time. Output order matches input
//! order. The derivation (and the snapshot inside it) is shared read-only
//! across chunks.

use super::Derivation;
use crate::error::{DeriveError, DeriveResult};
use crate::models::RecordContext;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// A typed record paired with its logging context
#[derive(Debug, Clone)]
pub struct BatchItem<R> {
    pub record: R,
    pub ctx: RecordContext,
}

impl<R> BatchItem<R> {
    pub fn new(record: R, ctx: RecordContext) -> Self {
        Self { record, ctx }
    }
}

impl<R> From<(R, RecordContext)> for BatchItem<R> {
    fn from((record, ctx): (R, RecordContext)) -> Self {
        Self::new(record, ctx)
    }
}

fn derive_chunk<D: Derivation>(derivation: &D, chunk: Vec<BatchItem<D::Record>>) -> Vec<D::Record> {
    chunk
        .into_iter()
        .map(|BatchItem { mut record, ctx }| {
            derivation.derive(&mut record, &ctx);
            record
        })
        .collect()
}

/// Derive every item, `batch_size` records per blocking task
///
/// Fails only when a worker task panics or is cancelled.
pub async fn derive_batch<D>(
    derivation: Arc<D>,
    items: Vec<BatchItem<D::Record>>,
    workers: usize,
    batch_size: usize,
) -> DeriveResult<Vec<D::Record>>
where
    D: Derivation + 'static,
{
    let total = items.len();
    let workers = workers.max(1);
    let batch_size = batch_size.max(1);
    let started = Instant::now();

    let mut chunks: Vec<Vec<BatchItem<D::Record>>> = Vec::with_capacity(total / batch_size + 1);
    let mut items = items.into_iter().peekable();
    while items.peek().is_some() {
        chunks.push(items.by_ref().take(batch_size).collect());
    }

    debug!(
        derivation = derivation.name(),
        records = total,
        chunks = chunks.len(),
        workers,
        "Starting batch"
    );

    let derived: Vec<Vec<D::Record>> = stream::iter(chunks)
        .map(|chunk| {
            let derivation = Arc::clone(&derivation);
            async move {
                tokio::task::spawn_blocking(move || derive_chunk(derivation.as_ref(), chunk))
                    .await
                    .map_err(|e| DeriveError::Worker(e.to_string()))
            }
        })
        .buffered(workers)
        .try_collect()
        .await?;

    let records: Vec<D::Record> = derived.into_iter().flatten().collect();

    info!(
        derivation = derivation.name(),
        records = records.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Batch derived"
    );

    Ok(records)
}

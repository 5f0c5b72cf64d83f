//! Batched Capture-Date Analysis
//!
//! Works out where every discovered file belongs, a fixed-size batch at a
//! time. Batching keeps the abort checks frequent on huge dumps, and inside
//! each batch a bounded pool of workers reads EXIF concurrently so one slow
//! disk read does not serialize the entire run.

use crate::Context;
use crate::abort::AbortFlag;
use crate::discover::FileMeta;
use crate::plan::{PlannedMove, RenamePolicy, plan};
use async_stream::stream;
use futures::stream::FuturesUnordered;
use futures::{Stream, StreamExt};
use shoebox_exif::resolve;
use std::path::PathBuf;

/// Progress events emitted by [`analyze`] as it works through the discovered
/// files.
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started) — exactly once, with the totals.
/// 2. Per batch: [`BatchStarted`](Self::BatchStarted), then one of
///    [`Planned`](Self::Planned), [`Skipped`](Self::Skipped) or
///    [`Failed`](Self::Failed) per file. Within a batch the per-file events
///    arrive in completion order, not submission order.
/// 3. [`Interrupted`](Self::Interrupted) — at most once, terminal. Emitted
///    instead of [`Complete`](Self::Complete) when an abort was observed;
///    files not yet handed to a worker are abandoned.
/// 4. [`Complete`](Self::Complete) — exactly once, unless interrupted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnalyzeEvent {
    /// Analysis has begun; emitted exactly once before any other event.
    Started { total: usize, batches: usize },
    /// A new batch of at most `Context::batch_size` files is being analyzed.
    BatchStarted { index: usize, len: usize },
    /// The file has a destination that differs from where it currently is.
    Planned(PlannedMove),
    /// The file is already exactly where it belongs.
    Skipped { path: PathBuf },
    /// The file could not be analyzed. The run carries on without it.
    Failed { path: PathBuf, reason: String },
    /// An abort request was observed between files; the stream is finished.
    Interrupted,
    /// Every file has been analyzed; the stream is finished.
    Complete,
}

/// Streams [`AnalyzeEvent`]s for the given files, resolving each one's capture
/// date and planning its destination under `ctx.root`.
///
/// Files are taken in batches of `ctx.batch_size`; the abort flag is checked
/// between batches and between individual files, never mid-file. Within a
/// batch up to `ctx.workers` files are in flight at once, with further files
/// promoted as in-flight ones complete.
///
/// The stream yields events in the order documented on [`AnalyzeEvent`].
/// Individual file failures are folded into [`AnalyzeEvent::Failed`] rather
/// than terminating the stream.
pub fn analyze(files: Vec<FileMeta>, ctx: Context, abort: AbortFlag) -> impl Stream<Item = AnalyzeEvent> {
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        let batch_size = ctx.batch_size.max(1);
        let workers = ctx.workers.max(1);
        let total = files.len();
        yield AnalyzeEvent::Started { total, batches: total.div_ceil(batch_size) };

        for (index, batch) in files.chunks(batch_size).enumerate() {
            if abort.is_set() {
                yield AnalyzeEvent::Interrupted;
                return;
            }
            yield AnalyzeEvent::BatchStarted { index, len: batch.len() };

            let mut queued: Vec<_> =
                batch.iter().map(|file| analyze_file(file.clone(), ctx.root.clone(), ctx.rename)).collect();
            let mut processing = FuturesUnordered::new();
            processing.extend(queued.drain(..workers.min(queued.len())));
            while let Some(event) = processing.next().await {
                yield event;
                // Pop-n-push, but FIFO instead of LIFO.
                if !queued.is_empty() && !abort.is_set() {
                    processing.push(queued.remove(0));
                }
            }

            if abort.is_set() {
                yield AnalyzeEvent::Interrupted;
                return;
            }
        }

        yield AnalyzeEvent::Complete;
    })
}

async fn analyze_file(file: FileMeta, root: PathBuf, rename: RenamePolicy) -> AnalyzeEvent {
    let path = file.path.clone();
    // EXIF parsing is synchronous file I/O; shift it off the async runtime.
    let resolved = tokio::task::spawn_blocking(move || resolve(&file.path)).await;
    match resolved {
        Ok(Ok(date)) => {
            tracing::debug!(path = %path.display(), taken = ?date.taken, source = ?date.source, "Resolved capture date");
            let planned = plan(&root, &path, date.taken, rename);
            if planned.dest == planned.source {
                // Copying a file onto itself truncates it to zero bytes, so a
                // photo already on the right shelf never reaches execution.
                AnalyzeEvent::Skipped { path }
            } else {
                AnalyzeEvent::Planned(planned)
            }
        },
        Ok(Err(err)) => {
            tracing::warn!(path = %path.display(), error = %err, "Could not resolve capture date");
            AnalyzeEvent::Failed { path, reason: err.to_string() }
        },
        // The worker panicked. Treat it like any other per-file failure.
        Err(err) => AnalyzeEvent::Failed { path, reason: err.to_string() },
    }
}

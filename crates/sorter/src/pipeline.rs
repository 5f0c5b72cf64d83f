//! The Sorting Pipeline
//!
//! Ties the phases together: discover everything under the root, analyze in
//! batches to produce a plan, then execute the plan. Aborting during analysis
//! ends the run before a single file has been touched; aborting during
//! execution stops between files and never deletes a source whose copy is
//! unconfirmed.

use crate::Context;
use crate::abort::AbortFlag;
use crate::analyze::{AnalyzeEvent, analyze};
use crate::discover::discover;
use crate::error::{ErrorKind, Result};
use crate::execute::{ExecuteEvent, execute};
use crate::plan::PlannedMove;
use crate::progress::{PipelineEvent, ProgressSink};
use exn::ResultExt;
use futures::{StreamExt, pin_mut};
use std::path::Path;
use tokio::fs;

/// What a run amounted to, in file counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// Supported files found under the root.
    pub discovered: usize,
    /// Files with a destination different from where they already were.
    pub planned: usize,
    /// Files already exactly where they belong.
    pub skipped: usize,
    /// Files that could not be analyzed, copied or deleted.
    pub failed: usize,
    /// Confirmed copies.
    pub copied: usize,
    /// Sources deleted after their copy was confirmed.
    pub removed: usize,
    /// Whether an abort request cut the run short.
    pub aborted: bool,
}
impl Summary {
    /// True when discovery found nothing to sort.
    pub fn nothing_to_do(&self) -> bool {
        self.discovered == 0
    }
}

/// Runs the whole pipeline: discover, analyze, execute.
///
/// Fatal errors (an unusable root) are returned as `Err`; everything that
/// goes wrong with individual files is reported through `sink` and counted in
/// the [`Summary`] instead. An aborted run is still an `Ok` run, with
/// [`Summary::aborted`] set and whatever had been confirmed by then counted.
pub async fn run(ctx: Context, sink: &dyn ProgressSink, abort: AbortFlag) -> Result<Summary> {
    let root = fs::canonicalize(&ctx.root).await.or_raise(|| ErrorKind::InvalidRoot(ctx.root.clone()))?;
    let metadata = fs::metadata(&root).await.or_raise(|| ErrorKind::InvalidRoot(root.clone()))?;
    if !metadata.is_dir() {
        exn::bail!(ErrorKind::InvalidRoot(root));
    }
    let ctx = Context { root, ..ctx };
    tracing::info!(root = %ctx.root.display(), rename = ?ctx.rename, "Sorting photo dump");

    let mut files = discover(&ctx.root).await;
    // Oldest first, so batches line up with shelves and an aborted run still
    // leaves a chronologically contiguous chunk sorted.
    files.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.path.cmp(&b.path)));
    let mut summary = Summary { discovered: files.len(), ..Summary::default() };
    sink.handle(&PipelineEvent::Discovered { total: files.len() });

    if files.is_empty() {
        tracing::warn!(root = %ctx.root.display(), "No supported image files found");
        list_root_entries(&ctx.root).await;
        return Ok(summary);
    }
    tracing::info!(count = files.len(), "Found supported image files");

    let mut ops: Vec<PlannedMove> = Vec::new();
    {
        let events = analyze(files, ctx.clone(), abort.clone());
        pin_mut!(events);
        while let Some(event) = events.next().await {
            match &event {
                AnalyzeEvent::Planned(planned) => {
                    summary.planned += 1;
                    ops.push(planned.clone());
                },
                AnalyzeEvent::Skipped { .. } => summary.skipped += 1,
                AnalyzeEvent::Failed { .. } => summary.failed += 1,
                AnalyzeEvent::Interrupted => summary.aborted = true,
                _ => {},
            }
            sink.handle(&PipelineEvent::Analyze(event));
        }
    }
    if summary.aborted {
        tracing::info!("Aborted during analysis; nothing has been moved");
        return Ok(summary);
    }

    {
        let events = execute(ops, abort);
        pin_mut!(events);
        while let Some(event) = events.next().await {
            match &event {
                ExecuteEvent::Copied { .. } => summary.copied += 1,
                ExecuteEvent::Removed { .. } => summary.removed += 1,
                ExecuteEvent::Failed { .. } => summary.failed += 1,
                ExecuteEvent::Interrupted => summary.aborted = true,
                _ => {},
            }
            sink.handle(&PipelineEvent::Execute(event));
        }
    }

    tracing::info!(
        copied = summary.copied,
        removed = summary.removed,
        failed = summary.failed,
        skipped = summary.skipped,
        aborted = summary.aborted,
        "Run finished"
    );
    Ok(summary)
}

/// Logs what *is* in the root, for the "why did it find nothing" question
/// that always follows.
async fn list_root_entries(root: &Path) {
    let Ok(mut entries) = fs::read_dir(root).await else {
        return;
    };
    while let Ok(Some(entry)) = entries.next_entry().await {
        tracing::info!(entry = %entry.path().display(), "Root contains");
    }
}

//! Commit and Cleanup Execution
//!
//! Carries out the planned moves in two phases. Commit copies every source to
//! its destination; cleanup then deletes the sources whose copies were
//! confirmed. A source file is never touched until its copy has landed, so an
//! abort (or a power cut) mid-run loses nothing worse than some disk space.

use crate::abort::AbortFlag;
use crate::error::{Result, map_io_error};
use crate::plan::PlannedMove;
use async_stream::stream;
use futures::Stream;
use std::path::PathBuf;
use tokio::fs;

/// Progress events emitted by [`execute`] as it carries out planned moves.
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started) — exactly once, with the operation count.
/// 2. Commit: one [`Copied`](Self::Copied) or [`Failed`](Self::Failed) per
///    operation, in operation order.
/// 3. Cleanup: one [`Removed`](Self::Removed) or [`Failed`](Self::Failed) per
///    confirmed copy, in the same order. Skipped entirely when commit was
///    interrupted, leaving every source in place.
/// 4. [`Interrupted`](Self::Interrupted) — at most once, terminal.
/// 5. [`Complete`](Self::Complete) — exactly once, unless interrupted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExecuteEvent {
    /// Execution has begun; emitted exactly once before any other event.
    Started { total: usize },
    /// The file now exists at its destination. The source is still in place.
    Copied { source: PathBuf, dest: PathBuf },
    /// The source file of a confirmed copy has been deleted.
    Removed { source: PathBuf },
    /// A copy or a delete went wrong. The run carries on with the next file.
    Failed { path: PathBuf, reason: String },
    /// An abort request was observed between files; the stream is finished.
    Interrupted,
    /// Commit and cleanup both ran to the end; the stream is finished.
    Complete,
}

/// Streams [`ExecuteEvent`]s while carrying out `ops`.
///
/// The abort flag is checked between operations, never mid-file. An abort
/// during commit skips cleanup altogether: destinations copied so far stay,
/// and no source is deleted. An abort during cleanup leaves the remaining
/// sources in place; their copies are already confirmed, so re-running the
/// sorter will skip them.
///
/// Failures are folded into [`ExecuteEvent::Failed`] per file. A failed copy
/// only ever skips that file's cleanup; it never stops the run.
pub fn execute(ops: Vec<PlannedMove>, abort: AbortFlag) -> impl Stream<Item = ExecuteEvent> {
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        yield ExecuteEvent::Started { total: ops.len() };

        let mut confirmed: Vec<PathBuf> = Vec::with_capacity(ops.len());
        let mut interrupted = false;
        for op in &ops {
            if abort.is_set() {
                interrupted = true;
                break;
            }
            match copy_file(op).await {
                Ok(()) => {
                    confirmed.push(op.source.clone());
                    yield ExecuteEvent::Copied { source: op.source.clone(), dest: op.dest.clone() };
                },
                Err(err) => {
                    tracing::warn!(source = %op.source.display(), error = %err, "Copy failed; source left untouched");
                    yield ExecuteEvent::Failed { path: op.source.clone(), reason: err.to_string() };
                },
            }
        }
        if interrupted {
            yield ExecuteEvent::Interrupted;
            return;
        }

        for source in &confirmed {
            if abort.is_set() {
                interrupted = true;
                break;
            }
            match fs::remove_file(source).await {
                Ok(()) => yield ExecuteEvent::Removed { source: source.clone() },
                Err(err) => {
                    tracing::warn!(source = %source.display(), error = %err, "Could not delete source after copy");
                    yield ExecuteEvent::Failed { path: source.clone(), reason: err.to_string() };
                },
            }
        }
        if interrupted {
            yield ExecuteEvent::Interrupted;
            return;
        }

        yield ExecuteEvent::Complete;
    })
}

async fn copy_file(op: &PlannedMove) -> Result<()> {
    if let Some(parent) = op.dest.parent() {
        fs::create_dir_all(parent).await.map_err(|e| map_io_error(e, &op.dest))?;
    }
    fs::copy(&op.source, &op.dest).await.map_err(|e| map_io_error(e, &op.source))?;
    preserve_modified(op).await;
    Ok(())
}

/// Carries the source's modification time onto the copy, so files that shelve
/// by mtime land on the same shelf when the tool runs again. Best effort:
/// losing the timestamp costs a re-shelf on some future run, not a photo.
async fn preserve_modified(op: &PlannedMove) {
    let Ok(metadata) = fs::metadata(&op.source).await else {
        return;
    };
    let Ok(modified) = metadata.modified() else {
        return;
    };
    let dest = op.dest.clone();
    let result =
        tokio::task::spawn_blocking(move || std::fs::File::options().write(true).open(dest)?.set_modified(modified))
            .await;
    if !matches!(result, Ok(Ok(()))) {
        tracing::debug!(dest = %op.dest.display(), "Could not carry the modification time onto the copy");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::{StreamExt, pin_mut};
    use std::path::Path;

    fn write(path: &Path, data: &[u8]) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, data).unwrap();
    }

    #[tokio::test]
    async fn test_copies_then_removes_in_order() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("dump/photo.jpg");
        let dest = temp_dir.path().join("2024/06/photo.jpg");
        write(&source, b"pixels");

        let ops = vec![PlannedMove { source: source.clone(), dest: dest.clone() }];
        let events = execute(ops, AbortFlag::new()).collect::<Vec<_>>().await;
        assert_eq!(
            events,
            vec![
                ExecuteEvent::Started { total: 1 },
                ExecuteEvent::Copied { source: source.clone(), dest: dest.clone() },
                ExecuteEvent::Removed { source: source.clone() },
                ExecuteEvent::Complete,
            ]
        );
        assert_eq!(std::fs::read(&dest).unwrap(), b"pixels");
        assert!(!source.exists());
    }

    #[tokio::test]
    async fn test_missing_source_fails_without_stopping_the_run() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("dump/gone.jpg");
        let source = temp_dir.path().join("dump/here.jpg");
        write(&source, b"pixels");

        let ops = vec![
            PlannedMove { source: missing.clone(), dest: temp_dir.path().join("2024/06/gone.jpg") },
            PlannedMove { source: source.clone(), dest: temp_dir.path().join("2024/06/here.jpg") },
        ];
        let events = execute(ops, AbortFlag::new()).collect::<Vec<_>>().await;
        assert!(events.iter().any(|e| matches!(e, ExecuteEvent::Failed { path, .. } if *path == missing)));
        assert!(events.contains(&ExecuteEvent::Removed { source: source.clone() }));
        assert_eq!(events.last(), Some(&ExecuteEvent::Complete));
        assert!(temp_dir.path().join("2024/06/here.jpg").exists());
    }

    #[tokio::test]
    async fn test_shared_source_cleanup_failure_keeps_both_copies() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("dump/photo.jpg");
        let dest_a = temp_dir.path().join("a/photo.jpg");
        let dest_b = temp_dir.path().join("b/photo.jpg");
        write(&source, b"pixels");

        let ops = vec![
            PlannedMove { source: source.clone(), dest: dest_a.clone() },
            PlannedMove { source: source.clone(), dest: dest_b.clone() },
        ];
        let events = execute(ops, AbortFlag::new()).collect::<Vec<_>>().await;
        // The second cleanup finds its source already deleted by the first.
        assert_eq!(events.iter().filter(|e| matches!(e, ExecuteEvent::Removed { .. })).count(), 1);
        assert_eq!(events.iter().filter(|e| matches!(e, ExecuteEvent::Failed { .. })).count(), 1);
        assert_eq!(events.last(), Some(&ExecuteEvent::Complete));
        assert_eq!(std::fs::read(&dest_a).unwrap(), b"pixels");
        assert_eq!(std::fs::read(&dest_b).unwrap(), b"pixels");
    }

    #[tokio::test]
    async fn test_failed_copy_never_deletes_the_source() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("dump/photo.jpg");
        let dest = temp_dir.path().join("2024/06/photo.jpg");
        write(&source, b"pixels");
        // Occupy the destination with a directory so the copy itself fails.
        std::fs::create_dir_all(&dest).unwrap();

        let ops = vec![PlannedMove { source: source.clone(), dest }];
        let events = execute(ops, AbortFlag::new()).collect::<Vec<_>>().await;
        assert!(events.iter().any(|e| matches!(e, ExecuteEvent::Failed { path, .. } if *path == source)));
        assert!(!events.iter().any(|e| matches!(e, ExecuteEvent::Removed { .. })));
        assert_eq!(events.last(), Some(&ExecuteEvent::Complete));
        assert!(source.exists());
    }

    #[tokio::test]
    async fn test_copy_preserves_modification_time() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("photo.jpg");
        let dest = temp_dir.path().join("2021/01/photo.jpg");
        write(&source, b"pixels");
        let mtime = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_609_556_645);
        std::fs::File::options().write(true).open(&source).unwrap().set_modified(mtime).unwrap();

        let ops = vec![PlannedMove { source, dest: dest.clone() }];
        let events = execute(ops, AbortFlag::new()).collect::<Vec<_>>().await;
        assert_eq!(events.last(), Some(&ExecuteEvent::Complete));
        assert_eq!(std::fs::metadata(&dest).unwrap().modified().unwrap(), mtime);
    }

    #[tokio::test]
    async fn test_abort_during_commit_skips_cleanup() {
        let temp_dir = tempfile::tempdir().unwrap();
        let first = temp_dir.path().join("dump/one.jpg");
        let second = temp_dir.path().join("dump/two.jpg");
        write(&first, b"one");
        write(&second, b"two");
        let abort = AbortFlag::new();

        let ops = vec![
            PlannedMove { source: first.clone(), dest: temp_dir.path().join("out/one.jpg") },
            PlannedMove { source: second.clone(), dest: temp_dir.path().join("out/two.jpg") },
        ];
        let events = execute(ops, abort.clone());
        pin_mut!(events);
        assert_eq!(events.next().await, Some(ExecuteEvent::Started { total: 2 }));
        assert!(matches!(events.next().await, Some(ExecuteEvent::Copied { .. })));
        abort.set();
        assert_eq!(events.next().await, Some(ExecuteEvent::Interrupted));
        assert_eq!(events.next().await, None);
        // The copy that landed stays, but no source has been deleted.
        assert!(temp_dir.path().join("out/one.jpg").exists());
        assert!(first.exists());
        assert!(second.exists());
        assert!(!temp_dir.path().join("out/two.jpg").exists());
    }

    #[tokio::test]
    async fn test_destination_directories_are_created() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("photo.jpg");
        let dest = temp_dir.path().join("2024/06/photo.jpg");
        write(&source, b"pixels");

        let ops = vec![PlannedMove { source, dest: dest.clone() }];
        let events = execute(ops, AbortFlag::new()).collect::<Vec<_>>().await;
        assert_eq!(events.last(), Some(&ExecuteEvent::Complete));
        assert!(dest.exists());
    }
}

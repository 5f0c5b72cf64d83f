//! Recursive Discovery of Supported Images
//!
//! Walks the dump directory and yields every file whose extension marks it as
//! a supported camera format. The walk is iterative (a stack of directories
//! still to visit) because recursing in an async fn means boxing futures, and
//! a `Vec` is so much simpler.

use crate::error::{ErrorKind, Result, map_io_error};
use async_stream::stream;
use futures::{Stream, StreamExt};
use shoebox_exif::Format;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tokio::fs::{self, DirEntry};

/// A discovered candidate file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileMeta {
    /// Absolute path on disk.
    pub path: PathBuf,
    /// Filesystem modification time; the fallback capture date.
    pub modified: OffsetDateTime,
}

enum WalkEntry {
    File(FileMeta),
    Descend(PathBuf),
    Skip,
}

/// Everything fallible about a single directory entry lives here, because
/// inside `stream!` you cannot `?` an error, only convert-yield-continue.
/// Learned that one the hard way.
async fn process_entry(entry: DirEntry) -> Result<WalkEntry> {
    let path = entry.path();
    let metadata = entry.metadata().await.map_err(|e| map_io_error(e, &path))?;
    if metadata.is_dir() {
        return Ok(WalkEntry::Descend(path));
    }
    if metadata.is_file() {
        if Format::from_path(&path).is_none() {
            return Ok(WalkEntry::Skip);
        }
        let modified = metadata.modified().map_err(ErrorKind::Io)?.into();
        return Ok(WalkEntry::File(FileMeta { path, modified }));
    }
    // Note: silently drop what is most likely a broken symlink.
    Ok(WalkEntry::Skip)
}

/// Stream every supported image file underneath `root`, depth-first.
///
/// Unreadable entries are yielded as errors so the caller decides whether to
/// halt or carry on; a missing directory mid-walk is treated as empty.
pub fn discover_stream(root: impl AsRef<Path>) -> impl Stream<Item = Result<FileMeta>> {
    let mut stack = vec![root.as_ref().to_path_buf()];
    stream! {
        'dirs: while let Some(current) = stack.pop() {
            let mut entries = match fs::read_dir(&current).await {
                Ok(entries) => entries,
                // A directory deleted between being queued and being read is
                // an empty directory as far as this walk is concerned.
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                Err(err) => {
                    yield Err(exn::Exn::from(map_io_error(err, &current)));
                    continue 'dirs;
                }
            };

            'entries: loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break 'entries,
                    Err(e) => { yield Err(exn::Exn::from(map_io_error(e, &current))); continue 'entries; },
                };
                match process_entry(entry).await {
                    Ok(WalkEntry::File(f)) => yield Ok(f),
                    Ok(WalkEntry::Descend(d)) => stack.push(d),
                    Ok(WalkEntry::Skip) => {},
                    Err(e) => yield Err(e),
                };
            }
        }
    }
}

/// Collect the discovery stream into a list, dropping unreadable entries.
///
/// A dump full of weird permissions should still sort the files that *are*
/// readable, so per-entry errors are logged and skipped rather than bubbled.
pub async fn discover(root: impl AsRef<Path>) -> Vec<FileMeta> {
    let stream = discover_stream(root);
    futures::pin_mut!(stream);
    let mut files = Vec::new();
    while let Some(result) = stream.next().await {
        match result {
            Ok(file) => files.push(file),
            Err(err) => tracing::warn!(error = %err, "Skipping unreadable entry during discovery"),
        }
    }
    files
}

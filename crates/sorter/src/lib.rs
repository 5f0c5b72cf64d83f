pub mod abort;
pub mod analyze;
pub mod discover;
pub mod error;
pub mod execute;
pub mod pipeline;
mod plan;
pub mod progress;
#[cfg(test)]
pub(crate) mod testutil;

pub use crate::abort::AbortFlag;
pub use crate::pipeline::{Summary, run};
pub use crate::plan::{PlannedMove, RenamePolicy, plan};
pub use crate::progress::{NullSink, PipelineEvent, ProgressSink};

use std::path::PathBuf;

/// Files analyzed per batch unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 200;

/// Default cap on concurrent metadata readers: twice the available hardware
/// parallelism, falling back to 4 when that cannot be determined.
pub fn default_workers() -> usize {
    std::thread::available_parallelism().map(|n| n.get() * 2).unwrap_or(4)
}

/// Shared settings consulted by every stage of a sorting run.
#[derive(Clone, Debug)]
pub struct Context {
    /// Root directory being reorganized (canonicalized by [`run`])
    pub root: PathBuf,
    /// Destination filename policy
    pub rename: RenamePolicy,
    /// Files analyzed per batch
    pub batch_size: usize,
    /// Concurrent metadata readers within a batch
    pub workers: usize,
}
impl Context {
    /// Creates a context for sorting `root` with default batching and concurrency.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            rename: RenamePolicy::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            workers: default_workers(),
        }
    }

    pub fn with_rename(mut self, rename: RenamePolicy) -> Self {
        self.rename = rename;
        self
    }

    /// Zero would make no progress at all; it is clamped to one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Zero would make no progress at all; it is clamped to one.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }
}

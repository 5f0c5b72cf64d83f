//! Cooperative Cancellation
//!
//! A run cannot be stopped mid-file (a half-copied photo is worse than a
//! finished one), so cancellation is a flag that the pipeline polls at batch
//! and item boundaries rather than anything pre-emptive.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared one-way abort flag.
///
/// Cloning is cheap and every clone observes the same flag. Once set, the
/// flag stays set for the rest of the run; there is no way to un-abort.
#[derive(Clone, Debug, Default)]
pub struct AbortFlag(Arc<AtomicBool>);

impl AbortFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the run stop at the next safe point. Idempotent.
    pub fn set(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Has an abort been requested?
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

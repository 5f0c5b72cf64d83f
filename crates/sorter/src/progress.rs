//! Progress Reporting
//!
//! The pipeline pushes typed events into a [`ProgressSink`] as it works, so a
//! terminal frontend can draw bars and a test can record exactly what
//! happened, without either of them being wired into the pipeline itself.

use crate::analyze::AnalyzeEvent;
use crate::execute::ExecuteEvent;

/// Everything the pipeline reports, in the order it happens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PipelineEvent {
    /// Discovery finished; `total` supported files were found.
    Discovered { total: usize },
    /// An event from the analysis phase.
    Analyze(AnalyzeEvent),
    /// An event from the execution phase.
    Execute(ExecuteEvent),
}

/// Receives pipeline events as they happen.
///
/// Called synchronously from the pipeline loop, so implementations should
/// return quickly; anything slow belongs on the far side of a channel.
pub trait ProgressSink: Send + Sync {
    fn handle(&self, event: &PipelineEvent);
}

/// Ignores every event, for callers who only want the final summary.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;
impl ProgressSink for NullSink {
    fn handle(&self, _event: &PipelineEvent) {}
}

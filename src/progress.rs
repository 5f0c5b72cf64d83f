//! Terminal Progress Rendering

use indicatif::{ProgressBar, ProgressStyle};
use shoebox_sorter::analyze::AnalyzeEvent;
use shoebox_sorter::execute::ExecuteEvent;
use shoebox_sorter::{PipelineEvent, ProgressSink};
use std::sync::atomic::{AtomicBool, Ordering};

/// Draws pipeline progress as a single reusable bar on stderr.
///
/// The bar is re-lengthed for every phase. During execution it counts copies
/// first and starts over for the source deletions, since those run as two
/// separate passes and a single combined count just looks stalled.
pub struct TerminalSink {
    bar: ProgressBar,
    cleaning: AtomicBool,
}

impl TerminalSink {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        Self { bar, cleaning: AtomicBool::new(false) }
    }

    /// Remove the bar once the run is over, leaving the terminal clean for
    /// the summary line.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for TerminalSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for TerminalSink {
    fn handle(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::Discovered { total } => {
                self.bar.println(format!("Found {total} photos to sort"));
            },
            PipelineEvent::Analyze(event) => match event {
                AnalyzeEvent::Started { total, batches } => {
                    self.bar.set_length(*total as u64);
                    self.bar.set_position(0);
                    self.bar.set_message(format!("analyzing in {batches} batches"));
                },
                AnalyzeEvent::BatchStarted { index, .. } => {
                    self.bar.set_message(format!("analyzing batch {}", index + 1));
                },
                AnalyzeEvent::Planned(_) | AnalyzeEvent::Skipped { .. } => self.bar.inc(1),
                AnalyzeEvent::Failed { path, reason } => {
                    self.bar.inc(1);
                    self.bar.println(format!("failed {}: {reason}", path.display()));
                },
                AnalyzeEvent::Interrupted => self.bar.set_message("aborted"),
                AnalyzeEvent::Complete => self.bar.set_message("analyzed"),
            },
            PipelineEvent::Execute(event) => match event {
                ExecuteEvent::Started { total } => {
                    self.bar.set_length(*total as u64);
                    self.bar.set_position(0);
                    self.bar.set_message("copying");
                },
                ExecuteEvent::Copied { .. } => self.bar.inc(1),
                ExecuteEvent::Removed { .. } => {
                    if !self.cleaning.swap(true, Ordering::Relaxed) {
                        self.bar.set_position(0);
                        self.bar.set_message("deleting sorted sources");
                    }
                    self.bar.inc(1);
                },
                ExecuteEvent::Failed { path, reason } => {
                    self.bar.inc(1);
                    self.bar.println(format!("failed {}: {reason}", path.display()));
                },
                ExecuteEvent::Interrupted => self.bar.set_message("aborted"),
                ExecuteEvent::Complete => self.bar.set_message("done"),
            },
        }
    }
}

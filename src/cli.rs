//! Command-Line Interface

use clap::Parser;
use shoebox_config::Settings;
use shoebox_sorter::{Context, RenamePolicy};
use std::path::PathBuf;

/// Sort a photo dump into year/month folders derived from capture dates.
#[derive(Debug, Parser)]
#[command(name = "shoebox", version)]
pub struct Args {
    /// Directory containing the photos to sort; sorted files stay under it
    pub root: PathBuf,

    /// Rename files to <timestamp>_<original name> while sorting
    #[arg(short, long)]
    pub rename: bool,

    /// Files analyzed per batch
    #[arg(long, value_name = "N")]
    pub batch_size: Option<usize>,

    /// Concurrent metadata reads within a batch
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Configuration file to use instead of the platform default
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v=info, -vv=debug, -vvv=trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Fold the command line over the file/environment settings. Flags win.
    pub fn context(&self, settings: &Settings) -> Context {
        let mut ctx = Context::new(&self.root);
        if let Some(batch_size) = self.batch_size.or(settings.batch_size) {
            ctx = ctx.with_batch_size(batch_size);
        }
        if let Some(workers) = self.workers.or(settings.workers) {
            ctx = ctx.with_workers(workers);
        }
        if self.rename || settings.rename {
            ctx = ctx.with_rename(RenamePolicy::Timestamped);
        }
        ctx
    }
}

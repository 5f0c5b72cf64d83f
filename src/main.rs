//! Shoebox: sort a photo dump into year/month folders.

mod cli;
mod progress;

use crate::cli::Args;
use crate::progress::TerminalSink;
use clap::Parser;
use shoebox_config::Settings;
use shoebox_sorter::AbortFlag;
use std::io::BufRead;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> miette::Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.verbose);

    // `exn` errors are not `std::error::Error`, so `into_diagnostic` does not
    // apply; `Report::msg` takes them through `Display`.
    let settings = Settings::load(args.config.as_deref()).map_err(miette::Report::msg)?;
    let ctx = args.context(&settings);

    let abort = AbortFlag::new();
    spawn_abort_listeners(abort.clone());

    let sink = TerminalSink::new();
    let summary = shoebox_sorter::run(ctx, &sink, abort).await.map_err(miette::Report::msg)?;
    sink.finish();

    println!(
        "{} copied, {} deleted, {} failed, {} skipped{}",
        summary.copied,
        summary.removed,
        summary.failed,
        summary.skipped,
        if summary.aborted { " (aborted)" } else { "" },
    );
    if summary.nothing_to_do() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn init_tracing(verbosity: u8) {
    let fallback = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // RUST_LOG always wins; the -v flags only move the default.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// Ctrl-C or a `q`/`quit` line on stdin both request a graceful stop: the
/// pipeline finishes the file in hand and stops at the next safe point.
fn spawn_abort_listeners(abort: AbortFlag) {
    tokio::spawn({
        let abort = abort.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("Stopping at the next safe point...");
                abort.set();
            }
        }
    });
    // A plain thread, not `tokio::io::stdin`: the runtime waits for that
    // blocking read at shutdown, which keeps the process alive after the
    // summary until stdin produces another line.
    std::thread::spawn(move || watch_for_quit(std::io::stdin().lock(), &abort));
}

/// Scans `reader` line by line and trips the abort flag on `q` or `quit`.
fn watch_for_quit(reader: impl BufRead, abort: &AbortFlag) {
    for line in reader.lines() {
        let Ok(line) = line else { break };
        if matches!(line.trim(), "q" | "quit") {
            eprintln!("Stopping at the next safe point...");
            abort.set();
            break;
        }
    }
}

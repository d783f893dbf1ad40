//! DiskWise: disk usage analyser.
//!
//! Thin binary entry point. All logic lives in the `diskwise-core` crate;
//! this file parses the command line, installs logging and prints results.

mod cli;
mod report;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::{ClassifyArgs, Cli, Command, DeleteArgs, ScanArgs};
use diskwise_core::classify::classify;
use diskwise_core::delete::delete;
use diskwise_core::model::{format_count, format_size};
use diskwise_core::platform::enumerate_drives;
use diskwise_core::scanner::{
    DiagnosticSink, FileDiagnosticLog, NullSink, ScanController, ScanMessage,
};
use diskwise_core::AnalyzerConfig;
use std::io::Write;
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = AnalyzerConfig::load(cli.config.as_deref())?;
    tracing::debug!(?config, "Loaded configuration");

    match cli.command {
        Command::Scan(args) => run_scan(args, Arc::new(config)),
        Command::Classify(args) => run_classify(&args, &config),
        Command::Delete(args) => run_delete(&args, &config),
        Command::Drives => run_drives(),
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_scan(args: ScanArgs, config: Arc<AnalyzerConfig>) -> Result<()> {
    let log = match &args.log {
        Some(path) => Some(Arc::new(FileDiagnosticLog::create(path).with_context(|| {
            format!("cannot create scan log {}", path.display())
        })?)),
        None => None,
    };
    let sink: Arc<dyn DiagnosticSink> = match &log {
        Some(log) => log.clone(),
        None => Arc::new(NullSink),
    };

    let mut controller = ScanController::new(config.clone());
    let handle = controller.start(args.root.clone(), sink)?;
    let root = handle.root().to_path_buf();
    eprintln!("Scanning {} ...", root.display());

    // Drain progress until the terminal message arrives.
    let result = loop {
        let Some(handle) = controller.handle() else {
            bail!("scan of {} ended unexpectedly", root.display());
        };
        match handle.messages.recv() {
            Ok(ScanMessage::Progress { dirs_visited }) => {
                eprint!("\r  {} folders scanned", format_count(dirs_visited));
            }
            Ok(ScanMessage::Completed(result)) => break *result,
            Ok(ScanMessage::Cancelled) | Err(_) => {
                controller.stop();
                bail!("scan of {} was cancelled", root.display());
            }
        }
    };
    controller.stop();
    eprintln!();
    if let Some(log) = &log {
        eprintln!("Scan log written to {}", log.path().display());
    }

    let min_size = args.min_size.unwrap_or(config.display.min_size);
    let tree = report::build_tree(&result, &config, min_size, args.depth);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &tree)?;
        writeln!(out)?;
    } else {
        report::write_tree(&mut out, &tree)?;
        writeln!(out)?;
        report::write_summary(&mut out, &result)?;
    }
    Ok(())
}

fn run_classify(args: &ClassifyArgs, config: &AnalyzerConfig) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for path in &args.paths {
        let is_dir = args.dir || path.is_dir();
        let label = classify(path, is_dir, &config.rules);
        writeln!(
            out,
            "{}\n  {} ({} risk): {}",
            path.display(),
            label.category.label(),
            label.risk.label(),
            label.explanation
        )?;
    }
    Ok(())
}

fn run_delete(args: &DeleteArgs, config: &AnalyzerConfig) -> Result<()> {
    // A link to a directory is removed as a link, never entered.
    let is_dir = std::fs::symlink_metadata(&args.path)
        .map(|m| m.is_dir())
        .unwrap_or(false);

    let outcome = delete(&args.path, is_dir, args.force, &config.rules)?;
    if outcome.is_partial() {
        println!(
            "Deleted {} entries; {} could not be removed",
            format_count(outcome.entries_removed),
            format_count(outcome.entries_failed)
        );
    } else {
        println!(
            "Deleted {} ({} entries)",
            args.path.display(),
            format_count(outcome.entries_removed)
        );
    }
    Ok(())
}

fn run_drives() -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for drive in enumerate_drives() {
        write!(out, "{:<6} {:<10}", drive.letter, drive.drive_type.label())?;
        if drive.total_bytes > 0 {
            write!(
                out,
                " {:>10} free of {:>10} ({:.0}% used)",
                format_size(drive.free_bytes),
                format_size(drive.total_bytes),
                drive.usage_percent()
            )?;
        }
        if !drive.label.is_empty() || !drive.filesystem.is_empty() {
            write!(out, "  {} {}", drive.label, drive.filesystem)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

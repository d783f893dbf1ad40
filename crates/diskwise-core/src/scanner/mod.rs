/// Scanner module: orchestrates background scans.
///
/// A scan runs on one dedicated thread in two phases:
/// 1. [`traversal::traverse`] walks the tree and builds the visitation log,
///    emitting coalesced progress counts.
/// 2. [`aggregate::aggregate`] folds the log into a [`crate::model::ScanResult`].
///
/// The worker owns every structure it builds. The consumer sees the result
/// only when it arrives inside [`ScanMessage::Completed`], so no locks guard
/// it. The only shared state is the cancellation flag and the channel.
pub mod aggregate;
pub mod diag_log;
pub mod progress;
pub mod traversal;

pub use aggregate::aggregate;
pub use diag_log::{DiagnosticSink, FileDiagnosticLog, NullSink, ScanEvent};
pub use progress::{ScanMessage, ScanOutcome};
pub use traversal::{traverse, VisitLog};

use crate::config::{AnalyzerConfig, ScanConfig};
use crate::error::ScanError;
use crossbeam_channel::{Receiver, Sender};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{info, warn};

/// Maximum number of messages that may queue up in the channel.
///
/// Progress is sent with `try_send` and always leaves one slot free, so the
/// single terminal message can never block the worker even if the consumer
/// has stopped draining.
pub const PROGRESS_CHANNEL_CAPACITY: usize = 4_096;

/// Handle to a running or finished scan.
pub struct ScanHandle {
    /// Progress and terminal messages from the scan thread.
    pub messages: Receiver<ScanMessage>,
    root: PathBuf,
    cancel_flag: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl ScanHandle {
    /// Absolute root path being scanned; the key of the root entry in the result.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Request the scan to stop as soon as possible.
    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::Relaxed)
    }

    /// `true` once the worker thread has returned.
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, |t| t.is_finished())
    }

    /// Block until the terminal message arrives, discarding progress.
    ///
    /// A worker that vanished without a terminal message (it panicked) is
    /// reported as cancelled: no result was published.
    pub fn wait_for_outcome(&self) -> ScanOutcome {
        loop {
            match self.messages.recv() {
                Ok(ScanMessage::Progress { .. }) => continue,
                Ok(ScanMessage::Completed(result)) => return ScanOutcome::Completed(*result),
                Ok(ScanMessage::Cancelled) | Err(_) => return ScanOutcome::Cancelled,
            }
        }
    }

    /// Wait for the worker thread to return.
    pub fn join(mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Scanner thread for {} panicked", self.root.display());
            }
        }
    }
}

impl Drop for ScanHandle {
    /// An abandoned scan is cancelled rather than left running detached.
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.cancel();
        }
    }
}

impl std::fmt::Debug for ScanHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanHandle")
            .field("root", &self.root)
            .field("cancelled", &self.is_cancelled())
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Start a new scan of `root` on a background thread.
///
/// `root` is made absolute (without resolving symlinks); that absolute path
/// is the key of the root directory in the published result.
pub fn start_scan(
    root: PathBuf,
    config: Arc<AnalyzerConfig>,
    sink: Arc<dyn DiagnosticSink>,
) -> Result<ScanHandle, ScanError> {
    let root = std::path::absolute(&root).unwrap_or(root);
    let (tx, rx) = crossbeam_channel::bounded::<ScanMessage>(PROGRESS_CHANNEL_CAPACITY);
    let cancel_flag = Arc::new(AtomicBool::new(false));

    let worker_root = root.clone();
    let worker_cancel = cancel_flag.clone();
    let thread = thread::Builder::new()
        .name("diskwise-scanner".into())
        .spawn(move || {
            run_scan(
                worker_root,
                &config.scan,
                &worker_cancel,
                sink.as_ref(),
                &tx,
            );
        })
        .map_err(ScanError::Spawn)?;

    Ok(ScanHandle {
        messages: rx,
        root,
        cancel_flag,
        thread: Some(thread),
    })
}

/// Body of the scanner thread.
fn run_scan(
    root: PathBuf,
    config: &ScanConfig,
    cancel: &AtomicBool,
    sink: &dyn DiagnosticSink,
    tx: &Sender<ScanMessage>,
) {
    let start = Instant::now();
    info!("Starting scan of {}", root.display());

    let log = traverse(&root, config, cancel, sink, |dirs_visited| {
        if tx.len() + 1 < PROGRESS_CHANNEL_CAPACITY {
            let _ = tx.try_send(ScanMessage::Progress { dirs_visited });
        }
    });

    let Some(log) = log else {
        info!("Scan of {} cancelled", root.display());
        let _ = tx.send(ScanMessage::Cancelled);
        return;
    };

    let mut result = aggregate(root, log);
    result.stats.duration = start.elapsed();

    // A cancel that lands during aggregation still suppresses publication.
    if cancel.load(Ordering::Relaxed) {
        info!("Scan of {} cancelled", result.root.display());
        let _ = tx.send(ScanMessage::Cancelled);
        return;
    }

    info!(
        "Scan of {} complete: {} directories, {} files, {} bytes in {:?}",
        result.root.display(),
        result.stats.dirs_visited,
        result.stats.files_seen,
        result.total_size(),
        result.stats.duration
    );
    let _ = tx.send(ScanMessage::Completed(Box::new(result)));
}

/// Owns at most one scan at a time.
///
/// Starting a new scan cancels the active one and waits for its worker to
/// return (at most one directory enumeration) before spawning the next.
#[derive(Debug)]
pub struct ScanController {
    config: Arc<AnalyzerConfig>,
    active: Option<ScanHandle>,
}

impl ScanController {
    pub fn new(config: Arc<AnalyzerConfig>) -> Self {
        Self {
            config,
            active: None,
        }
    }

    /// Start scanning `root`, replacing any scan in progress.
    pub fn start(
        &mut self,
        root: PathBuf,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Result<&ScanHandle, ScanError> {
        self.stop();
        let handle = start_scan(root, self.config.clone(), sink)?;
        Ok(self.active.insert(handle))
    }

    /// Signal cancellation to the active scan without waiting.
    pub fn cancel(&self) {
        if let Some(handle) = &self.active {
            handle.cancel();
        }
    }

    /// Cancel the active scan (if any) and wait for its worker to return.
    /// The controller is idle afterwards.
    pub fn stop(&mut self) {
        if let Some(handle) = self.active.take() {
            handle.cancel();
            handle.join();
        }
    }

    /// `true` while a worker is still running.
    pub fn is_active(&self) -> bool {
        self.active.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// The current scan, for draining progress messages.
    pub fn handle(&self) -> Option<&ScanHandle> {
        self.active.as_ref()
    }

    /// Block until the current scan ends and return its outcome.
    /// Returns `None` when no scan was started.
    pub fn finish(&mut self) -> Option<ScanOutcome> {
        let handle = self.active.take()?;
        let outcome = handle.wait_for_outcome();
        handle.join();
        Some(outcome)
    }
}

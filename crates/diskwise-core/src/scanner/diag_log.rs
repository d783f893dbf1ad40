/// Best-effort diagnostic log of scan events.
///
/// The scanner reports skip/visit/error events to an injected
/// [`DiagnosticSink`]. Sinks must never influence the scan: every write
/// failure is swallowed, and the engine never reads the log back.
use chrono::Local;
use parking_lot::Mutex;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Something that happened during traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    Started { root: PathBuf },
    Visited { path: PathBuf, files: usize, subdirs: usize },
    Skipped { path: PathBuf },
    DirUnreadable { path: PathBuf, message: String },
    EntryUnreadable { path: PathBuf, message: String },
    Finished { dirs_visited: u64 },
    Cancelled { dirs_visited: u64 },
}

impl ScanEvent {
    /// One plain-text line (without timestamp or newline).
    pub fn to_line(&self) -> String {
        match self {
            Self::Started { root } => format!("[START] {}", root.display()),
            Self::Visited {
                path,
                files,
                subdirs,
            } => format!("[VISIT] {} | {files} files, {subdirs} subdirs", path.display()),
            Self::Skipped { path } => format!("[SKIP] {}", path.display()),
            Self::DirUnreadable { path, message } => {
                format!("[ERROR] failed to open dir {}: {message}", path.display())
            }
            Self::EntryUnreadable { path, message } => {
                format!("[ERROR] dropped entry {}: {message}", path.display())
            }
            Self::Finished { dirs_visited } => format!("[DONE] {dirs_visited} directories"),
            Self::Cancelled { dirs_visited } => {
                format!("[CANCELLED] after {dirs_visited} directories")
            }
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished { .. } | Self::Cancelled { .. })
    }
}

/// Receiver of scan events. Implementations must not panic and must not
/// block for long; they run on the scanner thread.
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, event: &ScanEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn record(&self, _event: &ScanEvent) {}
}

/// Append-only plain-text log file.
pub struct FileDiagnosticLog {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl FileDiagnosticLog {
    /// Create (truncating) the log file and write its header line.
    pub fn create(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut writer = BufWriter::new(File::create(&path)?);
        writeln!(writer, "Scan started {}", Local::now().to_rfc3339())?;
        Ok(Self {
            path,
            writer: Mutex::new(writer),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DiagnosticSink for FileDiagnosticLog {
    fn record(&self, event: &ScanEvent) {
        let mut writer = self.writer.lock();
        let _ = writeln!(writer, "{} {}", Local::now().to_rfc3339(), event.to_line());
        if event.is_terminal() {
            let _ = writer.flush();
        }
    }
}

impl Drop for FileDiagnosticLog {
    fn drop(&mut self) {
        let _ = self.writer.get_mut().flush();
    }
}

impl std::fmt::Debug for FileDiagnosticLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileDiagnosticLog")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Iterative depth-first directory walk producing the visitation log.
///
/// The walk keeps an explicit LIFO stack instead of recursing, so arbitrarily
/// deep trees cannot overflow the thread stack. Each directory's
/// [`VisitRecord`] is appended to the log *before* any of its children are
/// popped. Consequently every directory appears in the log ahead of all of
/// its descendants, which is what lets [`super::aggregate`] finish sizes in a
/// single reverse pass.
///
/// # Partial failures
///
/// - A directory that cannot be enumerated is recorded with empty lists and
///   the walk continues.
/// - An entry that cannot be stat-ed is dropped; its siblings are unaffected.
/// - Symbolic links (and other non-regular entries) are never followed.
use super::diag_log::{DiagnosticSink, ScanEvent};
use crate::config::ScanConfig;
use crate::model::{DirectoryRef, FileEntry, ScanStats, VisitRecord};
use compact_str::CompactString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};

/// Append-only log of visited directories, in visitation order.
#[derive(Debug, Default)]
pub struct VisitLog {
    pub records: Vec<VisitRecord>,
    pub stats: ScanStats,
}

/// Walk `root` and return its visitation log, or `None` if `cancel` was
/// raised before the walk finished.
///
/// `cancel` is polled once per popped directory, so a cancelled walk returns
/// within one directory enumeration. `on_progress` receives the running
/// visited-directory count every `config.progress_every()` directories.
pub fn traverse(
    root: &Path,
    config: &ScanConfig,
    cancel: &AtomicBool,
    sink: &dyn DiagnosticSink,
    mut on_progress: impl FnMut(u64),
) -> Option<VisitLog> {
    let every = config.progress_every();
    let mut log = VisitLog::default();
    let mut stack: Vec<PathBuf> = vec![root.to_path_buf()];

    sink.record(&ScanEvent::Started {
        root: root.to_path_buf(),
    });

    while let Some(dir) = stack.pop() {
        if cancel.load(Ordering::Relaxed) {
            debug!(
                "Traversal cancelled after {} directories",
                log.stats.dirs_visited
            );
            sink.record(&ScanEvent::Cancelled {
                dirs_visited: log.stats.dirs_visited,
            });
            return None;
        }

        log.stats.dirs_visited += 1;
        if log.stats.dirs_visited % every == 0 {
            on_progress(log.stats.dirs_visited);
        }

        let record = visit_directory(dir, config, sink, &mut log.stats);
        // Children are pushed now but popped only after this record is
        // already in the log.
        stack.extend(record.subdirs.iter().map(|d| d.path.clone()));
        log.records.push(record);
    }

    sink.record(&ScanEvent::Finished {
        dirs_visited: log.stats.dirs_visited,
    });
    Some(log)
}

/// Enumerate the immediate entries of `dir`.
fn visit_directory(
    dir: PathBuf,
    config: &ScanConfig,
    sink: &dyn DiagnosticSink,
    stats: &mut ScanStats,
) -> VisitRecord {
    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!("Cannot open {}: {err}", dir.display());
            stats.unreadable_dirs += 1;
            sink.record(&ScanEvent::DirUnreadable {
                path: dir.clone(),
                message: err.to_string(),
            });
            return VisitRecord::unreadable(dir);
        }
    };

    let mut files = Vec::new();
    let mut subdirs = Vec::new();

    for entry_result in entries {
        let entry = match entry_result {
            Ok(e) => e,
            Err(err) => {
                drop_entry(&dir, &err, sink, stats);
                continue;
            }
        };

        // `DirEntry::file_type` does not follow symlinks.
        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(err) => {
                drop_entry(&entry.path(), &err, sink, stats);
                continue;
            }
        };

        let name = CompactString::new(entry.file_name().to_string_lossy());
        let path = entry.path();

        if file_type.is_dir() {
            if config.accepts_dir(&name) {
                subdirs.push(DirectoryRef { name, path });
            } else {
                debug!("Skipping {}", path.display());
                stats.skipped_dirs += 1;
                sink.record(&ScanEvent::Skipped { path });
            }
        } else if file_type.is_file() {
            match entry.metadata() {
                Ok(meta) => {
                    stats.files_seen += 1;
                    files.push(FileEntry {
                        name,
                        path,
                        size: meta.len(),
                    });
                }
                Err(err) => drop_entry(&path, &err, sink, stats),
            }
        }
    }

    trace!(
        "Visited {} ({} files, {} subdirs)",
        dir.display(),
        files.len(),
        subdirs.len()
    );
    sink.record(&ScanEvent::Visited {
        path: dir.clone(),
        files: files.len(),
        subdirs: subdirs.len(),
    });

    VisitRecord {
        path: dir,
        files,
        subdirs,
    }
}

fn drop_entry(
    path: &Path,
    err: &std::io::Error,
    sink: &dyn DiagnosticSink,
    stats: &mut ScanStats,
) {
    trace!("Dropping entry {}: {err}", path.display());
    stats.dropped_entries += 1;
    sink.record(&ScanEvent::EntryUnreadable {
        path: path.to_path_buf(),
        message: err.to_string(),
    });
}

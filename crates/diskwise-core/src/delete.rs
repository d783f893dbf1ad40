/// Guarded deletion against the live filesystem.
///
/// Deletion never touches a [`crate::model::ScanResult`]. On success the
/// caller invalidates the affected subtree itself (see
/// [`crate::model::ScanResult::remove_subtree`]). A scan running at the
/// same time may publish a result that is stale; re-scanning resolves it.
use crate::classify::{classify, Category, ClassificationRules};
use crate::error::DeleteError;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};

/// What a successful [`delete`] call removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    pub entries_removed: u64,
    /// Entries a forced removal could not delete. Always zero otherwise.
    pub entries_failed: u64,
}

impl DeleteOutcome {
    fn single() -> Self {
        Self {
            entries_removed: 1,
            entries_failed: 0,
        }
    }

    /// `true` if a forced removal left something behind.
    pub fn is_partial(&self) -> bool {
        self.entries_failed > 0
    }
}

/// Delete `path`.
///
/// Protected paths are refused before any filesystem call. A non-forced
/// directory delete only removes an empty directory. A forced directory
/// delete removes everything it can, ignoring per-entry failures.
pub fn delete(
    path: &Path,
    is_dir: bool,
    force: bool,
    rules: &ClassificationRules,
) -> Result<DeleteOutcome, DeleteError> {
    let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

    let label = classify(&path, is_dir, rules);
    if label.category == Category::Protected {
        warn!("Refusing to delete protected path {}", path.display());
        return Err(DeleteError::Protected {
            path,
            category: label.category,
        });
    }

    let outcome = match (is_dir, force) {
        (true, true) => remove_tree(&path),
        (true, false) => fs::remove_dir(&path)
            .map(|()| DeleteOutcome::single())
            .map_err(|err| DeleteError::from_io(path.clone(), err))?,
        (false, _) => fs::remove_file(&path)
            .map(|()| DeleteOutcome::single())
            .map_err(|err| DeleteError::from_io(path.clone(), err))?,
    };

    if outcome.is_partial() {
        warn!(
            "Forced delete of {} left {} entries behind",
            path.display(),
            outcome.entries_failed
        );
    } else {
        info!(
            "Deleted {} ({} entries)",
            path.display(),
            outcome.entries_removed
        );
    }
    Ok(outcome)
}

/// Best-effort recursive removal with an explicit stack.
///
/// Each directory is pushed twice: once to enumerate it, once (underneath
/// its children) to remove it after they are gone. Symbolic links are
/// removed as entries and never traversed.
fn remove_tree(root: &Path) -> DeleteOutcome {
    let mut outcome = DeleteOutcome::default();
    let mut stack: Vec<(PathBuf, bool)> = vec![(root.to_path_buf(), false)];

    while let Some((path, emptied)) = stack.pop() {
        if emptied {
            record(&mut outcome, &path, fs::remove_dir(&path));
            continue;
        }

        let file_type = match fs::symlink_metadata(&path) {
            Ok(meta) => meta.file_type(),
            // Already gone: nothing to do, nothing failed.
            Err(err) if err.kind() == ErrorKind::NotFound => continue,
            Err(err) => {
                debug!("Cannot stat {}: {err}", path.display());
                outcome.entries_failed += 1;
                continue;
            }
        };

        if file_type.is_dir() {
            stack.push((path.clone(), true));
            match fs::read_dir(&path) {
                Ok(entries) => {
                    for entry in entries {
                        match entry {
                            Ok(entry) => stack.push((entry.path(), false)),
                            Err(err) => {
                                debug!("Cannot read entry in {}: {err}", path.display());
                                outcome.entries_failed += 1;
                            }
                        }
                    }
                }
                Err(err) => debug!("Cannot open {}: {err}", path.display()),
            }
        } else if file_type.is_symlink() {
            // Directory links on Windows need `remove_dir`.
            let removed = fs::remove_file(&path).or_else(|_| fs::remove_dir(&path));
            record(&mut outcome, &path, removed);
        } else {
            record(&mut outcome, &path, fs::remove_file(&path));
        }
    }

    outcome
}

fn record(outcome: &mut DeleteOutcome, path: &Path, result: std::io::Result<()>) {
    match result {
        Ok(()) => outcome.entries_removed += 1,
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => {
            trace!("Failed to remove {}: {err}", path.display());
            outcome.entries_failed += 1;
        }
    }
}

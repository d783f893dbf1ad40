/// The result store published once per completed scan, and the lazy
/// query surface consumers use to expand it one directory at a time.
///
/// The store is flat: two maps keyed by absolute path. Every visited
/// directory has an aggregate size and a fully materialised, sorted child
/// listing, whether or not anyone ever asks for it.
use super::entry::ChildEntry;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Counters collected while building a result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub dirs_visited: u64,
    pub files_seen: u64,
    /// Directories whose enumeration failed (recorded with no children).
    pub unreadable_dirs: u64,
    /// Individual entries dropped because they could not be stat-ed.
    pub dropped_entries: u64,
    /// Subdirectories excluded by the skip-set or reserved prefix.
    pub skipped_dirs: u64,
    pub duration: Duration,
}

/// Aggregate sizes and sorted child listings for one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    pub root: PathBuf,
    pub sizes_by_path: HashMap<PathBuf, u64>,
    pub children_by_path: HashMap<PathBuf, Vec<ChildEntry>>,
    pub stats: ScanStats,
}

/// Listing order: size descending, then directories before files, then name.
///
/// The tie-breakers make listings independent of enumeration order, so an
/// unchanged tree always produces identical listings.
pub fn listing_order(a: &ChildEntry, b: &ChildEntry) -> Ordering {
    b.size
        .cmp(&a.size)
        .then(b.is_dir.cmp(&a.is_dir))
        .then_with(|| a.name.cmp(&b.name))
}

impl ScanResult {
    /// Empty result for `root`, filled in by the aggregator.
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            ..Self::default()
        }
    }

    /// Sorted children of `path`; empty when the path was never visited.
    pub fn children_of(&self, path: &Path) -> &[ChildEntry] {
        self.children_by_path
            .get(path)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Children of `path` at or above `min_size`.
    ///
    /// Filtered entries still count towards every aggregate; this only
    /// shortens the listing.
    pub fn visible_children_of<'a>(
        &'a self,
        path: &Path,
        min_size: u64,
    ) -> impl Iterator<Item = &'a ChildEntry> + 'a {
        self.children_of(path)
            .iter()
            .filter(move |c| c.size >= min_size)
    }

    /// Aggregate size of a visited directory.
    pub fn size_of(&self, path: &Path) -> Option<u64> {
        self.sizes_by_path.get(path).copied()
    }

    /// Aggregate size of the scan root.
    pub fn total_size(&self) -> u64 {
        self.size_of(&self.root).unwrap_or(0)
    }

    /// Number of directories with an aggregate entry.
    pub fn directory_count(&self) -> usize {
        self.sizes_by_path.len()
    }

    /// `true` if `path` was visited and has at least one child row.
    pub fn has_children(&self, path: &Path) -> bool {
        !self.children_of(path).is_empty()
    }

    /// Drop `path` and everything below it after it was deleted on disk.
    ///
    /// The entry disappears from its parent's listing and its size is
    /// subtracted from every ancestor; ancestor listings are re-sorted so
    /// the ordering invariant survives. Returns the bytes removed, or `None`
    /// if the result knows nothing about `path`.
    pub fn remove_subtree(&mut self, path: &Path) -> Option<u64> {
        let parent = path.parent().map(Path::to_path_buf);

        let listed_size = parent.as_deref().and_then(|p| {
            let siblings = self.children_by_path.get_mut(p)?;
            let pos = siblings.iter().position(|c| c.path == path)?;
            Some(siblings.remove(pos).size)
        });
        let removed = listed_size.or_else(|| self.size_of(path))?;

        self.sizes_by_path.retain(|k, _| !k.starts_with(path));
        self.children_by_path.retain(|k, _| !k.starts_with(path));

        let mut current = parent;
        while let Some(dir) = current {
            let Some(size) = self.sizes_by_path.get_mut(&dir) else {
                break;
            };
            *size = size.saturating_sub(removed);
            let new_size = *size;

            let grandparent = dir.parent().map(Path::to_path_buf);
            if let Some(siblings) = grandparent
                .as_deref()
                .and_then(|gp| self.children_by_path.get_mut(gp))
            {
                if let Some(row) = siblings.iter_mut().find(|c| c.path == dir) {
                    row.size = new_size;
                }
                siblings.sort_by(listing_order);
            }
            current = grandparent;
        }

        Some(removed)
    }
}

/// Bottom-up size aggregation over a finished visitation log.
///
/// Because the traversal appends a directory's record before any of its
/// descendants, iterating the log in *reverse* guarantees every
/// subdirectory's aggregate is final before its parent is processed. This
/// gives O(n) aggregation with no recursion and no tree of owned nodes: the
/// output is two flat maps keyed by path.
use super::traversal::VisitLog;
use crate::model::{listing_order, ChildEntry, ScanResult};
use std::path::PathBuf;

/// Turn a completed visitation log into a [`ScanResult`].
pub fn aggregate(root: PathBuf, log: VisitLog) -> ScanResult {
    let mut result = ScanResult::new(root);
    result.sizes_by_path.reserve(log.records.len());
    result.children_by_path.reserve(log.records.len());

    for record in log.records.into_iter().rev() {
        let mut total = record.file_bytes();
        let mut rows: Vec<ChildEntry> =
            Vec::with_capacity(record.files.len() + record.subdirs.len());

        for dir in record.subdirs {
            let size = result.sizes_by_path.get(&dir.path).copied();
            debug_assert!(
                size.is_some(),
                "subdirectory {} aggregated after its parent",
                dir.path.display()
            );
            let size = size.unwrap_or_default();
            total += size;
            rows.push(ChildEntry::dir(dir, size));
        }
        rows.extend(record.files.into_iter().map(ChildEntry::from));
        rows.sort_by(listing_order);

        result.sizes_by_path.insert(record.path.clone(), total);
        result.children_by_path.insert(record.path, rows);
    }

    result.stats = log.stats;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DirectoryRef, FileEntry, VisitRecord};
    use compact_str::CompactString;
    use std::path::Path;

    fn file(dir: &Path, name: &str, size: u64) -> FileEntry {
        FileEntry {
            name: CompactString::new(name),
            path: dir.join(name),
            size,
        }
    }

    fn subdir(dir: &Path, name: &str) -> DirectoryRef {
        DirectoryRef {
            name: CompactString::new(name),
            path: dir.join(name),
        }
    }

    /// root: 10 B + 20 B files, sub/ holding one 5 B file.
    fn two_level_log(root: &Path) -> VisitLog {
        let sub = root.join("sub");
        VisitLog {
            records: vec![
                VisitRecord {
                    path: root.to_path_buf(),
                    files: vec![file(root, "ten.bin", 10), file(root, "twenty.bin", 20)],
                    subdirs: vec![subdir(root, "sub")],
                },
                VisitRecord {
                    path: sub.clone(),
                    files: vec![file(&sub, "five.bin", 5)],
                    subdirs: vec![],
                },
            ],
            ..VisitLog::default()
        }
    }

    #[test]
    fn sums_files_and_finalised_subdirectories() {
        let root = PathBuf::from("/r");
        let result = aggregate(root.clone(), two_level_log(&root));

        assert_eq!(result.size_of(&root), Some(35));
        assert_eq!(result.size_of(&root.join("sub")), Some(5));

        let listing: Vec<_> = result
            .children_of(&root)
            .iter()
            .map(|c| (c.name.as_str(), c.size, c.is_dir))
            .collect();
        assert_eq!(
            listing,
            vec![("twenty.bin", 20, false), ("ten.bin", 10, false), ("sub", 5, true)]
        );
    }

    #[test]
    fn every_visited_directory_gets_a_listing() {
        let root = PathBuf::from("/r");
        let mut log = two_level_log(&root);
        log.records[1].files.clear();
        let result = aggregate(root.clone(), log);

        // Empty directories still have an (empty) materialised listing.
        assert!(result.children_by_path.contains_key(&root.join("sub")));
        assert_eq!(result.size_of(&root.join("sub")), Some(0));
        assert_eq!(result.total_size(), 30);
    }

    #[test]
    fn unreadable_directory_contributes_zero() {
        let root = PathBuf::from("/r");
        let locked = root.join("locked");
        let log = VisitLog {
            records: vec![
                VisitRecord {
                    path: root.clone(),
                    files: vec![file(&root, "a", 3)],
                    subdirs: vec![subdir(&root, "locked")],
                },
                VisitRecord::unreadable(locked.clone()),
            ],
            ..VisitLog::default()
        };
        let result = aggregate(root.clone(), log);
        assert_eq!(result.size_of(&locked), Some(0));
        assert_eq!(result.total_size(), 3);
        assert_eq!(result.children_of(&root).len(), 2);
    }

    #[test]
    fn stats_are_carried_over() {
        let root = PathBuf::from("/r");
        let mut log = two_level_log(&root);
        log.stats.dirs_visited = 2;
        log.stats.skipped_dirs = 4;
        let result = aggregate(root, log);
        assert_eq!(result.stats.dirs_visited, 2);
        assert_eq!(result.stats.skipped_dirs, 4);
    }
}

/// Records produced by the traversal and the rows served to consumers.
///
/// Paths are the only identity: every record carries its absolute path and
/// relationships between directories are resolved by path lookups, never by
/// pointers or indices into a tree.
use compact_str::CompactString;
use serde::Serialize;
use std::path::PathBuf;

/// A regular file seen during traversal. `size` is the byte length at scan
/// time and is never updated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: CompactString,
    pub path: PathBuf,
    pub size: u64,
}

/// An accepted subdirectory. Its size is derived during aggregation and
/// lives in the result store, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRef {
    pub name: CompactString,
    pub path: PathBuf,
}

/// One visited directory: its immediate files and accepted subdirectories.
///
/// A directory that could not be enumerated is still recorded, with both
/// lists empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitRecord {
    pub path: PathBuf,
    pub files: Vec<FileEntry>,
    pub subdirs: Vec<DirectoryRef>,
}

impl VisitRecord {
    /// Record for a directory whose enumeration failed.
    pub fn unreadable(path: PathBuf) -> Self {
        Self {
            path,
            files: Vec::new(),
            subdirs: Vec::new(),
        }
    }

    /// Sum of the immediate files' sizes.
    pub fn file_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }
}

/// A row of a directory listing in the result store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChildEntry {
    pub name: CompactString,
    pub path: PathBuf,
    /// File size, or aggregate size for directories.
    pub size: u64,
    pub is_dir: bool,
}

impl From<FileEntry> for ChildEntry {
    fn from(entry: FileEntry) -> Self {
        Self {
            name: entry.name,
            path: entry.path,
            size: entry.size,
            is_dir: false,
        }
    }
}

impl ChildEntry {
    /// Row for a subdirectory whose aggregate size is already known.
    pub fn dir(dir: DirectoryRef, size: u64) -> Self {
        Self {
            name: dir.name,
            path: dir.path,
            size,
            is_dir: true,
        }
    }
}

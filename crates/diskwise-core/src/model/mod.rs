/// Data model for DiskWise scans.
///
/// Traversal emits [`VisitRecord`]s into an append-only log; aggregation
/// turns that log into a flat, path-keyed [`ScanResult`].
pub mod entry;
pub mod scan_result;
pub mod size;

pub use entry::{ChildEntry, DirectoryRef, FileEntry, VisitRecord};
pub use scan_result::{listing_order, ScanResult, ScanStats};
pub use size::{format_count, format_size, parse_size, SizeTier};

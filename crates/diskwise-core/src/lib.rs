/// DiskWise Core: traversal, aggregation, classification and deletion.
///
/// This crate contains all business logic with zero UI dependencies.
/// Frontends (the `diskwise` binary, or any GUI) start scans through the
/// [`scanner`] module, read the published [`model::ScanResult`], and call
/// [`classify`] / [`delete`] directly.
///
/// # Modules
///
/// - [`config`]: Immutable analyser configuration (skip-set, rule tables, display thresholds).
/// - [`error`]: Error types surfaced to callers.
/// - [`model`]: Visit records, the flat path-keyed result store, size formatting.
/// - [`scanner`]: Background traversal + aggregation with progress and cancellation.
/// - [`classify`]: Safety/category labelling of arbitrary paths.
/// - [`delete`]: Guarded deletion against the live filesystem.
/// - [`platform`]: Drive enumeration.
pub mod classify;
pub mod config;
pub mod delete;
pub mod error;
pub mod model;
pub mod platform;
pub mod scanner;

pub use config::AnalyzerConfig;
pub use error::{ConfigError, DeleteError, ScanError};

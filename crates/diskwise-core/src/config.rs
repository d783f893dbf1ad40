/// Analyser configuration.
///
/// A single [`AnalyzerConfig`] is built once at startup (defaults, or a TOML
/// file) and shared behind an `Arc` with the scanner and the classifier.
/// Nothing in the crate reads configuration from global state.
use crate::classify::ClassificationRules;
use crate::error::ConfigError;
use crate::model::size::SizeTier;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub scan: ScanConfig,
    pub rules: ClassificationRules,
    pub display: DisplayConfig,
}

/// Traversal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Volume-metadata directory names excluded from traversal and
    /// aggregation. Matched exactly (case-sensitive) against the entry name.
    pub skip_dirs: Vec<String>,
    /// Names starting with this prefix are platform system containers and
    /// are excluded too. Empty disables the rule.
    pub reserved_prefix: String,
    /// Emit one progress message per this many visited directories.
    pub progress_interval: u64,
}

/// Presentation thresholds. These never influence aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Entries smaller than this are omitted from listings (bytes).
    pub min_size: u64,
    /// Directories above this are flagged as large (bytes).
    pub large_threshold: u64,
    /// Directories above this are flagged as huge (bytes).
    pub huge_threshold: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            skip_dirs: [
                "$Recycle.Bin",
                "System Volume Information",
                "Recovery",
                "$WinREAgent",
                "Config.Msi",
                "$SysReset",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            reserved_prefix: "$".to_string(),
            progress_interval: 1_000,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            min_size: 100 * 1024,
            large_threshold: 100 * 1024 * 1024,
            huge_threshold: 1024 * 1024 * 1024,
        }
    }
}

impl ScanConfig {
    /// Whether a subdirectory with this name is traversed and counted.
    ///
    /// Hidden folders and user-profile directories are always accepted;
    /// only the skip-set and the reserved prefix exclude.
    pub fn accepts_dir(&self, name: &str) -> bool {
        if self.skip_dirs.iter().any(|s| s == name) {
            return false;
        }
        self.reserved_prefix.is_empty() || !name.starts_with(self.reserved_prefix.as_str())
    }

    /// Progress interval clamped to at least one directory.
    pub fn progress_every(&self) -> u64 {
        self.progress_interval.max(1)
    }
}

impl DisplayConfig {
    /// Size badge for a directory of `size` bytes.
    pub fn tier(&self, size: u64) -> SizeTier {
        if size > self.huge_threshold {
            SizeTier::Huge
        } else if size > self.large_threshold {
            SizeTier::Large
        } else {
            SizeTier::Normal
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from `path`, or return defaults when `None`.
    ///
    /// Missing keys fall back to their defaults, so a file only needs to
    /// mention what it overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Reject settings that cannot be meaningfully applied.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.display.large_threshold > self.display.huge_threshold {
            return Err(ConfigError::Invalid(format!(
                "display.large_threshold ({}) must not exceed display.huge_threshold ({})",
                self.display.large_threshold, self.display.huge_threshold
            )));
        }
        if self.scan.skip_dirs.iter().any(|s| s.is_empty()) {
            return Err(ConfigError::Invalid(
                "scan.skip_dirs must not contain empty names".into(),
            ));
        }
        Ok(())
    }
}

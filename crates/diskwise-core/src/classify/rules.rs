/// Rule tables for the classifier.
///
/// Every list is matched case-insensitively as a substring of the path with
/// `\` turned into `/`, so `users/default` also matches `Users\Default User`
/// and `windows` matches `Windows.old`. Junk patterns are matched against the
/// final name only.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationRules {
    /// Path keywords that mark OS, program, boot/recovery and vendor
    /// driver locations. A match forbids deletion.
    pub protected_keywords: Vec<String>,
    /// Substrings of the final name that mark temporary/cache/log junk.
    pub junk_patterns: Vec<String>,
    /// Components that start a per-user area (`C:\Users`, `/home`).
    pub user_roots: Vec<String>,
    /// Components below a user root that hold application state.
    pub app_data_dirs: Vec<String>,
    /// Components naming personal-content folders.
    pub personal_dirs: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ClassificationRules {
    fn default() -> Self {
        Self {
            protected_keywords: strings(&[
                "windows",
                "program files",
                "program files (x86)",
                "programdata",
                "users/default",
                "users/public",
                "users/all users",
                "boot",
                "recovery",
                "system volume information",
                "perflogs",
                "intel",
                "amd",
                "nvidia",
            ]),
            junk_patterns: strings(&[
                "temp",
                "tmp",
                "cache",
                "log",
                ".log",
                ".tmp",
                ".bak",
                "thumbs.db",
                "desktop.ini",
                ".ds_store",
            ]),
            user_roots: strings(&["users", "home"]),
            app_data_dirs: strings(&["appdata", ".config", ".local"]),
            personal_dirs: strings(&[
                "downloads",
                "desktop",
                "documents",
                "music",
                "pictures",
                "videos",
            ]),
        }
    }
}

/// Lowercase `text` and turn `\` into `/`, so tables written with either
/// separator match paths from either platform.
pub(crate) fn normalize(text: &str) -> String {
    text.to_lowercase().replace('\\', "/")
}

/// Final non-empty segment of a normalised path.
pub(crate) fn final_name(path: &str) -> &str {
    path.rsplit('/').find(|s| !s.is_empty()).unwrap_or_default()
}

impl ClassificationRules {
    /// The first protected keyword contained anywhere in `path`
    /// (already normalised), if any.
    pub(crate) fn protected_match(&self, path: &str) -> Option<&str> {
        self.protected_keywords
            .iter()
            .find(|kw| contains(path, kw))
            .map(String::as_str)
    }

    pub(crate) fn is_junk_name(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.junk_patterns.iter().any(|p| contains(&name, p))
    }

    pub(crate) fn is_app_data(&self, path: &str) -> bool {
        self.user_roots.iter().any(|r| contains(path, r))
            && self.app_data_dirs.iter().any(|d| contains(path, d))
    }

    pub(crate) fn is_personal(&self, path: &str) -> bool {
        self.personal_dirs.iter().any(|d| contains(path, d))
    }
}

/// Substring test with the needle normalised like the haystack. Empty
/// entries never match.
fn contains(haystack: &str, needle: &str) -> bool {
    let needle = normalize(needle);
    !needle.is_empty() && haystack.contains(needle.as_str())
}

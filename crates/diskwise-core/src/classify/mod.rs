/// Safety/category labelling of paths for display and for the deletion guard.
///
/// Rules are evaluated in a fixed order and the first match wins; rules are
/// never combined. Classification is pure: it reads nothing from the
/// filesystem or from scan state, so any path can be labelled, including
/// paths outside the last scan.
///
/// 1. Protected system keyword in the path.
/// 2. Junk/cache pattern in the final name.
/// 3. Application data under a user profile.
/// 4. Personal-content folder.
/// 5. File extension (files only).
/// 6. General.
pub mod extension;
pub mod rules;

pub use extension::category_for_extension;
pub use rules::ClassificationRules;

use serde::Serialize;
use std::path::Path;

/// What a path is, as far as cleanup decisions go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Protected,
    Junk,
    AppData,
    Personal,
    Executable,
    TextConfig,
    Image,
    Media,
    Archive,
    SourceCode,
    General,
}

/// How dangerous deleting the path is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Unknown,
    Protected,
}

/// Result of [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub category: Category,
    pub risk: RiskLevel,
    pub explanation: &'static str,
}

impl Category {
    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Protected => "System protected",
            Self::Junk => "Junk / temporary",
            Self::AppData => "Application data",
            Self::Personal => "Personal files",
            Self::Executable => "Application / system file",
            Self::TextConfig => "Text / config",
            Self::Image => "Image",
            Self::Media => "Audio / video",
            Self::Archive => "Archive",
            Self::SourceCode => "Source code",
            Self::General => "General",
        }
    }

    pub fn risk(self) -> RiskLevel {
        match self {
            Self::Protected => RiskLevel::Protected,
            Self::Junk => RiskLevel::Low,
            Self::AppData | Self::Executable | Self::TextConfig | Self::Archive => {
                RiskLevel::Moderate
            }
            Self::Personal | Self::Image | Self::Media | Self::SourceCode => RiskLevel::High,
            Self::General => RiskLevel::Unknown,
        }
    }

    pub fn explanation(self) -> &'static str {
        match self {
            Self::Protected => "System file or folder; do not delete",
            Self::Junk => "Temporary or cache data; usually safe to delete",
            Self::AppData => "Application data; deleting it may reset application settings",
            Self::Personal => {
                "Your personal files; the system will keep working but the content will be gone"
            }
            Self::Executable => "Application or system binary",
            Self::TextConfig => "Text or configuration file",
            Self::Image => "Image",
            Self::Media => "Audio or video file",
            Self::Archive => "Compressed archive",
            Self::SourceCode => "Source code",
            Self::General => "General file; verify its purpose before deleting",
        }
    }
}

impl RiskLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Unknown => "unknown",
            Self::Protected => "protected",
        }
    }
}

impl From<Category> for Classification {
    fn from(category: Category) -> Self {
        Self {
            category,
            risk: category.risk(),
            explanation: category.explanation(),
        }
    }
}

/// Label `path`. `is_dir` disables the extension rule, which only makes
/// sense for files.
pub fn classify(path: &Path, is_dir: bool, rules: &ClassificationRules) -> Classification {
    let text = rules::normalize(&path.to_string_lossy());

    if rules.protected_match(&text).is_some() {
        return Category::Protected.into();
    }

    let name = rules::final_name(&text);
    if rules.is_junk_name(name) {
        return Category::Junk.into();
    }
    if rules.is_app_data(&text) {
        return Category::AppData.into();
    }
    if rules.is_personal(&text) {
        return Category::Personal.into();
    }

    if !is_dir {
        if let Some(category) = extension::extension_of(name).and_then(category_for_extension) {
            return category.into();
        }
    }

    Category::General.into()
}

/// `true` if rule 1 alone matches; the deletion guard uses this.
pub fn is_protected(path: &Path, rules: &ClassificationRules) -> bool {
    rules
        .protected_match(&rules::normalize(&path.to_string_lossy()))
        .is_some()
}

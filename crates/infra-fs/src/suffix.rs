//! Recognized document file suffixes.

use std::path::Path;

/// File suffix of a resource document.
///
/// `.yml` is primary: new resources are written with it and lookups try
/// it first. `.yaml` is accepted on scan and as a lookup fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentSuffix {
    /// `.yml`
    Yml,
    /// `.yaml`
    Yaml,
}

impl DocumentSuffix {
    /// The suffix new documents are written with.
    pub const PRIMARY: Self = Self::Yml;

    /// All suffixes in lookup order.
    pub const ALL: [Self; 2] = [Self::Yml, Self::Yaml];

    /// Get the string representation, including the leading dot.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yml => ".yml",
            Self::Yaml => ".yaml",
        }
    }

    /// Detect the suffix of a file name.
    pub fn of(file_name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|suffix| file_name.ends_with(suffix.as_str()))
    }

    /// Whether a path names a resource document.
    pub fn is_document(path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .and_then(Self::of)
            .is_some()
    }
}

impl AsRef<str> for DocumentSuffix {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for DocumentSuffix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

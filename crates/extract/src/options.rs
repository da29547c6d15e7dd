//! Options shared by every extractor.

use std::path::{Path, PathBuf};

/// How archive members are placed in the destination directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Prefix removed from every member path before it is joined to the destination.
    pub strip_path: Option<PathBuf>,
    /// Path (relative to the destination unless absolute) to move after extraction.
    pub rename_from: Option<PathBuf>,
    /// Path (relative to the destination unless absolute) to move `rename_from` to.
    pub rename_to: Option<PathBuf>,
}

impl ExtractOptions {
    /// Options that extract every member as stored.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Strip `prefix` from every member path.
    #[must_use]
    pub fn with_strip_path(mut self, prefix: impl Into<PathBuf>) -> Self {
        self.strip_path = Some(prefix.into());
        self
    }

    /// Move `from` to `to` once extraction has finished.
    #[must_use]
    pub fn with_rename(mut self, from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> Self {
        self.rename_from = Some(from.into());
        self.rename_to = Some(to.into());
        self
    }

    /// Set only the rename target. Archive extractors ignore a lone target;
    /// the uncompressed extractor uses it as the output file name.
    #[must_use]
    pub fn with_rename_to(mut self, to: impl Into<PathBuf>) -> Self {
        self.rename_to = Some(to.into());
        self
    }

    /// The rename to perform, present only when both ends are set.
    #[must_use]
    pub fn rename_pair(&self) -> Option<(&Path, &Path)> {
        match (&self.rename_from, &self.rename_to) {
            (Some(from), Some(to)) => Some((from.as_path(), to.as_path())),
            _ => None,
        }
    }
}

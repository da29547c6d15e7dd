//! Archive types and their file extensions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// A concrete archive format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveType {
    /// A zip archive.
    Zip,
    /// A gzip-compressed tarball with a `.tar.gz` extension.
    TarGz,
    /// A gzip-compressed tarball with a `.tgz` extension.
    Tgz,
    /// A single file that is not an archive at all.
    Uncompressed,
}

impl ArchiveType {
    /// Every supported archive type.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Zip, Self::TarGz, Self::Tgz, Self::Uncompressed]
    }

    /// The file extension, including the leading dot. Empty for [`Self::Uncompressed`].
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Zip => ".zip",
            Self::TarGz => ".tar.gz",
            Self::Tgz => ".tgz",
            Self::Uncompressed => "",
        }
    }

    /// The configuration name of this type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::TarGz => "tar_gz",
            Self::Tgz => "tgz",
            Self::Uncompressed => "uncompressed",
        }
    }
}

impl fmt::Display for ArchiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArchiveType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "zip" => Ok(Self::Zip),
            "tar_gz" => Ok(Self::TarGz),
            "tgz" => Ok(Self::Tgz),
            "uncompressed" => Ok(Self::Uncompressed),
            other => Err(Error::UnknownArchiveType {
                value: other.to_string(),
            }),
        }
    }
}

/// The configured archive type: either one type for every host, or a table
/// keyed by raw OS name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArchiveTypeSpec {
    /// The same type on every platform.
    Single(ArchiveType),
    /// A type per raw OS name (e.g. `darwin`, `linux`, `mswin64`).
    PerOs(BTreeMap<String, ArchiveType>),
}

impl Default for ArchiveTypeSpec {
    fn default() -> Self {
        Self::Single(ArchiveType::Zip)
    }
}

impl From<ArchiveType> for ArchiveTypeSpec {
    fn from(archive_type: ArchiveType) -> Self {
        Self::Single(archive_type)
    }
}

impl ArchiveTypeSpec {
    /// Build a per-OS table from `(os, type)` pairs.
    pub fn per_os<K: Into<String>>(pairs: impl IntoIterator<Item = (K, ArchiveType)>) -> Self {
        Self::PerOs(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Resolve to a concrete type for a raw OS name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnresolvedArchiveType`] when a per-OS table has no
    /// entry for `os`.
    pub fn resolve(&self, os: &str) -> Result<ArchiveType> {
        match self {
            Self::Single(archive_type) => Ok(*archive_type),
            Self::PerOs(table) => table
                .get(os)
                .copied()
                .ok_or_else(|| Error::UnresolvedArchiveType { os: os.to_string() }),
        }
    }
}

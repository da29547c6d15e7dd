//! Archive type to extractor lookup.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use binvendor_core::{ArchiveType, Error, Result};
use tracing::debug;

use crate::{ExtractOptions, Extractor, TarGzExtractor, UncompressedExtractor, ZipExtractor};

/// Registry mapping each [`ArchiveType`] to the extractor that handles it.
///
/// Adding a format means adding an [`ArchiveType`] variant and registering
/// one extractor for it; callers only ever go through the registry.
#[derive(Clone)]
pub struct ExtractorRegistry {
    extractors: HashMap<ArchiveType, Arc<dyn Extractor>>,
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        let tar_gz: Arc<dyn Extractor> = Arc::new(TarGzExtractor);
        Self::empty()
            .with(ArchiveType::Zip, Arc::new(ZipExtractor))
            .with(ArchiveType::TarGz, Arc::clone(&tar_gz))
            .with(ArchiveType::Tgz, tar_gz)
            .with(ArchiveType::Uncompressed, Arc::new(UncompressedExtractor))
    }
}

impl fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<_> = self.extractors.keys().copied().collect();
        types.sort();
        f.debug_struct("ExtractorRegistry")
            .field("types", &types)
            .finish()
    }
}

impl ExtractorRegistry {
    /// A registry with no extractors.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            extractors: HashMap::new(),
        }
    }

    /// Register (or replace) the extractor for an archive type.
    #[must_use]
    pub fn with(mut self, archive_type: ArchiveType, extractor: Arc<dyn Extractor>) -> Self {
        self.register(archive_type, extractor);
        self
    }

    /// Register (or replace) the extractor for an archive type in place.
    pub fn register(&mut self, archive_type: ArchiveType, extractor: Arc<dyn Extractor>) {
        debug!(%archive_type, extractor = extractor.name(), "Registering extractor");
        self.extractors.insert(archive_type, extractor);
    }

    /// Look up the extractor for an archive type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownArchiveType`] when nothing is registered.
    pub fn get(&self, archive_type: ArchiveType) -> Result<Arc<dyn Extractor>> {
        self.extractors
            .get(&archive_type)
            .cloned()
            .ok_or_else(|| Error::UnknownArchiveType {
                value: archive_type.to_string(),
            })
    }

    /// Extract `archive` into `destination` with the extractor for `archive_type`.
    ///
    /// # Errors
    ///
    /// Returns an error if no extractor is registered or extraction fails.
    pub fn extract(
        &self,
        archive_type: ArchiveType,
        archive: &Path,
        destination: &Path,
        options: &ExtractOptions,
    ) -> Result<()> {
        self.get(archive_type)?.extract(archive, destination, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_covers_every_type() {
        let registry = ExtractorRegistry::default();
        for archive_type in ArchiveType::all() {
            assert!(registry.get(*archive_type).is_ok(), "{archive_type} missing");
        }
        assert_eq!(registry.get(ArchiveType::Tgz).unwrap().name(), "tar_gz");
        assert_eq!(registry.get(ArchiveType::Zip).unwrap().name(), "zip");
    }

    #[test]
    fn test_empty_registry_reports_unknown_type() {
        let err = ExtractorRegistry::empty().get(ArchiveType::Zip).err().unwrap();
        assert!(matches!(err, Error::UnknownArchiveType { ref value } if value == "zip"));
    }

    #[test]
    fn test_register_replaces_extractor() {
        let registry =
            ExtractorRegistry::default().with(ArchiveType::Zip, Arc::new(UncompressedExtractor));
        assert_eq!(registry.get(ArchiveType::Zip).unwrap().name(), "uncompressed");
    }

    #[test]
    fn test_debug_lists_types() {
        let debug = format!("{:?}", ExtractorRegistry::default());
        assert!(debug.contains("TarGz"));
        assert!(debug.contains("Uncompressed"));
    }
}

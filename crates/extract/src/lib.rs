//! Archive extraction for binvendor.
//!
//! Every format implements one contract, [`Extractor::extract`]:
//!
//! 1. Create the destination directory.
//! 2. Walk the archive members in order. Each member path has the configured
//!    `strip_path` prefix removed and is joined to the destination; parent
//!    directories are created as needed.
//! 3. A file member whose target already exists is skipped, so re-running an
//!    extraction never clobbers files and writes nothing new.
//! 4. When both `rename_from` and `rename_to` are set, the file is moved
//!    afterwards.
//!
//! The [`UncompressedExtractor`] is the degenerate single-file case: it always
//! copies and marks the result executable.
//!
//! # Example
//!
//! ```ignore
//! use binvendor_extract::{ExtractOptions, ExtractorRegistry};
//! use binvendor_core::ArchiveType;
//!
//! let options = ExtractOptions::new().with_strip_path("tool-1.2.3");
//! ExtractorRegistry::default().extract(ArchiveType::TarGz, &archive, &bin_dir, &options)?;
//! ```

use std::path::Path;

use binvendor_core::Result;

mod fs;
mod options;
mod registry;
mod tar_gz;
mod uncompressed;
mod zip;

pub use options::ExtractOptions;
pub use registry::ExtractorRegistry;
pub use tar_gz::TarGzExtractor;
pub use uncompressed::{EXECUTABLE_MODE, UncompressedExtractor};
pub use zip::ZipExtractor;

/// Unpacks one archive format into a destination directory.
pub trait Extractor: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Extract `archive` into `destination`.
    ///
    /// Safe to re-run: existing files are left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive cannot be read, a member would escape
    /// the destination, or writing to the destination fails. Members written
    /// before the failure are left in place.
    fn extract(&self, archive: &Path, destination: &Path, options: &ExtractOptions) -> Result<()>;
}

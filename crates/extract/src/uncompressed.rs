//! Single-file "extraction" for artifacts that are not archives.

use std::path::Path;

use binvendor_core::{Error, Result};
use tracing::info;

use crate::fs::{ensure_dir, set_mode};
use crate::{ExtractOptions, Extractor};

/// Permission bits given to the copied file.
pub const EXECUTABLE_MODE: u32 = 0o755;

/// Copies a downloaded binary into the destination and marks it executable.
///
/// The target name is `rename_to` when set, otherwise the source file name.
/// Unlike the archive extractors the copy always overwrites an existing
/// target, and `strip_path` is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct UncompressedExtractor;

impl Extractor for UncompressedExtractor {
    fn name(&self) -> &'static str {
        "uncompressed"
    }

    fn extract(&self, archive: &Path, destination: &Path, options: &ExtractOptions) -> Result<()> {
        let target_name = match &options.rename_to {
            Some(name) => name.as_os_str().to_owned(),
            None => archive
                .file_name()
                .ok_or_else(|| Error::archive(archive, "source has no file name"))?
                .to_owned(),
        };
        let target = destination.join(target_name);
        info!(source = ?archive, ?target, "Copying uncompressed artifact");

        ensure_dir(destination)?;
        std::fs::copy(archive, &target).map_err(|e| Error::file("copy", archive, e))?;
        set_mode(&target, EXECUTABLE_MODE)
    }
}

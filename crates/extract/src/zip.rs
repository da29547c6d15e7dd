//! Zip archive extraction.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use binvendor_core::{Error, Result};
use tracing::{debug, info, trace};

use crate::fs::{
    apply_rename, create_symlink, ensure_dir, ensure_parent, is_symlink_mode, member_path,
    present, set_mode,
};
use crate::{ExtractOptions, Extractor};

/// Extracts zip archives, restoring stored Unix permissions and symbolic
/// links.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipExtractor;

impl Extractor for ZipExtractor {
    fn name(&self) -> &'static str {
        "zip"
    }

    fn extract(&self, archive: &Path, destination: &Path, options: &ExtractOptions) -> Result<()> {
        info!(?archive, ?destination, "Extracting zip archive");
        ensure_dir(destination)?;

        let file = File::open(archive).map_err(|e| Error::file("open", archive, e))?;
        let mut zip = ::zip::ZipArchive::new(file)
            .map_err(|e| Error::archive(archive, format!("failed to open zip: {e}")))?;

        let mut written = 0usize;
        for index in 0..zip.len() {
            let mut entry = zip
                .by_index(index)
                .map_err(|e| Error::archive(archive, format!("failed to read zip entry: {e}")))?;

            let stored = entry.enclosed_name().ok_or_else(|| Error::UnsafeEntryPath {
                entry: entry.name().to_string(),
            })?;
            let Some(relative) = member_path(&stored, options.strip_path.as_deref())? else {
                continue;
            };
            let target = destination.join(&relative);
            trace!(entry = entry.name(), ?target, "Processing zip entry");

            ensure_parent(&target)?;

            if entry.is_dir() {
                ensure_dir(&target)?;
                continue;
            }

            if present(&target) {
                debug!(?target, "Skipping zip entry, target already exists");
                continue;
            }

            if entry.unix_mode().is_some_and(is_symlink_mode) {
                let mut link_target = String::new();
                entry.read_to_string(&mut link_target).map_err(|e| {
                    Error::archive(archive, format!("failed to read link '{}': {e}", entry.name()))
                })?;
                create_symlink(&relative, &target, &link_target)?;
                written += 1;
                continue;
            }

            let mut out = File::create(&target).map_err(|e| Error::file("create", &target, e))?;
            io::copy(&mut entry, &mut out).map_err(|e| {
                Error::archive(archive, format!("failed to extract '{}': {e}", entry.name()))
            })?;

            if let Some(mode) = entry.unix_mode() {
                set_mode(&target, mode)?;
            }
            written += 1;
        }

        debug!(written, "Extracted zip entries");
        apply_rename(destination, options)
    }
}

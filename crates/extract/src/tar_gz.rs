//! Gzip-compressed tarball extraction.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use binvendor_core::{Error, Result};
use flate2::read::GzDecoder;
use tar::Archive;
use tracing::{debug, info, trace};

use crate::fs::{apply_rename, ensure_dir, ensure_parent, member_path, set_mode};
use crate::{ExtractOptions, Extractor};

/// Extracts `.tar.gz` and `.tgz` archives.
///
/// Only regular files produce output; directory members create their
/// directory, every other member kind (links, devices) is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct TarGzExtractor;

impl Extractor for TarGzExtractor {
    fn name(&self) -> &'static str {
        "tar_gz"
    }

    fn extract(&self, archive: &Path, destination: &Path, options: &ExtractOptions) -> Result<()> {
        info!(?archive, ?destination, "Extracting tar.gz archive");
        ensure_dir(destination)?;

        let file = File::open(archive).map_err(|e| Error::file("open", archive, e))?;
        let mut tar = Archive::new(GzDecoder::new(file));
        let entries = tar
            .entries()
            .map_err(|e| Error::archive(archive, format!("failed to read tar: {e}")))?;

        let mut written = 0usize;
        for entry in entries {
            let mut entry = entry
                .map_err(|e| Error::archive(archive, format!("failed to read tar entry: {e}")))?;
            let stored = entry
                .path()
                .map_err(|e| Error::archive(archive, format!("invalid path in tar: {e}")))?
                .into_owned();

            let Some(relative) = member_path(&stored, options.strip_path.as_deref())? else {
                continue;
            };
            let target = destination.join(relative);
            trace!(entry = %stored.display(), ?target, "Processing tar entry");

            ensure_parent(&target)?;

            let entry_type = entry.header().entry_type();
            if entry_type.is_dir() {
                ensure_dir(&target)?;
                continue;
            }
            if !entry_type.is_file() {
                trace!(entry = %stored.display(), ?entry_type, "Ignoring non-file tar entry");
                continue;
            }

            if target.exists() {
                debug!(?target, "Skipping tar entry, target already exists");
                continue;
            }

            let mut content = Vec::new();
            entry.read_to_end(&mut content).map_err(|e| {
                Error::archive(archive, format!("failed to read '{}': {e}", stored.display()))
            })?;

            let mut out = File::create(&target).map_err(|e| Error::file("create", &target, e))?;
            out.write_all(&content)
                .map_err(|e| Error::file("write", &target, e))?;

            let mode = entry
                .header()
                .mode()
                .map_err(|e| Error::archive(archive, format!("invalid mode in tar: {e}")))?;
            set_mode(&target, mode)?;
            written += 1;
        }

        debug!(written, "Extracted tar entries");
        apply_rename(destination, options)
    }
}

//! The leaf operations of a dependency: clean, download, extract, install
//! and the composite fetch.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use binvendor_core::{Error, Result};
use binvendor_extract::ExtractorRegistry;
use tracing::{debug, info};

use crate::context::DependencyContext;
use crate::download::Downloader;

/// One named unit of work in a dependency's pipeline.
#[async_trait]
pub trait Operation: Send + Sync {
    /// Name used in logs (`clean`, `download`, ...).
    fn name(&self) -> &'static str;

    /// Run the operation to completion.
    ///
    /// # Errors
    ///
    /// Failures are returned as-is; nothing is retried or rolled back.
    async fn run(&self) -> Result<()>;
}

/// Removes the dependency's whole working tree.
///
/// A tree that does not exist is already clean.
#[derive(Debug, Clone)]
pub struct Clean {
    path: PathBuf,
}

impl Clean {
    /// Clean `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Operation for Clean {
    fn name(&self) -> &'static str {
        "clean"
    }

    async fn run(&self) -> Result<()> {
        let path = &self.path;
        let metadata = match tokio::fs::symlink_metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(?path, "Nothing to clean");
                return Ok(());
            }
            Err(e) => return Err(Error::file("inspect", path, e)),
        };

        info!(?path, "Cleaning");
        let removed = if metadata.is_dir() {
            tokio::fs::remove_dir_all(path).await
        } else {
            tokio::fs::remove_file(path).await
        };
        removed.map_err(|e| Error::file("remove", path, e))
    }
}

/// Fetches the artifact and stores it as `path/distribution_dir/<file name>`.
pub struct Download {
    context: Arc<DependencyContext>,
    downloader: Arc<dyn Downloader>,
}

impl Download {
    /// Download the artifact described by `context` with `downloader`.
    #[must_use]
    pub fn new(context: Arc<DependencyContext>, downloader: Arc<dyn Downloader>) -> Self {
        Self {
            context,
            downloader,
        }
    }
}

#[async_trait]
impl Operation for Download {
    fn name(&self) -> &'static str {
        "download"
    }

    async fn run(&self) -> Result<()> {
        let uri = self.context.uri()?;
        let directory = self.context.config().distribution_path();
        let destination = directory.join(self.context.file_name()?);
        info!(%uri, ?destination, downloader = self.downloader.name(), "Downloading");

        let temp = self.downloader.fetch(&uri).await?;

        tokio::fs::create_dir_all(&directory)
            .await
            .map_err(|e| Error::file("create directory", &directory, e))?;
        tokio::fs::copy(temp.path(), &destination)
            .await
            .map_err(|e| Error::file("copy", temp.path(), e))?;

        debug!(?destination, "Download stored");
        Ok(())
    }
}

/// Unpacks the downloaded artifact into `path/binary_dir`.
pub struct Extract {
    context: Arc<DependencyContext>,
    registry: ExtractorRegistry,
}

impl Extract {
    /// Extract with the given extractors.
    #[must_use]
    pub fn new(context: Arc<DependencyContext>, registry: ExtractorRegistry) -> Self {
        Self { context, registry }
    }
}

#[async_trait]
impl Operation for Extract {
    fn name(&self) -> &'static str {
        "extract"
    }

    async fn run(&self) -> Result<()> {
        let archive = self.context.distribution_file()?;
        let destination = self.context.config().binary_path();
        let options = self.context.extract_options()?;
        let archive_type = self.context.archive_type();
        info!(?archive, ?destination, %archive_type, "Extracting");

        self.registry
            .extract(archive_type, &archive, &destination, &options)
    }
}

/// Copies the extracted binary into the installation directory.
#[derive(Debug, Clone)]
pub struct Install {
    context: Arc<DependencyContext>,
    installation_dir: PathBuf,
}

impl Install {
    /// Install into `installation_dir`.
    #[must_use]
    pub fn new(context: Arc<DependencyContext>, installation_dir: impl Into<PathBuf>) -> Self {
        Self {
            context,
            installation_dir: installation_dir.into(),
        }
    }
}

#[async_trait]
impl Operation for Install {
    fn name(&self) -> &'static str {
        "install"
    }

    async fn run(&self) -> Result<()> {
        let binary_name = self.context.install_binary_name()?;
        let source = self.context.config().binary_path().join(&binary_name);
        let file_name = source.file_name().ok_or_else(|| {
            Error::configuration(format!("binary name '{binary_name}' has no file name"))
        })?;
        // Nested binary names install flat under their base name.
        let target = self.installation_dir.join(file_name);
        info!(?target, "Installing '{binary_name}'");

        tokio::fs::metadata(&source)
            .await
            .map_err(|e| Error::file("read", &source, e))?;
        tokio::fs::create_dir_all(&self.installation_dir)
            .await
            .map_err(|e| Error::file("create directory", &self.installation_dir, e))?;
        tokio::fs::copy(&source, &target)
            .await
            .map_err(|e| Error::file("copy to", &target, e))?;

        info!("Installed");
        Ok(())
    }
}

/// Download followed by extract, without cleaning or installing.
pub struct Fetch {
    download: Arc<dyn Operation>,
    extract: Arc<dyn Operation>,
}

impl Fetch {
    /// Chain `download` and `extract`.
    #[must_use]
    pub fn new(download: Arc<dyn Operation>, extract: Arc<dyn Operation>) -> Self {
        Self { download, extract }
    }
}

#[async_trait]
impl Operation for Fetch {
    fn name(&self) -> &'static str {
        "fetch"
    }

    async fn run(&self) -> Result<()> {
        self.download.run().await?;
        self.extract.run().await
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use binvendor_core::{ArchiveType, DependencyConfig, HostPlatform};
    use tempfile::{NamedTempFile, TempDir};
    use tokio_test::assert_ok;

    use super::*;

    struct StaticDownloader(&'static [u8]);

    #[async_trait]
    impl Downloader for StaticDownloader {
        fn name(&self) -> &'static str {
            "static"
        }

        async fn fetch(&self, _uri: &str) -> Result<NamedTempFile> {
            let file = NamedTempFile::new()?;
            std::fs::write(file.path(), self.0)?;
            Ok(file)
        }
    }

    struct FailingDownloader;

    #[async_trait]
    impl Downloader for FailingDownloader {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn fetch(&self, uri: &str) -> Result<NamedTempFile> {
            Err(Error::download(uri, "connection refused"))
        }
    }

    fn context(root: &Path) -> Arc<DependencyContext> {
        let config = DependencyConfig::new(
            "tool",
            root.join("vendor/tool"),
            "https://example.com/tool-<%= version %>",
            "tool-<%= version %>",
        )
        .with_version("2.0.0")
        .with_archive_type(ArchiveType::Uncompressed);
        Arc::new(DependencyContext::new(config, HostPlatform::new("x86_64", "linux")).unwrap())
    }

    #[test]
    fn test_clean_missing_path_is_ok() {
        let temp = TempDir::new().unwrap();
        let clean = Clean::new(temp.path().join("absent"));
        assert_ok!(tokio_test::block_on(clean.run()));
    }

    #[tokio::test]
    async fn test_clean_removes_tree() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("vendor/tool");
        std::fs::create_dir_all(root.join("bin/nested")).unwrap();
        std::fs::write(root.join("bin/nested/file"), "x").unwrap();

        Clean::new(&root).run().await.unwrap();
        assert!(!root.exists());
        assert!(temp.path().join("vendor").exists());
    }

    #[tokio::test]
    async fn test_clean_removes_plain_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("stray");
        std::fs::write(&file, "x").unwrap();

        Clean::new(&file).run().await.unwrap();
        assert!(!file.exists());
    }

    #[tokio::test]
    async fn test_download_stores_in_distribution_dir() {
        let temp = TempDir::new().unwrap();
        let context = context(temp.path());
        let download = Download::new(Arc::clone(&context), Arc::new(StaticDownloader(b"binary")));

        download.run().await.unwrap();

        let stored = temp.path().join("vendor/tool/dist/tool-2.0.0");
        assert_eq!(std::fs::read(stored).unwrap(), b"binary");
    }

    #[tokio::test]
    async fn test_download_failure_creates_nothing() {
        let temp = TempDir::new().unwrap();
        let download = Download::new(context(temp.path()), Arc::new(FailingDownloader));

        let err = download.run().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Download { ref uri, .. } if uri == "https://example.com/tool-2.0.0"
        ));
        assert!(!temp.path().join("vendor/tool/dist").exists());
    }

    #[tokio::test]
    async fn test_fetch_then_install() {
        let temp = TempDir::new().unwrap();
        let context = context(temp.path());
        let download: Arc<dyn Operation> =
            Arc::new(Download::new(Arc::clone(&context), Arc::new(StaticDownloader(b"binary"))));
        let extract: Arc<dyn Operation> =
            Arc::new(Extract::new(Arc::clone(&context), ExtractorRegistry::default()));

        Fetch::new(download, extract).run().await.unwrap();
        assert!(temp.path().join("vendor/tool/bin/tool-2.0.0").exists());

        // The uncompressed artifact keeps its downloaded name, so install it
        // under that name.
        let context = Arc::new(
            DependencyContext::new(
                context
                    .config()
                    .clone()
                    .with_target_binary_name_template("tool-<%= version %>"),
                context.platform().clone(),
            )
            .unwrap(),
        );
        let install_dir = temp.path().join("install");
        Install::new(context, &install_dir).run().await.unwrap();
        assert_eq!(std::fs::read(install_dir.join("tool-2.0.0")).unwrap(), b"binary");
    }

    #[tokio::test]
    async fn test_install_missing_binary_fails() {
        let temp = TempDir::new().unwrap();
        let install = Install::new(context(temp.path()), temp.path().join("install"));

        let err = install.run().await.unwrap_err();
        match err {
            Error::FileOperation {
                operation, path, ..
            } => {
                assert_eq!(operation, "read");
                assert_eq!(path, temp.path().join("vendor/tool/bin/tool"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!temp.path().join("install").exists());
    }

    #[tokio::test]
    async fn test_install_nested_name_lands_flat() {
        let temp = TempDir::new().unwrap();
        let base = context(temp.path());
        let context = Arc::new(
            DependencyContext::new(
                base.config()
                    .clone()
                    .with_target_binary_name_template("some/path/tool"),
                base.platform().clone(),
            )
            .unwrap(),
        );
        let nested = temp.path().join("vendor/tool/bin/some/path");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("tool"), b"binary").unwrap();

        let install_dir = temp.path().join("install");
        Install::new(context, &install_dir).run().await.unwrap();

        assert_eq!(std::fs::read(install_dir.join("tool")).unwrap(), b"binary");
        assert!(!install_dir.join("some").exists());
    }

    #[tokio::test]
    async fn test_install_name_without_file_part_is_rejected() {
        let temp = TempDir::new().unwrap();
        let base = context(temp.path());
        let context = Arc::new(
            DependencyContext::new(
                base.config().clone().with_target_binary_name_template(".."),
                base.platform().clone(),
            )
            .unwrap(),
        );

        let err = Install::new(context, temp.path().join("install"))
            .run()
            .await
            .unwrap_err();
        assert!(err.is_configuration());
    }
}

//! Wiring one dependency configuration into its operations.

use std::sync::Arc;

use binvendor_core::{DependencyConfig, HostPlatform, Result};
use binvendor_extract::ExtractorRegistry;
use tracing::debug;

use crate::context::DependencyContext;
use crate::download::Downloader;
use crate::ensure::{Ensure, EnsureOutcome};
use crate::freshness::{FreshnessContext, NeedsFetch};
use crate::operations::{Clean, Download, Extract, Fetch, Install, Operation};

/// Every operation of one dependency, built from its configuration.
///
/// All operations share one [`DependencyContext`], so they render their
/// templates against the same parameters. The install step exists only when
/// `installation_dir` is configured.
///
/// ```ignore
/// let config = DependencyConfig::from_file(Path::new("vendor/terraform.toml"))?;
/// let tasks = DependencyTasks::new(config, Arc::new(HttpDownloader::new()?))?
///     .with_needs_fetch(NeedsFetch::missing_binary("terraform"));
/// tasks.ensure().await?;
/// ```
pub struct DependencyTasks {
    context: Arc<DependencyContext>,
    downloader: Arc<dyn Downloader>,
    needs_fetch: NeedsFetch,
    clean: Arc<dyn Operation>,
    download: Arc<dyn Operation>,
    extract: Arc<dyn Operation>,
    fetch: Arc<dyn Operation>,
    install: Option<Arc<dyn Operation>>,
}

impl DependencyTasks {
    /// Build the operations for the current host.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` is invalid or has no
    /// archive type for this host.
    pub fn new(config: DependencyConfig, downloader: Arc<dyn Downloader>) -> Result<Self> {
        Self::for_platform(config, HostPlatform::current(), downloader)
    }

    /// Build the operations for an explicit platform.
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn for_platform(
        config: DependencyConfig,
        platform: HostPlatform,
        downloader: Arc<dyn Downloader>,
    ) -> Result<Self> {
        let context = Arc::new(DependencyContext::new(config, platform)?);
        debug!(dependency = %context.config().name, "Building dependency tasks");

        let clean: Arc<dyn Operation> = Arc::new(Clean::new(&context.config().path));
        let download: Arc<dyn Operation> =
            Arc::new(Download::new(Arc::clone(&context), Arc::clone(&downloader)));
        let install = context
            .config()
            .installation_dir
            .as_ref()
            .map(|dir| Arc::new(Install::new(Arc::clone(&context), dir)) as Arc<dyn Operation>);

        let (extract, fetch) =
            extract_and_fetch(&context, &download, ExtractorRegistry::default());

        Ok(Self {
            context,
            downloader,
            needs_fetch: NeedsFetch::default(),
            clean,
            download,
            extract,
            fetch,
            install,
        })
    }

    /// Use a custom extractor registry.
    #[must_use]
    pub fn with_extractors(mut self, registry: ExtractorRegistry) -> Self {
        (self.extract, self.fetch) = extract_and_fetch(&self.context, &self.download, registry);
        self
    }

    /// Set the freshness check used by [`Self::ensure`].
    #[must_use]
    pub fn with_needs_fetch(mut self, needs_fetch: NeedsFetch) -> Self {
        self.needs_fetch = needs_fetch;
        self
    }

    /// The resolved context shared by the operations.
    #[must_use]
    pub fn context(&self) -> &DependencyContext {
        &self.context
    }

    /// The downloader used by the download step.
    #[must_use]
    pub fn downloader(&self) -> &Arc<dyn Downloader> {
        &self.downloader
    }

    /// Removes the dependency's working tree.
    #[must_use]
    pub fn clean(&self) -> Arc<dyn Operation> {
        Arc::clone(&self.clean)
    }

    /// Downloads the artifact into the distribution directory.
    #[must_use]
    pub fn download(&self) -> Arc<dyn Operation> {
        Arc::clone(&self.download)
    }

    /// Extracts the downloaded artifact into the binary directory.
    #[must_use]
    pub fn extract(&self) -> Arc<dyn Operation> {
        Arc::clone(&self.extract)
    }

    /// Download followed by extract.
    #[must_use]
    pub fn fetch(&self) -> Arc<dyn Operation> {
        Arc::clone(&self.fetch)
    }

    /// Copies the binary into the installation directory, when configured.
    #[must_use]
    pub fn install(&self) -> Option<Arc<dyn Operation>> {
        self.install.clone()
    }

    /// The freshness context handed to the check.
    #[must_use]
    pub fn freshness_context(&self) -> FreshnessContext {
        let config = self.context.config();
        FreshnessContext {
            path: config.path.clone(),
            version: config.version.clone(),
            binary_directory: config.binary_dir.clone(),
        }
    }

    /// The ensure orchestrator over these operations.
    #[must_use]
    pub fn orchestrator(&self) -> Ensure {
        let ensure = Ensure::new(
            self.freshness_context(),
            self.clean(),
            self.download(),
            self.extract(),
        )
        .with_needs_fetch(self.needs_fetch.clone());
        match self.install() {
            Some(install) => ensure.with_install(install),
            None => ensure,
        }
    }

    /// Run the ensure orchestrator once.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a step.
    pub async fn ensure(&self) -> Result<EnsureOutcome> {
        self.orchestrator().run().await
    }
}

fn extract_and_fetch(
    context: &Arc<DependencyContext>,
    download: &Arc<dyn Operation>,
    registry: ExtractorRegistry,
) -> (Arc<dyn Operation>, Arc<dyn Operation>) {
    let extract: Arc<dyn Operation> = Arc::new(Extract::new(Arc::clone(context), registry));
    let fetch: Arc<dyn Operation> =
        Arc::new(Fetch::new(Arc::clone(download), Arc::clone(&extract)));
    (extract, fetch)
}

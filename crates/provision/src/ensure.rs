//! The ensure orchestrator: check freshness, then clean, download, extract
//! and optionally install.

use std::sync::Arc;

use async_trait::async_trait;
use binvendor_core::Result;
use tracing::{debug, info};

use crate::freshness::{FreshnessContext, NeedsFetch};
use crate::operations::Operation;

/// Which path an `ensure` run took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// The freshness check said no fetch was needed; nothing ran.
    Skipped,
    /// The fetch chain ran.
    Fetched {
        /// Whether the install step ran.
        installed: bool,
    },
}

/// Runs a dependency's fetch chain when, and only when, it is needed.
///
/// The freshness check is evaluated once per [`Ensure::run`]. When it returns
/// `true`, clean, download and extract run in that order, followed by
/// install if one was configured. The first failure stops the chain; steps
/// that already ran are not undone.
#[derive(Clone)]
pub struct Ensure {
    context: FreshnessContext,
    needs_fetch: NeedsFetch,
    clean: Arc<dyn Operation>,
    download: Arc<dyn Operation>,
    extract: Arc<dyn Operation>,
    install: Option<Arc<dyn Operation>>,
}

impl Ensure {
    /// Build an orchestrator without an install step that always fetches.
    #[must_use]
    pub fn new(
        context: FreshnessContext,
        clean: Arc<dyn Operation>,
        download: Arc<dyn Operation>,
        extract: Arc<dyn Operation>,
    ) -> Self {
        Self {
            context,
            needs_fetch: NeedsFetch::default(),
            clean,
            download,
            extract,
            install: None,
        }
    }

    /// Set the freshness check.
    #[must_use]
    pub fn with_needs_fetch(mut self, needs_fetch: NeedsFetch) -> Self {
        self.needs_fetch = needs_fetch;
        self
    }

    /// Add the install step.
    #[must_use]
    pub fn with_install(mut self, install: Arc<dyn Operation>) -> Self {
        self.install = Some(install);
        self
    }

    /// Whether an install step is configured.
    #[must_use]
    pub fn has_install(&self) -> bool {
        self.install.is_some()
    }

    /// Check freshness and run the chain if needed.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a step.
    pub async fn run(&self) -> Result<EnsureOutcome> {
        let path = &self.context.path;
        debug!(?path, "Checking whether dependency needs fetching");

        if !self.needs_fetch.check(&self.context) {
            info!(?path, "Dependency up to date, skipping fetch");
            return Ok(EnsureOutcome::Skipped);
        }

        info!(?path, "Fetching dependency");
        for step in [&self.clean, &self.download, &self.extract] {
            run_step(step.as_ref()).await?;
        }

        let installed = match &self.install {
            Some(install) => {
                run_step(install.as_ref()).await?;
                true
            }
            None => false,
        };

        info!(?path, installed, "Dependency ready");
        Ok(EnsureOutcome::Fetched { installed })
    }
}

async fn run_step(step: &dyn Operation) -> Result<()> {
    debug!(step = step.name(), "Running step");
    step.run().await
}

#[async_trait]
impl Operation for Ensure {
    fn name(&self) -> &'static str {
        "ensure"
    }

    async fn run(&self) -> Result<()> {
        Self::run(self).await.map(|_| ())
    }
}

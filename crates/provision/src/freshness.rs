//! The caller-supplied "does this dependency need fetching?" check.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What the freshness check gets to look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreshnessContext {
    /// Root of the dependency's working tree.
    pub path: PathBuf,
    /// Configured version, if any.
    pub version: Option<String>,
    /// Directory under `path` holding the extracted contents.
    pub binary_directory: String,
}

impl FreshnessContext {
    /// `path/binary_directory`.
    #[must_use]
    pub fn binary_path(&self) -> PathBuf {
        self.path.join(&self.binary_directory)
    }
}

type Predicate = dyn Fn(&FreshnessContext) -> bool + Send + Sync;

/// Predicate deciding whether `ensure` runs the fetch chain.
///
/// Defaults to [`NeedsFetch::always`].
#[derive(Clone)]
pub struct NeedsFetch(Arc<Predicate>);

impl NeedsFetch {
    /// Wrap an arbitrary predicate.
    pub fn from_fn<F>(predicate: F) -> Self
    where
        F: Fn(&FreshnessContext) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    /// Always fetch.
    #[must_use]
    pub fn always() -> Self {
        Self::from_fn(|_| true)
    }

    /// Never fetch.
    #[must_use]
    pub fn never() -> Self {
        Self::from_fn(|_| false)
    }

    /// Fetch when `path/binary_directory/<binary>` does not exist.
    #[must_use]
    pub fn missing_binary(binary: impl Into<PathBuf>) -> Self {
        let binary = binary.into();
        Self::from_fn(move |context| !exists(&context.binary_path().join(&binary)))
    }

    /// Evaluate the predicate.
    #[must_use]
    pub fn check(&self, context: &FreshnessContext) -> bool {
        (self.0)(context)
    }
}

fn exists(path: &Path) -> bool {
    path.try_exists().unwrap_or(false)
}

impl Default for NeedsFetch {
    fn default() -> Self {
        Self::always()
    }
}

impl fmt::Debug for NeedsFetch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NeedsFetch").finish_non_exhaustive()
    }
}

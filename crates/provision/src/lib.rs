//! Provisioning of vendored binary dependencies.
//!
//! A dependency is described by a [`DependencyConfig`](binvendor_core::DependencyConfig).
//! [`DependencyTasks`] turns it into a set of [`Operation`]s:
//!
//! - `clean` removes the dependency's working tree
//! - `download` fetches the artifact into `path/dist`
//! - `extract` unpacks it into `path/bin`
//! - `install` copies the binary elsewhere (only when configured)
//! - `fetch` is download followed by extract
//!
//! The [`Ensure`] orchestrator asks a [`NeedsFetch`] check whether any of
//! this is necessary and, if so, runs clean, download, extract and install
//! in order.

mod context;
mod download;
mod ensure;
mod freshness;
mod operations;
mod tasks;

pub use context::DependencyContext;
pub use download::{Downloader, HttpDownloader};
pub use ensure::{Ensure, EnsureOutcome};
pub use freshness::{FreshnessContext, NeedsFetch};
pub use operations::{Clean, Download, Extract, Fetch, Install, Operation};
pub use tasks::DependencyTasks;

//! Core types for binvendor.
//!
//! This crate holds the pieces every other binvendor crate builds on:
//! - [`platform`]: host platform detection and logical OS/CPU naming
//! - [`template`]: immutable, parameterised string templates
//! - [`archive`]: archive types and their file extensions
//! - [`config`]: the dependency configuration and its TOML loading
//! - [`Error`]: the shared error taxonomy

pub mod archive;
pub mod config;
mod error;
pub mod platform;
pub mod template;

pub use archive::{ArchiveType, ArchiveTypeSpec};
pub use config::DependencyConfig;
pub use error::{Error, Result};
pub use platform::{HostPlatform, NameTable, PlatformNames, ResolvedPlatform};
pub use template::{Parameters, Template, Value};

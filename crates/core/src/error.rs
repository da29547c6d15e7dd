//! Error types for dependency provisioning.

use miette::Diagnostic;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for provisioning operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving, fetching or unpacking a dependency.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The dependency configuration is incomplete or inconsistent.
    #[error("Configuration error: {message}")]
    #[diagnostic(code(binvendor::config), help("{help}"))]
    Configuration {
        /// The error message
        message: String,
        /// Help text for the user
        help: String,
    },

    /// The configuration names an archive type that has no extractor.
    #[error("Unknown archive type: {value}")]
    #[diagnostic(
        code(binvendor::config::archive_type),
        help("Valid archive types are: zip, tar_gz, tgz, uncompressed")
    )]
    UnknownArchiveType {
        /// The unrecognised type name
        value: String,
    },

    /// A per-OS archive type table has no entry for the host OS.
    #[error("No archive type configured for operating system '{os}'")]
    #[diagnostic(
        code(binvendor::config::archive_type_os),
        help("Add an entry for '{os}' to the archive type table")
    )]
    UnresolvedArchiveType {
        /// The raw OS key that was looked up
        os: String,
    },

    /// A configuration file could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    #[diagnostic(code(binvendor::config::parse))]
    ConfigParse {
        /// The parser message
        message: String,
        /// The file that was being parsed, if any
        path: Option<PathBuf>,
    },

    /// A template is malformed.
    #[error("Invalid template '{template}': {message}")]
    #[diagnostic(
        code(binvendor::template::syntax),
        help("Templates interpolate parameters with <%= name %>")
    )]
    Template {
        /// The offending template source
        template: String,
        /// What is wrong with it
        message: String,
    },

    /// A template referenced a parameter that was never supplied.
    #[error("Undefined template parameter '{name}'")]
    #[diagnostic(
        code(binvendor::template::undefined),
        help("Available parameters are: version, platform, platform_os_name, platform_cpu_name, ext")
    )]
    UndefinedParameter {
        /// The parameter name
        name: String,
    },

    /// An archive could not be read.
    #[error("Failed to read archive {}: {message}", path.display())]
    #[diagnostic(
        code(binvendor::extract::archive),
        help("The downloaded file may be truncated or of a different archive type")
    )]
    Archive {
        /// The archive path
        path: PathBuf,
        /// The reader's message
        message: String,
    },

    /// An archive member would be written outside the destination directory.
    #[error("Archive entry '{entry}' escapes the extraction directory")]
    #[diagnostic(code(binvendor::extract::unsafe_path))]
    UnsafeEntryPath {
        /// The stored member path
        entry: String,
    },

    /// A file-system operation failed on a known path.
    #[error("Failed to {operation} {}: {source}", path.display())]
    #[diagnostic(code(binvendor::io::file))]
    FileOperation {
        /// What was being attempted (e.g. "create directory")
        operation: &'static str,
        /// The path involved
        path: PathBuf,
        /// The underlying source error
        #[source]
        source: std::io::Error,
    },

    /// Fetching a URI failed.
    #[error("Failed to download {uri}: {message}")]
    #[diagnostic(
        code(binvendor::download),
        help("Check the rendered URI and network connectivity")
    )]
    Download {
        /// The URI that was requested
        uri: String,
        /// The transport's message
        message: String,
    },

    /// Wrapped I/O error.
    #[error("I/O error: {0}")]
    #[diagnostic(code(binvendor::io))]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error with default help text.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            help: "Check the dependency configuration".to_string(),
        }
    }

    /// Create a configuration error with custom help text.
    #[must_use]
    pub fn configuration_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            help: help.into(),
        }
    }

    /// Create a template syntax error.
    #[must_use]
    pub fn template(template: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Template {
            template: template.into(),
            message: message.into(),
        }
    }

    /// Create an archive read error.
    #[must_use]
    pub fn archive(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Archive {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file operation error.
    #[must_use]
    pub fn file(operation: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::FileOperation {
            operation,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Create a download error.
    #[must_use]
    pub fn download(uri: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Download {
            uri: uri.into(),
            message: message.into(),
        }
    }

    /// Whether this error was raised by configuration validation rather than I/O.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. }
                | Self::UnknownArchiveType { .. }
                | Self::UnresolvedArchiveType { .. }
                | Self::ConfigParse { .. }
        )
    }
}

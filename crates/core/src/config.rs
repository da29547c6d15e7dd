//! Dependency configuration.
//!
//! A [`DependencyConfig`] describes one third-party binary: where it lives in
//! the working tree, how its download location is templated and how the
//! downloaded artifact is unpacked. It can be built in code or loaded from
//! TOML:
//!
//! ```toml
//! name = "terraform"
//! version = "1.9.5"
//! path = "vendor/terraform"
//! uri_template = "https://releases.example.com/terraform/<%= version %>/terraform_<%= version %>_<%= platform_os_name %>_<%= platform_cpu_name %><%= ext %>"
//! file_name_template = "terraform<%= ext %>"
//!
//! [archive_type]
//! darwin = "zip"
//! linux = "tar_gz"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::archive::ArchiveTypeSpec;
use crate::platform::{NameTable, PlatformNames};
use crate::template::Template;
use crate::{Error, Result};

/// Default directory (relative to the dependency path) for downloaded artifacts.
pub const DEFAULT_DISTRIBUTION_DIR: &str = "dist";

/// Default directory (relative to the dependency path) for extracted contents.
pub const DEFAULT_BINARY_DIR: &str = "bin";

fn default_distribution_dir() -> String {
    DEFAULT_DISTRIBUTION_DIR.to_string()
}

fn default_binary_dir() -> String {
    DEFAULT_BINARY_DIR.to_string()
}

/// Configuration for one provisioned dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DependencyConfig {
    /// Logical dependency name.
    pub name: String,
    /// Version, if the dependency is versioned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Root of this dependency's working tree.
    pub path: PathBuf,
    /// Archive format, optionally per OS.
    #[serde(default)]
    pub archive_type: ArchiveTypeSpec,
    /// CPU name table. Replaces the built-in table when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_names: Option<NameTable>,
    /// OS name table. Replaces the built-in table when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_names: Option<NameTable>,
    /// Directory under `path` receiving the downloaded artifact.
    #[serde(default = "default_distribution_dir")]
    pub distribution_dir: String,
    /// Directory under `path` receiving the extracted contents.
    #[serde(default = "default_binary_dir")]
    pub binary_dir: String,
    /// Directory the binary is copied to. Enables the install step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installation_dir: Option<PathBuf>,
    /// Template for the download URI.
    pub uri_template: String,
    /// Template for the downloaded file name.
    pub file_name_template: String,
    /// Template for the prefix stripped from archive entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strip_path_template: Option<String>,
    /// Template for the extracted binary to rename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_binary_name_template: Option<String>,
    /// Template for the name the binary is renamed to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_binary_name_template: Option<String>,
}

impl DependencyConfig {
    /// Create a configuration with every optional field at its default.
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        uri_template: impl Into<String>,
        file_name_template: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: None,
            path: path.into(),
            archive_type: ArchiveTypeSpec::default(),
            cpu_names: None,
            os_names: None,
            distribution_dir: default_distribution_dir(),
            binary_dir: default_binary_dir(),
            installation_dir: None,
            uri_template: uri_template.into(),
            file_name_template: file_name_template.into(),
            strip_path_template: None,
            source_binary_name_template: None,
            target_binary_name_template: None,
        }
    }

    /// Set the version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the archive type.
    #[must_use]
    pub fn with_archive_type(mut self, archive_type: impl Into<ArchiveTypeSpec>) -> Self {
        self.archive_type = archive_type.into();
        self
    }

    /// Set the installation directory, enabling the install step.
    #[must_use]
    pub fn with_installation_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.installation_dir = Some(dir.into());
        self
    }

    /// Set the strip path template.
    #[must_use]
    pub fn with_strip_path_template(mut self, template: impl Into<String>) -> Self {
        self.strip_path_template = Some(template.into());
        self
    }

    /// Set the source and target binary name templates.
    #[must_use]
    pub fn with_binary_rename(
        mut self,
        source_template: impl Into<String>,
        target_template: impl Into<String>,
    ) -> Self {
        self.source_binary_name_template = Some(source_template.into());
        self.target_binary_name_template = Some(target_template.into());
        self
    }

    /// Set only the target binary name template.
    #[must_use]
    pub fn with_target_binary_name_template(mut self, template: impl Into<String>) -> Self {
        self.target_binary_name_template = Some(template.into());
        self
    }

    /// Parse a configuration from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigParse`] when the document is not valid or does
    /// not match the expected shape, and any error from [`Self::validate`].
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source).map_err(|e| Error::ConfigParse {
            message: e.to_string(),
            path: None,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(?path, "Loading dependency configuration");
        let source =
            std::fs::read_to_string(path).map_err(|e| Error::file("read", path, e))?;
        let config: Self = toml::from_str(&source).map_err(|e| Error::ConfigParse {
            message: e.to_string(),
            path: Some(path.to_path_buf()),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check required fields and template syntax.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for missing required values and
    /// [`Error::Template`] for malformed templates.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::configuration("dependency name is required"));
        }
        if self.path.as_os_str().is_empty() {
            return Err(Error::configuration(format!(
                "path is required for dependency '{}'",
                self.name
            )));
        }
        for (field, template) in [
            ("uri_template", &self.uri_template),
            ("file_name_template", &self.file_name_template),
        ] {
            if template.trim().is_empty() {
                return Err(Error::configuration(format!(
                    "{field} is required for dependency '{}'",
                    self.name
                )));
            }
            Template::parse(template.as_str())?;
        }
        for template in [
            &self.strip_path_template,
            &self.source_binary_name_template,
            &self.target_binary_name_template,
        ]
        .into_iter()
        .flatten()
        {
            Template::parse(template.as_str())?;
        }
        Ok(())
    }

    /// The platform name tables after applying any overrides.
    #[must_use]
    pub fn platform_names(&self) -> PlatformNames {
        PlatformNames::from_overrides(self.cpu_names.clone(), self.os_names.clone())
    }

    /// `path/distribution_dir`.
    #[must_use]
    pub fn distribution_path(&self) -> PathBuf {
        self.path.join(&self.distribution_dir)
    }

    /// `path/binary_dir`.
    #[must_use]
    pub fn binary_path(&self) -> PathBuf {
        self.path.join(&self.binary_dir)
    }
}

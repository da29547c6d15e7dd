//! Per-dependency resolved facts shared by every operation.

use std::path::PathBuf;

use binvendor_core::template::{self, Parameters};
use binvendor_core::{ArchiveType, DependencyConfig, HostPlatform, Result, Value};
use binvendor_extract::ExtractOptions;
use tracing::debug;

/// A validated dependency configuration bound to one host platform.
///
/// Building the context resolves the archive type and the parameter map
/// (`version`, `platform`, `platform_os_name`, `platform_cpu_name`, `ext`)
/// once, so every template rendered for this dependency sees the same
/// values. Configuration errors surface here, before any I/O.
#[derive(Debug, Clone)]
pub struct DependencyContext {
    config: DependencyConfig,
    platform: HostPlatform,
    archive_type: ArchiveType,
    parameters: Parameters,
}

impl DependencyContext {
    /// Resolve `config` for `platform`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or its archive type
    /// cannot be resolved for the platform's OS.
    pub fn new(config: DependencyConfig, platform: HostPlatform) -> Result<Self> {
        config.validate()?;
        let archive_type = config.archive_type.resolve(platform.os())?;
        let names = config.platform_names().resolve(&platform);

        let mut parameters = Parameters::new();
        parameters.insert("version".into(), Value::from(config.version.clone()));
        parameters.insert("platform".into(), Value::from(platform.to_string()));
        parameters.insert("platform_os_name".into(), Value::from(names.os_name));
        parameters.insert("platform_cpu_name".into(), Value::from(names.cpu_name));
        parameters.insert("ext".into(), Value::from(archive_type.extension()));

        debug!(
            dependency = %config.name,
            %platform,
            %archive_type,
            "Resolved dependency context"
        );

        Ok(Self {
            config,
            platform,
            archive_type,
            parameters,
        })
    }

    /// The underlying configuration.
    #[must_use]
    pub fn config(&self) -> &DependencyConfig {
        &self.config
    }

    /// The platform this context was resolved for.
    #[must_use]
    pub fn platform(&self) -> &HostPlatform {
        &self.platform
    }

    /// The archive type for this platform.
    #[must_use]
    pub fn archive_type(&self) -> ArchiveType {
        self.archive_type
    }

    /// The parameters visible to every template.
    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Render an arbitrary template against this context's parameters.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed templates or undefined parameters.
    pub fn render(&self, source: &str) -> Result<String> {
        template::render(source, &self.parameters)
    }

    fn render_optional(&self, source: Option<&String>) -> Result<Option<String>> {
        source.map(|s| self.render(s)).transpose()
    }

    /// The download URI.
    ///
    /// # Errors
    ///
    /// See [`Self::render`].
    pub fn uri(&self) -> Result<String> {
        self.render(&self.config.uri_template)
    }

    /// The name the downloaded artifact is stored under.
    ///
    /// # Errors
    ///
    /// See [`Self::render`].
    pub fn file_name(&self) -> Result<String> {
        self.render(&self.config.file_name_template)
    }

    /// `path/distribution_dir/<file name>`.
    ///
    /// # Errors
    ///
    /// See [`Self::render`].
    pub fn distribution_file(&self) -> Result<PathBuf> {
        Ok(self.config.distribution_path().join(self.file_name()?))
    }

    /// The binary name used by the install step: the rendered target binary
    /// name when configured, the dependency name otherwise.
    ///
    /// # Errors
    ///
    /// See [`Self::render`].
    pub fn install_binary_name(&self) -> Result<String> {
        match &self.config.target_binary_name_template {
            Some(template) => self.render(template),
            None => Ok(self.config.name.clone()),
        }
    }

    /// Options for extracting the downloaded artifact.
    ///
    /// Archives receive a rename only when both binary name templates are
    /// configured. An uncompressed artifact uses the target name on its own.
    ///
    /// # Errors
    ///
    /// See [`Self::render`].
    pub fn extract_options(&self) -> Result<ExtractOptions> {
        let mut options = ExtractOptions::new();
        if let Some(strip) = self.render_optional(self.config.strip_path_template.as_ref())? {
            options = options.with_strip_path(strip);
        }

        let source = self.render_optional(self.config.source_binary_name_template.as_ref())?;
        let target = self.render_optional(self.config.target_binary_name_template.as_ref())?;
        options = match (source, target) {
            (Some(from), Some(to)) => options.with_rename(from, to),
            (None, Some(to)) if self.archive_type == ArchiveType::Uncompressed => {
                options.with_rename_to(to)
            }
            _ => options,
        };
        Ok(options)
    }
}

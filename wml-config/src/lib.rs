//! Shared configuration loader for the WML toolchain.
//!
//! `defaults/wml.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`WmlConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use wml_parser::wml::preprocessing::{UndefinedMacroPolicy, VersionError};
use wml_parser::{PathResolver, PreprocessorOptions};

const DEFAULT_TOML: &str = include_str!("../defaults/wml.default.toml");

/// Top-level configuration consumed by WML applications.
#[derive(Debug, Clone, Deserialize)]
pub struct WmlConfig {
    pub paths: PathsConfig,
    pub preprocessor: PreprocessorConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

/// Where data lives on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    pub data_dir: PathBuf,
    pub user_data_dir: PathBuf,
    /// Preprocessed, in order, before any input.
    pub include: Vec<PathBuf>,
}

/// Mirrors [`PreprocessorOptions`], with the version kept as text until
/// [`PreprocessorConfig::options`] validates it.
#[derive(Debug, Clone, Deserialize)]
pub struct PreprocessorConfig {
    pub max_depth: usize,
    pub undefined_macro: UndefinedMacroPolicy,
    pub reference_version: String,
    pub include_extensions: Vec<String>,
    pub extract_records: bool,
}

/// Defaults for CSV export.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    pub tag: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl PathsConfig {
    pub fn resolver(&self) -> PathResolver {
        PathResolver::new(&self.data_dir, &self.user_data_dir)
    }
}

impl PreprocessorConfig {
    pub fn options(&self) -> Result<PreprocessorOptions, VersionError> {
        Ok(PreprocessorOptions {
            max_depth: self.max_depth,
            undefined_macro: self.undefined_macro,
            reference_version: self.reference_version.parse()?,
            include_extensions: self.include_extensions.clone(),
            extract_records: self.extract_records,
        })
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<WmlConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<WmlConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.paths.data_dir, PathBuf::from("."));
        assert!(config.paths.include.is_empty());
        assert_eq!(config.preprocessor.max_depth, 100);
        assert_eq!(config.preprocessor.undefined_macro, UndefinedMacroPolicy::Error);
        assert_eq!(config.export.tag, "unit_type");
        assert_eq!(config.export.columns[0], "id");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn defaults_match_preprocessor_defaults() {
        let config = load_defaults().expect("defaults to deserialize");
        let options = config.preprocessor.options().expect("valid version");
        let builtin = PreprocessorOptions::default();
        assert_eq!(options.max_depth, builtin.max_depth);
        assert_eq!(options.reference_version, builtin.reference_version);
        assert_eq!(options.include_extensions, builtin.include_extensions);
        assert_eq!(options.extract_records, builtin.extract_records);
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("preprocessor.undefined_macro", "passthrough")
            .expect("override to apply")
            .set_override("paths.include", vec!["core/macros"])
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(
            config.preprocessor.undefined_macro,
            UndefinedMacroPolicy::Passthrough
        );
        assert_eq!(config.paths.include, vec![PathBuf::from("core/macros")]);
    }

    #[test]
    fn user_files_layer_over_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("wml.toml");
        fs::write(
            &path,
            "[paths]\ndata_dir = \"/opt/wesnoth/data\"\n\n[preprocessor]\nmax_depth = 12\n",
        )
        .expect("write config");

        let config = Loader::new().with_file(&path).build().expect("config to build");
        assert_eq!(config.paths.data_dir, PathBuf::from("/opt/wesnoth/data"));
        assert_eq!(config.paths.user_data_dir, PathBuf::from("."));
        assert_eq!(config.preprocessor.max_depth, 12);
        assert_eq!(
            config.paths.resolver().data_dir(),
            Path::new("/opt/wesnoth/data")
        );
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("absent.toml");
        assert!(Loader::new().with_file(&missing).build().is_err());
        assert!(Loader::new().with_optional_file(&missing).build().is_ok());
    }

    #[test]
    fn invalid_versions_are_rejected() {
        let config = Loader::new()
            .set_override("preprocessor.reference_version", "latest")
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert!(config.preprocessor.options().is_err());
    }
}

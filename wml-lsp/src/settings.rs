//! Server settings
//!
//!     Settings start from the `wml-config` configuration the binary loads and are
//!     then overridden by the client's `initializationOptions`:
//!
//!         {
//!             "inputPath": "/path/to/campaign/_main.cfg",
//!             "dataDir": "/usr/share/wesnoth/data",
//!             "userDataDir": "~/.local/share/wesnoth/1.18/data",
//!             "includePaths": ["/usr/share/wesnoth/data/core/macros"]
//!         }
//!
//!     Every key is optional. Unknown keys are ignored.

use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;
use tracing::warn;
use wml_config::WmlConfig;
use wml_parser::wml::preprocessing::VersionError;
use wml_parser::{MacroTable, PathResolver, PreprocessError, Preprocessor, PreprocessorOptions};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializationOptions {
    pub input_path: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub user_data_dir: Option<PathBuf>,
    pub include_paths: Option<Vec<PathBuf>>,
}

impl InitializationOptions {
    /// Reads the options a client sent. Malformed options are logged and ignored.
    pub fn from_value(value: Option<Value>) -> Self {
        match value.map(serde_json::from_value::<Self>) {
            Some(Ok(options)) => options,
            Some(Err(err)) => {
                warn!(error = %err, "ignoring malformed initializationOptions");
                Self::default()
            }
            None => Self::default(),
        }
    }
}

/// Everything a workspace parse needs.
#[derive(Debug, Clone, Default)]
pub struct ServerSettings {
    pub input_path: Option<PathBuf>,
    pub include_paths: Vec<PathBuf>,
    pub resolver: PathResolver,
    pub options: PreprocessorOptions,
}

impl ServerSettings {
    pub fn from_config(config: &WmlConfig) -> Result<Self, VersionError> {
        let mut options = config.preprocessor.options()?;
        // Records are never looked at by the server.
        options.extract_records = false;
        Ok(Self {
            input_path: None,
            include_paths: config.paths.include.clone(),
            resolver: config.paths.resolver(),
            options,
        })
    }

    pub fn apply(&mut self, overrides: InitializationOptions) {
        if let Some(input) = overrides.input_path {
            self.input_path = Some(input);
        }
        if let Some(include) = overrides.include_paths {
            self.include_paths = include;
        }
        if overrides.data_dir.is_some() || overrides.user_data_dir.is_some() {
            let data_dir = overrides
                .data_dir
                .unwrap_or_else(|| self.resolver.data_dir().to_path_buf());
            let user_data_dir = overrides
                .user_data_dir
                .unwrap_or_else(|| self.resolver.user_data_dir().to_path_buf());
            self.resolver = PathResolver::new(data_dir, user_data_dir);
        }
    }

    /// Whether there is anything to parse.
    pub fn is_configured(&self) -> bool {
        self.input_path.is_some() || !self.include_paths.is_empty()
    }
}

/// Preprocesses the include paths, then the input path, into one macro table.
///
/// Blocking; the server runs it off the async executor.
pub fn parse_workspace(settings: &ServerSettings) -> Result<MacroTable, PreprocessError> {
    let mut preprocessor = Preprocessor::new(settings.resolver.clone(), settings.options.clone());
    for path in &settings.include_paths {
        preprocessor.subparse(path)?;
    }
    if let Some(input) = &settings.input_path {
        preprocessor.subparse(input)?;
    }
    Ok(preprocessor.take_defines())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;

    #[test]
    fn reads_camel_case_options() {
        let options = InitializationOptions::from_value(Some(json!({
            "inputPath": "campaign/_main.cfg",
            "dataDir": "/data",
            "includePaths": ["/data/core/macros"],
            "somethingElse": true
        })));
        assert_eq!(options.input_path, Some(PathBuf::from("campaign/_main.cfg")));
        assert_eq!(options.data_dir, Some(PathBuf::from("/data")));
        assert!(options.user_data_dir.is_none());
        assert_eq!(
            options.include_paths,
            Some(vec![PathBuf::from("/data/core/macros")])
        );
    }

    #[test]
    fn malformed_options_are_ignored() {
        let options = InitializationOptions::from_value(Some(json!({ "inputPath": 3 })));
        assert_eq!(options, InitializationOptions::default());
        assert_eq!(
            InitializationOptions::from_value(None),
            InitializationOptions::default()
        );
    }

    #[test]
    fn overrides_replace_configured_values() {
        let config = wml_config::load_defaults().expect("defaults");
        let mut settings = ServerSettings::from_config(&config).expect("settings");
        assert!(!settings.is_configured());
        assert!(!settings.options.extract_records);

        settings.apply(InitializationOptions {
            user_data_dir: Some(PathBuf::from("/home/me/wesnoth")),
            input_path: Some(PathBuf::from("main.cfg")),
            ..InitializationOptions::default()
        });
        assert!(settings.is_configured());
        assert_eq!(settings.resolver.data_dir(), Path::new("."));
        assert_eq!(
            settings.resolver.user_data_dir(),
            Path::new("/home/me/wesnoth")
        );
    }

    #[test]
    fn parses_includes_before_the_input() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join("macros.cfg"), "#define A\n#enddef\n").expect("write");
        std::fs::write(dir.path().join("main.cfg"), "#ifdef A\n#define B\n#enddef\n#endif\n")
            .expect("write");

        let settings = ServerSettings {
            input_path: Some(dir.path().join("main.cfg")),
            include_paths: vec![dir.path().join("macros.cfg")],
            ..ServerSettings::default()
        };
        let table = parse_workspace(&settings).expect("parse");
        assert_eq!(table.names(), vec!["A", "B"]);
    }
}

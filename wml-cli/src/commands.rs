//! Subcommand implementations
//!
//! Every command that preprocesses first runs the configured include paths through
//! the same session, so their macros are visible to the inputs.

use anyhow::Context;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use wml_config::WmlConfig;
use wml_parser::wml::records::RecordTable;
use wml_parser::wml::sanitize::sanitize_path;
use wml_parser::{lex, Preprocessor, PreprocessorOptions};

pub struct Workspace {
    config: WmlConfig,
    options: PreprocessorOptions,
}

pub struct ExportArgs {
    pub paths: Vec<PathBuf>,
    pub tag: Option<String>,
    pub columns: Option<Vec<String>>,
    pub output: Option<PathBuf>,
}

impl Workspace {
    pub fn new(config: WmlConfig) -> anyhow::Result<Self> {
        let options = config
            .preprocessor
            .options()
            .context("invalid preprocessor configuration")?;
        Ok(Self { config, options })
    }

    /// A preprocessor that has already consumed the include paths.
    fn preprocessor(&self, options: PreprocessorOptions) -> anyhow::Result<Preprocessor> {
        let mut preprocessor = Preprocessor::new(self.config.paths.resolver(), options);
        for include in &self.config.paths.include {
            preprocessor.subparse(include)?;
        }
        Ok(preprocessor)
    }

    pub fn preprocess(&self, paths: &[PathBuf], output: Option<&PathBuf>) -> anyhow::Result<()> {
        let mut preprocessor = self.preprocessor(self.options.clone())?;
        let mut text = String::new();
        for path in paths {
            text.push_str(&preprocessor.subparse(path)?);
        }
        info!(macros = preprocessor.defines().len(), "preprocessed");
        emit(output.map(PathBuf::as_path), text.as_bytes())
    }

    pub fn defines(&self, paths: &[PathBuf]) -> anyhow::Result<()> {
        let mut preprocessor = self.preprocessor(self.options.clone())?;
        for path in paths {
            preprocessor.subparse(path)?;
        }
        let mut listing = String::new();
        for definition in preprocessor.defines().rows() {
            listing.push_str(&format!("{}\t{}\n", definition.signature(), definition.site));
        }
        emit(None, listing.as_bytes())
    }

    pub fn export(&self, args: ExportArgs) -> anyhow::Result<()> {
        let options = PreprocessorOptions {
            extract_records: true,
            ..self.options.clone()
        };
        let mut preprocessor = self.preprocessor(options)?;
        for path in &args.paths {
            preprocessor.subparse(path)?;
        }

        let tag = args.tag.unwrap_or_else(|| self.config.export.tag.clone());
        let columns = args
            .columns
            .unwrap_or_else(|| self.config.export.columns.clone());
        let table = RecordTable::project(preprocessor.extracted_records(), &tag, &columns);
        info!(tag = %tag, rows = table.rows.len(), "exporting records");
        let csv = table.to_csv_string().context("failed to encode CSV")?;
        emit(args.output.as_deref(), csv.as_bytes())
    }

    pub fn sanitize(&self, path: &Path) -> anyhow::Result<()> {
        let changed = sanitize_path(path, &self.options.include_extensions)?;
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for file in changed {
            writeln!(out, "Changed: {}", file.display())?;
        }
        Ok(())
    }
}

pub fn tokens(path: &Path, format: &str) -> anyhow::Result<()> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let tokens = lex(&source);
    let rendered = match format {
        "json" => serde_json::to_string_pretty(&tokens).context("failed to serialize tokens")?,
        _ => tokens
            .iter()
            .map(|token| format!("{} {:?}\n", token.kind, token.content))
            .collect(),
    };
    emit(None, rendered.as_bytes())
}

fn emit(output: Option<&Path>, bytes: &[u8]) -> anyhow::Result<()> {
    match output {
        Some(file) => fs::write(file, bytes)
            .with_context(|| format!("failed to write {}", file.display())),
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            out.write_all(bytes)?;
            out.flush()?;
            Ok(())
        }
    }
}

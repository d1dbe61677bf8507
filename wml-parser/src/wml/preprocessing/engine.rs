//! The preprocessing engine.
//!
//!     [Preprocessor] evaluates node lists against its [Session]. Macro expansion
//!     substitutes the call arguments into the body and evaluates the result as a
//!     fresh source with the depth counter raised by one; file inclusion does the
//!     same with a file's contents. Both stop at `max_depth`, so a macro that calls
//!     itself or a file that includes itself fails instead of recursing forever.

use super::call::MacroCall;
use super::conditional::{ConditionalFrame, ConditionalKind};
use super::directive::{Directive, DirectiveKind};
use super::error::PreprocessError;
use super::nodes::{build_nodes, BuildError, DefineBlock, Node};
use super::options::{PreprocessorOptions, UndefinedMacroPolicy};
use super::output::Output;
use super::session::Session;
use super::version::{Version, VersionOp};
use crate::wml::location::SourceSite;
use crate::wml::macros::{MacroDefinition, MacroTable};
use crate::wml::paths::{normalize, PathResolver};
use crate::wml::records::{extract_records, RecordNode};
use ignore::WalkBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};

/// Where the nodes being evaluated come from. Inside an expansion every
/// location is reported at the line of the outermost call (`anchor`).
#[derive(Debug, Clone, Copy)]
struct Origin<'p> {
    file: Option<&'p Path>,
    anchor: Option<usize>,
}

impl<'p> Origin<'p> {
    fn site(&self, line: usize) -> SourceSite {
        SourceSite::new(self.file, self.anchor.unwrap_or(line))
    }

    fn current(&self) -> &'p Path {
        self.file.unwrap_or(Path::new("."))
    }
}

#[derive(Debug)]
pub struct Preprocessor {
    session: Session,
    resolver: PathResolver,
    options: PreprocessorOptions,
}

impl Preprocessor {
    pub fn new(resolver: PathResolver, options: PreprocessorOptions) -> Self {
        Self::with_session(resolver, options, Session::new())
    }

    pub fn with_session(
        resolver: PathResolver,
        options: PreprocessorOptions,
        session: Session,
    ) -> Self {
        Self {
            session,
            resolver,
            options,
        }
    }

    /// Preprocesses a file, or every matching file below a directory, returning the
    /// flat output. Definitions, binary paths and records accumulate in the session.
    pub fn subparse(&mut self, path: impl AsRef<Path>) -> Result<String, PreprocessError> {
        let path = path.as_ref();
        let mut output = Output::new();
        let result = self.include(path, 0, None, &mut output);
        self.collect_binary_paths(&mut output);
        result?;

        let text = output.into_string();
        self.finish_run(&text);
        info!(
            path = %path.display(),
            macros = self.session.defines.len(),
            "preprocessed"
        );
        Ok(text)
    }

    /// Preprocesses in-memory text. `file` names the text's location, if any, for
    /// relative paths and error reports.
    pub fn preprocess_str(
        &mut self,
        source: &str,
        file: Option<&Path>,
    ) -> Result<String, PreprocessError> {
        let mut output = Output::new();
        if let Some(file) = file {
            self.session.include_stack.push(include_key(file));
        }
        let result = self.run(source, Origin { file, anchor: None }, 0, &mut output);
        if file.is_some() {
            self.session.include_stack.pop();
        }
        self.collect_binary_paths(&mut output);
        result?;

        let text = output.into_string();
        self.finish_run(&text);
        Ok(text)
    }

    pub fn defines(&self) -> &MacroTable {
        self.session.defines()
    }

    /// Replaces the macro table, e.g. to reuse the definitions of an earlier run.
    pub fn set_defines(&mut self, defines: MacroTable) {
        self.session.set_defines(defines);
    }

    pub fn take_defines(&mut self) -> MacroTable {
        self.session.take_defines()
    }

    pub fn binary_paths(&self) -> &[PathBuf] {
        self.session.binary_paths()
    }

    pub fn extracted_records(&self) -> &[RecordNode] {
        self.session.extracted_records()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn options(&self) -> &PreprocessorOptions {
        &self.options
    }

    fn finish_run(&mut self, text: &str) {
        if self.options.extract_records {
            let records = extract_records(text);
            debug!(count = records.len(), "extracted records");
            self.session.records.extend(records);
        }
    }

    fn collect_binary_paths(&mut self, output: &mut Output) {
        for path in output.take_binary_paths() {
            debug!(path = %path.display(), "binary path");
            self.session.add_binary_path(path);
        }
    }

    fn include(
        &mut self,
        path: &Path,
        depth: usize,
        from: Option<&SourceSite>,
        output: &mut Output,
    ) -> Result<(), PreprocessError> {
        if !path.is_dir() {
            return self.include_file(path, depth, from, output);
        }
        for file in self.directory_files(path)? {
            self.include_file(&file, depth, from, output)?;
        }
        Ok(())
    }

    fn directory_files(&self, dir: &Path) -> Result<Vec<PathBuf>, PreprocessError> {
        let mut files = Vec::new();
        let walker = WalkBuilder::new(dir)
            .standard_filters(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();
        for entry in walker {
            let entry = entry.map_err(|source| PreprocessError::Walk {
                path: dir.to_path_buf(),
                source,
            })?;
            let is_file = entry.file_type().is_some_and(|t| t.is_file());
            if is_file && self.wants(entry.path()) {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    fn wants(&self, file: &Path) -> bool {
        if self.options.include_extensions.is_empty() {
            return true;
        }
        file.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                self.options
                    .include_extensions
                    .iter()
                    .any(|wanted| wanted.eq_ignore_ascii_case(ext))
            })
    }

    fn include_file(
        &mut self,
        path: &Path,
        depth: usize,
        from: Option<&SourceSite>,
        output: &mut Output,
    ) -> Result<(), PreprocessError> {
        let key = include_key(path);
        if self.session.include_stack.contains(&key) {
            return Err(PreprocessError::IncludeCycle {
                path: path.to_path_buf(),
                site: from.cloned().unwrap_or_default(),
            });
        }
        let source = fs::read_to_string(path).map_err(|source| PreprocessError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(file = %path.display(), depth, "preprocessing file");
        self.session.include_stack.push(key);
        let origin = Origin {
            file: Some(path),
            anchor: None,
        };
        let result = self.run(&source, origin, depth, output);
        self.session.include_stack.pop();
        result
    }

    /// Evaluates one source text. Conditionals opened in it must be closed in it.
    fn run(
        &mut self,
        source: &str,
        origin: Origin<'_>,
        depth: usize,
        output: &mut Output,
    ) -> Result<(), PreprocessError> {
        let nodes = build_nodes(source).map_err(|err| match err {
            BuildError::UnterminatedDefine { name, line } => PreprocessError::UnterminatedDefine {
                name,
                site: origin.site(line),
            },
            BuildError::MissingArgName { line } => PreprocessError::InvalidDirective {
                directive: DirectiveKind::Arg,
                expected: "expects a parameter name",
                site: origin.site(line),
            },
        })?;

        let floor = self.session.conditionals.len();
        let result = nodes.into_iter().try_for_each(|node| {
            self.eval(node, origin, depth, floor, output)?;
            self.collect_binary_paths(output);
            Ok(())
        });

        let unclosed = self.session.conditionals.truncate(floor);
        result?;
        match unclosed {
            Some(frame) => Err(PreprocessError::UnterminatedConditional {
                kind: frame.kind,
                site: frame.site,
            }),
            None => Ok(()),
        }
    }

    fn eval(
        &mut self,
        node: Node,
        origin: Origin<'_>,
        depth: usize,
        floor: usize,
        output: &mut Output,
    ) -> Result<(), PreprocessError> {
        let active = self.session.conditionals.is_active();
        match node {
            Node::Token(token) => {
                if active {
                    output.write_token(&token);
                }
                Ok(())
            }
            Node::Call { call, raw, line } if active => {
                self.expand(&call, &raw, origin, origin.site(line), depth, output)
            }
            Node::Define(block) if active => self.define(block, origin),
            Node::Call { .. } | Node::Define(_) => Ok(()),
            Node::Directive { directive, line } => {
                self.directive(directive, origin, origin.site(line), active, floor)
            }
        }
    }

    fn define(&mut self, block: DefineBlock, origin: Origin<'_>) -> Result<(), PreprocessError> {
        let site = origin.site(block.line);
        let DefineBlock {
            header,
            body,
            arg_defaults,
            doc,
            ..
        } = block;
        let name = header.arg(0).ok_or_else(|| PreprocessError::InvalidDirective {
            directive: DirectiveKind::Define,
            expected: "expects a macro name",
            site: site.clone(),
        })?;

        let mut definition = MacroDefinition::new(name, body);
        for param in header.args.iter().skip(1) {
            match param.split_once('=') {
                Some((key, value)) => {
                    definition.defaults.insert(key.to_string(), value.to_string());
                }
                None => definition.params.push(param.clone()),
            }
        }
        definition.defaults.extend(arg_defaults);
        definition.doc = doc;
        definition.textdomain = self.session.textdomain.clone();
        definition.site = site;

        debug!(name = %definition.name, site = %definition.site, "defined macro");
        self.session.defines.define(definition);
        Ok(())
    }

    fn directive(
        &mut self,
        directive: Directive,
        origin: Origin<'_>,
        site: SourceSite,
        active: bool,
        floor: usize,
    ) -> Result<(), PreprocessError> {
        if let Some(kind) = ConditionalKind::from_directive(directive.kind) {
            // Conditions inside skipped regions are not evaluated.
            let frame_active =
                active && self.test_condition(kind, &directive, &site, origin)? != kind.is_negated();
            trace!(%site, %kind, active = frame_active, "conditional");
            self.session.conditionals.push(ConditionalFrame {
                kind,
                active: frame_active,
                else_seen: false,
                site,
            });
            return Ok(());
        }

        let stray = |site: SourceSite| PreprocessError::StrayDirective {
            directive: directive.kind,
            site,
        };
        match directive.kind {
            DirectiveKind::Else => {
                if self.session.conditionals.len() <= floor || !self.session.conditionals.flip() {
                    return Err(stray(site));
                }
                Ok(())
            }
            DirectiveKind::Endif => {
                if self.session.conditionals.len() <= floor {
                    return Err(stray(site));
                }
                self.session.conditionals.pop();
                Ok(())
            }
            _ if !active => Ok(()),
            DirectiveKind::Undef => {
                let name = required_arg(&directive, 0, "expects a macro name", &site)?;
                let removed = self.session.defines.undef(name);
                trace!(%site, name, removed, "undef");
                Ok(())
            }
            DirectiveKind::Textdomain => {
                let domain = required_arg(&directive, 0, "expects a domain name", &site)?;
                self.session.textdomain = Some(domain.to_string());
                Ok(())
            }
            DirectiveKind::Error => Err(PreprocessError::UserError {
                message: directive.rest.clone(),
                site,
            }),
            DirectiveKind::Warning | DirectiveKind::Deprecated => {
                warn!(%site, "{} {}", directive.kind, directive.rest);
                Ok(())
            }
            DirectiveKind::Define
            | DirectiveKind::Enddef
            | DirectiveKind::Arg
            | DirectiveKind::Endarg => Err(stray(site)),
            // opened above
            DirectiveKind::Ifdef
            | DirectiveKind::Ifndef
            | DirectiveKind::Ifhave
            | DirectiveKind::Ifnhave
            | DirectiveKind::Ifver
            | DirectiveKind::Ifnver => Ok(()),
        }
    }

    fn test_condition(
        &self,
        kind: ConditionalKind,
        directive: &Directive,
        site: &SourceSite,
        origin: Origin<'_>,
    ) -> Result<bool, PreprocessError> {
        match kind {
            ConditionalKind::Ifdef | ConditionalKind::Ifndef => {
                let name = required_arg(directive, 0, "expects a macro name", site)?;
                Ok(self.session.defines.contains(name))
            }
            ConditionalKind::Ifhave | ConditionalKind::Ifnhave => {
                let path = required_arg(directive, 0, "expects a path", site)?;
                Ok(self
                    .resolver
                    .exists(path, &self.session.binary_paths, origin.current()))
            }
            ConditionalKind::Ifver | ConditionalKind::Ifnver => self.test_version(directive, site),
        }
    }

    /// `#ifver OP VERSION` tests the reference version, `#ifver MACRO OP VERSION`
    /// the body of `MACRO`. An undefined `MACRO` fails the test.
    fn test_version(&self, directive: &Directive, site: &SourceSite) -> Result<bool, PreprocessError> {
        let invalid_version = |source| PreprocessError::InvalidVersion {
            source,
            site: site.clone(),
        };
        let (lhs, op, rhs) = match directive.args.as_slice() {
            [op, rhs] => (self.options.reference_version.clone(), op, rhs),
            [name, op, rhs] => match self.session.defines.lookup(name) {
                Some(definition) => (
                    definition.body.parse::<Version>().map_err(invalid_version)?,
                    op,
                    rhs,
                ),
                None => return Ok(false),
            },
            _ => {
                return Err(PreprocessError::InvalidDirective {
                    directive: directive.kind,
                    expected: "expects an operator and a version",
                    site: site.clone(),
                })
            }
        };
        let op: VersionOp = op.parse().map_err(invalid_version)?;
        let rhs: Version = rhs.parse().map_err(invalid_version)?;
        Ok(op.holds(&lhs, &rhs))
    }

    fn expand(
        &mut self,
        call: &MacroCall,
        raw: &str,
        origin: Origin<'_>,
        site: SourceSite,
        depth: usize,
        output: &mut Output,
    ) -> Result<(), PreprocessError> {
        if call.name.is_empty() {
            output.write_str(&format!("{{{}}}", raw));
            return Ok(());
        }
        if depth >= self.options.max_depth {
            return Err(PreprocessError::ExpansionDepthExceeded {
                name: call.name.clone(),
                limit: self.options.max_depth,
                site,
            });
        }

        if let Some(definition) = self.session.defines.lookup(&call.name).cloned() {
            let bound = call.bind(&definition);
            if bound.positional.len() != definition.arity() {
                return Err(PreprocessError::ArgumentCountMismatch {
                    name: call.name.clone(),
                    expected: definition.arity(),
                    found: bound.positional.len(),
                    site,
                });
            }
            let text = definition.substitute(&bound.positional, &bound.keywords);
            trace!(name = %call.name, depth, "expanding macro");
            let inner = Origin {
                file: origin.file,
                anchor: Some(site.line),
            };
            return self.run(&text, inner, depth + 1, output);
        }

        if call.args.is_empty() {
            let target =
                self.resolver
                    .resolve(&call.name, &self.session.binary_paths, origin.current());
            if target.exists() {
                debug!(%site, target = %target.display(), "including");
                return self.include(&target, depth + 1, Some(&site), output);
            }
        }

        match self.options.undefined_macro {
            UndefinedMacroPolicy::Error => Err(PreprocessError::UndefinedMacro {
                name: call.name.clone(),
                site,
            }),
            UndefinedMacroPolicy::Passthrough => {
                warn!(%site, name = %call.name, "undefined macro left in place");
                output.write_str(&format!("{{{}}}", raw));
                Ok(())
            }
        }
    }
}

fn required_arg<'d>(
    directive: &'d Directive,
    index: usize,
    expected: &'static str,
    site: &SourceSite,
) -> Result<&'d str, PreprocessError> {
    directive
        .arg(index)
        .ok_or_else(|| PreprocessError::InvalidDirective {
            directive: directive.kind,
            expected,
            site: site.clone(),
        })
}

fn include_key(path: &Path) -> PathBuf {
    normalize(&std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()))
}

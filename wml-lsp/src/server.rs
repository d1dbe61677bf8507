//! Main language server implementation

use std::collections::HashMap;
use std::sync::Arc;

use crate::settings::{parse_workspace, InitializationOptions, ServerSettings};
use tokio::sync::{Mutex, RwLock};
use tower_lsp::async_trait;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    CompletionItem, CompletionOptions, CompletionParams, CompletionResponse,
    CompletionTriggerKind, Diagnostic, DidChangeTextDocumentParams, DidCloseTextDocumentParams,
    DidOpenTextDocumentParams, DidSaveTextDocumentParams, Documentation, GotoDefinitionParams,
    GotoDefinitionResponse, Hover, HoverContents, HoverParams, HoverProviderCapability,
    InitializeParams, InitializeResult, InitializedParams, Location, MarkupContent, MarkupKind,
    MessageType, OneOf, Position, Range, ServerCapabilities, ServerInfo, TextDocumentItem,
    TextDocumentSyncCapability, TextDocumentSyncKind, TextDocumentSyncOptions,
    TextDocumentSyncSaveOptions, Url,
};
use tower_lsp::Client;
use tracing::{debug, error, info, warn};
use wml_analysis::completion::TRIGGER_CHARACTERS;
use wml_analysis::{
    completion_items, error_diagnostic, goto_definition, hover as compute_hover,
    CompletionCandidate, CompletionTrigger, DefinitionTarget, ErrorDiagnostic, HoverResult,
};
use wml_parser::wml::location::Position as SourcePosition;
use wml_parser::MacroTable;

pub const READY_MESSAGE: &str = "WML LSP Server ready!";

/// The part of the client the server talks back to.
#[async_trait]
pub trait LspClient: Send + Sync + Clone + 'static {
    async fn show_message(&self, typ: MessageType, message: String);
    async fn publish_diagnostics(&self, uri: Url, diagnostics: Vec<Diagnostic>);
}

#[async_trait]
impl LspClient for Client {
    async fn show_message(&self, typ: MessageType, message: String) {
        Client::show_message(self, typ, message).await;
    }

    async fn publish_diagnostics(&self, uri: Url, diagnostics: Vec<Diagnostic>) {
        Client::publish_diagnostics(self, uri, diagnostics, None).await;
    }
}

pub trait FeatureProvider: Send + Sync + 'static {
    fn hover(&self, defines: &MacroTable, source: &str, position: SourcePosition)
        -> Option<HoverResult>;
    fn definition(
        &self,
        defines: &MacroTable,
        source: &str,
        position: SourcePosition,
    ) -> Option<DefinitionTarget>;
    fn completion(&self, defines: &MacroTable, trigger: CompletionTrigger)
        -> Vec<CompletionCandidate>;
}

#[derive(Default)]
pub struct DefaultFeatureProvider;

impl DefaultFeatureProvider {
    pub fn new() -> Self {
        Self
    }
}

impl FeatureProvider for DefaultFeatureProvider {
    fn hover(
        &self,
        defines: &MacroTable,
        source: &str,
        position: SourcePosition,
    ) -> Option<HoverResult> {
        compute_hover(defines, source, position)
    }

    fn definition(
        &self,
        defines: &MacroTable,
        source: &str,
        position: SourcePosition,
    ) -> Option<DefinitionTarget> {
        goto_definition(defines, source, position)
    }

    fn completion(
        &self,
        defines: &MacroTable,
        trigger: CompletionTrigger,
    ) -> Vec<CompletionCandidate> {
        completion_items(defines, trigger)
    }
}

/// Texts of the documents the client has open.
#[derive(Default)]
struct DocumentStore {
    entries: RwLock<HashMap<Url, Arc<String>>>,
}

impl DocumentStore {
    async fn upsert(&self, uri: Url, text: String) {
        self.entries.write().await.insert(uri, Arc::new(text));
    }

    async fn get(&self, uri: &Url) -> Option<Arc<String>> {
        self.entries.read().await.get(uri).cloned()
    }

    async fn remove(&self, uri: &Url) {
        self.entries.write().await.remove(uri);
    }
}

/// Parse state. Guarded by one mutex so parses never overlap and queries never
/// see a half-built table.
#[derive(Default)]
struct Workspace {
    settings: ServerSettings,
    defines: Option<Arc<MacroTable>>,
    /// File holding the diagnostic of the last failed parse.
    failed: Option<Url>,
}

pub struct WmlLanguageServer<C = Client, P = DefaultFeatureProvider> {
    client: C,
    documents: DocumentStore,
    workspace: Mutex<Workspace>,
    features: Arc<P>,
}

impl WmlLanguageServer<Client, DefaultFeatureProvider> {
    pub fn new(client: Client) -> Self {
        Self::with_settings(client, ServerSettings::default())
    }
}

impl<C> WmlLanguageServer<C, DefaultFeatureProvider>
where
    C: LspClient,
{
    pub fn with_settings(client: C, settings: ServerSettings) -> Self {
        Self::with_features(client, settings, Arc::new(DefaultFeatureProvider::new()))
    }
}

impl<C, P> WmlLanguageServer<C, P>
where
    C: LspClient,
    P: FeatureProvider,
{
    pub fn with_features(client: C, settings: ServerSettings, features: Arc<P>) -> Self {
        Self {
            client,
            documents: DocumentStore::default(),
            workspace: Mutex::new(Workspace {
                settings,
                ..Workspace::default()
            }),
            features,
        }
    }

    /// The current macro table, if a parse has succeeded.
    pub async fn defines(&self) -> Option<Arc<MacroTable>> {
        self.workspace.lock().await.defines.clone()
    }

    /// Re-runs the workspace parse. On failure the previous table stays in place
    /// and the error is shown and published against the failing file.
    pub async fn reparse(&self) {
        let mut workspace = self.workspace.lock().await;
        if !workspace.settings.is_configured() {
            debug!("no input configured, skipping parse");
            return;
        }

        let settings = workspace.settings.clone();
        let parsed = tokio::task::spawn_blocking(move || parse_workspace(&settings)).await;
        match parsed {
            Ok(Ok(table)) => {
                let count = table.len();
                workspace.defines = Some(Arc::new(table));
                if let Some(uri) = workspace.failed.take() {
                    self.client.publish_diagnostics(uri, Vec::new()).await;
                }
                info!(macros = count, "workspace parsed");
                self.client
                    .show_message(
                        MessageType::INFO,
                        format!("Parsed, total {} macros defined.", count),
                    )
                    .await;
            }
            Ok(Err(err)) => {
                warn!(error = %err, "workspace parse failed");
                self.client
                    .show_message(MessageType::ERROR, format!("Parsing error: {}", err))
                    .await;
                let ErrorDiagnostic { uri, diagnostic } = error_diagnostic(&err);
                if let Some(previous) = workspace.failed.take() {
                    if Some(&previous) != uri.as_ref() {
                        self.client.publish_diagnostics(previous, Vec::new()).await;
                    }
                }
                if let Some(uri) = uri {
                    self.client
                        .publish_diagnostics(uri.clone(), vec![diagnostic])
                        .await;
                    workspace.failed = Some(uri);
                }
            }
            Err(join_error) => error!(error = %join_error, "parse task failed"),
        }
    }

    /// Open buffer text, falling back to the file on disk.
    async fn document_text(&self, uri: &Url) -> Option<Arc<String>> {
        if let Some(text) = self.documents.get(uri).await {
            return Some(text);
        }
        let path = uri.to_file_path().ok()?;
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Some(Arc::new(text)),
            Err(err) => {
                debug!(path = %path.display(), error = %err, "document not readable");
                None
            }
        }
    }

    async fn query_inputs(&self, uri: &Url) -> Option<(Arc<MacroTable>, Arc<String>)> {
        let defines = self.defines().await?;
        let text = self.document_text(uri).await?;
        Some((defines, text))
    }
}

/// Text of line `line`, without its terminator.
fn line_text(source: &str, line: usize) -> &str {
    source
        .split('\n')
        .nth(line)
        .map(|text| text.trim_end_matches('\r'))
        .unwrap_or("")
}

/// LSP columns count UTF-16 code units; the analysis layer counts chars.
fn from_lsp_position(source: &str, position: Position) -> SourcePosition {
    let line = position.line as usize;
    let target = position.character as usize;
    let mut units = 0;
    let mut column = 0;
    for c in line_text(source, line).chars() {
        if units >= target {
            break;
        }
        units += c.len_utf16();
        column += 1;
    }
    SourcePosition::new(line, column)
}

fn to_utf16_column(source: &str, line: usize, column: usize) -> usize {
    line_text(source, line)
        .chars()
        .take(column)
        .map(char::len_utf16)
        .sum()
}

fn line_range(line: usize, start: usize, end: usize) -> Range {
    Range::new(
        Position::new(line as u32, start as u32),
        Position::new(line as u32, end as u32),
    )
}

fn to_completion_item(candidate: CompletionCandidate) -> CompletionItem {
    CompletionItem {
        label: candidate.label,
        kind: Some(candidate.kind),
        detail: candidate.detail,
        documentation: candidate.documentation.map(Documentation::String),
        insert_text: candidate.insert_text,
        ..CompletionItem::default()
    }
}

fn completion_trigger(params: &CompletionParams) -> Option<CompletionTrigger> {
    match &params.context {
        Some(context) if context.trigger_kind == CompletionTriggerKind::TRIGGER_CHARACTER => {
            CompletionTrigger::from_character(context.trigger_character.as_deref())
        }
        _ => Some(CompletionTrigger::Invoked),
    }
}

#[async_trait]
impl<C, P> tower_lsp::LanguageServer for WmlLanguageServer<C, P>
where
    C: LspClient,
    P: FeatureProvider,
{
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let overrides = InitializationOptions::from_value(params.initialization_options);
        self.workspace.lock().await.settings.apply(overrides);

        let capabilities = ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Options(
                TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(TextDocumentSyncKind::FULL),
                    save: Some(TextDocumentSyncSaveOptions::Supported(true)),
                    ..TextDocumentSyncOptions::default()
                },
            )),
            hover_provider: Some(HoverProviderCapability::Simple(true)),
            definition_provider: Some(OneOf::Left(true)),
            completion_provider: Some(CompletionOptions {
                resolve_provider: Some(false),
                trigger_characters: Some(
                    TRIGGER_CHARACTERS.iter().map(|c| c.to_string()).collect(),
                ),
                ..CompletionOptions::default()
            }),
            ..ServerCapabilities::default()
        };

        Ok(InitializeResult {
            capabilities,
            server_info: Some(ServerInfo {
                name: "wml-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .show_message(MessageType::INFO, READY_MESSAGE.to_string())
            .await;
        self.reparse().await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let TextDocumentItem { uri, text, .. } = params.text_document;
        self.documents.upsert(uri, text).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        if let Some(change) = params.content_changes.into_iter().last() {
            self.documents
                .upsert(params.text_document.uri, change.text)
                .await;
        }
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        debug!(uri = %params.text_document.uri, "saved, reparsing");
        self.reparse().await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.documents.remove(&params.text_document.uri).await;
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let position_params = params.text_document_position_params;
        let Some((defines, text)) = self.query_inputs(&position_params.text_document.uri).await
        else {
            return Ok(None);
        };
        let position = from_lsp_position(&text, position_params.position);
        Ok(self
            .features
            .hover(&defines, &text, position)
            .map(|result| Hover {
                contents: HoverContents::Markup(MarkupContent {
                    kind: MarkupKind::Markdown,
                    value: result.contents,
                }),
                range: Some(line_range(
                    result.word.line,
                    to_utf16_column(&text, result.word.line, result.word.start),
                    to_utf16_column(&text, result.word.line, result.word.end),
                )),
            }))
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let position_params = params.text_document_position_params;
        let Some((defines, text)) = self.query_inputs(&position_params.text_document.uri).await
        else {
            return Ok(None);
        };
        let position = from_lsp_position(&text, position_params.position);
        Ok(self
            .features
            .definition(&defines, &text, position)
            .map(|target| {
                GotoDefinitionResponse::Scalar(Location::new(
                    target.uri,
                    line_range(target.line, 0, 1),
                ))
            }))
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let Some(trigger) = completion_trigger(&params) else {
            return Ok(None);
        };
        let defines = self.defines().await.unwrap_or_default();
        let items: Vec<CompletionItem> = self
            .features
            .completion(&defines, trigger)
            .into_iter()
            .map(to_completion_item)
            .collect();
        Ok(Some(CompletionResponse::Array(items)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower_lsp::lsp_types::{
        CompletionContext, TextDocumentIdentifier, TextDocumentPositionParams,
    };
    use tower_lsp::LanguageServer;
    use wml_parser::wml::testing::{write_file, MACRO_LIBRARY};

    #[derive(Clone, Default)]
    struct RecordingClient {
        messages: Arc<std::sync::Mutex<Vec<(MessageType, String)>>>,
        diagnostics: Arc<std::sync::Mutex<Vec<(Url, Vec<Diagnostic>)>>>,
    }

    #[async_trait]
    impl LspClient for RecordingClient {
        async fn show_message(&self, typ: MessageType, message: String) {
            self.messages.lock().unwrap().push((typ, message));
        }

        async fn publish_diagnostics(&self, uri: Url, diagnostics: Vec<Diagnostic>) {
            self.diagnostics.lock().unwrap().push((uri, diagnostics));
        }
    }

    impl RecordingClient {
        fn messages(&self) -> Vec<String> {
            self.messages
                .lock()
                .unwrap()
                .iter()
                .map(|(_, message)| message.clone())
                .collect()
        }
    }

    #[derive(Default)]
    struct MockFeatureProvider {
        hover_called: AtomicUsize,
        completion_called: AtomicUsize,
        last_trigger: std::sync::Mutex<Option<CompletionTrigger>>,
    }

    impl FeatureProvider for MockFeatureProvider {
        fn hover(&self, _: &MacroTable, _: &str, _: SourcePosition) -> Option<HoverResult> {
            self.hover_called.fetch_add(1, Ordering::SeqCst);
            None
        }

        fn definition(
            &self,
            _: &MacroTable,
            _: &str,
            _: SourcePosition,
        ) -> Option<DefinitionTarget> {
            None
        }

        fn completion(
            &self,
            _: &MacroTable,
            trigger: CompletionTrigger,
        ) -> Vec<CompletionCandidate> {
            self.completion_called.fetch_add(1, Ordering::SeqCst);
            *self.last_trigger.lock().unwrap() = Some(trigger);
            Vec::new()
        }
    }

    const DOCUMENT: &str = "[unit]\n    {GREET you}\n[/unit]\n";

    struct Fixture {
        dir: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().expect("temp dir");
            write_file(dir.path(), "core/macros.cfg", MACRO_LIBRARY).expect("write");
            write_file(dir.path(), "campaign/_main.cfg", DOCUMENT).expect("write");
            Self { dir }
        }

        fn path(&self, relative: &str) -> std::path::PathBuf {
            self.dir.path().join(relative)
        }

        fn uri(&self, relative: &str) -> Url {
            Url::from_file_path(self.path(relative)).expect("file uri")
        }

        fn settings(&self) -> ServerSettings {
            ServerSettings {
                input_path: Some(self.path("campaign/_main.cfg")),
                include_paths: vec![self.path("core")],
                ..ServerSettings::default()
            }
        }
    }

    fn position_params(uri: Url, line: u32, character: u32) -> TextDocumentPositionParams {
        TextDocumentPositionParams {
            text_document: TextDocumentIdentifier { uri },
            position: Position::new(line, character),
        }
    }

    fn hover_params(uri: Url, line: u32, character: u32) -> HoverParams {
        HoverParams {
            text_document_position_params: position_params(uri, line, character),
            work_done_progress_params: Default::default(),
        }
    }

    fn completion_params(uri: Url, trigger: Option<&str>) -> CompletionParams {
        CompletionParams {
            text_document_position: position_params(uri, 1, 5),
            work_done_progress_params: Default::default(),
            partial_result_params: Default::default(),
            context: Some(CompletionContext {
                trigger_kind: match trigger {
                    Some(_) => CompletionTriggerKind::TRIGGER_CHARACTER,
                    None => CompletionTriggerKind::INVOKED,
                },
                trigger_character: trigger.map(str::to_string),
            }),
        }
    }

    async fn save(server: &impl LanguageServer, uri: Url) {
        server
            .did_save(DidSaveTextDocumentParams {
                text_document: TextDocumentIdentifier { uri },
                text: None,
            })
            .await;
    }

    #[tokio::test]
    async fn initialize_advertises_capabilities() {
        let server = WmlLanguageServer::with_settings(RecordingClient::default(), ServerSettings::default());
        let result = server
            .initialize(InitializeParams::default())
            .await
            .unwrap();

        let capabilities = result.capabilities;
        assert!(capabilities.hover_provider.is_some());
        assert!(capabilities.definition_provider.is_some());
        let completion = capabilities.completion_provider.expect("completion");
        assert_eq!(
            completion.trigger_characters,
            Some(vec!["#".to_string(), "{".to_string()])
        );
    }

    #[tokio::test]
    async fn initialized_announces_and_parses() {
        let fixture = Fixture::new();
        let client = RecordingClient::default();
        let server = WmlLanguageServer::with_settings(client.clone(), fixture.settings());

        server.initialized(InitializedParams {}).await;

        assert_eq!(
            client.messages(),
            vec![
                READY_MESSAGE.to_string(),
                "Parsed, total 3 macros defined.".to_string()
            ]
        );
        assert_eq!(server.defines().await.expect("table").len(), 3);
    }

    #[tokio::test]
    async fn initialization_options_select_the_input() {
        let fixture = Fixture::new();
        let client = RecordingClient::default();
        let server = WmlLanguageServer::with_settings(client.clone(), ServerSettings::default());

        server
            .initialize(InitializeParams {
                initialization_options: Some(serde_json::json!({
                    "inputPath": fixture.path("campaign/_main.cfg"),
                    "includePaths": [fixture.path("core/macros.cfg")],
                })),
                ..InitializeParams::default()
            })
            .await
            .unwrap();
        server.initialized(InitializedParams {}).await;

        assert!(server.defines().await.expect("table").contains("GREET"));
    }

    #[tokio::test]
    async fn nothing_is_parsed_without_configuration() {
        let client = RecordingClient::default();
        let server = WmlLanguageServer::with_settings(client.clone(), ServerSettings::default());

        server.initialized(InitializedParams {}).await;

        assert_eq!(client.messages(), vec![READY_MESSAGE.to_string()]);
        assert!(server.defines().await.is_none());
    }

    #[tokio::test]
    async fn hover_and_definition_use_the_parsed_table() {
        let fixture = Fixture::new();
        let server = WmlLanguageServer::with_settings(RecordingClient::default(), fixture.settings());
        server.initialized(InitializedParams {}).await;
        let uri = fixture.uri("campaign/_main.cfg");

        let hover = server
            .hover(hover_params(uri.clone(), 1, 6))
            .await
            .unwrap()
            .expect("hover");
        match hover.contents {
            HoverContents::Markup(markup) => {
                assert!(markup.value.starts_with("**GREET[name]**\n\nGreets someone by name."))
            }
            other => panic!("unexpected hover contents: {:?}", other),
        }
        assert_eq!(hover.range, Some(line_range(1, 5, 10)));

        let definition = server
            .goto_definition(GotoDefinitionParams {
                text_document_position_params: position_params(uri, 1, 6),
                work_done_progress_params: Default::default(),
                partial_result_params: Default::default(),
            })
            .await
            .unwrap()
            .expect("definition");
        match definition {
            GotoDefinitionResponse::Scalar(location) => {
                assert_eq!(location.uri, fixture.uri("core/macros.cfg"));
                assert_eq!(location.range.start, Position::new(2, 0));
            }
            other => panic!("unexpected definition response: {:?}", other),
        }
    }

    #[tokio::test]
    async fn open_buffers_take_precedence_over_disk() {
        let fixture = Fixture::new();
        let server = WmlLanguageServer::with_settings(RecordingClient::default(), fixture.settings());
        server.initialized(InitializedParams {}).await;
        let uri = fixture.uri("campaign/_main.cfg");

        server
            .did_open(DidOpenTextDocumentParams {
                text_document: TextDocumentItem {
                    uri: uri.clone(),
                    language_id: "wml".into(),
                    version: 1,
                    text: "{RECT 1 2}\n".into(),
                },
            })
            .await;

        let hover = server
            .hover(hover_params(uri, 0, 2))
            .await
            .unwrap()
            .expect("hover");
        match hover.contents {
            HoverContents::Markup(markup) => assert!(markup.value.starts_with("**RECT[W, H]**")),
            other => panic!("unexpected hover contents: {:?}", other),
        }
    }

    #[test]
    fn columns_are_converted_from_utf16() {
        let source = "a=1\nname=\"😀\" {GREET x}\n";
        assert_eq!(
            from_lsp_position(source, Position::new(1, 12)),
            SourcePosition::new(1, 11)
        );
        assert_eq!(
            from_lsp_position(source, Position::new(0, 2)),
            SourcePosition::new(0, 2)
        );
        assert_eq!(to_utf16_column(source, 1, 10), 11);
        assert_eq!(to_utf16_column(source, 1, 15), 16);
    }

    #[tokio::test]
    async fn hover_ranges_count_utf16_units() {
        let fixture = Fixture::new();
        let server = WmlLanguageServer::with_settings(RecordingClient::default(), fixture.settings());
        server.initialized(InitializedParams {}).await;
        let uri = fixture.uri("campaign/_main.cfg");

        server
            .did_open(DidOpenTextDocumentParams {
                text_document: TextDocumentItem {
                    uri: uri.clone(),
                    language_id: "wml".into(),
                    version: 1,
                    text: "name=\"😀\" {GREET x}\n".into(),
                },
            })
            .await;

        let hover = server
            .hover(hover_params(uri, 0, 12))
            .await
            .unwrap()
            .expect("hover");
        assert_eq!(hover.range, Some(line_range(0, 11, 16)));
    }

    #[tokio::test]
    async fn completion_follows_the_trigger_character() {
        let fixture = Fixture::new();
        let server = WmlLanguageServer::with_settings(RecordingClient::default(), fixture.settings());
        server.initialized(InitializedParams {}).await;
        let uri = fixture.uri("campaign/_main.cfg");

        let labels = |response: Option<CompletionResponse>| match response {
            Some(CompletionResponse::Array(items)) => {
                items.into_iter().map(|item| item.label).collect::<Vec<_>>()
            }
            other => panic!("unexpected completion response: {:?}", other),
        };

        let macros = labels(server.completion(completion_params(uri.clone(), Some("{"))).await.unwrap());
        assert_eq!(macros, vec!["GREET[name]", "RECT[W, H]", "SIZED[SIZE=medium]"]);

        let directives = labels(server.completion(completion_params(uri.clone(), Some("#"))).await.unwrap());
        assert_eq!(directives.first().map(String::as_str), Some("define"));
        assert!(!directives.contains(&"GREET[name]".to_string()));

        let everything = labels(server.completion(completion_params(uri, None)).await.unwrap());
        assert_eq!(everything.len(), directives.len() + macros.len());
    }

    #[tokio::test]
    async fn directive_completion_works_before_any_parse() {
        let server = WmlLanguageServer::with_settings(RecordingClient::default(), ServerSettings::default());
        let uri = Url::parse("file:///tmp/none.cfg").unwrap();

        let response = server
            .completion(completion_params(uri, Some("#")))
            .await
            .unwrap();
        match response {
            Some(CompletionResponse::Array(items)) => {
                assert!(items.iter().any(|item| item.label == "ifdef"))
            }
            other => panic!("unexpected completion response: {:?}", other),
        }
    }

    #[tokio::test]
    async fn failed_reparse_keeps_the_previous_table() {
        let fixture = Fixture::new();
        let client = RecordingClient::default();
        let server = WmlLanguageServer::with_settings(client.clone(), fixture.settings());
        server.initialized(InitializedParams {}).await;

        write_file(fixture.dir.path(), "campaign/_main.cfg", "[unit]\n{GREET}\n[/unit]\n")
            .expect("write");
        let main = fixture.uri("campaign/_main.cfg");
        save(&server, main.clone()).await;

        let messages = client.messages();
        let last = messages.last().expect("message");
        assert!(last.starts_with("Parsing error: "));
        assert!(last.ends_with("Expected 1 but got 0."));
        assert_eq!(server.defines().await.expect("table").len(), 3);

        {
            let published = client.diagnostics.lock().unwrap();
            let (uri, diagnostics) = published.last().expect("diagnostic");
            assert_eq!(uri, &main);
            assert_eq!(diagnostics.len(), 1);
            assert_eq!(diagnostics[0].range.start, Position::new(1, 0));
        }

        write_file(fixture.dir.path(), "campaign/_main.cfg", DOCUMENT).expect("write");
        save(&server, main.clone()).await;

        let published = client.diagnostics.lock().unwrap();
        let (uri, diagnostics) = published.last().expect("cleared");
        assert_eq!(uri, &main);
        assert!(diagnostics.is_empty());
    }

    #[tokio::test]
    async fn queries_reach_the_feature_provider() {
        let fixture = Fixture::new();
        let provider = Arc::new(MockFeatureProvider::default());
        let server = WmlLanguageServer::with_features(
            RecordingClient::default(),
            fixture.settings(),
            provider.clone(),
        );

        // No table yet: hover does not consult the provider.
        let uri = fixture.uri("campaign/_main.cfg");
        assert!(server.hover(hover_params(uri.clone(), 1, 6)).await.unwrap().is_none());
        assert_eq!(provider.hover_called.load(Ordering::SeqCst), 0);

        server.initialized(InitializedParams {}).await;
        server.hover(hover_params(uri.clone(), 1, 6)).await.unwrap();
        assert_eq!(provider.hover_called.load(Ordering::SeqCst), 1);

        server.completion(completion_params(uri.clone(), Some("{"))).await.unwrap();
        assert_eq!(
            *provider.last_trigger.lock().unwrap(),
            Some(CompletionTrigger::Macro)
        );
        let unrelated = server.completion(completion_params(uri, Some("["))).await.unwrap();
        assert!(unrelated.is_none());
        assert_eq!(provider.completion_called.load(Ordering::SeqCst), 1);
    }
}

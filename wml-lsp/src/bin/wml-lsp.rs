use tokio::io::{stdin, stdout};
use tower_lsp::{LspService, Server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wml_config::Loader;
use wml_lsp::{ServerSettings, WmlLanguageServer};

#[tokio::main]
async fn main() {
    // stdout carries the protocol, logs go to stderr.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wml_lsp=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = match Loader::new()
        .with_optional_file("wml.toml")
        .build()
        .map_err(|err| err.to_string())
        .and_then(|config| ServerSettings::from_config(&config).map_err(|err| err.to_string()))
    {
        Ok(settings) => settings,
        Err(err) => {
            tracing::warn!(error = %err, "falling back to default settings");
            ServerSettings::default()
        }
    };

    tracing::info!("starting WML language server");
    let (service, socket) =
        LspService::new(move |client| WmlLanguageServer::with_settings(client, settings.clone()));
    Server::new(stdin(), stdout(), socket).serve(service).await;
}

// Raggit
// Main entry point for the raggit binary

use clap::Parser;
use raggit_engine::cli::{Cli, Command, ConfigAction, KeyAction};
use raggit_engine::config::Config;
use raggit_engine::handlers::{
    handle_ask, handle_config_path, handle_config_show, handle_fetch, handle_key_delete,
    handle_key_set, handle_serve, OutputFormat, RepoSource,
};
use raggit_engine::secrets::SecretManager;
use raggit_engine::telemetry::init_telemetry_with_level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Determine output format
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    // `config path` must work even when the file is broken
    if let Command::Config {
        action: ConfigAction::Path,
    } = cli.command
    {
        return handle_config_path(cli.config.as_deref(), format);
    }

    // Load configuration (or use custom path if provided)
    let config = if let Some(config_path) = &cli.config {
        Config::load_from_path(config_path)?
    } else {
        Config::load_or_create()?
    };

    // --log wins over core.log_level; RUST_LOG wins over both
    let level = cli.log.as_deref().unwrap_or(&config.core.log_level);
    init_telemetry_with_level(level);

    let version = env!("CARGO_PKG_VERSION");
    let commit = env!("GIT_COMMIT_HASH");
    let timestamp = env!("BUILD_TIMESTAMP");

    tracing::info!("Raggit v{} ({} - {})", version, commit, timestamp);

    match cli.command {
        Command::Serve { host, port } => {
            tracing::info!("Starting HTTP server...");
            handle_serve(config, host, port).await
        }

        Command::Ask {
            question,
            repo,
            path,
            target,
        } => {
            let source = RepoSource::from_args(repo, path, target)?;
            tracing::info!("Answering: {}", question);
            handle_ask(&config, question, source, format).await
        }

        Command::Fetch { url, target } => {
            tracing::info!("Fetching {}", url);
            handle_fetch(&config, &url, target.as_deref(), format).await
        }

        Command::Config { action } => match action {
            ConfigAction::Show => handle_config_show(&config, format),
            ConfigAction::Path => handle_config_path(cli.config.as_deref(), format),
        },

        Command::Key { action } => {
            let manager = SecretManager::default();
            match action {
                KeyAction::Set { provider } => {
                    handle_key_set(&manager, &provider, std::io::stdin().lock(), format)
                }
                KeyAction::Delete { provider } => handle_key_delete(&manager, &provider, format),
            }
        }
    }
}

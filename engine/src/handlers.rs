//! Command handlers for CLI operations
//!
//! - serve: run the HTTP server
//! - ask: one-shot question against a remote or local repository
//! - fetch: clone or update a repository
//! - config show / config path
//! - key set / key delete

use anyhow::{Context, Result};
use serde_json::json;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::conductor::RepoSession;
use crate::llm::router::LLMRouter;
use crate::llm::ModelInvoker;
use crate::provision;
use crate::secrets::{key_name_for, SecretCache, SecretManager};
use crate::service::AssistantService;

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// Where `ask` gets its working tree from
#[derive(Debug, Clone)]
pub enum RepoSource {
    Remote {
        url: String,
        target: Option<PathBuf>,
    },
    Local(PathBuf),
}

impl RepoSource {
    /// Resolve the `ask` flags; `target` only applies to a clone
    pub fn from_args(
        repo: Option<String>,
        path: Option<PathBuf>,
        target: Option<PathBuf>,
    ) -> Result<Self> {
        match (repo, path) {
            (Some(url), None) => Ok(RepoSource::Remote { url, target }),
            (None, Some(path)) => {
                if target.is_some() {
                    anyhow::bail!("--target only applies to --repo");
                }
                Ok(RepoSource::Local(path))
            }
            (Some(_), Some(_)) => anyhow::bail!("--repo and --path are mutually exclusive"),
            (None, None) => anyhow::bail!("Either --repo or --path is required"),
        }
    }
}

/// Build the router over every configured provider
pub fn build_router(config: &Config) -> Result<LLMRouter> {
    let secrets = Arc::new(SecretCache::new(Arc::new(SecretManager::default())));
    LLMRouter::from_config(&config.llm, secrets).context("Failed to initialize LLM providers")
}

async fn fetch_repository(config: &Config, url: &str, target: Option<&Path>) -> Result<PathBuf> {
    let parent = match target {
        Some(dir) => dir.to_path_buf(),
        None => config.clone_dir()?,
    };
    let root = provision::provision(url, &parent)
        .await
        .with_context(|| format!("Failed to load repository {}", url))?;
    Ok(root)
}

/// Start the HTTP server and block until it exits
pub async fn handle_serve(config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut server = config.server.clone();
    if let Some(host) = host {
        server.host = host;
    }
    if let Some(port) = port {
        server.port = port;
    }

    let router = build_router(&config)?;
    for (provider, healthy) in router.check_health().await {
        if healthy {
            tracing::info!("Provider {} available", provider);
        } else {
            tracing::warn!("Provider {} unavailable (missing API key?)", provider);
        }
    }

    let invoker: Arc<dyn ModelInvoker> = Arc::new(router);
    let service = AssistantService::new(Arc::new(config), invoker);

    api_server::serve(&server.bind_address(), Arc::new(service))
        .await
        .context("HTTP server failed")
}

/// Answer one question and print it
pub async fn handle_ask(
    config: &Config,
    question: String,
    source: RepoSource,
    format: OutputFormat,
) -> Result<()> {
    let root = match source {
        RepoSource::Remote { url, target } => {
            fetch_repository(config, &url, target.as_deref()).await?
        }
        RepoSource::Local(path) => provision::resolve_local(&path)?,
    };

    let invoker: Arc<dyn ModelInvoker> = Arc::new(build_router(config)?);
    let mut session = RepoSession::new(
        root.clone(),
        config.scan.clone(),
        config.pipeline.clone(),
        invoker,
    );

    let outcome = session
        .answer_query(&question)
        .await
        .context("Failed to answer question")?;

    match format {
        OutputFormat::Text => {
            println!("{}", outcome.answer);
        }
        OutputFormat::Json => {
            let output = json!({
                "status": "success",
                "repository": root,
                "response": outcome.answer,
                "context": outcome.trace.to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Clone or pull and print the working tree path
pub async fn handle_fetch(
    config: &Config,
    url: &str,
    target: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let root = fetch_repository(config, url, target).await?;

    match format {
        OutputFormat::Text => println!("Repository ready at {}", root.display()),
        OutputFormat::Json => {
            let output = json!({
                "status": "success",
                "repository": root,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

/// Print the effective configuration
pub fn handle_config_show(config: &Config, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            let text = toml::to_string_pretty(config).context("Failed to serialize config")?;
            print!("{}", text);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
    }
    Ok(())
}

/// Print the configuration file location
pub fn handle_config_path(custom: Option<&Path>, format: OutputFormat) -> Result<()> {
    let path = match custom {
        Some(path) => path.to_path_buf(),
        None => Config::default_config_path()?,
    };

    match format {
        OutputFormat::Text => println!("{}", path.display()),
        OutputFormat::Json => println!("{}", json!({ "path": path })),
    }
    Ok(())
}

fn key_name(provider: &str) -> Result<&'static str> {
    key_name_for(provider).with_context(|| format!("No API key is used by provider {}", provider))
}

/// Read one line from `input` and store it as `provider`'s API key
pub fn handle_key_set(
    manager: &SecretManager,
    provider: &str,
    mut input: impl BufRead,
    format: OutputFormat,
) -> Result<()> {
    let key = key_name(provider)?;

    let mut value = String::new();
    input
        .read_line(&mut value)
        .context("Failed to read key from stdin")?;
    manager.set_secret(key, value.trim())?;

    match format {
        OutputFormat::Text => println!("Stored {} in the keychain", key),
        OutputFormat::Json => println!("{}", json!({ "status": "success", "key": key })),
    }
    Ok(())
}

/// Remove `provider`'s API key from the keychain
pub fn handle_key_delete(
    manager: &SecretManager,
    provider: &str,
    format: OutputFormat,
) -> Result<()> {
    let key = key_name(provider)?;
    manager.delete_secret(key)?;

    match format {
        OutputFormat::Text => println!("Removed {} from the keychain", key),
        OutputFormat::Json => println!("{}", json!({ "status": "success", "key": key })),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LLMProvider;

    #[test]
    fn test_build_router_from_default_config() {
        let router = build_router(&Config::default()).unwrap();
        let names: Vec<_> = router.ordered_providers().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["gemini", "openai", "ollama"]);
    }

    #[tokio::test]
    async fn test_ask_local_path_must_exist() {
        let err = handle_ask(
            &Config::default(),
            "question".into(),
            RepoSource::Local(PathBuf::from("/definitely/not/here")),
            OutputFormat::Text,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("Path canonicalization failed"));
    }

    #[test]
    fn test_target_is_rejected_for_local_path() {
        let err = RepoSource::from_args(None, Some(PathBuf::from(".")), Some(PathBuf::from("/tmp")))
            .unwrap_err();
        assert!(err.to_string().contains("--target only applies to --repo"));

        let source = RepoSource::from_args(
            Some("https://github.com/acme/widgets.git".into()),
            None,
            Some(PathBuf::from("/tmp")),
        )
        .unwrap();
        assert!(matches!(
            source,
            RepoSource::Remote { target: Some(ref t), .. } if t == Path::new("/tmp")
        ));

        assert!(RepoSource::from_args(Some("u".into()), Some(PathBuf::from(".")), None).is_err());
        assert!(RepoSource::from_args(None, None, None).is_err());
    }

    #[test]
    fn test_key_set_rejects_empty_input() {
        let manager = SecretManager::new("raggit-test");
        let err = handle_key_set(&manager, "gemini", "\n".as_bytes(), OutputFormat::Text).unwrap_err();
        assert!(err.to_string().contains("Secret cannot be empty"));
    }

    #[test]
    fn test_key_commands_reject_keyless_provider() {
        let manager = SecretManager::new("raggit-test");
        let err = handle_key_set(&manager, "ollama", "abc\n".as_bytes(), OutputFormat::Text)
            .unwrap_err();
        assert!(err.to_string().contains("ollama"));
        assert!(handle_key_delete(&manager, "ollama", OutputFormat::Text).is_err());
    }
}

//! LLM Router
//!
//! Holds the configured providers with the default one first and tries them in
//! order, failing over on error. Implements `ModelInvoker` for the pipeline.

use super::gemini::GeminiProvider;
use super::ollama::OllamaProvider;
use super::openai::OpenAIProvider;
use super::{http_client, AgentProfile, LLMError, LLMProvider, Message, ModelInvoker, Task};
use crate::config::LLMConfig;
use crate::secrets::SecretCache;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// LLM Router with ordered failover
pub struct LLMRouter {
    providers: Vec<Box<dyn LLMProvider>>,
    default_provider: String,
    failover: bool,
}

impl LLMRouter {
    /// Create a new LLM router
    ///
    /// # Arguments
    /// * `providers` - Available providers, in fallback order
    /// * `default_provider` - Name of the provider tried first
    pub fn new(providers: Vec<Box<dyn LLMProvider>>, default_provider: impl Into<String>) -> Self {
        Self {
            providers,
            default_provider: default_provider.into(),
            failover: true,
        }
    }

    /// Only ever call the default provider
    pub fn without_failover(mut self) -> Self {
        self.failover = false;
        self
    }

    /// Build the Gemini, OpenAI and Ollama providers from config
    pub fn from_config(config: &LLMConfig, secrets: Arc<SecretCache>) -> super::Result<Self> {
        let client = http_client(Duration::from_secs(config.request_timeout_secs))?;

        let providers: Vec<Box<dyn LLMProvider>> = vec![
            Box::new(GeminiProvider::new(
                config.gemini.clone(),
                config.temperature,
                Arc::clone(&secrets),
                client.clone(),
            )),
            Box::new(OpenAIProvider::new(
                config.openai.clone(),
                config.temperature,
                Arc::clone(&secrets),
                client.clone(),
            )),
            Box::new(OllamaProvider::new(
                config.ollama.clone(),
                config.temperature,
                client,
            )),
        ];

        let router = Self::new(providers, config.default_provider.clone());
        Ok(if config.failover {
            router
        } else {
            router.without_failover()
        })
    }

    /// Providers in the order they are attempted: default first, then the rest
    /// in registration order.
    pub fn ordered_providers(&self) -> Vec<&dyn LLMProvider> {
        let mut providers: Vec<&dyn LLMProvider> =
            self.providers.iter().map(|b| b.as_ref()).collect();

        // Stable sort keeps registration order among the non-defaults
        providers.sort_by_key(|p| p.name() != self.default_provider);

        if !self.failover {
            providers.truncate(1);
        }
        providers
    }

    /// Call providers with automatic failover
    ///
    /// Returns the first successful completion and the name of the provider that
    /// produced it, or `LLMError::Exhausted` listing each provider's failure.
    pub async fn call(&self, messages: &[Message]) -> super::Result<(String, String)> {
        if self.providers.is_empty() {
            return Err(LLMError::ProviderUnavailable(
                "No LLM providers configured".to_string(),
            ));
        }

        let mut failures = Vec::new();
        let mut last_error = None;
        for provider in self.ordered_providers() {
            tracing::debug!("Attempting provider: {}", provider.name());

            match provider.generate(messages).await {
                Ok(response) => {
                    tracing::debug!("Provider {} succeeded", provider.name());
                    return Ok((response, provider.name().to_string()));
                }
                Err(e) => {
                    let cause = crate::secrets::scrub(&e.to_string());
                    tracing::warn!("Provider {} failed: {}", provider.name(), cause);
                    failures.push(format!("{}: {}", provider.name(), cause));
                    last_error = Some(e);
                }
            }
        }

        tracing::error!("All LLM providers exhausted");
        match last_error {
            Some(e) if !self.failover => Err(e),
            _ => Err(LLMError::Exhausted(failures)),
        }
    }

    /// Check the health of all registered providers
    /// Returns a list of (provider_name, is_healthy)
    pub async fn check_health(&self) -> Vec<(&str, bool)> {
        let mut results = Vec::new();
        for provider in &self.providers {
            let is_healthy = provider.check_health().await;
            results.push((provider.name(), is_healthy));
        }
        results
    }
}

#[async_trait]
impl ModelInvoker for LLMRouter {
    async fn invoke(&self, agent: &AgentProfile, task: &Task) -> super::Result<String> {
        let messages = agent.messages_for(task);
        let (text, provider) = self.call(&messages).await?;
        tracing::debug!(role = agent.role, provider = %provider, "model invocation complete");
        Ok(text)
    }
}

use crate::secrets::string::SecretString;
use crate::secrets::SecretManager;
use sdk::errors::EngineError;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

type EnvLookup = dyn Fn(&str) -> Option<String> + Send + Sync;

/// Environment variables checked for each provider key, in order
pub fn env_vars_for(key: &str) -> &'static [&'static str] {
    match key {
        "gemini_api_key" => &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
        "openai_api_key" => &["OPENAI_API_KEY"],
        _ => &[],
    }
}

/// In-memory cache of resolved API keys.
///
/// Resolution order: environment variables, then the OS keychain.
/// Found values are cached for the process lifetime; misses are not.
#[derive(Clone)]
pub struct SecretCache {
    manager: Arc<SecretManager>,
    env: Arc<EnvLookup>,
    cache: Arc<RwLock<HashMap<String, SecretString>>>,
}

impl SecretCache {
    /// Creates a new SecretCache reading the process environment
    pub fn new(manager: Arc<SecretManager>) -> Self {
        Self::with_env(manager, |name| {
            std::env::var(name).ok().filter(|v| !v.trim().is_empty())
        })
    }

    /// Creates a SecretCache with a custom environment lookup
    pub fn with_env(
        manager: Arc<SecretManager>,
        env: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            manager,
            env: Arc::new(env),
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Resolve a secret. `Ok(None)` when neither the environment nor the
    /// keychain has it.
    pub fn get_secret(&self, key: &str) -> Result<Option<SecretString>, EngineError> {
        {
            let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
            if let Some(secret) = cache.get(key) {
                return Ok(Some(secret.clone()));
            }
        }

        let from_env = env_vars_for(key).iter().find_map(|name| (self.env)(name));
        let raw_secret = match from_env {
            Some(value) => value,
            None => match self.manager.get_secret(key)? {
                Some(value) => value,
                None => return Ok(None),
            },
        };
        let secret = SecretString::new(raw_secret);

        {
            let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
            cache.insert(key.to_string(), secret.clone());
        }

        Ok(Some(secret))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_takes_precedence() {
        let cache = SecretCache::with_env(Arc::new(SecretManager::default()), |name| {
            (name == "GOOGLE_API_KEY").then(|| "from-env".to_string())
        });
        let secret = cache.get_secret("gemini_api_key").unwrap().unwrap();
        assert_eq!(secret.expose(), "from-env");
    }

    #[test]
    fn test_first_env_var_wins() {
        let cache = SecretCache::with_env(Arc::new(SecretManager::default()), |name| {
            Some(format!("value-of-{}", name))
        });
        let secret = cache.get_secret("gemini_api_key").unwrap().unwrap();
        assert_eq!(secret.expose(), "value-of-GEMINI_API_KEY");
    }

    #[test]
    fn test_unknown_key_has_no_env_vars() {
        assert!(env_vars_for("ollama_api_key").is_empty());
        assert_eq!(env_vars_for("openai_api_key"), &["OPENAI_API_KEY"]);
    }
}

//! Runtime configuration
//!
//! Read from the process environment (after `.env` is loaded by the binaries).

use crate::error::AgentError;
use crate::Result;
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "nomic-embed-text";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DIMENSION: usize = 256;
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_SESSIONS: usize = 1024;
const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingBackend {
    /// Offline feature-hashing embedder
    Hashing,
    /// Ollama-compatible `/api/embed` endpoint
    Http,
}

impl FromStr for EmbeddingBackend {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "hashing" | "hash" | "local" => Ok(EmbeddingBackend::Hashing),
            "http" | "ollama" => Ok(EmbeddingBackend::Http),
            other => Err(AgentError::ConfigError(format!(
                "unknown EMBEDDING_BACKEND '{}', expected 'hashing' or 'http'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub backend: EmbeddingBackend,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::Hashing,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            dimension: DEFAULT_DIMENSION,
        }
    }
}

/// Bounds on the API's in-memory session table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    pub max_sessions: usize,
    /// Sessions untouched for this long are dropped, ledger included.
    pub idle_timeout: Duration,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            max_sessions: DEFAULT_MAX_SESSIONS,
            idle_timeout: Duration::from_secs(DEFAULT_SESSION_IDLE_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub embedding: EmbeddingConfig,
    /// Reuse example embeddings across classifications.
    pub cache_examples: bool,
    pub port: u16,
    pub sessions: SessionLimits,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            embedding: EmbeddingConfig::default(),
            cache_examples: true,
            port: DEFAULT_PORT,
            sessions: SessionLimits::default(),
        }
    }
}

impl AgentConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AgentConfig::default();

        let backend = match lookup("EMBEDDING_BACKEND") {
            Some(v) => v.parse()?,
            None => defaults.embedding.backend,
        };

        let base_url = lookup("EMBEDDING_BASE_URL")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or(defaults.embedding.base_url);

        let model = lookup("EMBEDDING_MODEL").unwrap_or(defaults.embedding.model);

        let timeout = match lookup("EMBEDDING_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_number("EMBEDDING_TIMEOUT_SECS", &v)?),
            None => defaults.embedding.timeout,
        };

        let dimension = match lookup("EMBEDDING_DIMENSION") {
            Some(v) => parse_number("EMBEDDING_DIMENSION", &v)?,
            None => defaults.embedding.dimension,
        };
        if dimension == 0 {
            return Err(AgentError::ConfigError(
                "EMBEDDING_DIMENSION must be greater than zero".to_string(),
            ));
        }

        let cache_examples = match lookup("EXAMPLE_CACHE") {
            Some(v) => parse_bool("EXAMPLE_CACHE", &v)?,
            None => defaults.cache_examples,
        };

        let port = match lookup("PORT").or_else(|| lookup("API_PORT")) {
            Some(v) => parse_number("PORT", &v)?,
            None => defaults.port,
        };

        let max_sessions = match lookup("MAX_SESSIONS") {
            Some(v) => parse_number("MAX_SESSIONS", &v)?,
            None => defaults.sessions.max_sessions,
        };
        if max_sessions == 0 {
            return Err(AgentError::ConfigError(
                "MAX_SESSIONS must be greater than zero".to_string(),
            ));
        }

        let idle_timeout = match lookup("SESSION_IDLE_SECS") {
            Some(v) => Duration::from_secs(parse_number("SESSION_IDLE_SECS", &v)?),
            None => defaults.sessions.idle_timeout,
        };

        Ok(Self {
            embedding: EmbeddingConfig {
                backend,
                base_url,
                model,
                timeout,
                dimension,
            },
            cache_examples,
            port,
            sessions: SessionLimits {
                max_sessions,
                idle_timeout,
            },
        })
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| AgentError::ConfigError(format!("{} must be a number, got '{}'", key, value)))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AgentError::ConfigError(format!(
            "{} must be a boolean, got '{}'",
            key, value
        ))),
    }
}

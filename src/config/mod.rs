mod env_manager;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::error::{ChallengeError, Result};

pub use env_manager::{get_env_value, ApiKeys, GITHUB_TOKEN, GOOGLE_API_KEY, OPENAI_API_KEY};

/// Main configuration struct for the application
///
/// Built once per ranking session and handed to the constructors that need it;
/// nothing in the crate reads configuration from globals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitHub API access
    pub github: GitHubConfig,
    /// Chat model backend
    pub llm: LlmConfig,
    /// README lookup heuristics
    pub readme: ReadmeConfig,
    /// Ranking run settings
    pub scoring: ScoringConfig,
    /// Web server settings
    pub server: ServerConfig,
}

/// GitHub API access settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Base URL of the REST API
    pub api_base: String,
    /// Base URL serving raw file contents
    pub raw_base: String,
    /// Optional token sent as `Authorization: token <t>` to raise rate limits
    pub token: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent header, GitHub rejects requests without one
    pub user_agent: String,
    /// Behaviour on HTTP 429
    pub rate_limit: RateLimitConfig,
}

/// How the client waits out HTTP 429 responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Wait used when the response carries no `X-RateLimit-Reset` header
    pub default_reset_secs: u64,
    /// Added on top of the reset hint before retrying
    pub extra_wait_secs: u64,
    /// Total attempts per request, 0 retries forever
    pub max_attempts: u32,
}

/// Supported chat-completion backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// OpenAI or any server speaking its chat-completions API
    #[value(name = "openai")]
    OpenAi,
    /// Google Generative Language API
    Gemini,
}

impl LlmProvider {
    /// Model used when the configuration does not name one
    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o-mini",
            Self::Gemini => "gemini-pro",
        }
    }

    /// Environment variable the provider's API key is read from
    pub fn api_key_env(self) -> &'static str {
        match self {
            Self::OpenAi => OPENAI_API_KEY,
            Self::Gemini => GOOGLE_API_KEY,
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAi => f.write_str("openai"),
            Self::Gemini => f.write_str("gemini"),
        }
    }
}

impl FromStr for LlmProvider {
    type Err = ChallengeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "gemini" | "google" => Ok(Self::Gemini),
            other => Err(ChallengeError::Config(format!("Unknown LLM provider: {}", other))),
        }
    }
}

/// Chat model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Which backend to talk to
    pub provider: LlmProvider,
    /// Model name, falls back to the provider default
    pub model: Option<String>,
    /// API key for the selected provider
    pub api_key: Option<String>,
    /// Override for the provider's API base URL
    pub base_url: Option<String>,
    /// Sampling temperature, 0.0 (deterministic) to 1.0
    pub temperature: f32,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

/// Where the README is looked up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadmeSourceKind {
    /// `{html_url}/blob/master/README.md`
    BlobMaster,
    /// `{raw_base}/{owner}/{repo}/{default_branch}/README.md`
    DefaultBranch,
}

/// README lookup settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadmeConfig {
    /// URL heuristic used to find the README
    pub source: ReadmeSourceKind,
    /// README text is cut to this many characters before prompting
    pub max_chars: usize,
}

/// Ranking run settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Repositories scored at the same time, 1 keeps the run sequential
    pub max_concurrent: usize,
}

/// Web server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    pub bind_addr: String,
}

impl Config {
    /// Loads configuration from the default config file location
    ///
    /// If the config file doesn't exist, returns the default configuration.
    /// Environment overrides are applied on top in both cases.
    pub fn load() -> Result<Self> {
        let mut config = match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Default config file location, `<config dir>/repo-challenge/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("repo-challenge").join("config.toml"))
    }

    /// Reads a TOML config file, missing sections take their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ChallengeError::Config(format!("Failed to read config file {}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| ChallengeError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Applies overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_from(get_env_value);
    }

    /// Applies overrides from an arbitrary variable lookup
    ///
    /// Explicit values win over the file: the provider and model variables
    /// replace whatever was configured, keys only fill gaps.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base) = lookup("GITHUB_API_BASE_URL") {
            self.github.api_base = base;
        }
        if let Some(provider) = lookup("LLM_PROVIDER").and_then(|p| p.parse().ok()) {
            self.llm.provider = provider;
        }
        if let Some(model) = lookup("LLM_MODEL") {
            self.llm.model = Some(model);
        }
        if let Some(temperature) = lookup("LLM_TEMPERATURE").and_then(|t| t.parse().ok()) {
            self.llm.temperature = temperature;
        }
        if let Some(base) = lookup("OPENAI_BASE_URL") {
            if self.llm.provider == LlmProvider::OpenAi {
                self.llm.base_url = Some(base);
            }
        }
        if let Some(addr) = lookup("BIND_ADDR") {
            self.server.bind_addr = addr;
        }

        let keys = ApiKeys::from_lookup(&lookup);
        if self.github.token.is_none() {
            self.github.token = keys.github_token;
        }
        if self.llm.api_key.is_none() {
            self.llm.api_key = match self.llm.provider {
                LlmProvider::OpenAi => keys.openai_api_key,
                LlmProvider::Gemini => keys.google_api_key,
            };
        }
    }

    /// Validates the settings a ranking session depends on
    pub fn validate(&self) -> Result<()> {
        self.ensure_tokens()?;
        self.llm.validate()?;
        if self.scoring.max_concurrent == 0 {
            return Err(ChallengeError::Config("scoring.max_concurrent must be at least 1".into()));
        }
        if self.readme.max_chars == 0 {
            return Err(ChallengeError::Config("readme.max_chars must be at least 1".into()));
        }
        Ok(())
    }

    /// Rejects tokens that are configured but blank
    pub fn ensure_tokens(&self) -> Result<()> {
        if let Some(token) = &self.github.token {
            if token.trim().is_empty() {
                return Err(ChallengeError::Config("GitHub token is empty".into()));
            }
        }
        Ok(())
    }
}

impl LlmConfig {
    /// Model name to request, falling back to the provider default
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or_else(|| self.provider.default_model())
    }

    /// Returns the API key or a config error naming the variable to set
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                ChallengeError::Config(format!(
                    "No API key for provider {}; set {}",
                    self.provider,
                    self.provider.api_key_env()
                ))
            })
    }

    /// Checks temperature range and key presence
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ChallengeError::Config(format!(
                "llm.temperature must be within 0.0..=1.0, got {}",
                self.temperature
            )));
        }
        if self.temperature > 0.5 {
            log::warn!(
                "llm.temperature {} is above 0.5; complexity scores will vary between runs",
                self.temperature
            );
        }
        self.require_api_key().map(|_| ())
    }

    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl GitHubConfig {
    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            raw_base: "https://raw.githubusercontent.com".to_string(),
            token: None,
            timeout_secs: 30,
            user_agent: concat!("repo-challenge/", env!("CARGO_PKG_VERSION")).to_string(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            default_reset_secs: 60,
            extra_wait_secs: 10,
            max_attempts: 8,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Gemini,
            model: None,
            api_key: None,
            base_url: None,
            temperature: 0.3,
            timeout_secs: 120,
        }
    }
}

impl Default for ReadmeConfig {
    fn default() -> Self {
        Self {
            source: ReadmeSourceKind::BlobMaster,
            max_chars: 8000,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self { max_concurrent: 1 }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
        }
    }
}

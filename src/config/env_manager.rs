use serde::{Deserialize, Serialize};

/// Environment variable holding the OpenAI key
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
/// Environment variable holding the Google Generative Language key
pub const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
/// Environment variable holding the GitHub token
pub const GITHUB_TOKEN: &str = "GITHUB_TOKEN";

/// Stores API keys for the services the ranker talks to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeys {
    /// GitHub API token for authenticated requests
    pub github_token: Option<String>,
    /// OpenAI (or compatible) API key
    pub openai_api_key: Option<String>,
    /// Google Generative Language API key
    pub google_api_key: Option<String>,
}

impl ApiKeys {
    /// Loads API keys through an arbitrary lookup, empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            github_token: read(GITHUB_TOKEN),
            openai_api_key: read(OPENAI_API_KEY),
            google_api_key: read(GOOGLE_API_KEY),
        }
    }
}

/// Reads an environment variable, treating the empty string as missing
pub fn get_env_value(key: &str) -> Option<String> {
    let value = std::env::var(key).ok()?;
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

//! GitHub API access with a blocking wait on HTTP 429.
//!
//! Every call goes through [`RateLimitedClient::get`]. When GitHub answers
//! `429 Too Many Requests` the client reads `X-RateLimit-Reset`, sleeps for
//! the hinted time plus a fixed margin and sends the same request again.
//! Any other status is handed back as parsed JSON, error bodies included.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use crate::config::{GitHubConfig, RateLimitConfig};
use crate::error::{ChallengeError, Result};

/// Header GitHub uses to tell when the rate-limit window resets
pub const RATE_LIMIT_RESET_HEADER: &str = "x-ratelimit-reset";

/// Reset values above this are Unix timestamps rather than second counts
const EPOCH_THRESHOLD: u64 = 1_000_000_000;

/// Something that can pause the current task
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Waits for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// HTTP client for the GitHub REST API that waits out rate limits
#[derive(Clone)]
pub struct RateLimitedClient {
    client: Client,
    token: Option<String>,
    policy: RateLimitConfig,
    sleeper: Arc<dyn Sleeper>,
}

impl RateLimitedClient {
    /// Builds a client from the GitHub section of the configuration
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            token: config.token.clone(),
            policy: config.rate_limit.clone(),
            sleeper: Arc::new(TokioSleeper),
        })
    }

    /// Replaces the sleeper used while waiting out a rate limit
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Underlying reqwest client, for requests that bypass the rate-limit loop
    pub fn http(&self) -> &Client {
        &self.client
    }

    /// Issues a GET and returns the JSON body, retrying after each 429
    pub async fn get(&self, url: &str, params: Option<&[(&str, &str)]>) -> Result<Value> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;

            let mut request = self.client.get(url);
            if let Some(params) = params {
                request = request.query(params);
            }
            if let Some(token) = &self.token {
                request = request.header(AUTHORIZATION, format!("token {}", token));
            }

            debug!("GET {} (attempt {})", url, attempt);
            let response = request.send().await?;

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                let wait = rate_limit_wait(response.headers(), &self.policy, unix_now());
                if self.policy.max_attempts != 0 && attempt >= self.policy.max_attempts {
                    return Err(ChallengeError::RateLimitExceeded(format!(
                        "{} still rate limited after {} attempts",
                        url, attempt
                    )));
                }
                warn!("Rate limit exceeded, waiting for {} seconds.", wait.as_secs());
                self.sleeper.sleep(wait).await;
                continue;
            }

            let body = response.text().await?;
            return Ok(serde_json::from_str(&body)?);
        }
    }
}

/// How long to wait before retrying a 429 response
///
/// Small reset values are read as seconds to wait. Values that look like a
/// Unix timestamp are turned into the remaining time until that instant.
pub fn rate_limit_wait(headers: &HeaderMap, policy: &RateLimitConfig, now_epoch: u64) -> Duration {
    let reset = headers
        .get(RATE_LIMIT_RESET_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(policy.default_reset_secs);

    let reset = if reset > EPOCH_THRESHOLD {
        reset.saturating_sub(now_epoch)
    } else {
        reset
    };

    Duration::from_secs(reset + policy.extra_wait_secs)
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

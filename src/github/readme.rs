use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, StatusCode};
use crate::config::ReadmeSourceKind;
use super::Repository;

/// Best-effort README lookup
#[async_trait]
pub trait ReadmeSource: Send + Sync {
    /// README text of `repo`, or an empty string when there is none
    async fn fetch_readme(&self, repo: &Repository) -> String;
}

/// Fetches README text over plain HTTP
///
/// Anything other than a 200 answer, including transport failures, yields an
/// empty string: a missing README never fails a ranking run.
#[derive(Clone)]
pub struct ReadmeFetcher {
    client: Client,
    source: ReadmeSourceKind,
    raw_base: String,
}

impl ReadmeFetcher {
    /// Creates a fetcher using the `blob/master` heuristic
    pub fn new(client: Client) -> Self {
        Self {
            client,
            source: ReadmeSourceKind::BlobMaster,
            raw_base: "https://raw.githubusercontent.com".to_string(),
        }
    }

    /// Switches the URL heuristic
    pub fn with_source(mut self, source: ReadmeSourceKind, raw_base: impl Into<String>) -> Self {
        self.source = source;
        self.raw_base = raw_base.into();
        self
    }

    /// URL the README of `repo` is requested from
    pub fn readme_url(&self, repo: &Repository) -> String {
        match self.source {
            ReadmeSourceKind::BlobMaster => repo.readme_url(),
            ReadmeSourceKind::DefaultBranch => match repo.owner_and_name() {
                Ok((owner, name)) => format!(
                    "{}/{}/{}/{}/README.md",
                    self.raw_base.trim_end_matches('/'),
                    owner,
                    name,
                    repo.default_branch.as_deref().unwrap_or("master")
                ),
                Err(_) => repo.readme_url(),
            },
        }
    }
}

#[async_trait]
impl ReadmeSource for ReadmeFetcher {
    async fn fetch_readme(&self, repo: &Repository) -> String {
        let url = self.readme_url(repo);
        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("README request for {} failed: {}", repo.name, e);
                return String::new();
            }
        };

        if response.status() != StatusCode::OK {
            debug!("No README for {} at {} ({})", repo.name, url, response.status());
            return String::new();
        }

        response.text().await.unwrap_or_else(|e| {
            warn!("Could not read README body for {}: {}", repo.name, e);
            String::new()
        })
    }
}

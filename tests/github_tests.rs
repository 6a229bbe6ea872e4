use std::sync::{Arc, Mutex};
use std::time::Duration;
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use repo_challenge::error::ChallengeError;
use repo_challenge::rate_limiter::{RateLimitedClient, Sleeper};
use repo_challenge::scoring::{CodeMetricsProvider, GitHubStatsMetrics};
use repo_challenge::testing::RecordingSleeper;
use repo_challenge::{ReadmeFetcher, ReadmeSource, Repository, RepositoryFetcher, RepositorySource};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::test_helpers::*;

/// Notes how many requests the server had seen whenever the client sleeps
struct ObservingSleeper {
    server: Arc<MockServer>,
    observed: Mutex<Vec<(Duration, usize)>>,
}

#[async_trait]
impl Sleeper for ObservingSleeper {
    async fn sleep(&self, duration: Duration) {
        let seen = self.server.received_requests().await.map(|r| r.len()).unwrap_or(0);
        self.observed.lock().unwrap().push((duration, seen));
    }
}

#[tokio::test]
async fn test_fetch_user_repos_keeps_api_order() {
    setup_test_logger();
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/users/octocat/repos")
        .match_header("user-agent", mockito::Matcher::Regex("^repo-challenge/".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(repos_body("https://github.com", "octocat", &["zeta", "alpha", "mid"]))
        .create_async()
        .await;

    let client = Arc::new(RateLimitedClient::new(&github_config(&server.url())).unwrap());
    let fetcher = RepositoryFetcher::new(client, server.url());

    let repos = fetcher.fetch_user_repos("octocat").await.unwrap();
    let names: Vec<_> = repos.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    assert_eq!(repos[0].url, "https://github.com/octocat/zeta");
}

#[tokio::test]
async fn test_fetch_sends_token_when_configured() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/users/octocat/repos")
        .match_header("authorization", "token ghp_secret")
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let mut config = github_config(&server.url());
    config.token = Some("ghp_secret".into());
    let client = Arc::new(RateLimitedClient::new(&config).unwrap());
    let fetcher = RepositoryFetcher::new(client, server.url());

    assert!(fetcher.fetch_user_repos("octocat").await.unwrap().is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unknown_user_is_github_api_error() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/users/nobody-here/repos")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "Not Found", "documentation_url": "https://docs.github.com"}"#)
        .create_async()
        .await;

    let client = Arc::new(RateLimitedClient::new(&github_config(&server.url())).unwrap());
    let fetcher = RepositoryFetcher::new(client, server.url());

    let err = fetcher.fetch_user_repos("nobody-here").await.unwrap_err();
    assert!(matches!(err, ChallengeError::GitHubApi(ref msg) if msg.contains("Not Found")));
}

#[tokio::test]
async fn test_blank_username_is_rejected_without_request() {
    let client = Arc::new(RateLimitedClient::new(&github_config("http://127.0.0.1:9")).unwrap());
    let fetcher = RepositoryFetcher::new(client, "http://127.0.0.1:9");

    let err = fetcher.fetch_user_repos("   ").await.unwrap_err();
    assert!(matches!(err, ChallengeError::Validation(_)));
}

#[tokio::test]
async fn test_rate_limited_request_waits_then_retries() {
    let server = Arc::new(MockServer::start().await);
    Mock::given(method("GET"))
        .and(path("/users/octocat/repos"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("X-RateLimit-Reset", "5")
                .set_body_json(json!({"message": "API rate limit exceeded"})),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/octocat/repos"))
        .and(header("accept", "application/vnd.github+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "A", "html_url": "https://github.com/octocat/A"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let sleeper = Arc::new(ObservingSleeper {
        server: server.clone(),
        observed: Mutex::new(Vec::new()),
    });
    let client = RateLimitedClient::new(&github_config(&server.uri()))
        .unwrap()
        .with_sleeper(sleeper.clone());

    let body = client
        .get(&format!("{}/users/octocat/repos", server.uri()), None)
        .await
        .unwrap();

    assert_eq!(body[0]["name"], "A");
    // one 15 s wait, taken after the first request and before the second
    assert_eq!(*sleeper.observed.lock().unwrap(), vec![(Duration::from_secs(15), 1)]);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_missing_reset_header_waits_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let sleeper = Arc::new(RecordingSleeper::default());
    let client = RateLimitedClient::new(&github_config(&server.uri()))
        .unwrap()
        .with_sleeper(sleeper.clone());

    let body = client.get(&format!("{}/rate", server.uri()), None).await.unwrap();
    assert_eq!(body, json!({"ok": true}));
    assert_eq!(sleeper.sleeps(), vec![Duration::from_secs(70)]);
}

#[tokio::test]
async fn test_rate_limit_gives_up_after_max_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("X-RateLimit-Reset", "1"))
        .mount(&server)
        .await;

    let mut config = github_config(&server.uri());
    config.rate_limit.max_attempts = 3;
    let sleeper = Arc::new(RecordingSleeper::default());
    let client = RateLimitedClient::new(&config).unwrap().with_sleeper(sleeper.clone());

    let err = client.get(&format!("{}/users/u/repos", server.uri()), None).await.unwrap_err();
    assert!(matches!(err, ChallengeError::RateLimitExceeded(_)));
    assert_eq!(sleeper.sleeps().len(), 2);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_error_status_body_is_returned_as_json() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/repos/u/gone")
        .with_status(410)
        .with_body(r#"{"message": "Repository access blocked"}"#)
        .create_async()
        .await;

    let client = RateLimitedClient::new(&github_config(&server.url())).unwrap();
    let body = client.get(&format!("{}/repos/u/gone", server.url()), None).await.unwrap();
    assert_eq!(body["message"], "Repository access blocked");
}

#[tokio::test]
async fn test_query_params_are_forwarded() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/users/u/repos")
        .match_query(mockito::Matcher::UrlEncoded("per_page".into(), "100".into()))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let client = RateLimitedClient::new(&github_config(&server.url())).unwrap();
    client
        .get(&format!("{}/users/u/repos", server.url()), Some(&[("per_page", "100")]))
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_readme_404_is_empty_string() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/octocat/A/blob/master/README.md")
        .with_status(404)
        .create_async()
        .await;

    let fetcher = ReadmeFetcher::new(reqwest::Client::new());
    let repo = Repository::new("A", format!("{}/octocat/A", server.url()));
    assert_eq!(fetcher.fetch_readme(&repo).await, "");
}

#[tokio::test]
async fn test_languages_metrics() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/repos/octocat/A/languages")
        .with_status(200)
        .with_body(r#"{"Rust": 1000}"#)
        .create_async()
        .await;

    let client = Arc::new(RateLimitedClient::new(&github_config(&server.url())).unwrap());
    let metrics = GitHubStatsMetrics::new(client, server.url());

    let result = metrics.extract_metrics("https://github.com/octocat/A").await.unwrap();
    assert_eq!(result.complexity_score, 3.57);
}

#[tokio::test]
async fn test_languages_failure_is_metrics_unavailable() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/repos/octocat/private/languages")
        .with_status(404)
        .with_body(r#"{"message": "Not Found"}"#)
        .create_async()
        .await;

    let client = Arc::new(RateLimitedClient::new(&github_config(&server.url())).unwrap());
    let metrics = GitHubStatsMetrics::new(client, server.url());

    match metrics.extract_metrics("https://github.com/octocat/private").await {
        Err(ChallengeError::MetricsUnavailable { repo_url, reason }) => {
            assert_eq!(repo_url, "https://github.com/octocat/private");
            assert_eq!(reason, "Not Found");
        }
        other => panic!("expected MetricsUnavailable, got {:?}", other),
    }

    let err = metrics.extract_metrics("https://github.com/octocat").await.unwrap_err();
    assert!(matches!(err, ChallengeError::MetricsUnavailable { .. }));
}

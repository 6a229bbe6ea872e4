//! Web surface: an HTML form and a JSON endpoint around [`ChallengeRanker`].

use std::sync::Arc;
use axum::{
    extract::{Form, Json, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use crate::error::ChallengeError;
use crate::ranker::ChallengeRanker;
use crate::scoring::ScoredRepository;

const EMPTY_USERNAME: &str = "Please enter a GitHub username.";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    ranker: Arc<ChallengeRanker>,
    started_at: DateTime<Utc>,
}

impl AppState {
    /// Wraps a ranker for the handlers
    pub fn new(ranker: Arc<ChallengeRanker>) -> Self {
        Self {
            ranker,
            started_at: Utc::now(),
        }
    }
}

/// Body of `POST /analyze` (form) and `POST /api/analyze` (JSON)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    /// GitHub login to analyze
    #[serde(default)]
    pub username: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service name
    pub service: String,
    /// Service version
    pub version: String,
    /// Current status
    pub status: String,
    /// Service uptime in seconds
    pub uptime: u64,
}

/// A ranking failure rendered as a JSON error response
#[derive(Debug)]
pub struct ApiError(pub ChallengeError);

impl From<ChallengeError> for ApiError {
    fn from(err: ChallengeError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// HTTP status reported for each kind of ranking failure
pub fn status_for(err: &ChallengeError) -> StatusCode {
    match err {
        ChallengeError::Validation(_) => StatusCode::BAD_REQUEST,
        ChallengeError::NoRepositories { .. } => StatusCode::NOT_FOUND,
        ChallengeError::RateLimitExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
        ChallengeError::Http(_)
        | ChallengeError::GitHubApi(_)
        | ChallengeError::LLM(_)
        | ChallengeError::OpenAI(_)
        | ChallengeError::ScoreExtraction { .. }
        | ChallengeError::MetricsUnavailable { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Builds the router with all routes and middleware
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/analyze", post(analyze_form))
        .route("/api/analyze", post(analyze_json))
        .route("/health", get(health_check))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn run(state: &AppState, username: &str) -> Result<ScoredRepository, ChallengeError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ChallengeError::Validation(EMPTY_USERNAME.into()));
    }

    info!("Analyzing repositories of {}", username);
    state.ranker.find_most_challenging(username).await.map_err(|e| {
        if e.is_user_error() {
            warn!("Analysis of {} rejected: {}", username, e);
        } else {
            error!("Analysis of {} failed: {}", username, e);
        }
        e
    })
}

async fn index() -> Html<String> {
    Html(render_page(""))
}

async fn analyze_form(
    State(state): State<AppState>,
    Form(request): Form<AnalyzeRequest>,
) -> (StatusCode, Html<String>) {
    match run(&state, &request.username).await {
        Ok(best) => (StatusCode::OK, Html(render_page(&render_result(&best)))),
        Err(ChallengeError::Validation(msg)) => (
            StatusCode::BAD_REQUEST,
            Html(render_page(&render_error(&msg))),
        ),
        Err(e) => {
            let message = format!("Could not find a repository or an error occurred: {}", e);
            (status_for(&e), Html(render_page(&render_error(&message))))
        }
    }
}

async fn analyze_json(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<ScoredRepository>, ApiError> {
    Ok(Json(run(&state, &request.username).await?))
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        service: "repo-challenge".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "healthy".to_string(),
        uptime: (Utc::now() - state.started_at).num_seconds().max(0) as u64,
    })
}

fn render_page(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>GitHub Repository Complexity Analysis</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 40px; }}
        .success {{ color: #2e7d32; }}
        .error {{ color: #c62828; }}
    </style>
</head>
<body>
    <h1>GitHub Repository Complexity Analysis</h1>
    <form method="post" action="/analyze">
        <label for="username">Enter GitHub Username:</label>
        <input type="text" id="username" name="username">
        <button type="submit">Analyze</button>
    </form>
    {}
</body>
</html>
"#,
        body
    )
}

fn render_result(best: &ScoredRepository) -> String {
    format!(
        r#"<p class="success">Most challenging repository found!</p>
    <p>Repository Name: {}</p>
    <p>Repository URL: <a href="{url}">{url}</a></p>
    <p>Overall Complexity Score: {}</p>"#,
        escape_html(&best.name),
        best.overall_score,
        url = escape_html(&best.url),
    )
}

fn render_error(message: &str) -> String {
    format!(r#"<p class="error">{}</p>"#, escape_html(message))
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

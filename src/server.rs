use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::analysis::ReportAssembler;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{ContributionSummary, Identity, LanguageSummary, WrappedReport};

/// Application state shared across handlers. One assembler, and therefore
/// one GitHub client and rate limiter, serves every request.
#[derive(Clone)]
pub struct AppState {
    assembler: Arc<ReportAssembler>,
}

impl AppState {
    pub fn new(assembler: ReportAssembler) -> Self {
        Self {
            assembler: Arc::new(assembler),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<VerifiedUser>,
}

#[derive(Debug, Serialize)]
pub struct VerifiedUser {
    pub login: String,
    pub id: u64,
}

/// Boundary error: a fixed status and a stable message, never the upstream body.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::info!("Request rejected: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.public_message() }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

pub fn create_app(state: AppState) -> Router {
    // The static `verify` segment wins over `:username`, so the legacy
    // routes of a user literally named "verify" are unreachable here.
    let api = Router::new()
        .route("/verify/:username", get(verify_user))
        .route("/:username", get(wrapped_report))
        .route("/:username/languages", get(language_summary))
        .route("/:username/contributions", get(contribution_summary));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/github", api)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(config: &Config, assembler: ReportAssembler) -> Result<()> {
    let app = create_app(AppState::new(assembler));
    let addr = format!("{}:{}", config.host, config.port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

async fn verify_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<VerifyResponse> {
    let identity = Identity::parse(&username)?;
    let user = state.assembler.github().get_user(&identity).await?;

    Ok(Json(VerifyResponse {
        exists: true,
        user: Some(VerifiedUser {
            login: user.login,
            id: user.id,
        }),
    }))
}

async fn wrapped_report(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<WrappedReport> {
    let identity = Identity::parse(&username)?;
    Ok(Json(state.assembler.build_report(&identity).await?))
}

async fn language_summary(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<LanguageSummary> {
    let identity = Identity::parse(&username)?;
    Ok(Json(state.assembler.language_summary(&identity).await?))
}

async fn contribution_summary(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<ContributionSummary> {
    let identity = Identity::parse(&username)?;
    Ok(Json(state.assembler.contribution_summary(&identity).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReportConfig;
    use crate::github::GitHubClient;
    use mockito::Server;
    use std::time::Duration;

    #[test]
    fn test_error_responses_use_fixed_status() {
        let cases = [
            (Error::NotFound("ghost".into()), StatusCode::NOT_FOUND),
            (Error::RateLimited("users".into()), StatusCode::FORBIDDEN),
            (Error::InvalidUsername("-x".into()), StatusCode::BAD_REQUEST),
            (
                Error::DataFetch("repositories".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_verify_response_shape() {
        let body = serde_json::to_value(VerifyResponse {
            exists: true,
            user: Some(VerifiedUser {
                login: "octocat".into(),
                id: 583231,
            }),
        })
        .unwrap();
        assert_eq!(body, json!({"exists": true, "user": {"login": "octocat", "id": 583231}}));

        let missing = serde_json::to_value(VerifyResponse {
            exists: false,
            user: None,
        })
        .unwrap();
        assert_eq!(missing, json!({"exists": false}));
    }

    #[tokio::test]
    async fn test_verify_segment_takes_precedence_over_username() {
        let mut github = Server::new_async().await;
        let _user = github
            .mock("GET", "/users/languages")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"login":"languages","id":7,"avatar_url":"https://avatars.example/u/7",
                    "created_at":"2020-01-01T00:00:00Z"}"#,
            )
            .create_async()
            .await;

        let client = GitHubClient::with_options(None, &github.url(), Duration::ZERO).unwrap();
        let app = create_app(AppState::new(ReportAssembler::new(
            client,
            ReportConfig::default(),
        )));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });

        let url = format!("http://{}/api/github/verify/languages", addr);
        let body: serde_json::Value = reqwest::get(url)
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body, json!({"exists": true, "user": {"login": "languages", "id": 7}}));

        let bad = reqwest::get(format!("http://{}/api/github/-bad-/languages", addr))
            .await
            .unwrap();
        assert_eq!(bad.status(), reqwest::StatusCode::BAD_REQUEST);
    }
}

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{header, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::github::paginator::Paginator;
use crate::github::rate_limiter::RateLimiter;
use crate::models::{
    CalendarData, CommitSummary, ContributionCalendar, GitHubUser, Identity, PublicEvent,
    Repository,
};

const USER_AGENT: &str = "gitwrapped/0.1";

/// GitHub caps the public events feed at 300 entries.
const MAX_PUBLIC_EVENTS: u32 = 300;

const CONTRIBUTION_CALENDAR_QUERY: &str = r#"
    query($username: String!) {
        user(login: $username) {
            contributionsCollection {
                contributionCalendar {
                    totalContributions
                    weeks {
                        contributionDays {
                            contributionCount
                            date
                        }
                    }
                }
            }
        }
    }
"#;

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

/// Maps a non-2xx REST response to the error taxonomy: 404 is `NotFound`,
/// 403 is `RateLimited`, anything else is `Upstream` with the body attached.
pub(crate) async fn check_status(response: Response, context: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::NOT_FOUND => Err(Error::NotFound(context.to_string())),
        StatusCode::FORBIDDEN => Err(Error::RateLimited(context.to_string())),
        _ => {
            let body = response.text().await.unwrap_or_default();
            Err(Error::Upstream {
                status: status.as_u16(),
                message: format!("{}: {}", context, body),
            })
        }
    }
}

/// Reads a 2xx body as JSON. A body that does not decode is an upstream
/// fault, not a transport one.
pub(crate) async fn decode_json<T: DeserializeOwned>(
    response: Response,
    context: &str,
) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    serde_json::from_str(&body).map_err(|e| Error::Upstream {
        status: status.as_u16(),
        message: format!("{}: malformed response: {}", context, e),
    })
}

pub struct GitHubClient {
    client: Client,
    rate_limiter: RateLimiter,
    base_url: String,
}

impl GitHubClient {
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_options(
            config.github_token.as_deref(),
            &config.api_base_url,
            Duration::from_millis(config.rate_limit_delay_ms),
        )
    }

    pub fn with_options(
        token: Option<&str>,
        base_url: &str,
        min_interval: Duration,
    ) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github.v3+json"),
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(USER_AGENT),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            rate_limiter: RateLimiter::new(min_interval),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Single rate-limited GET against a REST path such as `/users/octocat`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.rate_limiter.wait().await;
        let url = format!("{}{}", self.base_url, path);

        let response = self.client.get(&url).send().await?;
        self.rate_limiter.observe(&response);
        let response = check_status(response, path).await?;

        decode_json(response, path).await
    }

    pub async fn get_user(&self, identity: &Identity) -> Result<GitHubUser> {
        tracing::info!("Fetching user: {}", identity);
        self.get_json(&format!("/users/{}", identity)).await
    }

    /// Every repository the user owns, most recently updated first.
    pub async fn get_user_repos(&self, identity: &Identity) -> Result<Vec<Repository>> {
        let url = format!(
            "{}/users/{}/repos?type=owner&sort=updated&direction=desc",
            self.base_url, identity
        );
        let paginator = Paginator::new(&self.client, &self.rate_limiter);
        tracing::info!("Fetching repositories for: {}", identity);
        paginator.fetch_all(&url, 100).await
    }

    pub async fn get_repo_commits(
        &self,
        repo: &Repository,
        author: &str,
        since: DateTime<Utc>,
        max_commits: u32,
    ) -> Result<Vec<CommitSummary>> {
        let url = format!(
            "{}/repos/{}/commits?author={}&since={}",
            self.base_url,
            repo.full_name,
            author,
            since.to_rfc3339_opts(SecondsFormat::Secs, true)
        );

        let paginator = Paginator::new(&self.client, &self.rate_limiter);
        tracing::debug!("Fetching commits for: {}", repo.full_name);
        paginator.fetch_limited(&url, 100, max_commits).await
    }

    pub async fn get_repo_languages(&self, repo: &Repository) -> Result<HashMap<String, u64>> {
        tracing::debug!("Fetching languages for: {}", repo.full_name);
        self.get_json(&format!("/repos/{}/languages", repo.full_name))
            .await
    }

    pub async fn get_public_events(&self, identity: &Identity) -> Result<Vec<PublicEvent>> {
        let url = format!("{}/users/{}/events/public", self.base_url, identity);
        let paginator = Paginator::new(&self.client, &self.rate_limiter);
        tracing::debug!("Fetching public events for: {}", identity);
        paginator.fetch_limited(&url, 100, MAX_PUBLIC_EVENTS).await
    }

    /// Runs a GraphQL query. Any non-2xx status or a non-empty `errors` array
    /// fails with `Upstream`.
    pub async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T> {
        self.rate_limiter.wait().await;
        let url = format!("{}/graphql", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;
        self.rate_limiter.observe(&response);

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                status: status.as_u16(),
                message: format!("GraphQL request failed: {}", body),
            });
        }

        let result: GraphQlResponse<T> = decode_json(response, "graphql").await?;
        if !result.errors.is_empty() {
            let messages: Vec<_> = result.errors.into_iter().map(|e| e.message).collect();
            return Err(Error::Upstream {
                status: status.as_u16(),
                message: messages.join("; "),
            });
        }

        result.data.ok_or_else(|| Error::Upstream {
            status: status.as_u16(),
            message: "GraphQL response carried no data".to_string(),
        })
    }

    pub async fn get_contribution_calendar(
        &self,
        identity: &Identity,
    ) -> Result<ContributionCalendar> {
        tracing::info!("Fetching contribution calendar for: {}", identity);
        let data: CalendarData = self
            .graphql(
                CONTRIBUTION_CALENDAR_QUERY,
                json!({ "username": identity.as_str() }),
            )
            .await?;

        data.user
            .map(|u| u.contributions_collection.contribution_calendar)
            .ok_or_else(|| Error::NotFound(identity.to_string()))
    }
}

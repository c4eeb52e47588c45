use crate::error::{Error, Result};
use std::env;
use std::str::FromStr;

pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub github_token: Option<String>,
    pub api_base_url: String,
    pub rate_limit_delay_ms: u64,
    pub max_analyzed_repos: usize,
    pub max_commits_per_repo: u32,
    pub lookback_days: i64,
    pub concurrency_limit: usize,
    pub host: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_token: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            rate_limit_delay_ms: 100,
            max_analyzed_repos: 20,
            max_commits_per_repo: 100,
            lookback_days: 365,
            concurrency_limit: 5,
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        // An empty token is the same as no token: unauthenticated calls are allowed.
        let github_token = env::var("GITHUB_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        let api_base_url = env::var("GITHUB_API_BASE_URL")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base_url);

        let host = env::var("HOST").unwrap_or(defaults.host);

        Ok(Self {
            github_token,
            api_base_url,
            rate_limit_delay_ms: parse_var("RATE_LIMIT_DELAY_MS", defaults.rate_limit_delay_ms)?,
            max_analyzed_repos: parse_var("MAX_ANALYZED_REPOS", defaults.max_analyzed_repos)?,
            max_commits_per_repo: parse_var("MAX_COMMITS_PER_REPO", defaults.max_commits_per_repo)?,
            lookback_days: parse_var("LOOKBACK_DAYS", defaults.lookback_days)?,
            concurrency_limit: parse_var("CONCURRENCY_LIMIT", defaults.concurrency_limit)?,
            host,
            port: parse_var("PORT", defaults.port)?,
        })
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} has an invalid value: {}", name, raw))),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub max_analyzed_repos: usize,
    pub max_commits_per_repo: u32,
    pub lookback_days: i64,
    pub concurrency_limit: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ReportConfig {
    fn from(config: &Config) -> Self {
        Self {
            max_analyzed_repos: config.max_analyzed_repos,
            max_commits_per_repo: config.max_commits_per_repo,
            lookback_days: config.lookback_days,
            concurrency_limit: config.concurrency_limit.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.rate_limit_delay_ms, 100);
        assert_eq!(config.max_analyzed_repos, 20);
        assert!(config.github_token.is_none());

        let report = ReportConfig::from(&config);
        assert_eq!(report.max_analyzed_repos, 20);
        assert_eq!(report.lookback_days, 365);
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        std::env::set_var("GITWRAPPED_TEST_PORT", "not-a-port");
        let result: Result<u16> = parse_var("GITWRAPPED_TEST_PORT", 3000);
        assert!(matches!(result, Err(Error::Config(_))));

        let missing: Result<u16> = parse_var("GITWRAPPED_TEST_UNSET", 3000);
        assert_eq!(missing.unwrap(), 3000);
    }
}

use chrono::{DateTime, Timelike, Utc};
use futures::future::join_all;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::config::ReportConfig;
use crate::error::Result;
use crate::github::GitHubClient;
use crate::models::{
    CommitSummary, DailyCommitIndex, HourlyCommitIndex, LanguageRepo, RepoCommitCount, Repository,
};

/// Weight credited to a repository's primary language when its byte counts
/// can't be fetched. Not a byte count.
pub const PRIMARY_LANGUAGE_FALLBACK_WEIGHT: u64 = 1;

/// Where a repository's language weights came from.
#[derive(Debug, Clone, PartialEq)]
pub enum LanguageSource {
    Measured(HashMap<String, u64>),
    PrimaryOnly(String),
    Unknown,
}

impl LanguageSource {
    /// Measured bytes when the fetch succeeded, otherwise the primary
    /// language at fallback weight.
    pub fn resolve(primary: Option<&str>, fetched: Option<HashMap<String, u64>>) -> Self {
        match (fetched, primary) {
            (Some(bytes), _) => LanguageSource::Measured(bytes),
            (None, Some(language)) => LanguageSource::PrimaryOnly(language.to_string()),
            (None, None) => LanguageSource::Unknown,
        }
    }

    pub fn weights(&self) -> Vec<(String, u64)> {
        match self {
            LanguageSource::Measured(bytes) => {
                let mut weights: Vec<_> = bytes.iter().map(|(l, b)| (l.clone(), *b)).collect();
                weights.sort();
                weights
            }
            LanguageSource::PrimaryOnly(language) => {
                vec![(language.clone(), PRIMARY_LANGUAGE_FALLBACK_WEIGHT)]
            }
            LanguageSource::Unknown => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    Commits,
    Languages,
}

impl fmt::Display for FetchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchStage::Commits => f.write_str("commits"),
            FetchStage::Languages => f.write_str("languages"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RepoFailure {
    pub repository: String,
    pub stage: FetchStage,
    pub message: String,
}

/// Raw per-repository fetch outcome, before folding into a `Harvest`.
#[derive(Debug)]
pub struct RepoFetch {
    pub repository: Repository,
    pub commits: Result<Vec<CommitSummary>>,
    pub languages: LanguageSource,
    pub language_error: Option<String>,
}

/// Running aggregates over the analyzed repositories.
#[derive(Debug, Clone, Default)]
pub struct Harvest {
    pub daily: DailyCommitIndex,
    pub hourly: HourlyCommitIndex,
    pub language_bytes: BTreeMap<String, u64>,
    pub language_repos: BTreeMap<String, Vec<LanguageRepo>>,
    pub repo_commits: Vec<RepoCommitCount>,
    pub commit_times: Vec<DateTime<Utc>>,
    pub first_seen: Option<DateTime<Utc>>,
    pub last_seen: Option<DateTime<Utc>>,
    pub matched_commits: u64,
    pub failures: Vec<RepoFailure>,
}

impl Harvest {
    /// Folds one repository's fetch into the aggregates. Only commits whose
    /// author login equals `login` exactly are counted.
    pub fn absorb(&mut self, login: &str, fetch: RepoFetch) {
        let RepoFetch {
            repository,
            commits,
            languages,
            language_error,
        } = fetch;

        match commits {
            Ok(commits) => {
                let mut matched = 0u32;
                for commit in commits.iter().filter(|c| c.author_login() == Some(login)) {
                    self.record_commit(commit.authored_at());
                    matched += 1;
                }
                self.repo_commits.push(RepoCommitCount {
                    repository: repository.clone(),
                    commits: matched,
                });
            }
            Err(e) => {
                tracing::warn!("Skipping commits for {}: {}", repository.full_name, e);
                self.failures.push(RepoFailure {
                    repository: repository.full_name.clone(),
                    stage: FetchStage::Commits,
                    message: e.to_string(),
                });
            }
        }

        if let Some(message) = language_error {
            self.failures.push(RepoFailure {
                repository: repository.full_name.clone(),
                stage: FetchStage::Languages,
                message,
            });
        }

        for (language, bytes) in languages.weights() {
            *self.language_bytes.entry(language.clone()).or_insert(0) += bytes;
            self.language_repos
                .entry(language)
                .or_default()
                .push(LanguageRepo {
                    repository: repository.clone(),
                    bytes,
                });
        }
    }

    fn record_commit(&mut self, at: DateTime<Utc>) {
        *self.daily.entry(at.date_naive()).or_insert(0) += 1;
        *self.hourly.entry(at.hour() as u8).or_insert(0) += 1;
        self.matched_commits += 1;
        self.commit_times.push(at);

        self.first_seen = Some(self.first_seen.map_or(at, |f| f.min(at)));
        self.last_seen = Some(self.last_seen.map_or(at, |l| l.max(at)));
    }

    /// Repositories whose commit history couldn't be fetched.
    pub fn failed_repositories(&self) -> usize {
        self.failures
            .iter()
            .filter(|f| f.stage == FetchStage::Commits)
            .count()
    }
}

pub struct Harvester {
    github: Arc<GitHubClient>,
    config: ReportConfig,
}

impl Harvester {
    pub fn new(github: Arc<GitHubClient>, config: ReportConfig) -> Self {
        Self { github, config }
    }

    /// Fetches commits and languages for each repository and folds them in
    /// input order. A failing repository is logged and skipped; this never
    /// fails as a whole.
    pub async fn harvest(
        &self,
        login: &str,
        repos: &[Repository],
        since: DateTime<Utc>,
    ) -> Harvest {
        let fetches = self.fetch_repos(login, repos, since).await;

        let mut harvest = Harvest::default();
        for fetch in fetches {
            harvest.absorb(login, fetch);
        }

        tracing::info!(
            "Harvested {} commits from {} repositories ({} failed)",
            harvest.matched_commits,
            repos.len(),
            harvest.failed_repositories()
        );
        harvest
    }

    async fn fetch_repos(
        &self,
        login: &str,
        repos: &[Repository],
        since: DateTime<Utc>,
    ) -> Vec<RepoFetch> {
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency_limit));
        let mut fetch_futures = Vec::new();

        for repo in repos {
            let github = self.github.clone();
            let sem = semaphore.clone();
            let author = login.to_string();
            let max_commits = self.config.max_commits_per_repo;
            let repo = repo.clone();

            fetch_futures.push(async move {
                let _permit = sem.acquire().await.ok();

                let commits = github
                    .get_repo_commits(&repo, &author, since, max_commits)
                    .await;

                let (languages, language_error) = match repo.language.as_deref() {
                    Some(primary) => match github.get_repo_languages(&repo).await {
                        Ok(bytes) => (LanguageSource::resolve(Some(primary), Some(bytes)), None),
                        Err(e) => {
                            tracing::warn!(
                                "Languages unavailable for {}, crediting {}: {}",
                                repo.full_name,
                                primary,
                                e
                            );
                            (
                                LanguageSource::resolve(Some(primary), None),
                                Some(e.to_string()),
                            )
                        }
                    },
                    None => (LanguageSource::Unknown, None),
                };

                RepoFetch {
                    repository: repo,
                    commits,
                    languages,
                    language_error,
                }
            });
        }

        join_all(fetch_futures).await
    }
}

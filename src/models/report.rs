use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::user::{GitHubUser, Repository};

/// Commit counts per UTC calendar day. Iterates chronologically, which makes
/// "first encountered" mean "earliest date" wherever ties are broken.
pub type DailyCommitIndex = BTreeMap<NaiveDate, u32>;

/// Commit counts per UTC hour of day (0-23), lowest hour first.
pub type HourlyCommitIndex = BTreeMap<u8, u32>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakRecord {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub length: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageBreakdownEntry {
    pub language: String,
    pub bytes: u64,
    pub percentage: f64,
}

/// A repository's contribution to one language's byte total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageRepo {
    pub repository: Repository,
    pub bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoCommitCount {
    pub repository: Repository,
    pub commits: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CodingSchedule {
    Morning,
    Afternoon,
    Evening,
    Night,
    Anytime,
}

impl fmt::Display for CodingSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CodingSchedule::Morning => "morning",
            CodingSchedule::Afternoon => "afternoon",
            CodingSchedule::Evening => "evening",
            CodingSchedule::Night => "night",
            CodingSchedule::Anytime => "anytime",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityType {
    WeekendWarrior,
    Consistent,
    BurstCoder,
    SteadyPace,
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActivityType::WeekendWarrior => "weekend-warrior",
            ActivityType::Consistent => "consistent",
            ActivityType::BurstCoder => "burst-coder",
            ActivityType::SteadyPace => "steady-pace",
        };
        f.write_str(s)
    }
}

/// Where the report's daily index and commit total came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitSource {
    Calendar,
    Harvest,
    Events,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryTotals {
    pub total_commits: u64,
    pub commit_source: CommitSource,
    pub total_repos: usize,
    pub total_stars: u64,
    pub total_forks: u64,
    pub total_issues: u64,
    pub years_on_platform: u32,
    pub join_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitStats {
    pub daily: DailyCommitIndex,
    pub most_active_day: Option<NaiveDate>,
    pub most_active_day_count: u32,
    pub most_active_hour: Option<u8>,
    pub most_active_hour_count: u32,
    pub longest_streak: Option<StreakRecord>,
    pub first_commit: Option<DateTime<Utc>>,
    pub last_commit: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryRankings {
    pub top_by_stars: Vec<Repository>,
    pub top_by_forks: Vec<Repository>,
    pub top_by_commits: Vec<RepoCommitCount>,
    pub languages: Vec<LanguageBreakdownEntry>,
    pub language_repos: BTreeMap<String, Vec<LanguageRepo>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Personality {
    pub title: String,
    pub description: String,
    pub badges: Vec<String>,
    pub coding_schedule: CodingSchedule,
    pub activity_type: ActivityType,
}

/// Everything the presentation layer needs for one user's year in review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WrappedReport {
    pub user: GitHubUser,
    pub summary: SummaryTotals,
    pub commits: CommitStats,
    pub repositories: RepositoryRankings,
    pub personality: Personality,
    /// Analyzed repositories whose commit fetch failed.
    pub partial_failures: usize,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageSummary {
    pub languages: Vec<LanguageBreakdownEntry>,
    pub total_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributionSummary {
    pub commits_by_date: DailyCommitIndex,
    pub most_active_day: Option<NaiveDate>,
    pub most_active_day_count: u32,
    pub total_commits: u64,
    pub source: CommitSource,
}

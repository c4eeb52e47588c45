use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::sync::Arc;

use crate::analysis::harvester::Harvest;
use crate::github::GitHubClient;
use crate::models::{CommitSource, ContributionCalendar, DailyCommitIndex, Identity};

/// Outcome of a best-effort data source.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Available(T),
    Unavailable,
}

impl<T> Fetched<T> {
    pub fn as_ref(&self) -> Fetched<&T> {
        match self {
            Fetched::Available(value) => Fetched::Available(value),
            Fetched::Unavailable => Fetched::Unavailable,
        }
    }
}

/// The contribution calendar flattened into the report's shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarResult {
    pub daily: DailyCommitIndex,
    pub total_contributions: u64,
    /// One noon-UTC entry per contribution, for streak input only.
    pub commit_dates: Vec<DateTime<Utc>>,
}

impl CalendarResult {
    pub fn from_calendar(calendar: &ContributionCalendar) -> Self {
        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default();
        let mut daily = DailyCommitIndex::new();
        let mut commit_dates = Vec::new();

        for day in calendar.weeks.iter().flat_map(|w| &w.contribution_days) {
            let date = match NaiveDate::parse_from_str(&day.date, "%Y-%m-%d") {
                Ok(date) => date,
                Err(e) => {
                    tracing::warn!("Ignoring calendar day with bad date {:?}: {}", day.date, e);
                    continue;
                }
            };

            daily.insert(date, day.contribution_count);
            let stamp = date.and_time(noon).and_utc();
            commit_dates.extend(std::iter::repeat(stamp).take(day.contribution_count as usize));
        }

        Self {
            daily,
            total_contributions: calendar.total_contributions,
            commit_dates,
        }
    }
}

/// Daily activity and commit total after applying the calendar-over-harvest rule.
#[derive(Debug, Clone)]
pub struct ReconciledActivity {
    pub daily: DailyCommitIndex,
    pub total_commits: u64,
    pub commit_dates: Vec<NaiveDate>,
    pub source: CommitSource,
}

/// An available calendar replaces the harvested daily index and total
/// outright; otherwise the harvest's matched commits stand.
pub fn apply_calendar_override(
    harvest: &Harvest,
    calendar: Fetched<&CalendarResult>,
) -> ReconciledActivity {
    match calendar {
        Fetched::Available(calendar) => ReconciledActivity {
            daily: calendar.daily.clone(),
            total_commits: calendar.total_contributions,
            commit_dates: calendar.commit_dates.iter().map(|d| d.date_naive()).collect(),
            source: CommitSource::Calendar,
        },
        Fetched::Unavailable => ReconciledActivity {
            daily: harvest.daily.clone(),
            total_commits: harvest.matched_commits,
            commit_dates: harvest.commit_times.iter().map(|d| d.date_naive()).collect(),
            source: CommitSource::Harvest,
        },
    }
}

pub struct Reconciler {
    github: Arc<GitHubClient>,
}

impl Reconciler {
    pub fn new(github: Arc<GitHubClient>) -> Self {
        Self { github }
    }

    /// Never fails: any error is logged and reported as `Unavailable`.
    pub async fn reconcile(&self, identity: &Identity) -> Fetched<CalendarResult> {
        match self.github.get_contribution_calendar(identity).await {
            Ok(calendar) => {
                let result = CalendarResult::from_calendar(&calendar);
                tracing::info!(
                    "Contribution calendar for {}: {} contributions over {} days",
                    identity,
                    result.total_contributions,
                    result.daily.len()
                );
                Fetched::Available(result)
            }
            Err(e) => {
                tracing::warn!("Contribution calendar unavailable for {}: {}", identity, e);
                Fetched::Unavailable
            }
        }
    }
}

//! Narrower aggregates for the simpler presentation path. These skip the
//! full report and only touch the endpoints they need.

use std::collections::BTreeMap;

use crate::analysis::assembler::ReportAssembler;
use crate::analysis::harvester::LanguageSource;
use crate::analysis::reconciler::{CalendarResult, Fetched};
use crate::analysis::stats::{language_breakdown, most_active_day};
use crate::error::Result;
use crate::models::{
    CommitSource, ContributionSummary, DailyCommitIndex, Identity, LanguageSummary, PublicEvent,
};

impl ReportAssembler {
    /// Language breakdown over the analyzed repository subset, with the same
    /// primary-language fallback as the full report.
    pub async fn language_summary(&self, identity: &Identity) -> Result<LanguageSummary> {
        self.github().get_user(identity).await?;
        let repos = self.fetch_repositories(identity).await?;
        let analyzed = &repos[..repos.len().min(self.config().max_analyzed_repos)];

        let mut bytes: BTreeMap<String, u64> = BTreeMap::new();
        for repo in analyzed {
            let Some(primary) = repo.language.as_deref() else {
                continue;
            };

            let fetched = match self.github().get_repo_languages(repo).await {
                Ok(measured) => Some(measured),
                Err(e) => {
                    tracing::warn!("Languages unavailable for {}: {}", repo.full_name, e);
                    None
                }
            };

            for (language, weight) in LanguageSource::resolve(Some(primary), fetched).weights() {
                *bytes.entry(language).or_insert(0) += weight;
            }
        }

        Ok(LanguageSummary {
            total_bytes: bytes.values().sum(),
            languages: language_breakdown(&bytes),
        })
    }

    /// Commits by date: the contribution calendar when available, otherwise
    /// push volume from the public events feed.
    pub async fn contribution_summary(&self, identity: &Identity) -> Result<ContributionSummary> {
        self.github().get_user(identity).await?;

        let calendar = match self.github().get_contribution_calendar(identity).await {
            Ok(calendar) => Fetched::Available(calendar),
            Err(e) => {
                tracing::warn!("Falling back to public events for {}: {}", identity, e);
                Fetched::Unavailable
            }
        };

        let (daily, total_commits, source) = match calendar {
            Fetched::Available(calendar) => {
                let result = CalendarResult::from_calendar(&calendar);
                (result.daily, result.total_contributions, CommitSource::Calendar)
            }
            Fetched::Unavailable => {
                let events = match self.github().get_public_events(identity).await {
                    Ok(events) => events,
                    Err(e) => {
                        tracing::warn!("Public events unavailable for {}: {}", identity, e);
                        Vec::new()
                    }
                };
                let daily = bucket_push_events(&events);
                let total = daily.values().map(|&c| u64::from(c)).sum();
                (daily, total, CommitSource::Events)
            }
        };

        let (most_active_day, most_active_day_count) = most_active_day(&daily);
        Ok(ContributionSummary {
            commits_by_date: daily,
            most_active_day,
            most_active_day_count,
            total_commits,
            source,
        })
    }
}

pub fn bucket_push_events(events: &[PublicEvent]) -> DailyCommitIndex {
    let mut daily = DailyCommitIndex::new();
    for event in events {
        let commits = event.push_commit_count();
        if commits > 0 {
            *daily.entry(event.created_at.date_naive()).or_insert(0) += commits;
        }
    }
    daily
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_bucket_push_events() {
        let events: Vec<PublicEvent> = serde_json::from_str(
            r#"[
                {"type":"PushEvent","created_at":"2024-02-01T10:00:00Z","payload":{"size":3}},
                {"type":"PushEvent","created_at":"2024-02-01T23:59:00Z","payload":{"commits":[{},{}]}},
                {"type":"WatchEvent","created_at":"2024-02-02T10:00:00Z","payload":{}},
                {"type":"PushEvent","created_at":"2024-02-03T00:00:00Z","payload":{"size":1}}
            ]"#,
        )
        .unwrap();

        let daily = bucket_push_events(&events);
        let feb = |d| NaiveDate::from_ymd_opt(2024, 2, d).unwrap();
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[&feb(1)], 5);
        assert_eq!(daily[&feb(3)], 1);
    }
}

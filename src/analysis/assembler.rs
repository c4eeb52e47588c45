use chrono::{DateTime, Datelike, Duration, Utc};
use std::sync::Arc;

use crate::analysis::harvester::{Harvest, Harvester};
use crate::analysis::personality::{derive_personality, PersonalityInputs};
use crate::analysis::reconciler::{apply_calendar_override, CalendarResult, Fetched, Reconciler};
use crate::analysis::stats::{
    language_breakdown, longest_streak, most_active_day, most_active_hour, top_n_by,
};
use crate::config::ReportConfig;
use crate::error::{Error, Result};
use crate::github::GitHubClient;
use crate::models::{
    CommitStats, GitHubUser, Identity, Repository, RepositoryRankings, SummaryTotals,
    WrappedReport,
};

pub const TOP_N: usize = 5;

pub struct ReportAssembler {
    github: Arc<GitHubClient>,
    harvester: Harvester,
    reconciler: Reconciler,
    config: ReportConfig,
}

impl ReportAssembler {
    pub fn new(github: GitHubClient, config: ReportConfig) -> Self {
        Self::with_shared_client(Arc::new(github), config)
    }

    pub fn with_shared_client(github: Arc<GitHubClient>, config: ReportConfig) -> Self {
        Self {
            harvester: Harvester::new(github.clone(), config.clone()),
            reconciler: Reconciler::new(github.clone()),
            github,
            config,
        }
    }

    pub fn github(&self) -> &Arc<GitHubClient> {
        &self.github
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub async fn build_report(&self, identity: &Identity) -> Result<WrappedReport> {
        let now = Utc::now();

        // Step 1: Resolve profile. The only step allowed to surface
        // NotFound / RateLimited.
        tracing::info!("Building wrapped report for: {}", identity);
        let user = self.github.get_user(identity).await?;

        // Step 2: Full repository list
        let repos = self.fetch_repositories(identity).await?;
        tracing::info!("Found {} repositories", repos.len());

        // Steps 3-4: calendar and harvest are independent of each other
        let analyzed = &repos[..repos.len().min(self.config.max_analyzed_repos)];
        let since = now - Duration::days(self.config.lookback_days);
        let (calendar, harvest) = tokio::join!(
            self.reconciler.reconcile(identity),
            self.harvester.harvest(&user.login, analyzed, since),
        );

        // Steps 5-9
        Ok(assemble(user, &repos, harvest, calendar, now))
    }

    pub(crate) async fn fetch_repositories(&self, identity: &Identity) -> Result<Vec<Repository>> {
        self.github.get_user_repos(identity).await.map_err(|e| {
            tracing::error!("Failed to fetch repositories for {}: {}", identity, e);
            Error::DataFetch(format!("repositories for {}", identity))
        })
    }
}

/// Pure assembly of a report from fetched inputs. `repos` is the full
/// repository list; totals are always computed over all of it.
pub fn assemble(
    user: GitHubUser,
    repos: &[Repository],
    harvest: Harvest,
    calendar: Fetched<CalendarResult>,
    now: DateTime<Utc>,
) -> WrappedReport {
    let activity = apply_calendar_override(&harvest, calendar.as_ref());

    let (most_active_day, most_active_day_count) = most_active_day(&activity.daily);
    let busiest_hour = most_active_hour(&harvest.hourly);
    let streak = longest_streak(activity.commit_dates.iter().copied());
    let languages = language_breakdown(&harvest.language_bytes);

    let summary = SummaryTotals {
        total_commits: activity.total_commits,
        commit_source: activity.source,
        total_repos: repos.len(),
        total_stars: repos.iter().map(|r| u64::from(r.stargazers_count)).sum(),
        total_forks: repos.iter().map(|r| u64::from(r.forks_count)).sum(),
        total_issues: repos.iter().map(|r| u64::from(r.open_issues_count)).sum(),
        years_on_platform: whole_years_between(user.created_at, now),
        join_date: user.created_at,
    };

    let personality = derive_personality(&PersonalityInputs {
        total_commits: summary.total_commits,
        total_stars: summary.total_stars,
        total_repos: summary.total_repos,
        streak_length: streak.as_ref().map_or(0, |s| s.length),
        top_language: languages.first().map(|l| l.language.as_str()),
        most_active_hour: busiest_hour.map(|(hour, _)| hour),
        daily: Some(&activity.daily),
    });

    let commits = CommitStats {
        daily: activity.daily,
        most_active_day,
        most_active_day_count,
        most_active_hour: busiest_hour.map(|(hour, _)| hour),
        most_active_hour_count: busiest_hour.map_or(0, |(_, count)| count),
        longest_streak: streak,
        first_commit: harvest.first_seen,
        last_commit: harvest.last_seen,
    };

    let partial_failures = harvest.failed_repositories();
    let repositories = RepositoryRankings {
        top_by_stars: top_n_by(repos, TOP_N, |r| r.stargazers_count),
        top_by_forks: top_n_by(repos, TOP_N, |r| r.forks_count),
        top_by_commits: top_n_by(&harvest.repo_commits, TOP_N, |r| r.commits),
        languages,
        language_repos: harvest.language_repos,
    };

    WrappedReport {
        user,
        summary,
        commits,
        repositories,
        personality,
        partial_failures,
        generated_at: now,
    }
}

fn whole_years_between(from: DateTime<Utc>, to: DateTime<Utc>) -> u32 {
    let mut years = to.year() - from.year();
    if (to.month(), to.day()) < (from.month(), from.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::harvester::{LanguageSource, RepoFetch};
    use crate::models::{
        ActivityType, CommitSource, ContributionCalendar, ContributionDay, ContributionWeek,
        RepositoryOwner,
    };
    use chrono::TimeZone;

    fn user() -> GitHubUser {
        GitHubUser {
            login: "octocat".to_string(),
            id: 1,
            name: Some("The Octocat".to_string()),
            avatar_url: "https://avatars.example/octocat".to_string(),
            bio: None,
            public_repos: 0,
            public_gists: 0,
            followers: 10,
            following: 0,
            created_at: Utc.with_ymd_and_hms(2015, 6, 1, 0, 0, 0).unwrap(),
        }
    }

    fn repo(id: u64, stars: u32, forks: u32, issues: u32) -> Repository {
        Repository {
            id,
            name: format!("r{}", id),
            full_name: format!("octocat/r{}", id),
            description: None,
            language: None,
            stargazers_count: stars,
            forks_count: forks,
            open_issues_count: issues,
            fork: false,
            pushed_at: None,
            updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            owner: RepositoryOwner {
                login: "octocat".to_string(),
            },
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 31, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_whole_years() {
        let created = Utc.with_ymd_and_hms(2015, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(whole_years_between(created, now()), 8);
        let later = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(whole_years_between(created, later), 9);
        assert_eq!(whole_years_between(later, created), 0);
    }

    #[test]
    fn test_empty_user_report() {
        let report = assemble(user(), &[], Harvest::default(), Fetched::Unavailable, now());

        assert_eq!(report.summary.total_commits, 0);
        assert_eq!(report.summary.total_repos, 0);
        assert_eq!(report.summary.total_stars, 0);
        assert_eq!(report.summary.total_forks, 0);
        assert_eq!(report.summary.total_issues, 0);
        assert!(report.repositories.languages.is_empty());
        assert!(report.commits.longest_streak.is_none());
        assert_eq!(report.commits.most_active_day_count, 0);
        assert_eq!(report.personality.title, "Code Apprentice");
    }

    #[test]
    fn test_totals_cover_all_repositories() {
        let repos: Vec<_> = (1..=25).map(|i| repo(i, 10, 2, 1)).collect();
        let report = assemble(user(), &repos, Harvest::default(), Fetched::Unavailable, now());

        assert_eq!(report.summary.total_repos, 25);
        assert_eq!(report.summary.total_stars, 250);
        assert_eq!(report.summary.total_forks, 50);
        assert_eq!(report.summary.total_issues, 25);
        assert_eq!(report.repositories.top_by_stars.len(), TOP_N);
        assert!(report.personality.badges.contains(&"Star Collector".to_string()));
        assert!(report.personality.badges.contains(&"Repository Master".to_string()));
    }

    #[test]
    fn test_calendar_total_wins() {
        let mut harvest = Harvest::default();
        harvest.absorb(
            "octocat",
            RepoFetch {
                repository: repo(1, 0, 0, 0),
                commits: Ok(Vec::new()),
                languages: LanguageSource::PrimaryOnly("Rust".to_string()),
                language_error: None,
            },
        );
        harvest.matched_commits = 12;

        let calendar = CalendarResult::from_calendar(&ContributionCalendar {
            total_contributions: 842,
            weeks: vec![ContributionWeek {
                contribution_days: (1..=9)
                    .map(|day| ContributionDay {
                        contribution_count: 2,
                        date: format!("2024-01-{:02}", day),
                    })
                    .collect(),
            }],
        });

        let report = assemble(user(), &[], harvest, Fetched::Available(calendar), now());

        assert_eq!(report.summary.total_commits, 842);
        assert_eq!(report.summary.commit_source, CommitSource::Calendar);
        assert_eq!(report.commits.longest_streak.as_ref().unwrap().length, 9);
        assert_eq!(report.personality.title, "Code Warrior");
        assert_eq!(
            report.personality.badges,
            vec!["Commit Warrior", "Streak Master", "Rust Expert"]
        );
        assert_eq!(report.repositories.languages[0].percentage, 100.0);
        assert_eq!(report.personality.activity_type, ActivityType::Consistent);
    }
}

use crate::analysis::stats::{classify_activity, classify_schedule};
use crate::models::{DailyCommitIndex, Personality};

/// Insertion-ordered set of badge labels. Re-inserting a label is a no-op.
#[derive(Debug, Clone, Default)]
pub struct BadgeSet {
    badges: Vec<String>,
}

impl BadgeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, badge: impl Into<String>) -> bool {
        let badge = badge.into();
        if self.badges.contains(&badge) {
            return false;
        }
        self.badges.push(badge);
        true
    }

    pub fn len(&self) -> usize {
        self.badges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.badges.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.badges
    }
}

struct Tier {
    min_commits_exclusive: u64,
    title: &'static str,
    description: &'static str,
    badge: &'static str,
}

// Checked top-down; the first tier the commit count exceeds applies.
const TIERS: [Tier; 4] = [
    Tier {
        min_commits_exclusive: 1000,
        title: "Code Legend",
        description: "Your commit history reads like an epic. The keyboard bows to you.",
        badge: "Legendary Committer",
    },
    Tier {
        min_commits_exclusive: 500,
        title: "Code Warrior",
        description: "You battled through hundreds of commits and shipped relentlessly.",
        badge: "Commit Warrior",
    },
    Tier {
        min_commits_exclusive: 100,
        title: "Code Artisan",
        description: "Steady, thoughtful contributions crafted with care.",
        badge: "Rising Star",
    },
    Tier {
        min_commits_exclusive: 0,
        title: "Code Apprentice",
        description: "Every legend starts somewhere. Your journey is just beginning.",
        badge: "Getting Started",
    },
];

#[derive(Debug, Clone, Default)]
pub struct PersonalityInputs<'a> {
    pub total_commits: u64,
    pub total_stars: u64,
    pub total_repos: usize,
    pub streak_length: u32,
    pub top_language: Option<&'a str>,
    pub most_active_hour: Option<u8>,
    pub daily: Option<&'a DailyCommitIndex>,
}

pub fn derive_personality(inputs: &PersonalityInputs<'_>) -> Personality {
    let tier = TIERS
        .iter()
        .find(|t| inputs.total_commits > t.min_commits_exclusive)
        .unwrap_or(&TIERS[TIERS.len() - 1]);

    let mut badges = BadgeSet::new();
    badges.insert(tier.badge);

    if inputs.total_stars > 100 {
        badges.insert("Star Collector");
    }
    if inputs.total_repos > 20 {
        badges.insert("Repository Master");
    }
    if inputs.streak_length > 7 {
        badges.insert("Streak Master");
    }
    if let Some(language) = inputs.top_language {
        badges.insert(format!("{} Expert", language));
    }

    let empty = DailyCommitIndex::new();

    Personality {
        title: tier.title.to_string(),
        description: tier.description.to_string(),
        badges: badges.into_vec(),
        coding_schedule: classify_schedule(inputs.most_active_hour),
        activity_type: classify_activity(inputs.daily.unwrap_or(&empty)),
    }
}

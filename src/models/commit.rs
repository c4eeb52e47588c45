use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of `GET /repos/{owner}/{repo}/commits`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitSummary {
    pub sha: String,
    pub commit: CommitDetails,
    /// The GitHub account linked to the commit, if any. Missing for commits
    /// whose email isn't tied to an account.
    pub author: Option<CommitAuthorInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitDetails {
    #[serde(default)]
    pub message: String,
    pub author: CommitAuthor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitAuthor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitAuthorInfo {
    pub login: String,
}

impl CommitSummary {
    pub fn author_login(&self) -> Option<&str> {
        self.author.as_ref().map(|a| a.login.as_str())
    }

    pub fn authored_at(&self) -> DateTime<Utc> {
        self.commit.author.date
    }
}

/// Entry of the public events feed. Only push events carry commit volume.
#[derive(Debug, Clone, Deserialize)]
pub struct PublicEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub payload: PushPayload,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushPayload {
    pub size: Option<u32>,
    #[serde(default)]
    pub commits: Vec<serde_json::Value>,
}

impl PublicEvent {
    pub fn push_commit_count(&self) -> u32 {
        if self.event_type != "PushEvent" {
            return 0;
        }
        self.payload
            .size
            .unwrap_or(self.payload.commits.len() as u32)
    }
}

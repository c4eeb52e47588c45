use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

const MAX_LOGIN_LEN: usize = 39;

/// A GitHub login that passed GitHub's username grammar: ASCII alphanumerics
/// and single hyphens, 1-39 chars, no leading or trailing hyphen.
///
/// The requested spelling is kept for URLs and display. Commit authorship is
/// matched against the canonical login from the profile instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
    pub fn parse(raw: &str) -> Result<Self> {
        let login = raw.trim();
        if is_valid_login(login) {
            Ok(Self(login.to_string()))
        } else {
            Err(Error::InvalidUsername(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub fn is_valid_login(login: &str) -> bool {
    if login.is_empty() || login.len() > MAX_LOGIN_LEN {
        return false;
    }
    if login.starts_with('-') || login.ends_with('-') || login.contains("--") {
        return false;
    }
    login.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Identity {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Identity::parse(&value)
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        identity.0
    }
}

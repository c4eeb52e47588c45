use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid GitHub username: {0}")]
    InvalidUsername(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("GitHub API error ({status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Failed to fetch data: {0}")]
    DataFetch(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// HTTP status the route layer answers with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::InvalidUsername(_) => 400,
            Error::NotFound(_) => 404,
            Error::RateLimited(_) => 403,
            _ => 500,
        }
    }

    /// Stable message safe to show to end users. Never includes upstream bodies.
    pub fn public_message(&self) -> &'static str {
        match self {
            Error::InvalidUsername(_) => "Invalid GitHub username",
            Error::NotFound(_) => "User not found",
            Error::RateLimited(_) => "GitHub API rate limit exceeded. Please try again later.",
            Error::DataFetch(_) => "Failed to fetch GitHub data",
            _ => "Internal server error",
        }
    }
}

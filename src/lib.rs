pub mod config;
pub mod error;
pub mod models;
pub mod github;
pub mod analysis;
pub mod server;

pub use config::{Config, ReportConfig};
pub use error::{Error, Result};
pub use github::GitHubClient;
pub use analysis::ReportAssembler;
pub use models::{Identity, WrappedReport};

pub mod user;
pub mod commit;
pub mod calendar;
pub mod identity;
pub mod report;

pub use user::*;
pub use commit::*;
pub use calendar::*;
pub use identity::Identity;
pub use report::*;

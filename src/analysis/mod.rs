pub mod harvester;
pub mod reconciler;
pub mod stats;
pub mod personality;
pub mod assembler;
pub mod legacy;

pub use assembler::ReportAssembler;
pub use harvester::{Harvest, Harvester};
pub use reconciler::{CalendarResult, Fetched, Reconciler};

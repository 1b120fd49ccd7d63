pub mod companies;
pub mod orchestrator;

pub use companies::{CompanyEntry, CompanyRegistry};
pub use orchestrator::{Orchestrator, RunOutcome};

pub mod prelude {
    pub use super::{CompanyRegistry, Orchestrator, RunOutcome};
    pub use ns_core::{CompanyAnalysis, Result};
}

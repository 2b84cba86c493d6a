//! Core logic for participant viewing plans.
//!
//! Assigns a catalogue of items to a participant pool so that every item
//! gets a target number of views, each participant gets an ordered personal
//! sequence, and (optionally) every viewed item is followed by a delayed
//! companion item. Generation is pure and seeded; storage lives behind the
//! `repo` traits.

pub mod config;
pub mod db;
pub mod logging;
pub mod materialize;
pub mod model;
pub mod plan;
pub mod repo;
pub mod service;

pub use config::{load_config, ConfigError, ConfigMode, ViewPlanConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use materialize::{to_records, ConsistencyError, RecordSet, ViewRecord};
pub use model::assignment::{
    Batch, BatchId, BatchViewAssignment, ItemId, ItemRole, ParticipantId, Placement,
    ViewAssignment,
};
pub use model::run::{AssignmentRun, RunId, RunKind};
pub use plan::batch::{partition_and_assign, BatchOptions};
pub use plan::cycle::generate;
pub use plan::random::{seeded_rng, RandomSource};
pub use plan::transit::{generate_paired, TransitOptions};
pub use plan::{ConfigurationError, PlanResult};
pub use repo::participant_repo::{ParticipantSource, SqliteParticipantRepository};
pub use repo::view_repo::{SqliteViewSink, ViewSink};
pub use repo::{RepoError, RepoResult};
pub use service::assignment_service::{
    AssignmentError, AssignmentResult, AssignmentService, BatchPlanRequest, PlanSummary,
    ViewPlanRequest,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

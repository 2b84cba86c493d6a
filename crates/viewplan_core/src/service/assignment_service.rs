//! Assignment use-case service.
//!
//! # Responsibility
//! - Run the cycle, transit and batch generators against the stored pool.
//! - Persist materialized records together with one audit row per run.
//!
//! # Invariants
//! - Configuration errors abort before the sink is touched.
//! - Records handed to the sink always match their declared schema.
//! - Mirrored rows only address participants already in the pool.

use crate::materialize::{to_records, ConsistencyError, ViewRecord};
use crate::model::assignment::{BatchViewAssignment, ParticipantId, ViewAssignment};
use crate::model::run::{AssignmentRun, RunId, RunKind};
use crate::plan::batch::{partition_and_assign, BatchOptions};
use crate::plan::cohort::{mirror_for_cohort, CohortRow};
use crate::plan::random::RandomSource;
use crate::plan::transit::{generate_paired, TransitOptions};
use crate::plan::{cycle, ConfigurationError};
use crate::repo::participant_repo::ParticipantSource;
use crate::repo::view_repo::ViewSink;
use crate::repo::RepoError;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type AssignmentResult<T> = Result<T, AssignmentError>;

/// Service error for assignment use-cases.
#[derive(Debug)]
pub enum AssignmentError {
    /// Parameters make balanced generation impossible.
    Configuration(ConfigurationError),
    /// Materialized records do not match their schema.
    Consistency(ConsistencyError),
    /// Storage failure.
    Repo(RepoError),
    /// Run parameters could not be encoded for the audit row.
    Encode(serde_json::Error),
}

impl Display for AssignmentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration(err) => write!(f, "configuration error: {err}"),
            Self::Consistency(err) => write!(f, "consistency error: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode run parameters: {err}"),
        }
    }
}

impl Error for AssignmentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Configuration(err) => Some(err),
            Self::Consistency(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<ConfigurationError> for AssignmentError {
    fn from(value: ConfigurationError) -> Self {
        Self::Configuration(value)
    }
}

impl From<ConsistencyError> for AssignmentError {
    fn from(value: ConsistencyError) -> Self {
        Self::Consistency(value)
    }
}

impl From<RepoError> for AssignmentError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Consistency(err) => Self::Consistency(err),
            other => Self::Repo(other),
        }
    }
}

impl From<serde_json::Error> for AssignmentError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Parameters for a per-participant plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewPlanRequest {
    pub n_items: usize,
    pub n_views: usize,
    pub shuffle: bool,
    /// `None` generates a plain cycle plan; `Some` adds delayed companions.
    pub delay: Option<usize>,
    /// Only meaningful with `delay`.
    pub swap_before_interleave: bool,
}

/// Parameters for a batch plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPlanRequest {
    pub n_items: usize,
    pub n_batches: usize,
    pub delay: usize,
    pub batches_per_participant: usize,
    pub swap_before_interleave: bool,
}

/// Outcome of a persisted run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSummary<T> {
    pub run_id: RunId,
    pub kind: RunKind,
    pub rows: Vec<T>,
    /// Distinct participants receiving at least one row.
    pub participants: usize,
}

/// Use-case service wrapper for plan generation and persistence.
pub struct AssignmentService<S: ParticipantSource, K: ViewSink> {
    source: S,
    sink: K,
}

impl<S: ParticipantSource, K: ViewSink> AssignmentService<S, K> {
    pub fn new(source: S, sink: K) -> Self {
        Self { source, sink }
    }

    /// Generates a cycle or transit plan without persisting it.
    pub fn plan_views<R: RandomSource>(
        &self,
        request: &ViewPlanRequest,
        rng: &mut R,
    ) -> AssignmentResult<Vec<ViewAssignment>> {
        let participant_ids = self.source.participant_ids()?;
        let rows = match request.delay {
            Some(delay) => generate_paired(
                request.n_items,
                request.n_views,
                &participant_ids,
                request.shuffle,
                rng,
                TransitOptions {
                    delay,
                    swap_before_interleave: request.swap_before_interleave,
                },
            ),
            None => cycle::generate(
                request.n_items,
                request.n_views,
                &participant_ids,
                request.shuffle,
                rng,
            ),
        };
        rows.map_err(|err| log_rejected(view_kind(request), err))
    }

    /// Generates and persists a cycle or transit plan.
    pub fn create_views<R: RandomSource>(
        &self,
        request: &ViewPlanRequest,
        rng: &mut R,
    ) -> AssignmentResult<PlanSummary<ViewAssignment>> {
        let rows = self.plan_views(request, rng)?;
        self.persist(view_kind(request), serde_json::to_string(request)?, rows)
    }

    /// Generates a batch plan without persisting it.
    pub fn plan_batch_views<R: RandomSource>(
        &self,
        request: &BatchPlanRequest,
        rng: &mut R,
    ) -> AssignmentResult<Vec<BatchViewAssignment>> {
        let participant_ids = self.source.participant_ids()?;
        partition_and_assign(
            request.n_items,
            &participant_ids,
            BatchOptions {
                n_batches: request.n_batches,
                delay: request.delay,
                batches_per_participant: request.batches_per_participant,
                swap_before_interleave: request.swap_before_interleave,
            },
            rng,
        )
        .map_err(|err| log_rejected(RunKind::Batch, err))
    }

    /// Generates and persists a batch plan.
    pub fn create_batch_views<R: RandomSource>(
        &self,
        request: &BatchPlanRequest,
        rng: &mut R,
    ) -> AssignmentResult<PlanSummary<BatchViewAssignment>> {
        let rows = self.plan_batch_views(request, rng)?;
        self.persist(RunKind::Batch, serde_json::to_string(request)?, rows)
    }

    /// Persists a copy of `rows` for the cohort shifted by `participant_offset`.
    ///
    /// # Errors
    /// `UnregisteredParticipant` when a shifted id is not in the pool; the
    /// second cohort must be registered first.
    pub fn mirror_views<T>(
        &self,
        rows: &[T],
        participant_offset: i64,
    ) -> AssignmentResult<PlanSummary<T>>
    where
        T: CohortRow + ViewRecord + ParticipantRow,
    {
        let mirrored = mirror_for_cohort(rows, participant_offset)
            .map_err(|err| log_rejected(RunKind::Mirror, err))?;
        let known = self.source.participant_ids()?;
        if let Some(missing) = distinct_ids(&mirrored)
            .into_iter()
            .find(|id| known.binary_search(id).is_err())
        {
            return Err(log_rejected(
                RunKind::Mirror,
                ConfigurationError::UnregisteredParticipant(missing),
            ));
        }
        let params = serde_json::json!({ "participant_offset": participant_offset });
        self.persist(RunKind::Mirror, params.to_string(), mirrored)
    }

    fn persist<T>(&self, kind: RunKind, params: String, rows: Vec<T>) -> AssignmentResult<PlanSummary<T>>
    where
        T: ViewRecord + ParticipantRow,
    {
        let records = to_records(&rows)?;
        let run = AssignmentRun::new(kind, params, records.len());
        let written = self.sink.insert_run(&run, &records).map_err(|err| {
            error!(
                "event=plan_persist module=service status=error kind={} run_id={} error={err}",
                kind.as_str(),
                run.id
            );
            err
        })?;

        let participants = distinct_ids(&rows).len();
        info!(
            "event=plan_persist module=service status=ok kind={} run_id={} rows={written} participants={participants}",
            kind.as_str(),
            run.id
        );
        Ok(PlanSummary {
            run_id: run.id,
            kind,
            rows,
            participants,
        })
    }
}

/// Row addressed to one participant.
pub trait ParticipantRow {
    fn participant(&self) -> ParticipantId;
}

impl ParticipantRow for ViewAssignment {
    fn participant(&self) -> ParticipantId {
        self.participant_id
    }
}

impl ParticipantRow for BatchViewAssignment {
    fn participant(&self) -> ParticipantId {
        self.participant_id
    }
}

fn distinct_ids<T: ParticipantRow>(rows: &[T]) -> Vec<ParticipantId> {
    let mut ids: Vec<ParticipantId> = rows.iter().map(ParticipantRow::participant).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

fn view_kind(request: &ViewPlanRequest) -> RunKind {
    if request.delay.is_some() {
        RunKind::Transit
    } else {
        RunKind::Cycle
    }
}

fn log_rejected(kind: RunKind, err: ConfigurationError) -> AssignmentError {
    error!(
        "event=plan_generate module=service status=rejected kind={} error={err}",
        kind.as_str()
    );
    err.into()
}

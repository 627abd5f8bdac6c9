//! Planning phase state machine.
//!
//! ```text
//! Draft -> Active -> SubmissionOpen <-> UnderReview -> Closed -> Archived
//! ```
//!
//! Each transition re-reads the phase inside a database transaction and re-checks its
//! preconditions before writing. Failed preconditions are returned as typed errors and
//! never retried. Archiving an already archived phase is a no-op.

use crate::{
    config::WorkflowPolicy,
    core::access::{Actor, Capability, authorize},
    core::semester::get_semester,
    entities::{
        LoadStatement, PlanningPhase, load_statement,
        load_statement::StatementStatus,
        planning_phase::{self, PhaseOutcome, PhaseState},
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{DatabaseTransaction, QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{info, instrument};

/// Input for [`create_phase`]
#[derive(Debug, Clone)]
pub struct NewPhase {
    /// Semester to plan
    pub semester_id: i64,
    /// Display name
    pub name: String,
    /// Planned opening date
    pub start_date: NaiveDate,
    /// Planned closing date
    pub end_date: NaiveDate,
}

/// Filter for [`list_phases`]; `None` fields do not restrict
#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseFilter {
    /// Only phases of this semester
    pub semester_id: Option<i64>,
    /// Only phases in this state
    pub state: Option<PhaseState>,
}

fn invalid_transition(phase: &planning_phase::Model, action: &'static str) -> Error {
    Error::InvalidTransition {
        entity: "planning phase",
        state: phase.state.to_string(),
        action,
    }
}

/// Finds a phase by id.
pub async fn get_phase<C>(db: &C, phase_id: i64) -> Result<planning_phase::Model>
where
    C: ConnectionTrait,
{
    PlanningPhase::find_by_id(phase_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("planning phase", phase_id))
}

/// Lists phases matching `filter`, newest first.
pub async fn list_phases(
    db: &DatabaseConnection,
    filter: PhaseFilter,
) -> Result<Vec<planning_phase::Model>> {
    let mut query = PlanningPhase::find();
    if let Some(semester_id) = filter.semester_id {
        query = query.filter(planning_phase::Column::SemesterId.eq(semester_id));
    }
    if let Some(state) = filter.state {
        query = query.filter(planning_phase::Column::State.eq(state));
    }
    query
        .order_by_desc(planning_phase::Column::StartDate)
        .order_by_desc(planning_phase::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Returns the active phase of a semester, if any.
pub async fn get_active_phase(
    db: &DatabaseConnection,
    semester_id: i64,
) -> Result<Option<planning_phase::Model>> {
    PlanningPhase::find()
        .filter(planning_phase::Column::SemesterId.eq(semester_id))
        .filter(planning_phase::Column::IsActive.eq(true))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a phase in `Draft`.
///
/// # Errors
/// - [`Error::InvalidRange`] if `end_date <= start_date`
/// - [`Error::NotFound`] if the semester does not exist
/// - [`Error::ConflictingActivePhase`] if the semester already has a non-archived phase
#[instrument(skip(db))]
pub async fn create_phase(
    db: &DatabaseConnection,
    actor: &Actor,
    input: NewPhase,
) -> Result<planning_phase::Model> {
    authorize(actor, Capability::ManagePhases)?;

    if input.end_date <= input.start_date {
        return Err(Error::InvalidRange {
            start: input.start_date,
            end: input.end_date,
        });
    }

    let txn = db.begin().await?;
    let semester = get_semester(&txn, input.semester_id).await?;

    let blocking = PlanningPhase::find()
        .filter(planning_phase::Column::SemesterId.eq(semester.id))
        .filter(planning_phase::Column::State.ne(PhaseState::Archived))
        .one(&txn)
        .await?;
    if let Some(blocking) = blocking {
        return Err(Error::ConflictingActivePhase {
            semester_id: semester.id,
            phase_id: blocking.id,
        });
    }

    let name = if input.name.trim().is_empty() {
        format!("Planning {}", semester.code)
    } else {
        input.name.trim().to_string()
    };

    let phase = planning_phase::ActiveModel {
        semester_id: Set(semester.id),
        name: Set(name),
        start_date: Set(input.start_date),
        end_date: Set(input.end_date),
        is_active: Set(false),
        state: Set(PhaseState::Draft),
        outcome: Set(None),
        created_by: Set(actor.person_id),
        created_at: Set(chrono::Utc::now()),
        closed_at: Set(None),
        archived_at: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!(phase_id = phase.id, semester_id = semester.id, "Created planning phase");
    Ok(phase)
}

/// Draft -> Active. Clears `is_active` on the other phases of the semester, or on every
/// phase when `policy.single_active_phase` is set.
#[instrument(skip(db))]
pub async fn activate_phase(
    db: &DatabaseConnection,
    actor: &Actor,
    policy: &WorkflowPolicy,
    phase_id: i64,
) -> Result<planning_phase::Model> {
    authorize(actor, Capability::ManagePhases)?;

    let txn = db.begin().await?;
    let phase = get_phase(&txn, phase_id).await?;
    if phase.state != PhaseState::Draft {
        return Err(invalid_transition(&phase, "activate"));
    }

    let mut others = PlanningPhase::update_many()
        .col_expr(planning_phase::Column::IsActive, Expr::value(false))
        .filter(planning_phase::Column::IsActive.eq(true))
        .filter(planning_phase::Column::Id.ne(phase.id));
    if !policy.single_active_phase {
        others = others.filter(planning_phase::Column::SemesterId.eq(phase.semester_id));
    }
    let deactivated = others.exec(&txn).await?.rows_affected;

    let mut active: planning_phase::ActiveModel = phase.into();
    active.state = Set(PhaseState::Active);
    active.is_active = Set(true);
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    info!(phase_id, deactivated, "Activated planning phase");
    Ok(updated)
}

async fn set_state(
    txn: &DatabaseTransaction,
    phase: planning_phase::Model,
    state: PhaseState,
) -> Result<planning_phase::Model> {
    let mut active: planning_phase::ActiveModel = phase.into();
    active.state = Set(state);
    active.update(txn).await.map_err(Into::into)
}

/// Active | UnderReview -> SubmissionOpen. Statements may leave `Draft` only while open.
#[instrument(skip(db))]
pub async fn open_submission(
    db: &DatabaseConnection,
    actor: &Actor,
    phase_id: i64,
) -> Result<planning_phase::Model> {
    authorize(actor, Capability::ManagePhases)?;

    let txn = db.begin().await?;
    let phase = get_phase(&txn, phase_id).await?;
    if !matches!(phase.state, PhaseState::Active | PhaseState::UnderReview) {
        return Err(invalid_transition(&phase, "open submission for"));
    }
    let updated = set_state(&txn, phase, PhaseState::SubmissionOpen).await?;
    txn.commit().await?;

    info!(phase_id, "Submission opened");
    Ok(updated)
}

/// SubmissionOpen -> UnderReview.
#[instrument(skip(db))]
pub async fn close_submission(
    db: &DatabaseConnection,
    actor: &Actor,
    phase_id: i64,
) -> Result<planning_phase::Model> {
    authorize(actor, Capability::ManagePhases)?;

    let txn = db.begin().await?;
    let phase = get_phase(&txn, phase_id).await?;
    if phase.state != PhaseState::SubmissionOpen {
        return Err(invalid_transition(&phase, "close submission for"));
    }
    let updated = set_state(&txn, phase, PhaseState::UnderReview).await?;
    txn.commit().await?;

    info!(phase_id, "Submission closed");
    Ok(updated)
}

/// UnderReview -> Closed, recording the outcome.
///
/// Fails while statements are still waiting for a decision. The outcome is `Approved`
/// unless at least one statement was rejected.
#[instrument(skip(db))]
pub async fn close_phase(
    db: &DatabaseConnection,
    actor: &Actor,
    phase_id: i64,
) -> Result<planning_phase::Model> {
    authorize(actor, Capability::ManagePhases)?;

    let txn = db.begin().await?;
    let phase = get_phase(&txn, phase_id).await?;
    if phase.state != PhaseState::UnderReview {
        return Err(invalid_transition(&phase, "close"));
    }

    let pending = LoadStatement::find()
        .filter(load_statement::Column::PhaseId.eq(phase.id))
        .filter(load_statement::Column::Status.eq(StatementStatus::Submitted))
        .count(&txn)
        .await?;
    if pending > 0 {
        return Err(Error::InvalidTransition {
            entity: "planning phase",
            state: format!("{} with {pending} statements awaiting review", phase.state),
            action: "close",
        });
    }

    let rejected = LoadStatement::find()
        .filter(load_statement::Column::PhaseId.eq(phase.id))
        .filter(load_statement::Column::Status.eq(StatementStatus::Rejected))
        .count(&txn)
        .await?;
    let outcome = if rejected > 0 {
        PhaseOutcome::PartiallyRejected
    } else {
        PhaseOutcome::Approved
    };

    let mut active: planning_phase::ActiveModel = phase.into();
    active.state = Set(PhaseState::Closed);
    active.outcome = Set(Some(outcome));
    active.closed_at = Set(Some(chrono::Utc::now()));
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    info!(phase_id, ?outcome, "Closed planning phase");
    Ok(updated)
}

/// Closed -> Archived. Idempotent: an archived phase is returned unchanged.
#[instrument(skip(db))]
pub async fn archive_phase(
    db: &DatabaseConnection,
    actor: &Actor,
    phase_id: i64,
) -> Result<planning_phase::Model> {
    authorize(actor, Capability::ManagePhases)?;

    let txn = db.begin().await?;
    let phase = get_phase(&txn, phase_id).await?;
    let state = phase.state;
    match state {
        PhaseState::Archived => {
            txn.commit().await?;
            return Ok(phase);
        }
        PhaseState::Closed => {}
        _ => return Err(invalid_transition(&phase, "archive")),
    }

    let mut active: planning_phase::ActiveModel = phase.into();
    active.state = Set(PhaseState::Archived);
    active.is_active = Set(false);
    active.archived_at = Set(Some(chrono::Utc::now()));
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    info!(phase_id, "Archived planning phase");
    Ok(updated)
}

//! Load statement business logic - drafting, line items and the review workflow.
//!
//! ```text
//! Draft -> Submitted -> Approved | Rejected
//! ```
//!
//! A statement is editable only as a draft while its phase accepts drafts. Approved and
//! rejected statements are immutable; this module refuses every change to them rather than
//! relying on storage permissions. Submission is gated by the phase being open for
//! submission, review by the phase still accepting reviews.
//!
//! Computing a breakdown never writes. Subtotals are persisted only by [`recalculate`] and
//! [`submit`], in the same transaction that reads the items they are computed from.

use crate::{
    config::WorkflowPolicy,
    core::{
        access::{Actor, Capability, authorize},
        course_plan::list_teaching_assignments,
        duty::approved_duties_for_person,
        load::{LoadBreakdown, compute_load},
        phase::get_phase,
        settings::{LoadRules, active_rules_or_default, rules_by_id, validate_sws},
    },
    entities::{
        LoadItem, LoadStatement,
        load_item::{
            self, DegreeLevel, ItemOrigin, LoadCategory, SupervisionStatus, SupervisionType,
            TeachingKind,
        },
        load_statement::{self, StatementStatus},
        planning_phase::{self, PhaseState},
    },
    errors::{Error, Result},
};
use sea_orm::{DatabaseTransaction, QueryOrder, Set, SqlErr, TransactionTrait, prelude::*};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, instrument, warn};

/// A line item as entered by the user, one variant per category
#[derive(Debug, Clone, PartialEq)]
pub enum LoadItemInput {
    /// Own teaching activity
    Teaching {
        /// Course title
        description: String,
        /// Kind of course
        kind: TeachingKind,
        /// Weekly hours
        sws: f64,
    },
    /// Teaching for another department
    Export {
        /// Course title
        description: String,
        /// Receiving department
        target_department: String,
        /// Weekly hours
        sws: f64,
    },
    /// Substitution for a colleague
    Substitution {
        /// What was taught
        description: String,
        /// Who was substituted
        substitute_for: String,
        /// Weekly hours
        sws: f64,
    },
    /// Reduction or credit
    Reduction {
        /// Reason for the reduction
        description: String,
        /// Weekly hours
        sws: f64,
    },
    /// Thesis, seminar or project supervision
    Supervision {
        /// Thesis or project title
        title: String,
        /// Supervised student
        student_name: String,
        /// What is supervised
        supervision_type: SupervisionType,
        /// Degree level of the student
        degree_level: DegreeLevel,
        /// Running or finished
        status: SupervisionStatus,
        /// Manual hours replacing the configured coefficient
        override_sws: Option<f64>,
    },
}

impl LoadItemInput {
    /// Category the item belongs to.
    #[must_use]
    pub const fn category(&self) -> LoadCategory {
        match self {
            Self::Teaching { .. } => LoadCategory::Teaching,
            Self::Export { .. } => LoadCategory::Export,
            Self::Substitution { .. } => LoadCategory::Substitution,
            Self::Reduction { .. } => LoadCategory::Reduction,
            Self::Supervision { .. } => LoadCategory::Supervision,
        }
    }

    fn validate(&self) -> Result<()> {
        let (text, hours) = match self {
            Self::Teaching {
                description, sws, ..
            }
            | Self::Export {
                description, sws, ..
            }
            | Self::Substitution {
                description, sws, ..
            }
            | Self::Reduction { description, sws } => (description, Some(*sws)),
            Self::Supervision {
                title,
                override_sws,
                ..
            } => (title, *override_sws),
        };
        if text.trim().is_empty() {
            return Err(Error::Validation {
                message: format!("A {} item needs a description", self.category()),
            });
        }
        hours.map_or(Ok(()), validate_sws)
    }

    /// Writes every content column, clearing the ones that belong to other categories.
    fn apply(self, item: &mut load_item::ActiveModel) {
        item.category = Set(self.category());
        item.teaching_kind = Set(None);
        item.target_department = Set(None);
        item.substitute_for = Set(None);
        item.supervision_type = Set(None);
        item.degree_level = Set(None);
        item.supervision_status = Set(None);
        item.student_name = Set(None);
        item.override_sws = Set(None);

        match self {
            Self::Teaching {
                description,
                kind,
                sws,
            } => {
                item.description = Set(description.trim().to_string());
                item.teaching_kind = Set(Some(kind));
                item.sws = Set(sws);
            }
            Self::Export {
                description,
                target_department,
                sws,
            } => {
                item.description = Set(description.trim().to_string());
                item.target_department = Set(Some(target_department.trim().to_string()));
                item.sws = Set(sws);
            }
            Self::Substitution {
                description,
                substitute_for,
                sws,
            } => {
                item.description = Set(description.trim().to_string());
                item.substitute_for = Set(Some(substitute_for.trim().to_string()));
                item.sws = Set(sws);
            }
            Self::Reduction { description, sws } => {
                item.description = Set(description.trim().to_string());
                item.sws = Set(sws);
            }
            Self::Supervision {
                title,
                student_name,
                supervision_type,
                degree_level,
                status,
                override_sws,
            } => {
                item.description = Set(title.trim().to_string());
                item.student_name = Set(Some(student_name.trim().to_string()));
                item.supervision_type = Set(Some(supervision_type));
                item.degree_level = Set(Some(degree_level));
                item.supervision_status = Set(Some(status));
                item.override_sws = Set(override_sws);
                item.sws = Set(0.0);
            }
        }
    }
}

/// A statement together with its items and computed breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementBreakdown {
    /// The statement row
    pub statement: load_statement::Model,
    /// Its line items, grouped by category
    pub items: Vec<load_item::Model>,
    /// The computed load
    pub breakdown: LoadBreakdown,
}

async fn find_statement<C>(db: &C, statement_id: i64) -> Result<load_statement::Model>
where
    C: ConnectionTrait,
{
    LoadStatement::find_by_id(statement_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("load statement", statement_id))
}

async fn find_item<C>(db: &C, item_id: i64) -> Result<load_item::Model>
where
    C: ConnectionTrait,
{
    LoadItem::find_by_id(item_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("load item", item_id))
}

/// Line items of a statement, ordered by category and then by creation.
pub async fn list_items<C>(db: &C, statement_id: i64) -> Result<Vec<load_item::Model>>
where
    C: ConnectionTrait,
{
    let mut items = LoadItem::find()
        .filter(load_item::Column::StatementId.eq(statement_id))
        .order_by_asc(load_item::Column::Id)
        .all(db)
        .await?;
    items.sort_by_key(|item| (item.category, item.id));
    Ok(items)
}

/// Fails unless the statement is a draft in a phase that still accepts drafts.
fn ensure_editable(
    statement: &load_statement::Model,
    phase: &planning_phase::Model,
) -> Result<()> {
    if statement.status.is_final() {
        return Err(Error::ImmutableRecord {
            statement_id: statement.id,
            status: statement.status.to_string(),
        });
    }
    if statement.status != StatementStatus::Draft {
        return Err(Error::InvalidTransition {
            entity: "load statement",
            state: statement.status.to_string(),
            action: "edit",
        });
    }
    if !phase.state.accepts_drafts() {
        return Err(Error::InvalidTransition {
            entity: "planning phase",
            state: phase.state.to_string(),
            action: "edit statements of",
        });
    }
    Ok(())
}

/// Reads the statement and its phase inside `txn`, authorizes an edit and checks that the
/// statement is still editable.
async fn load_for_edit(
    txn: &DatabaseTransaction,
    actor: &Actor,
    statement_id: i64,
) -> Result<load_statement::Model> {
    let statement = find_statement(txn, statement_id).await?;
    authorize(
        actor,
        Capability::EditStatement {
            owner: statement.person_id,
        },
    )?;
    let phase = get_phase(txn, statement.phase_id).await?;
    ensure_editable(&statement, &phase)?;
    Ok(statement)
}

async fn touch(txn: &DatabaseTransaction, statement: load_statement::Model) -> Result<()> {
    let mut active: load_statement::ActiveModel = statement.into();
    active.updated_at = Set(chrono::Utc::now());
    active.update(txn).await?;
    Ok(())
}

fn write_breakdown(
    active: &mut load_statement::ActiveModel,
    breakdown: &LoadBreakdown,
    settings_id: Option<i64>,
) {
    active.sws_teaching = Set(breakdown.credited(LoadCategory::Teaching));
    active.sws_export = Set(breakdown.credited(LoadCategory::Export));
    active.sws_substitution = Set(breakdown.credited(LoadCategory::Substitution));
    active.sws_reduction = Set(breakdown.credited(LoadCategory::Reduction));
    active.sws_supervision = Set(breakdown.credited(LoadCategory::Supervision));
    active.sws_total = Set(breakdown.total);
    active.sws_delta = Set(breakdown.delta);
    active.settings_id = Set(settings_id);
}

/// Maps a unique-index violation on `(phase_id, person_id)` to [`Error::DuplicateStatement`].
///
/// Covers a concurrent draft committed between the existence check and the insert.
fn duplicate_or_db(err: DbErr, phase_id: i64, person_id: i64) -> Error {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => Error::DuplicateStatement {
            phase_id,
            person_id,
        },
        _ => err.into(),
    }
}

/// Creates an empty draft for `person_id` in `phase_id`.
///
/// # Errors
/// - [`Error::InvalidTransition`] unless the phase is active or open for submission
/// - [`Error::DuplicateStatement`] if the person already has a statement in the phase
#[instrument(skip(db))]
pub async fn create_draft(
    db: &DatabaseConnection,
    actor: &Actor,
    phase_id: i64,
    person_id: i64,
    netto_lehrverpflichtung: Option<f64>,
) -> Result<load_statement::Model> {
    authorize(actor, Capability::EditStatement { owner: person_id })?;
    if let Some(target) = netto_lehrverpflichtung {
        validate_sws(target)?;
    }

    let txn = db.begin().await?;
    let phase = get_phase(&txn, phase_id).await?;
    if !phase.state.accepts_drafts() {
        return Err(Error::InvalidTransition {
            entity: "planning phase",
            state: phase.state.to_string(),
            action: "create statements in",
        });
    }

    let existing = LoadStatement::find()
        .filter(load_statement::Column::PhaseId.eq(phase_id))
        .filter(load_statement::Column::PersonId.eq(person_id))
        .one(&txn)
        .await?;
    if existing.is_some() {
        return Err(Error::DuplicateStatement {
            phase_id,
            person_id,
        });
    }

    let now = chrono::Utc::now();
    let statement = load_statement::ActiveModel {
        phase_id: Set(phase_id),
        person_id: Set(person_id),
        netto_lehrverpflichtung: Set(netto_lehrverpflichtung),
        status: Set(StatementStatus::Draft),
        submitted_at: Set(None),
        approved_at: Set(None),
        rejected_at: Set(None),
        rejection_reason: Set(None),
        reviewed_by: Set(None),
        settings_id: Set(None),
        sws_teaching: Set(0.0),
        sws_export: Set(0.0),
        sws_substitution: Set(0.0),
        sws_reduction: Set(0.0),
        sws_supervision: Set(0.0),
        sws_total: Set(0.0),
        sws_delta: Set(0.0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| duplicate_or_db(e, phase_id, person_id))?;
    txn.commit().await?;

    info!(statement_id = statement.id, phase_id, person_id, "Created load statement draft");
    Ok(statement)
}

/// Reads a statement the actor may see.
pub async fn get_statement(
    db: &DatabaseConnection,
    actor: &Actor,
    statement_id: i64,
) -> Result<load_statement::Model> {
    let statement = find_statement(db, statement_id).await?;
    authorize(
        actor,
        Capability::ViewStatement {
            owner: statement.person_id,
        },
    )?;
    Ok(statement)
}

/// Lists all statements of a phase, ordered by person.
///
/// # Errors
/// [`Error::NotFound`] if the phase does not exist
pub async fn list_statements_for_phase(
    db: &DatabaseConnection,
    actor: &Actor,
    phase_id: i64,
) -> Result<Vec<load_statement::Model>> {
    authorize(actor, Capability::ViewPhaseStatements)?;
    get_phase(db, phase_id).await?;
    LoadStatement::find()
        .filter(load_statement::Column::PhaseId.eq(phase_id))
        .order_by_asc(load_statement::Column::PersonId)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Changes the personal net obligation of a draft; `None` falls back to the default.
#[instrument(skip(db))]
pub async fn set_target(
    db: &DatabaseConnection,
    actor: &Actor,
    statement_id: i64,
    netto_lehrverpflichtung: Option<f64>,
) -> Result<load_statement::Model> {
    if let Some(target) = netto_lehrverpflichtung {
        validate_sws(target)?;
    }

    let txn = db.begin().await?;
    let statement = load_for_edit(&txn, actor, statement_id).await?;
    let mut active: load_statement::ActiveModel = statement.into();
    active.netto_lehrverpflichtung = Set(netto_lehrverpflichtung);
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(&txn).await?;
    txn.commit().await?;
    Ok(updated)
}

/// Deletes a draft together with its items.
#[instrument(skip(db))]
pub async fn delete_draft(db: &DatabaseConnection, actor: &Actor, statement_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let statement = load_for_edit(&txn, actor, statement_id).await?;

    LoadItem::delete_many()
        .filter(load_item::Column::StatementId.eq(statement.id))
        .exec(&txn)
        .await?;
    statement.delete(&txn).await?;
    txn.commit().await?;

    info!(statement_id, "Deleted load statement draft");
    Ok(())
}

/// Adds a manually entered item to a draft.
#[instrument(skip(db))]
pub async fn add_item(
    db: &DatabaseConnection,
    actor: &Actor,
    statement_id: i64,
    input: LoadItemInput,
) -> Result<load_item::Model> {
    input.validate()?;

    let txn = db.begin().await?;
    let statement = load_for_edit(&txn, actor, statement_id).await?;

    let mut item = load_item::ActiveModel {
        statement_id: Set(statement.id),
        origin: Set(ItemOrigin::Manual),
        origin_id: Set(None),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    input.apply(&mut item);
    let item = item.insert(&txn).await?;
    touch(&txn, statement).await?;
    txn.commit().await?;

    info!(item_id = item.id, statement_id, category = %item.category, "Added load item");
    Ok(item)
}

/// Replaces the content of an item. The category may change; the origin is kept.
#[instrument(skip(db))]
pub async fn update_item(
    db: &DatabaseConnection,
    actor: &Actor,
    item_id: i64,
    input: LoadItemInput,
) -> Result<load_item::Model> {
    input.validate()?;

    let txn = db.begin().await?;
    let existing = find_item(&txn, item_id).await?;
    let statement = load_for_edit(&txn, actor, existing.statement_id).await?;

    let mut item: load_item::ActiveModel = existing.into();
    input.apply(&mut item);
    let item = item.update(&txn).await?;
    touch(&txn, statement).await?;
    txn.commit().await?;

    info!(item_id, "Updated load item");
    Ok(item)
}

/// Removes an item from a draft.
#[instrument(skip(db))]
pub async fn remove_item(db: &DatabaseConnection, actor: &Actor, item_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let existing = find_item(&txn, item_id).await?;
    let statement = load_for_edit(&txn, actor, existing.statement_id).await?;

    existing.delete(&txn).await?;
    touch(&txn, statement).await?;
    txn.commit().await?;

    info!(item_id, "Removed load item");
    Ok(())
}

/// Origin ids of a statement's items that were derived from `origin`.
async fn imported_origin_ids(
    txn: &DatabaseTransaction,
    statement_id: i64,
    origin: ItemOrigin,
) -> Result<HashSet<i64>> {
    Ok(LoadItem::find()
        .filter(load_item::Column::StatementId.eq(statement_id))
        .filter(load_item::Column::Origin.eq(origin))
        .all(txn)
        .await?
        .into_iter()
        .filter_map(|item| item.origin_id)
        .collect())
}

/// Copies the person's scheduled courses of the phase's semester into teaching items.
///
/// Courses imported earlier are skipped; returns only the newly created items.
#[instrument(skip(db))]
pub async fn import_planned_teaching(
    db: &DatabaseConnection,
    actor: &Actor,
    statement_id: i64,
) -> Result<Vec<load_item::Model>> {
    let txn = db.begin().await?;
    let statement = load_for_edit(&txn, actor, statement_id).await?;
    let phase = get_phase(&txn, statement.phase_id).await?;

    let known = imported_origin_ids(&txn, statement.id, ItemOrigin::CoursePlan).await?;
    let assignments =
        list_teaching_assignments(&txn, phase.semester_id, Some(statement.person_id)).await?;

    let now = chrono::Utc::now();
    let mut created = Vec::new();
    for assignment in assignments.into_iter().filter(|a| !known.contains(&a.id)) {
        let mut item = load_item::ActiveModel {
            statement_id: Set(statement.id),
            origin: Set(ItemOrigin::CoursePlan),
            origin_id: Set(Some(assignment.id)),
            created_at: Set(now),
            ..Default::default()
        };
        LoadItemInput::Teaching {
            description: format!("{} {}", assignment.module_code, assignment.title),
            kind: assignment.kind,
            sws: assignment.sws,
        }
        .apply(&mut item);
        created.push(item.insert(&txn).await?);
    }
    if !created.is_empty() {
        touch(&txn, statement).await?;
    }
    txn.commit().await?;

    info!(statement_id, imported = created.len(), "Imported planned teaching");
    Ok(created)
}

/// Copies the person's approved semester duties into reduction items.
///
/// Hours are the assignment's override or the duty's standard value. Duties imported
/// earlier are skipped; returns only the newly created items.
#[instrument(skip(db))]
pub async fn import_approved_duties(
    db: &DatabaseConnection,
    actor: &Actor,
    statement_id: i64,
) -> Result<Vec<load_item::Model>> {
    let txn = db.begin().await?;
    let statement = load_for_edit(&txn, actor, statement_id).await?;
    let phase = get_phase(&txn, statement.phase_id).await?;

    let known = imported_origin_ids(&txn, statement.id, ItemOrigin::SemesterDuty).await?;
    let duties =
        approved_duties_for_person(&txn, phase.semester_id, statement.person_id).await?;

    let now = chrono::Utc::now();
    let mut created = Vec::new();
    for (assignment, duty) in duties.into_iter().filter(|(a, _)| !known.contains(&a.id)) {
        let mut item = load_item::ActiveModel {
            statement_id: Set(statement.id),
            origin: Set(ItemOrigin::SemesterDuty),
            origin_id: Set(Some(assignment.id)),
            created_at: Set(now),
            ..Default::default()
        };
        LoadItemInput::Reduction {
            sws: assignment.credited_sws(&duty),
            description: duty.name,
        }
        .apply(&mut item);
        created.push(item.insert(&txn).await?);
    }
    if !created.is_empty() {
        touch(&txn, statement).await?;
    }
    txn.commit().await?;

    info!(statement_id, imported = created.len(), "Imported approved duties");
    Ok(created)
}

/// Rules a statement is evaluated with: the active settings for drafts, the settings row
/// captured at submission for everything else.
async fn rules_for<C>(db: &C, statement: &load_statement::Model) -> Result<(Option<i64>, LoadRules)>
where
    C: ConnectionTrait,
{
    if statement.status == StatementStatus::Draft {
        return active_rules_or_default(db).await;
    }
    match statement.settings_id {
        Some(id) => Ok((Some(id), rules_by_id(db, id).await?)),
        None => Ok((None, LoadRules::default())),
    }
}

/// Computes the breakdown of a statement with the currently active settings.
/// Nothing is written.
pub async fn compute_preview(
    db: &DatabaseConnection,
    actor: &Actor,
    statement_id: i64,
) -> Result<LoadBreakdown> {
    let statement = get_statement(db, actor, statement_id).await?;
    let items = list_items(db, statement.id).await?;
    let (_, rules) = active_rules_or_default(db).await?;
    Ok(compute_load(
        &items,
        &rules,
        statement.netto_lehrverpflichtung,
    ))
}

/// Returns a statement with its items and breakdown.
///
/// Drafts are evaluated with the active settings; submitted and final statements with the
/// settings they were submitted under, so later settings changes do not alter them.
pub async fn get_breakdown(
    db: &DatabaseConnection,
    actor: &Actor,
    statement_id: i64,
) -> Result<StatementBreakdown> {
    let statement = get_statement(db, actor, statement_id).await?;
    let items = list_items(db, statement.id).await?;
    let (_, rules) = rules_for(db, &statement).await?;
    let breakdown = compute_load(&items, &rules, statement.netto_lehrverpflichtung);
    Ok(StatementBreakdown {
        statement,
        items,
        breakdown,
    })
}

/// Persists the current subtotals of a draft.
#[instrument(skip(db))]
pub async fn recalculate(
    db: &DatabaseConnection,
    actor: &Actor,
    statement_id: i64,
) -> Result<StatementBreakdown> {
    let txn = db.begin().await?;
    let statement = load_for_edit(&txn, actor, statement_id).await?;
    let items = list_items(&txn, statement.id).await?;
    let (settings_id, rules) = active_rules_or_default(&txn).await?;
    let breakdown = compute_load(&items, &rules, statement.netto_lehrverpflichtung);

    let mut active: load_statement::ActiveModel = statement.into();
    write_breakdown(&mut active, &breakdown, settings_id);
    active.updated_at = Set(chrono::Utc::now());
    let statement = active.update(&txn).await?;
    txn.commit().await?;

    info!(statement_id, total = breakdown.total, "Persisted load subtotals");
    Ok(StatementBreakdown {
        statement,
        items,
        breakdown,
    })
}

/// Draft -> Submitted, persisting the subtotals computed with the active settings.
///
/// # Errors
/// - [`Error::AuthorizationDenied`] unless the actor owns the statement
/// - [`Error::InvalidTransition`] if it is not a draft (including approved and rejected
///   statements) or the phase is not open for submission
/// - [`Error::IncompleteData`] if it has no items and the policy forbids empty submissions
#[instrument(skip(db))]
pub async fn submit(
    db: &DatabaseConnection,
    actor: &Actor,
    policy: &WorkflowPolicy,
    statement_id: i64,
) -> Result<StatementBreakdown> {
    let txn = db.begin().await?;
    let statement = find_statement(&txn, statement_id).await?;
    authorize(
        actor,
        Capability::SubmitStatement {
            owner: statement.person_id,
        },
    )?;
    if statement.status != StatementStatus::Draft {
        return Err(Error::InvalidTransition {
            entity: "load statement",
            state: statement.status.to_string(),
            action: "submit",
        });
    }
    let phase = get_phase(&txn, statement.phase_id).await?;
    if phase.state != PhaseState::SubmissionOpen {
        return Err(Error::InvalidTransition {
            entity: "planning phase",
            state: phase.state.to_string(),
            action: "submit statements in",
        });
    }

    let items = list_items(&txn, statement.id).await?;
    if items.is_empty() && !policy.allow_empty_submission {
        return Err(Error::IncompleteData {
            message: format!("Load statement {statement_id} has no line items"),
        });
    }

    let (settings_id, rules) = active_rules_or_default(&txn).await?;
    let breakdown = compute_load(&items, &rules, statement.netto_lehrverpflichtung);

    let now = chrono::Utc::now();
    let mut active: load_statement::ActiveModel = statement.into();
    write_breakdown(&mut active, &breakdown, settings_id);
    active.status = Set(StatementStatus::Submitted);
    active.submitted_at = Set(Some(now));
    active.updated_at = Set(now);
    let statement = active.update(&txn).await?;
    txn.commit().await?;

    if !breakdown.warnings.is_empty() {
        warn!(
            statement_id,
            warnings = breakdown.warnings.len(),
            "Submitted with ceiling warnings"
        );
    }
    info!(
        statement_id,
        total = breakdown.total,
        delta = breakdown.delta,
        "Submitted load statement"
    );
    Ok(StatementBreakdown {
        statement,
        items,
        breakdown,
    })
}

/// Reads a statement for review and checks role, status and phase.
async fn load_for_review(
    txn: &DatabaseTransaction,
    actor: &Actor,
    statement_id: i64,
    action: &'static str,
) -> Result<load_statement::Model> {
    let statement = find_statement(txn, statement_id).await?;
    authorize(
        actor,
        Capability::ReviewStatement {
            owner: statement.person_id,
        },
    )?;
    if statement.status != StatementStatus::Submitted {
        return Err(Error::InvalidTransition {
            entity: "load statement",
            state: statement.status.to_string(),
            action,
        });
    }
    let phase = get_phase(txn, statement.phase_id).await?;
    if !phase.state.accepts_reviews() {
        return Err(Error::InvalidTransition {
            entity: "planning phase",
            state: phase.state.to_string(),
            action: "review statements in",
        });
    }
    Ok(statement)
}

/// Submitted -> Approved.
#[instrument(skip(db))]
pub async fn approve(
    db: &DatabaseConnection,
    actor: &Actor,
    statement_id: i64,
) -> Result<load_statement::Model> {
    let txn = db.begin().await?;
    let statement = load_for_review(&txn, actor, statement_id, "approve").await?;

    let now = chrono::Utc::now();
    let mut active: load_statement::ActiveModel = statement.into();
    active.status = Set(StatementStatus::Approved);
    active.approved_at = Set(Some(now));
    active.reviewed_by = Set(Some(actor.person_id));
    active.updated_at = Set(now);
    let statement = active.update(&txn).await?;
    txn.commit().await?;

    info!(statement_id, reviewer = actor.person_id, "Approved load statement");
    Ok(statement)
}

/// Submitted -> Rejected. The reason must contain more than whitespace.
#[instrument(skip(db))]
pub async fn reject(
    db: &DatabaseConnection,
    actor: &Actor,
    statement_id: i64,
    reason: &str,
) -> Result<load_statement::Model> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(Error::MissingReason);
    }

    let txn = db.begin().await?;
    let statement = load_for_review(&txn, actor, statement_id, "reject").await?;

    let now = chrono::Utc::now();
    let mut active: load_statement::ActiveModel = statement.into();
    active.status = Set(StatementStatus::Rejected);
    active.rejected_at = Set(Some(now));
    active.rejection_reason = Set(Some(reason.to_string()));
    active.reviewed_by = Set(Some(actor.person_id));
    active.updated_at = Set(now);
    let statement = active.update(&txn).await?;
    txn.commit().await?;

    info!(statement_id, reviewer = actor.person_id, "Rejected load statement");
    Ok(statement)
}

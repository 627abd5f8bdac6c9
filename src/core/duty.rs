//! Duty business logic - the duty catalogue and per-semester duty assignments.
//!
//! A semester duty goes `requested -> approved | rejected`; only the dean decides.
//! Approved assignments are what `core::statement::import_approved_duties` turns into
//! reduction items.

use crate::{
    core::access::{Actor, Capability, authorize},
    core::semester::get_semester,
    core::settings::validate_sws,
    entities::{
        Duty, SemesterDuty, duty,
        semester_duty::{self, DutyStatus},
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Input for [`request_semester_duty`]
#[derive(Debug, Clone)]
pub struct SemesterDutyRequest {
    /// Semester the duty is held in
    pub semester_id: i64,
    /// The duty
    pub duty_id: i64,
    /// Person who holds it
    pub person_id: i64,
    /// Hours override; `None` uses the duty's standard value
    pub sws: Option<f64>,
    /// Optional comment for the dean
    pub note: Option<String>,
}

/// Adds a duty to the catalogue.
#[instrument(skip(db))]
pub async fn create_duty(
    db: &DatabaseConnection,
    actor: &Actor,
    name: &str,
    description: Option<String>,
    default_sws: f64,
) -> Result<duty::Model> {
    authorize(actor, Capability::ManageDuties)?;

    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation {
            message: "Duty name cannot be empty".to_string(),
        });
    }
    validate_sws(default_sws)?;

    let txn = db.begin().await?;
    let existing = Duty::find()
        .filter(duty::Column::Name.eq(name))
        .one(&txn)
        .await?;
    if existing.is_some() {
        return Err(Error::Conflict {
            message: format!("Duty '{name}' already exists"),
        });
    }

    let row = duty::ActiveModel {
        name: Set(name.to_string()),
        description: Set(description),
        default_sws: Set(default_sws),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!(duty_id = row.id, name = %row.name, "Created duty");
    Ok(row)
}

/// Lists duties alphabetically, optionally including inactive ones.
pub async fn list_duties(
    db: &DatabaseConnection,
    include_inactive: bool,
) -> Result<Vec<duty::Model>> {
    let mut query = Duty::find();
    if !include_inactive {
        query = query.filter(duty::Column::IsActive.eq(true));
    }
    query
        .order_by_asc(duty::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a duty by id.
pub async fn get_duty<C>(db: &C, duty_id: i64) -> Result<duty::Model>
where
    C: ConnectionTrait,
{
    Duty::find_by_id(duty_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("duty", duty_id))
}

/// Activates or deactivates a catalogue entry. Existing assignments are unaffected.
#[instrument(skip(db))]
pub async fn set_duty_active(
    db: &DatabaseConnection,
    actor: &Actor,
    duty_id: i64,
    is_active: bool,
) -> Result<duty::Model> {
    authorize(actor, Capability::ManageDuties)?;

    let row = get_duty(db, duty_id).await?;
    let mut active: duty::ActiveModel = row.into();
    active.is_active = Set(is_active);
    let updated = active.update(db).await?;

    info!(duty_id, is_active, "Duty activation changed");
    Ok(updated)
}

/// Files a request for a person to hold a duty in a semester.
///
/// # Errors
/// - [`Error::Validation`] if the duty is inactive
/// - [`Error::Conflict`] if a request for the same semester, duty and person is pending
///   or approved
#[instrument(skip(db))]
pub async fn request_semester_duty(
    db: &DatabaseConnection,
    actor: &Actor,
    request: SemesterDutyRequest,
) -> Result<semester_duty::Model> {
    authorize(
        actor,
        Capability::RequestDuty {
            person_id: request.person_id,
        },
    )?;
    if let Some(sws) = request.sws {
        validate_sws(sws)?;
    }

    let txn = db.begin().await?;
    get_semester(&txn, request.semester_id).await?;
    let duty = get_duty(&txn, request.duty_id).await?;
    if !duty.is_active {
        return Err(Error::Validation {
            message: format!("Duty '{}' is inactive", duty.name),
        });
    }

    let existing = SemesterDuty::find()
        .filter(semester_duty::Column::SemesterId.eq(request.semester_id))
        .filter(semester_duty::Column::DutyId.eq(request.duty_id))
        .filter(semester_duty::Column::PersonId.eq(request.person_id))
        .filter(semester_duty::Column::Status.ne(DutyStatus::Rejected))
        .one(&txn)
        .await?;
    if let Some(existing) = existing {
        return Err(Error::Conflict {
            message: format!(
                "Duty '{}' is already {} for person {} in this semester",
                duty.name, existing.status, request.person_id
            ),
        });
    }

    let row = semester_duty::ActiveModel {
        semester_id: Set(request.semester_id),
        duty_id: Set(request.duty_id),
        person_id: Set(request.person_id),
        sws: Set(request.sws),
        status: Set(DutyStatus::Requested),
        requested_by: Set(actor.person_id),
        decided_by: Set(None),
        decided_at: Set(None),
        decision_note: Set(request.note),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!(semester_duty_id = row.id, "Semester duty requested");
    Ok(row)
}

async fn decide(
    db: &DatabaseConnection,
    actor: &Actor,
    semester_duty_id: i64,
    status: DutyStatus,
    note: Option<String>,
) -> Result<semester_duty::Model> {
    authorize(actor, Capability::DecideDuty)?;

    let txn = db.begin().await?;
    let row = SemesterDuty::find_by_id(semester_duty_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("semester duty", semester_duty_id))?;
    if row.status != DutyStatus::Requested {
        return Err(Error::InvalidTransition {
            entity: "semester duty",
            state: row.status.to_string(),
            action: "decide on",
        });
    }

    let mut active: semester_duty::ActiveModel = row.into();
    active.status = Set(status);
    active.decided_by = Set(Some(actor.person_id));
    active.decided_at = Set(Some(chrono::Utc::now()));
    if note.is_some() {
        active.decision_note = Set(note);
    }
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    info!(semester_duty_id, %status, "Semester duty decided");
    Ok(updated)
}

/// Requested -> Approved.
#[instrument(skip(db))]
pub async fn approve_semester_duty(
    db: &DatabaseConnection,
    actor: &Actor,
    semester_duty_id: i64,
) -> Result<semester_duty::Model> {
    decide(db, actor, semester_duty_id, DutyStatus::Approved, None).await
}

/// Requested -> Rejected. A non-empty reason is required.
#[instrument(skip(db))]
pub async fn reject_semester_duty(
    db: &DatabaseConnection,
    actor: &Actor,
    semester_duty_id: i64,
    reason: &str,
) -> Result<semester_duty::Model> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(Error::MissingReason);
    }
    decide(
        db,
        actor,
        semester_duty_id,
        DutyStatus::Rejected,
        Some(reason.to_string()),
    )
    .await
}

/// Lists the duty assignments of a semester, optionally for one person only.
pub async fn list_semester_duties<C>(
    db: &C,
    semester_id: i64,
    person_id: Option<i64>,
) -> Result<Vec<semester_duty::Model>>
where
    C: ConnectionTrait,
{
    let mut query =
        SemesterDuty::find().filter(semester_duty::Column::SemesterId.eq(semester_id));
    if let Some(person_id) = person_id {
        query = query.filter(semester_duty::Column::PersonId.eq(person_id));
    }
    query
        .order_by_asc(semester_duty::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Approved assignments of one person in one semester, paired with their duty.
pub async fn approved_duties_for_person<C>(
    db: &C,
    semester_id: i64,
    person_id: i64,
) -> Result<Vec<(semester_duty::Model, duty::Model)>>
where
    C: ConnectionTrait,
{
    let rows = SemesterDuty::find()
        .filter(semester_duty::Column::SemesterId.eq(semester_id))
        .filter(semester_duty::Column::PersonId.eq(person_id))
        .filter(semester_duty::Column::Status.eq(DutyStatus::Approved))
        .order_by_asc(semester_duty::Column::Id)
        .find_also_related(Duty)
        .all(db)
        .await?;

    rows.into_iter()
        .map(|(assignment, duty)| match duty {
            Some(duty) => Ok((assignment, duty)),
            None => Err(Error::not_found("duty", assignment.duty_id)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_duty_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let staff = staff_actor();

        let result = create_duty(&db, &staff, "  ", None, 2.0).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = create_duty(&db, &staff, "Dean", None, -1.0).await;
        assert!(matches!(result, Err(Error::InvalidHours { .. })));

        create_duty(&db, &staff, "Dean", None, 4.0).await?;
        let result = create_duty(&db, &staff, "Dean", None, 4.0).await;
        assert!(matches!(result, Err(Error::Conflict { .. })));

        let result = create_duty(&db, &professor_actor(3), "Vice Dean", None, 2.0).await;
        assert!(matches!(result, Err(Error::AuthorizationDenied { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_list_duties_respects_active_flag() -> Result<()> {
        let db = setup_test_db().await?;
        let staff = staff_actor();
        let dean = create_duty(&db, &staff, "Dean", None, 4.0).await?;
        create_duty(&db, &staff, "Vice Dean", None, 2.0).await?;

        set_duty_active(&db, &staff, dean.id, false).await?;

        let active = list_duties(&db, false).await?;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Vice Dean");
        assert_eq!(list_duties(&db, true).await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_semester_duty_workflow() -> Result<()> {
        let (db, semester) = setup_with_semester().await?;
        let duty = create_duty(&db, &staff_actor(), "Dean", None, 4.0).await?;
        let prof = professor_actor(20);

        let request = request_semester_duty(
            &db,
            &prof,
            SemesterDutyRequest {
                semester_id: semester.id,
                duty_id: duty.id,
                person_id: 20,
                sws: None,
                note: Some("re-election".to_string()),
            },
        )
        .await?;
        assert_eq!(request.status, DutyStatus::Requested);
        assert_eq!(request.requested_by, 20);

        // A second request for the same pair conflicts while pending
        let duplicate = request_semester_duty(
            &db,
            &prof,
            SemesterDutyRequest {
                semester_id: semester.id,
                duty_id: duty.id,
                person_id: 20,
                sws: None,
                note: None,
            },
        )
        .await;
        assert!(matches!(duplicate, Err(Error::Conflict { .. })));

        // Staff cannot decide, the dean can
        assert!(matches!(
            approve_semester_duty(&db, &staff_actor(), request.id).await,
            Err(Error::AuthorizationDenied { .. })
        ));
        let approved = approve_semester_duty(&db, &dean_actor(), request.id).await?;
        assert_eq!(approved.status, DutyStatus::Approved);
        assert_eq!(approved.decided_by, Some(dean_actor().person_id));
        assert_eq!(approved.credited_sws(&duty), 4.0);

        // Decided rows cannot be decided again
        assert!(matches!(
            reject_semester_duty(&db, &dean_actor(), request.id, "late").await,
            Err(Error::InvalidTransition { .. })
        ));

        let approved = approved_duties_for_person(&db, semester.id, 20).await?;
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].1.name, "Dean");

        Ok(())
    }

    #[tokio::test]
    async fn test_reject_semester_duty_requires_reason() -> Result<()> {
        let (db, semester) = setup_with_semester().await?;
        let duty = create_duty(&db, &staff_actor(), "Erasmus Officer", None, 1.0).await?;
        let request = request_semester_duty(
            &db,
            &staff_actor(),
            SemesterDutyRequest {
                semester_id: semester.id,
                duty_id: duty.id,
                person_id: 21,
                sws: Some(0.5),
                note: None,
            },
        )
        .await?;
        assert_eq!(request.credited_sws(&duty), 0.5);

        assert!(matches!(
            reject_semester_duty(&db, &dean_actor(), request.id, "   ").await,
            Err(Error::MissingReason)
        ));

        let rejected = reject_semester_duty(&db, &dean_actor(), request.id, "no budget").await?;
        assert_eq!(rejected.status, DutyStatus::Rejected);
        assert_eq!(rejected.decision_note.as_deref(), Some("no budget"));

        // After a rejection a new request may be filed
        request_semester_duty(
            &db,
            &staff_actor(),
            SemesterDutyRequest {
                semester_id: semester.id,
                duty_id: duty.id,
                person_id: 21,
                sws: None,
                note: None,
            },
        )
        .await?;
        assert_eq!(list_semester_duties(&db, semester.id, Some(21)).await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_professor_requests_only_for_self() -> Result<()> {
        let (db, semester) = setup_with_semester().await?;
        let duty = create_duty(&db, &staff_actor(), "Dean", None, 4.0).await?;

        let result = request_semester_duty(
            &db,
            &professor_actor(20),
            SemesterDutyRequest {
                semester_id: semester.id,
                duty_id: duty.id,
                person_id: 99,
                sws: None,
                note: None,
            },
        )
        .await;
        assert!(matches!(result, Err(Error::AuthorizationDenied { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_inactive_duty_cannot_be_requested() -> Result<()> {
        let (db, semester) = setup_with_semester().await?;
        let staff = staff_actor();
        let duty = create_duty(&db, &staff, "Dean", None, 4.0).await?;
        set_duty_active(&db, &staff, duty.id, false).await?;

        let result = request_semester_duty(
            &db,
            &staff,
            SemesterDutyRequest {
                semester_id: semester.id,
                duty_id: duty.id,
                person_id: 20,
                sws: None,
                note: None,
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        Ok(())
    }
}

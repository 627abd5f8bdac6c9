//! Semester business logic - term definitions and the planning-term flag.
//!
//! The "only one planning term" rule lives here as an explicit check-and-swap instead of
//! being left to callers. [`suggest_planning_semester`] is advisory only and never writes.

use crate::{
    core::access::{Actor, Capability, authorize},
    entities::{Semester, semester},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::Serialize;
use tracing::{info, instrument};

/// Input for [`create_semester`]
#[derive(Debug, Clone)]
pub struct NewSemester {
    /// Unique short code
    pub code: String,
    /// Display label
    pub label: String,
    /// First day
    pub start_date: NaiveDate,
    /// Last day
    pub end_date: NaiveDate,
    /// Winter term flag
    pub is_winter: bool,
    /// Summer term flag
    pub is_summer: bool,
}

/// Advisory output of [`suggest_planning_semester`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SemesterSuggestion {
    /// Semester currently flagged as planning term, if any
    pub current: Option<semester::Model>,
    /// Semester that should be under planning on the given date
    pub suggested: semester::Model,
    /// Semester running on the given date, if any
    pub running: Option<semester::Model>,
}

/// Creates a semester after validating code, label and date range.
#[instrument(skip(db))]
pub async fn create_semester(
    db: &DatabaseConnection,
    actor: &Actor,
    input: NewSemester,
) -> Result<semester::Model> {
    authorize(actor, Capability::ManageSemesters)?;

    let code = input.code.trim().to_string();
    if code.is_empty() || input.label.trim().is_empty() {
        return Err(Error::Validation {
            message: "Semester code and label cannot be empty".to_string(),
        });
    }
    if input.end_date <= input.start_date {
        return Err(Error::InvalidRange {
            start: input.start_date,
            end: input.end_date,
        });
    }

    let txn = db.begin().await?;
    let existing = Semester::find()
        .filter(semester::Column::Code.eq(code.as_str()))
        .one(&txn)
        .await?;
    if existing.is_some() {
        return Err(Error::Conflict {
            message: format!("Semester code '{code}' already exists"),
        });
    }

    let row = semester::ActiveModel {
        code: Set(code),
        label: Set(input.label.trim().to_string()),
        start_date: Set(input.start_date),
        end_date: Set(input.end_date),
        is_winter: Set(input.is_winter),
        is_summer: Set(input.is_summer),
        is_planning_term: Set(false),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!(semester_id = row.id, code = %row.code, "Created semester");
    Ok(row)
}

/// Lists all semesters ordered by start date.
pub async fn list_semesters(db: &DatabaseConnection) -> Result<Vec<semester::Model>> {
    Semester::find()
        .order_by_asc(semester::Column::StartDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a semester by id.
pub async fn get_semester<C>(db: &C, semester_id: i64) -> Result<semester::Model>
where
    C: ConnectionTrait,
{
    Semester::find_by_id(semester_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("semester", semester_id))
}

/// Returns the semester flagged as planning term, if any.
pub async fn get_planning_semester<C>(db: &C) -> Result<Option<semester::Model>>
where
    C: ConnectionTrait,
{
    Semester::find()
        .filter(semester::Column::IsPlanningTerm.eq(true))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Moves the planning-term flag to `semester_id`.
///
/// Reads the currently flagged semester, clears the flag and sets the new one within one
/// transaction. Calling it for the semester that already carries the flag is a no-op.
#[instrument(skip(db))]
pub async fn set_planning_semester(
    db: &DatabaseConnection,
    actor: &Actor,
    semester_id: i64,
) -> Result<semester::Model> {
    authorize(actor, Capability::ManageSemesters)?;

    let txn = db.begin().await?;
    let target = get_semester(&txn, semester_id).await?;
    if target.is_planning_term {
        txn.commit().await?;
        return Ok(target);
    }

    let previous = get_planning_semester(&txn).await?;
    Semester::update_many()
        .col_expr(semester::Column::IsPlanningTerm, Expr::value(false))
        .filter(semester::Column::IsPlanningTerm.eq(true))
        .exec(&txn)
        .await?;

    let mut active: semester::ActiveModel = target.into();
    active.is_planning_term = Set(true);
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    info!(
        semester_id,
        previous = previous.map(|s| s.id),
        "Planning term moved"
    );
    Ok(updated)
}

/// The semester that should be under planning on `today`: the earliest one starting after
/// `today`, or the one running on `today` when nothing later is defined.
fn expected_planning_semester(
    semesters: &[semester::Model],
    today: NaiveDate,
) -> Option<&semester::Model> {
    semesters
        .iter()
        .filter(|s| s.start_date > today)
        .min_by_key(|s| s.start_date)
        .or_else(|| semesters.iter().find(|s| s.is_running(today)))
}

/// Compares `today` with the semester dates and the flagged planning term.
///
/// Returns a suggestion only when the flagged semester differs from the expected one.
/// Read-only: the flag is never moved here.
pub async fn suggest_planning_semester(
    db: &DatabaseConnection,
    today: NaiveDate,
) -> Result<Option<SemesterSuggestion>> {
    let semesters = list_semesters(db).await?;
    let current = semesters.iter().find(|s| s.is_planning_term).cloned();
    let running = semesters.iter().find(|s| s.is_running(today)).cloned();

    let Some(expected) = expected_planning_semester(&semesters, today) else {
        return Ok(None);
    };
    if current.as_ref().is_some_and(|c| c.id == expected.id) {
        return Ok(None);
    }

    Ok(Some(SemesterSuggestion {
        current,
        suggested: expected.clone(),
        running,
    }))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_semester_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let staff = staff_actor();

        let inverted = NewSemester {
            end_date: date(2025, 10, 1),
            ..winter_semester_input("WS2025", 2025)
        };
        let result = create_semester(&db, &staff, inverted).await;
        assert!(matches!(result, Err(Error::InvalidRange { .. })));

        let blank = NewSemester {
            code: "  ".to_string(),
            ..winter_semester_input("WS2025", 2025)
        };
        let result = create_semester(&db, &staff, blank).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result =
            create_semester(&db, &professor_actor(5), winter_semester_input("WS2025", 2025)).await;
        assert!(matches!(result, Err(Error::AuthorizationDenied { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_code_conflicts() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_semester(&db, "WS2025", 2025).await?;

        let result =
            create_semester(&db, &staff_actor(), winter_semester_input("WS2025", 2025)).await;
        assert!(matches!(result, Err(Error::Conflict { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_set_planning_semester_swaps_flag() -> Result<()> {
        let db = setup_test_db().await?;
        let staff = staff_actor();
        let ws = create_test_semester(&db, "WS2025", 2025).await?;
        let ws_next = create_test_semester(&db, "WS2026", 2026).await?;

        set_planning_semester(&db, &staff, ws.id).await?;
        assert_eq!(get_planning_semester(&db).await?.unwrap().id, ws.id);

        set_planning_semester(&db, &staff, ws_next.id).await?;
        let flagged: Vec<_> = list_semesters(&db)
            .await?
            .into_iter()
            .filter(|s| s.is_planning_term)
            .collect();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].id, ws_next.id);

        // Repeating is a no-op
        let again = set_planning_semester(&db, &staff, ws_next.id).await?;
        assert!(again.is_planning_term);

        Ok(())
    }

    #[tokio::test]
    async fn test_set_planning_semester_not_found() -> Result<()> {
        let db = setup_test_db().await?;

        let result = set_planning_semester(&db, &staff_actor(), 99).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_is_running() -> Result<()> {
        let db = setup_test_db().await?;
        let ws = create_test_semester(&db, "WS2025", 2025).await?;

        assert!(ws.is_running(date(2025, 10, 1)));
        assert!(ws.is_running(date(2026, 3, 31)));
        assert!(!ws.is_running(date(2026, 4, 1)));

        Ok(())
    }

    #[tokio::test]
    async fn test_suggestion_points_to_upcoming_semester() -> Result<()> {
        let db = setup_test_db().await?;
        let ws = create_test_semester(&db, "WS2025", 2025).await?;
        let ws_next = create_test_semester(&db, "WS2026", 2026).await?;
        set_planning_semester(&db, &staff_actor(), ws.id).await?;

        // During WS2025 the next winter term should be planned
        let suggestion = suggest_planning_semester(&db, date(2025, 12, 1))
            .await?
            .unwrap();
        assert_eq!(suggestion.suggested.id, ws_next.id);
        assert_eq!(suggestion.current.unwrap().id, ws.id);
        assert_eq!(suggestion.running.unwrap().id, ws.id);

        // Advisory only: the flag did not move
        assert_eq!(get_planning_semester(&db).await?.unwrap().id, ws.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_no_suggestion_when_flag_matches() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_semester(&db, "WS2025", 2025).await?;
        let ws_next = create_test_semester(&db, "WS2026", 2026).await?;
        set_planning_semester(&db, &staff_actor(), ws_next.id).await?;

        assert!(suggest_planning_semester(&db, date(2025, 12, 1)).await?.is_none());

        // After the last defined semester started, the running one is expected
        let suggestion = suggest_planning_semester(&db, date(2026, 11, 1)).await?;
        assert!(suggestion.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_suggestion_without_flag() -> Result<()> {
        let db = setup_test_db().await?;
        let ws = create_test_semester(&db, "WS2025", 2025).await?;

        let suggestion = suggest_planning_semester(&db, date(2025, 6, 1))
            .await?
            .unwrap();
        assert!(suggestion.current.is_none());
        assert!(suggestion.running.is_none());
        assert_eq!(suggestion.suggested.id, ws.id);

        Ok(())
    }
}

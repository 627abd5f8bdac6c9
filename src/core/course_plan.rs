//! Course plan - scheduled teaching assignments per semester and lecturer.
//!
//! These rows are the source that `core::statement::import_planned_teaching` copies into a
//! statement's teaching items.

use crate::{
    core::access::{Actor, Capability, authorize},
    core::semester::get_semester,
    core::settings::validate_sws,
    entities::{TeachingAssignment, load_item::TeachingKind, teaching_assignment},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

/// Input for [`add_teaching_assignment`]
#[derive(Debug, Clone)]
pub struct NewTeachingAssignment {
    /// Semester the course runs in
    pub semester_id: i64,
    /// Lecturer
    pub person_id: i64,
    /// Module code
    pub module_code: String,
    /// Course title
    pub title: String,
    /// Kind of course
    pub kind: TeachingKind,
    /// Weekly hours
    pub sws: f64,
}

/// Adds a course to the plan.
#[instrument(skip(db))]
pub async fn add_teaching_assignment(
    db: &DatabaseConnection,
    actor: &Actor,
    input: NewTeachingAssignment,
) -> Result<teaching_assignment::Model> {
    authorize(actor, Capability::ManageCoursePlan)?;

    let module_code = input.module_code.trim();
    if module_code.is_empty() {
        return Err(Error::Validation {
            message: "Module code cannot be empty".to_string(),
        });
    }
    validate_sws(input.sws)?;
    get_semester(db, input.semester_id).await?;

    let row = teaching_assignment::ActiveModel {
        semester_id: Set(input.semester_id),
        person_id: Set(input.person_id),
        module_code: Set(module_code.to_string()),
        title: Set(input.title.trim().to_string()),
        kind: Set(input.kind),
        sws: Set(input.sws),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(assignment_id = row.id, module = %row.module_code, "Added teaching assignment");
    Ok(row)
}

/// Lists the course plan of a semester, optionally for one lecturer, by module code.
pub async fn list_teaching_assignments<C>(
    db: &C,
    semester_id: i64,
    person_id: Option<i64>,
) -> Result<Vec<teaching_assignment::Model>>
where
    C: ConnectionTrait,
{
    let mut query = TeachingAssignment::find()
        .filter(teaching_assignment::Column::SemesterId.eq(semester_id));
    if let Some(person_id) = person_id {
        query = query.filter(teaching_assignment::Column::PersonId.eq(person_id));
    }
    query
        .order_by_asc(teaching_assignment::Column::ModuleCode)
        .order_by_asc(teaching_assignment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Removes a course from the plan. Items already imported into statements stay.
#[instrument(skip(db))]
pub async fn remove_teaching_assignment(
    db: &DatabaseConnection,
    actor: &Actor,
    assignment_id: i64,
) -> Result<()> {
    authorize(actor, Capability::ManageCoursePlan)?;

    let result = TeachingAssignment::delete_by_id(assignment_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("teaching assignment", assignment_id));
    }

    info!(assignment_id, "Removed teaching assignment");
    Ok(())
}

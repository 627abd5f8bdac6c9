//! Shared test utilities.
//!
//! Helpers for setting up an in-memory database and creating semesters, phases, course
//! plan rows and statements with sensible defaults.

use crate::{
    config::WorkflowPolicy,
    core::{
        access::{Actor, Role},
        course_plan::{NewTeachingAssignment, add_teaching_assignment},
        phase::{
            NewPhase, activate_phase, close_phase, close_submission, create_phase, open_submission,
        },
        semester::{NewSemester, create_semester},
        statement::{LoadItemInput, add_item, create_draft, submit},
    },
    entities::{
        load_item::{DegreeLevel, SupervisionStatus, SupervisionType, TeachingKind},
        load_statement, planning_phase, semester, teaching_assignment,
    },
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Dean, person 1
pub const fn dean_actor() -> Actor {
    Actor::new(1, Role::Dean)
}

/// Department office, person 3
pub const fn staff_actor() -> Actor {
    Actor::new(3, Role::Staff)
}

/// Professor with the given person id
pub const fn professor_actor(person_id: i64) -> Actor {
    Actor::new(person_id, Role::Professor)
}

/// Builds a date, panicking on invalid input.
#[allow(clippy::unwrap_used)]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Winter semester running from October of `year` to March of the following year.
pub fn winter_semester_input(code: &str, year: i32) -> NewSemester {
    NewSemester {
        code: code.to_string(),
        label: format!("Winter term {year}/{}", year + 1),
        start_date: date(year, 10, 1),
        end_date: date(year + 1, 3, 31),
        is_winter: true,
        is_summer: false,
    }
}

/// Creates a winter semester through the office.
pub async fn create_test_semester(
    db: &DatabaseConnection,
    code: &str,
    year: i32,
) -> Result<semester::Model> {
    create_semester(db, &staff_actor(), winter_semester_input(code, year)).await
}

/// Sets up a database with semester `WS2025`.
/// Returns (db, semester) for common test scenarios.
pub async fn setup_with_semester() -> Result<(DatabaseConnection, semester::Model)> {
    let db = setup_test_db().await?;
    let semester = create_test_semester(&db, "WS2025", 2025).await?;
    Ok((db, semester))
}

/// Creates a draft phase for the semester, planned for the summer before it.
pub async fn create_test_phase(
    db: &DatabaseConnection,
    semester_id: i64,
) -> Result<planning_phase::Model> {
    create_phase(
        db,
        &staff_actor(),
        NewPhase {
            semester_id,
            name: String::new(),
            start_date: date(2025, 7, 1),
            end_date: date(2025, 9, 30),
        },
    )
    .await
}

/// Creates and activates a phase.
pub async fn create_active_phase(
    db: &DatabaseConnection,
    semester_id: i64,
) -> Result<planning_phase::Model> {
    let phase = create_test_phase(db, semester_id).await?;
    activate_phase(db, &staff_actor(), &WorkflowPolicy::default(), phase.id).await
}

/// Creates a phase and opens it for submission.
pub async fn create_open_phase(
    db: &DatabaseConnection,
    semester_id: i64,
) -> Result<planning_phase::Model> {
    let phase = create_active_phase(db, semester_id).await?;
    open_submission(db, &staff_actor(), phase.id).await
}

/// Sets up a database with semester `WS2025` and a phase open for submission.
pub async fn setup_with_open_phase() -> Result<(DatabaseConnection, planning_phase::Model)> {
    let (db, semester) = setup_with_semester().await?;
    let phase = create_open_phase(&db, semester.id).await?;
    Ok((db, phase))
}

/// Walks a new phase through the whole workflow up to `Closed`.
pub async fn create_closed_phase(
    db: &DatabaseConnection,
    semester_id: i64,
) -> Result<planning_phase::Model> {
    let staff = staff_actor();
    let phase = create_open_phase(db, semester_id).await?;
    close_submission(db, &staff, phase.id).await?;
    close_phase(db, &staff, phase.id).await
}

/// Adds a course to the plan through the office.
pub async fn create_test_assignment(
    db: &DatabaseConnection,
    semester_id: i64,
    person_id: i64,
    module_code: &str,
    kind: TeachingKind,
    sws: f64,
) -> Result<teaching_assignment::Model> {
    add_teaching_assignment(
        db,
        &staff_actor(),
        NewTeachingAssignment {
            semester_id,
            person_id,
            module_code: module_code.to_string(),
            title: format!("Course {module_code}"),
            kind,
            sws,
        },
    )
    .await
}

/// A lecture item
pub fn lecture(description: &str, sws: f64) -> LoadItemInput {
    LoadItemInput::Teaching {
        description: description.to_string(),
        kind: TeachingKind::Lecture,
        sws,
    }
}

/// A running bachelor thesis supervision without override
pub fn bachelor_thesis(title: &str, student_name: &str) -> LoadItemInput {
    LoadItemInput::Supervision {
        title: title.to_string(),
        student_name: student_name.to_string(),
        supervision_type: SupervisionType::Thesis,
        degree_level: DegreeLevel::Bachelor,
        status: SupervisionStatus::Active,
        override_sws: None,
    }
}

/// Creates a statement for `person_id` with one lecture and submits it as its owner.
pub async fn create_submitted_statement(
    db: &DatabaseConnection,
    phase_id: i64,
    person_id: i64,
) -> Result<load_statement::Model> {
    let owner = professor_actor(person_id);
    let statement = create_draft(db, &owner, phase_id, person_id, None).await?;
    add_item(db, &owner, statement.id, lecture("Analysis I", 4.0)).await?;
    let submitted = submit(db, &owner, &WorkflowPolicy::default(), statement.id).await?;
    Ok(submitted.statement)
}

//! Semester entity - An academic term identified by a short code.
//!
//! Whether a term is "currently running" is derived from a supplied date and never stored.
//! At most one semester carries the `is_planning_term` flag; `core::semester` owns that swap.

use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Semester database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "semesters")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Short code, e.g. `"WS2025"` or `"SS2026"`
    #[sea_orm(unique)]
    pub code: String,
    /// Display label, e.g. "Wintersemester 2025/26"
    pub label: String,
    /// First day of the term
    pub start_date: Date,
    /// Last day of the term
    pub end_date: Date,
    /// Winter term flag
    pub is_winter: bool,
    /// Summer term flag
    pub is_summer: bool,
    /// Whether this is the term currently under planning
    pub is_planning_term: bool,
}

impl Model {
    /// Whether `today` falls inside the term (inclusive on both ends).
    #[must_use]
    pub fn is_running(&self, today: NaiveDate) -> bool {
        self.start_date <= today && today <= self.end_date
    }
}

/// Defines relationships between Semester and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One semester has many planning phases over time
    #[sea_orm(has_many = "super::planning_phase::Entity")]
    PlanningPhases,
    /// One semester has many duty assignments
    #[sea_orm(has_many = "super::semester_duty::Entity")]
    SemesterDuties,
    /// One semester has many scheduled course assignments
    #[sea_orm(has_many = "super::teaching_assignment::Entity")]
    TeachingAssignments,
}

impl Related<super::planning_phase::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlanningPhases.def()
    }
}

impl Related<super::semester_duty::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SemesterDuties.def()
    }
}

impl Related<super::teaching_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TeachingAssignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! Teaching assignment entity - A scheduled course from the course plan.
//!
//! Used as the source of automatically derived teaching items.

use super::load_item::TeachingKind;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Teaching assignment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "teaching_assignments")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Semester the course is scheduled in
    pub semester_id: i64,
    /// Lecturer
    pub person_id: i64,
    /// Module code from the module handbook, e.g. `"INF-101"`
    pub module_code: String,
    /// Course title
    pub title: String,
    /// Kind of course
    pub kind: TeachingKind,
    /// Weekly hours
    pub sws: f64,
    /// Creation timestamp
    pub created_at: DateTimeUtc,
}

/// Defines relationships between TeachingAssignment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each assignment belongs to one semester
    #[sea_orm(
        belongs_to = "super::semester::Entity",
        from = "Column::SemesterId",
        to = "super::semester::Column::Id"
    )]
    Semester,
}

impl Related<super::semester::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Semester.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

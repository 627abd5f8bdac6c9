//! Duty entity - Named administrative duty (Auftrag) such as "Dean" or "Vice Dean".
//!
//! Reference data: rows are deactivated rather than deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Duty database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "duties")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Unique duty name
    #[sea_orm(unique)]
    pub name: String,
    /// Optional longer description
    pub description: Option<String>,
    /// Standard weekly hours credited for the duty
    pub default_sws: f64,
    /// Inactive duties cannot be requested any more
    pub is_active: bool,
}

/// Defines relationships between Duty and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One duty is assigned many times across semesters
    #[sea_orm(has_many = "super::semester_duty::Entity")]
    SemesterDuties,
}

impl Related<super::semester_duty::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SemesterDuties.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

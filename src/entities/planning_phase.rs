//! Planning phase entity - One semester's planning cycle.
//!
//! Phases are never deleted. Closing a phase records its outcome and archiving retires it,
//! which is what allows a new phase for the same semester to be created.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a planning phase
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum PhaseState {
    /// Created, not yet visible to professors
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Activated; statements may be drafted
    #[sea_orm(string_value = "active")]
    Active,
    /// Statements may be submitted
    #[sea_orm(string_value = "submission_open")]
    SubmissionOpen,
    /// Submission closed, dean reviews the remaining statements
    #[sea_orm(string_value = "under_review")]
    UnderReview,
    /// Review finished, outcome recorded
    #[sea_orm(string_value = "closed")]
    Closed,
    /// Terminal; superseded by a later phase
    #[sea_orm(string_value = "archived")]
    Archived,
}

impl PhaseState {
    /// Stable lowercase name, identical to the stored value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::SubmissionOpen => "submission_open",
            Self::UnderReview => "under_review",
            Self::Closed => "closed",
            Self::Archived => "archived",
        }
    }

    /// Whether statements of this phase may still be created and edited
    #[must_use]
    pub const fn accepts_drafts(self) -> bool {
        matches!(self, Self::Active | Self::SubmissionOpen)
    }

    /// Whether the dean may still decide on submitted statements
    #[must_use]
    pub const fn accepts_reviews(self) -> bool {
        matches!(self, Self::SubmissionOpen | Self::UnderReview)
    }
}

impl fmt::Display for PhaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result recorded when a phase is closed
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum PhaseOutcome {
    /// No statement of the phase was rejected
    #[sea_orm(string_value = "approved")]
    Approved,
    /// At least one statement was rejected
    #[sea_orm(string_value = "partially_rejected")]
    PartiallyRejected,
}

/// Planning phase database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "planning_phases")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Semester this phase plans
    pub semester_id: i64,
    /// Display name, e.g. "Planung WS2025"
    pub name: String,
    /// Planned opening date
    pub start_date: Date,
    /// Planned closing date
    pub end_date: Date,
    /// Whether this is the active phase of its semester
    pub is_active: bool,
    /// Current lifecycle state
    pub state: PhaseState,
    /// Set when the phase is closed
    pub outcome: Option<PhaseOutcome>,
    /// Person who created the phase
    pub created_by: i64,
    /// Creation timestamp
    pub created_at: DateTimeUtc,
    /// When the phase was closed
    pub closed_at: Option<DateTimeUtc>,
    /// When the phase was archived
    pub archived_at: Option<DateTimeUtc>,
}

/// Defines relationships between PlanningPhase and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each phase belongs to one semester
    #[sea_orm(
        belongs_to = "super::semester::Entity",
        from = "Column::SemesterId",
        to = "super::semester::Column::Id"
    )]
    Semester,
    /// One phase has many load statements
    #[sea_orm(has_many = "super::load_statement::Entity")]
    LoadStatements,
}

impl Related<super::semester::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Semester.def()
    }
}

impl Related<super::load_statement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoadStatements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

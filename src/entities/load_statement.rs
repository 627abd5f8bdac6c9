//! Load statement entity - One person's teaching-load declaration for one planning phase
//! (Deputatsabrechnung).
//!
//! The `sws_*` columns hold the subtotals of the last explicit persist step; `settings_id`
//! records which settings row produced them. At most one statement exists per
//! `(phase_id, person_id)`, backed by a unique index.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Workflow state of a statement
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum StatementStatus {
    /// Editable by its owner
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Waiting for the dean
    #[sea_orm(string_value = "submitted")]
    Submitted,
    /// Final
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Final
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl StatementStatus {
    /// Approved and rejected statements can no longer change
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl fmt::Display for StatementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        })
    }
}

/// Load statement database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "load_statements")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Planning phase the statement belongs to
    pub phase_id: i64,
    /// Person declaring the load
    pub person_id: i64,
    /// Personal net teaching obligation; `None` falls back to the settings default
    pub netto_lehrverpflichtung: Option<f64>,
    /// Workflow state
    pub status: StatementStatus,
    /// When the statement was submitted
    pub submitted_at: Option<DateTimeUtc>,
    /// When the statement was approved
    pub approved_at: Option<DateTimeUtc>,
    /// When the statement was rejected
    pub rejected_at: Option<DateTimeUtc>,
    /// Reason given on rejection
    pub rejection_reason: Option<String>,
    /// Dean who approved or rejected
    pub reviewed_by: Option<i64>,
    /// Settings row the persisted subtotals were computed with
    pub settings_id: Option<i64>,
    /// Persisted teaching subtotal
    pub sws_teaching: f64,
    /// Persisted export subtotal
    pub sws_export: f64,
    /// Persisted substitution subtotal
    pub sws_substitution: f64,
    /// Persisted reduction subtotal
    pub sws_reduction: f64,
    /// Persisted supervision subtotal
    pub sws_supervision: f64,
    /// Persisted total load
    pub sws_total: f64,
    /// Persisted total minus target obligation
    pub sws_delta: f64,
    /// Creation timestamp
    pub created_at: DateTimeUtc,
    /// Last modification
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between LoadStatement and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each statement belongs to one planning phase
    #[sea_orm(
        belongs_to = "super::planning_phase::Entity",
        from = "Column::PhaseId",
        to = "super::planning_phase::Column::Id"
    )]
    PlanningPhase,
    /// One statement has many line items
    #[sea_orm(has_many = "super::load_item::Entity")]
    LoadItems,
}

impl Related<super::planning_phase::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlanningPhase.def()
    }
}

impl Related<super::load_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoadItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

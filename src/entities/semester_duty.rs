//! Semester duty entity - Assignment of a duty to a person for one semester (Semesterauftrag).
//!
//! Carries its own approval workflow: `requested` to `approved` or `rejected`.
//! Approved rows can be turned into reduction items of a load statement.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Approval state of a semester duty
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum DutyStatus {
    /// Waiting for a decision by the dean
    #[sea_orm(string_value = "requested")]
    Requested,
    /// Confirmed; creditable as a reduction
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Declined
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl fmt::Display for DutyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Requested => "requested",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        })
    }
}

/// Semester duty database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "semester_duties")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Semester the duty is held in
    pub semester_id: i64,
    /// The duty
    pub duty_id: i64,
    /// Person holding the duty
    pub person_id: i64,
    /// Hours override; `None` means the duty's standard value applies
    pub sws: Option<f64>,
    /// Approval state
    pub status: DutyStatus,
    /// Person who filed the request
    pub requested_by: i64,
    /// Dean who decided, once decided
    pub decided_by: Option<i64>,
    /// When the decision was made
    pub decided_at: Option<DateTimeUtc>,
    /// Comment of the requester or reason given on rejection
    pub decision_note: Option<String>,
    /// Creation timestamp
    pub created_at: DateTimeUtc,
}

impl Model {
    /// Hours this assignment is worth: the override if set, else the duty's standard value.
    #[must_use]
    pub fn credited_sws(&self, duty: &super::duty::Model) -> f64 {
        self.sws.unwrap_or(duty.default_sws)
    }
}

/// Defines relationships between SemesterDuty and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each assignment belongs to one semester
    #[sea_orm(
        belongs_to = "super::semester::Entity",
        from = "Column::SemesterId",
        to = "super::semester::Column::Id"
    )]
    Semester,
    /// Each assignment refers to one duty
    #[sea_orm(
        belongs_to = "super::duty::Entity",
        from = "Column::DutyId",
        to = "super::duty::Column::Id"
    )]
    Duty,
}

impl Related<super::semester::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Semester.def()
    }
}

impl Related<super::duty::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Duty.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! Load item entity - One line of a load statement.
//!
//! All five categories share one table, discriminated by `category`; the category-specific
//! columns are `NULL` for the others. Items are owned by their statement and deleted with it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Accounting category of a line item
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum LoadCategory {
    /// Own teaching (Lehrtätigkeit)
    #[sea_orm(string_value = "teaching")]
    Teaching,
    /// Teaching exported to another department (Lehrexport)
    #[sea_orm(string_value = "export")]
    Export,
    /// Substitution for a colleague (Vertretung)
    #[sea_orm(string_value = "substitution")]
    Substitution,
    /// Reductions and credits (Ermäßigung)
    #[sea_orm(string_value = "reduction")]
    Reduction,
    /// Thesis and project supervision (Betreuung)
    #[sea_orm(string_value = "supervision")]
    Supervision,
}

impl LoadCategory {
    /// All categories in reporting order
    pub const ALL: [Self; 5] = [
        Self::Teaching,
        Self::Export,
        Self::Substitution,
        Self::Reduction,
        Self::Supervision,
    ];
}

impl fmt::Display for LoadCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Teaching => "teaching",
            Self::Export => "export",
            Self::Substitution => "substitution",
            Self::Reduction => "reduction",
            Self::Supervision => "supervision",
        })
    }
}

/// Kind of a teaching activity; three kinds carry hard ceilings
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum TeachingKind {
    /// Vorlesung
    #[sea_orm(string_value = "lecture")]
    Lecture,
    /// Übung
    #[sea_orm(string_value = "exercise")]
    Exercise,
    /// Seminar (bachelor level)
    #[sea_orm(string_value = "seminar")]
    Seminar,
    /// Praxisseminar, capped by `max_sws_praxisseminar`
    #[sea_orm(string_value = "praxisseminar")]
    Praxisseminar,
    /// Projektveranstaltung, capped by `max_sws_projektveranstaltung`
    #[sea_orm(string_value = "projektveranstaltung")]
    Projektveranstaltung,
    /// Master seminar, capped by `max_sws_seminar_master`
    #[sea_orm(string_value = "seminar_master")]
    SeminarMaster,
    /// Lab course
    #[sea_orm(string_value = "lab")]
    Lab,
}

impl fmt::Display for TeachingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Lecture => "lecture",
            Self::Exercise => "exercise",
            Self::Seminar => "seminar",
            Self::Praxisseminar => "praxisseminar",
            Self::Projektveranstaltung => "projektveranstaltung",
            Self::SeminarMaster => "seminar_master",
            Self::Lab => "lab",
        })
    }
}

/// What is being supervised
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum SupervisionType {
    /// Final thesis
    #[sea_orm(string_value = "thesis")]
    Thesis,
    /// Seminar paper
    #[sea_orm(string_value = "seminar")]
    Seminar,
    /// Student project
    #[sea_orm(string_value = "project")]
    Project,
}

/// Degree level of a supervised student
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum DegreeLevel {
    /// Bachelor
    #[sea_orm(string_value = "bachelor")]
    Bachelor,
    /// Master
    #[sea_orm(string_value = "master")]
    Master,
    /// Doctorate
    #[sea_orm(string_value = "doctoral")]
    Doctoral,
}

/// Whether a supervision is still running
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum SupervisionStatus {
    /// Ongoing
    #[sea_orm(string_value = "active")]
    Active,
    /// Finished during the phase's semester
    #[sea_orm(string_value = "ended")]
    Ended,
}

/// Where a line item came from
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ItemOrigin {
    /// Entered by hand
    #[sea_orm(string_value = "manual")]
    Manual,
    /// Derived from a teaching assignment of the course plan
    #[sea_orm(string_value = "course_plan")]
    CoursePlan,
    /// Derived from an approved semester duty
    #[sea_orm(string_value = "semester_duty")]
    SemesterDuty,
}

/// Load item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "load_items")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning statement
    pub statement_id: i64,
    /// Accounting category
    pub category: LoadCategory,
    /// Free text (course title, thesis title, duty name, ...)
    pub description: String,
    /// Face value in SWS; unused for supervision items
    pub sws: f64,
    /// Teaching items only
    pub teaching_kind: Option<TeachingKind>,
    /// Export items only: receiving department
    pub target_department: Option<String>,
    /// Substitution items only: who was substituted
    pub substitute_for: Option<String>,
    /// Supervision items only
    pub supervision_type: Option<SupervisionType>,
    /// Supervision items only
    pub degree_level: Option<DegreeLevel>,
    /// Supervision items only
    pub supervision_status: Option<SupervisionStatus>,
    /// Supervision items only
    pub student_name: Option<String>,
    /// Supervision items only: manual hours that replace the configured coefficient
    pub override_sws: Option<f64>,
    /// Where the item came from
    pub origin: ItemOrigin,
    /// Id of the source row for derived items
    pub origin_id: Option<i64>,
    /// Creation timestamp
    pub created_at: DateTimeUtc,
}

/// Defines relationships between LoadItem and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each item belongs to one statement
    #[sea_orm(
        belongs_to = "super::load_statement::Entity",
        from = "Column::StatementId",
        to = "super::load_statement::Column::Id",
        on_delete = "Cascade"
    )]
    LoadStatement,
}

impl Related<super::load_statement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoadStatement.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

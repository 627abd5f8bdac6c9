//! Load settings entity - Coefficients and ceilings of the load computation
//! (DeputatsEinstellungen).
//!
//! Historic rows are kept; exactly one row is marked active. Ceilings are nullable and a
//! `NULL` ceiling means the category is uncapped.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Load settings database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "load_settings")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// SWS per supervised bachelor thesis
    pub sws_bachelor_arbeit: f64,
    /// SWS per supervised master thesis
    pub sws_master_arbeit: f64,
    /// SWS per supervised doctorate
    pub sws_doktorarbeit: f64,
    /// SWS per supervised bachelor seminar paper
    pub sws_seminar_ba: f64,
    /// SWS per supervised master seminar paper
    pub sws_seminar_ma: f64,
    /// SWS per supervised bachelor project
    pub sws_projekt_ba: f64,
    /// SWS per supervised master project
    pub sws_projekt_ma: f64,
    /// Ceiling for the supervision subtotal
    pub max_sws_betreuung: Option<f64>,
    /// Ceiling for the reduction subtotal
    pub max_sws_ermaessigung: Option<f64>,
    /// Reductions above this value raise a warning
    pub warn_ermaessigung_ueber: Option<f64>,
    /// Hard ceiling for Praxisseminar teaching
    pub max_sws_praxisseminar: Option<f64>,
    /// Hard ceiling for Projektveranstaltung teaching
    pub max_sws_projektveranstaltung: Option<f64>,
    /// Hard ceiling for master seminar teaching
    pub max_sws_seminar_master: Option<f64>,
    /// Net teaching obligation used when a statement has no personal value
    pub default_netto_lehrverpflichtung: f64,
    /// Only the active row governs new computations
    pub is_active: bool,
    /// Person who created the row, `None` for seeded defaults
    pub created_by: Option<i64>,
    /// Creation timestamp
    pub created_at: DateTimeUtc,
}

/// `LoadSettings` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

//! Load settings - the single active configuration row of the load computation.
//!
//! Several rows may exist historically. Lookups never rely on table order: the row flagged
//! `is_active` wins, and when there is none the built-in [`LoadRules::default`] applies.
//! Creating or activating a row swaps the flag inside one transaction.

use crate::{
    core::access::{Actor, Capability, authorize},
    entities::{LoadSettings, load_settings},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Coefficients, ceilings and the default target of the load computation.
///
/// Plain value type so the computation engine stays independent of the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadRules {
    /// SWS per bachelor thesis
    pub sws_bachelor_arbeit: f64,
    /// SWS per master thesis
    pub sws_master_arbeit: f64,
    /// SWS per doctorate
    pub sws_doktorarbeit: f64,
    /// SWS per bachelor seminar paper
    pub sws_seminar_ba: f64,
    /// SWS per master seminar paper
    pub sws_seminar_ma: f64,
    /// SWS per bachelor project
    pub sws_projekt_ba: f64,
    /// SWS per master project
    pub sws_projekt_ma: f64,
    /// Supervision ceiling (clip with warning)
    pub max_sws_betreuung: Option<f64>,
    /// Reduction ceiling (clip with warning)
    pub max_sws_ermaessigung: Option<f64>,
    /// Reduction warning threshold
    pub warn_ermaessigung_ueber: Option<f64>,
    /// Hard ceiling for Praxisseminar teaching
    pub max_sws_praxisseminar: Option<f64>,
    /// Hard ceiling for Projektveranstaltung teaching
    pub max_sws_projektveranstaltung: Option<f64>,
    /// Hard ceiling for master seminar teaching
    pub max_sws_seminar_master: Option<f64>,
    /// Target obligation for statements without a personal value
    pub default_netto_lehrverpflichtung: f64,
}

impl Default for LoadRules {
    fn default() -> Self {
        Self {
            sws_bachelor_arbeit: 0.3,
            sws_master_arbeit: 0.5,
            sws_doktorarbeit: 1.0,
            sws_seminar_ba: 0.1,
            sws_seminar_ma: 0.2,
            sws_projekt_ba: 0.2,
            sws_projekt_ma: 0.3,
            max_sws_betreuung: Some(3.0),
            max_sws_ermaessigung: None,
            warn_ermaessigung_ueber: Some(9.0),
            max_sws_praxisseminar: Some(5.0),
            max_sws_projektveranstaltung: Some(6.0),
            max_sws_seminar_master: Some(4.0),
            default_netto_lehrverpflichtung: 18.0,
        }
    }
}

impl From<&load_settings::Model> for LoadRules {
    fn from(row: &load_settings::Model) -> Self {
        Self {
            sws_bachelor_arbeit: row.sws_bachelor_arbeit,
            sws_master_arbeit: row.sws_master_arbeit,
            sws_doktorarbeit: row.sws_doktorarbeit,
            sws_seminar_ba: row.sws_seminar_ba,
            sws_seminar_ma: row.sws_seminar_ma,
            sws_projekt_ba: row.sws_projekt_ba,
            sws_projekt_ma: row.sws_projekt_ma,
            max_sws_betreuung: row.max_sws_betreuung,
            max_sws_ermaessigung: row.max_sws_ermaessigung,
            warn_ermaessigung_ueber: row.warn_ermaessigung_ueber,
            max_sws_praxisseminar: row.max_sws_praxisseminar,
            max_sws_projektveranstaltung: row.max_sws_projektveranstaltung,
            max_sws_seminar_master: row.max_sws_seminar_master,
            default_netto_lehrverpflichtung: row.default_netto_lehrverpflichtung,
        }
    }
}

impl LoadRules {
    /// Checks that every value is finite and non-negative.
    ///
    /// # Errors
    /// Returns [`Error::InvalidHours`] for the first offending value.
    pub fn validate(&self) -> Result<()> {
        let required = [
            self.sws_bachelor_arbeit,
            self.sws_master_arbeit,
            self.sws_doktorarbeit,
            self.sws_seminar_ba,
            self.sws_seminar_ma,
            self.sws_projekt_ba,
            self.sws_projekt_ma,
            self.default_netto_lehrverpflichtung,
        ];
        let optional = [
            self.max_sws_betreuung,
            self.max_sws_ermaessigung,
            self.warn_ermaessigung_ueber,
            self.max_sws_praxisseminar,
            self.max_sws_projektveranstaltung,
            self.max_sws_seminar_master,
        ];
        required
            .into_iter()
            .chain(optional.into_iter().flatten())
            .try_for_each(validate_sws)
    }

    fn into_active_model(self, created_by: Option<i64>) -> load_settings::ActiveModel {
        load_settings::ActiveModel {
            sws_bachelor_arbeit: Set(self.sws_bachelor_arbeit),
            sws_master_arbeit: Set(self.sws_master_arbeit),
            sws_doktorarbeit: Set(self.sws_doktorarbeit),
            sws_seminar_ba: Set(self.sws_seminar_ba),
            sws_seminar_ma: Set(self.sws_seminar_ma),
            sws_projekt_ba: Set(self.sws_projekt_ba),
            sws_projekt_ma: Set(self.sws_projekt_ma),
            max_sws_betreuung: Set(self.max_sws_betreuung),
            max_sws_ermaessigung: Set(self.max_sws_ermaessigung),
            warn_ermaessigung_ueber: Set(self.warn_ermaessigung_ueber),
            max_sws_praxisseminar: Set(self.max_sws_praxisseminar),
            max_sws_projektveranstaltung: Set(self.max_sws_projektveranstaltung),
            max_sws_seminar_master: Set(self.max_sws_seminar_master),
            default_netto_lehrverpflichtung: Set(self.default_netto_lehrverpflichtung),
            is_active: Set(true),
            created_by: Set(created_by),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
    }
}

/// Upper bound for any single hour value, coefficient or target.
pub const MAX_SWS: f64 = 100.0;

/// Rejects negative, non-finite and implausibly large hour values.
pub(crate) fn validate_sws(value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=MAX_SWS).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidHours { value })
    }
}

/// Returns the settings row flagged active, if any.
pub async fn get_active_settings<C>(db: &C) -> Result<Option<load_settings::Model>>
where
    C: ConnectionTrait,
{
    LoadSettings::find()
        .filter(load_settings::Column::IsActive.eq(true))
        .order_by_desc(load_settings::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Fetch-active-or-default: the active row's rules and id, or the built-in defaults
/// with no id when the table holds no active row.
pub async fn active_rules_or_default<C>(db: &C) -> Result<(Option<i64>, LoadRules)>
where
    C: ConnectionTrait,
{
    Ok(get_active_settings(db).await?.map_or_else(
        || (None, LoadRules::default()),
        |row| (Some(row.id), LoadRules::from(&row)),
    ))
}

/// Rules of a specific settings row.
pub async fn rules_by_id<C>(db: &C, settings_id: i64) -> Result<LoadRules>
where
    C: ConnectionTrait,
{
    LoadSettings::find_by_id(settings_id)
        .one(db)
        .await?
        .map(|row| LoadRules::from(&row))
        .ok_or_else(|| Error::not_found("load settings", settings_id))
}

/// Lists all settings rows, newest first.
pub async fn list_settings(db: &DatabaseConnection) -> Result<Vec<load_settings::Model>> {
    LoadSettings::find()
        .order_by_desc(load_settings::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Stores a new settings row and makes it the only active one.
#[instrument(skip(db, rules))]
pub async fn create_settings(
    db: &DatabaseConnection,
    actor: &Actor,
    rules: LoadRules,
) -> Result<load_settings::Model> {
    authorize(actor, Capability::ManageSettings)?;
    rules.validate()?;

    let txn = db.begin().await?;
    deactivate_all(&txn).await?;
    let row = rules.into_active_model(Some(actor.person_id)).insert(&txn).await?;
    txn.commit().await?;

    info!(settings_id = row.id, "Created and activated load settings");
    Ok(row)
}

/// Makes an existing settings row the only active one.
#[instrument(skip(db))]
pub async fn activate_settings(
    db: &DatabaseConnection,
    actor: &Actor,
    settings_id: i64,
) -> Result<load_settings::Model> {
    authorize(actor, Capability::ManageSettings)?;

    let txn = db.begin().await?;
    let row = LoadSettings::find_by_id(settings_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("load settings", settings_id))?;

    deactivate_all(&txn).await?;
    let mut active: load_settings::ActiveModel = row.into();
    active.is_active = Set(true);
    let row = active.update(&txn).await?;
    txn.commit().await?;

    info!(settings_id, "Activated load settings");
    Ok(row)
}

/// Seeds a first settings row from `rules` when the table is empty.
///
/// Returns the row that is active afterwards, or `None` if rows exist but none is active.
pub async fn ensure_settings(
    db: &DatabaseConnection,
    rules: LoadRules,
) -> Result<Option<load_settings::Model>> {
    if LoadSettings::find().count(db).await? > 0 {
        return get_active_settings(db).await;
    }
    rules.validate()?;
    let row = rules.into_active_model(None).insert(db).await?;
    info!(settings_id = row.id, "Seeded default load settings");
    Ok(Some(row))
}

async fn deactivate_all<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    LoadSettings::update_many()
        .col_expr(load_settings::Column::IsActive, Expr::value(false))
        .filter(load_settings::Column::IsActive.eq(true))
        .exec(db)
        .await?;
    Ok(())
}

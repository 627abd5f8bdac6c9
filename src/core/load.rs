//! Teaching-load computation engine.
//!
//! [`compute_load`] is a pure function of a statement's line items, the governing
//! [`LoadRules`] and the statement's personal target. It never touches the database, so a
//! preview can be computed as often as needed; persisting the result is a separate step in
//! `core::statement`.
//!
//! Per category the items are summed first and clipped afterwards, which makes the result
//! independent of item order. Clipping against a ceiling is reported as a [`LoadWarning`],
//! never as an error.

use crate::{
    core::settings::LoadRules,
    entities::load_item::{self, DegreeLevel, LoadCategory, SupervisionType, TeachingKind},
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// Subtotal of one category before and after ceilings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySubtotal {
    /// The category
    pub category: LoadCategory,
    /// Sum of the items' hours
    pub raw: f64,
    /// Hours actually credited after ceilings
    pub credited: f64,
    /// Number of items in the category
    pub item_count: usize,
}

/// Something noteworthy that happened during aggregation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadWarning {
    /// A category (or a capped teaching kind) exceeded its ceiling and was clipped
    CeilingClipped {
        /// Affected category
        category: LoadCategory,
        /// Capped teaching kind, for teaching ceilings
        teaching_kind: Option<TeachingKind>,
        /// Sum before clipping
        raw: f64,
        /// The ceiling the sum was clipped to
        ceiling: f64,
        /// Hard ceilings bound the category unconditionally; soft ones exist for review
        hard: bool,
    },
    /// Reductions exceed the configured warning threshold
    ReductionAboveThreshold {
        /// Credited reduction hours
        value: f64,
        /// The threshold
        threshold: f64,
    },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CeilingClipped {
                category,
                teaching_kind: Some(kind),
                raw,
                ceiling,
                ..
            } => write!(
                f,
                "{category} ({kind}): {raw:.2} SWS exceeds the ceiling, credited {ceiling:.2} SWS"
            ),
            Self::CeilingClipped {
                category,
                teaching_kind: None,
                raw,
                ceiling,
                ..
            } => write!(
                f,
                "{category}: {raw:.2} SWS exceeds the ceiling, credited {ceiling:.2} SWS"
            ),
            Self::ReductionAboveThreshold { value, threshold } => write!(
                f,
                "reduction: {value:.2} SWS is above the review threshold of {threshold:.2} SWS"
            ),
        }
    }
}

/// Result of a load computation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadBreakdown {
    /// One entry per category, in [`LoadCategory::ALL`] order
    pub subtotals: Vec<CategorySubtotal>,
    /// Sum of credited subtotals
    pub total: f64,
    /// Net teaching obligation the total is compared with
    pub target: f64,
    /// `total - target`; negative means under-load
    pub delta: f64,
    /// Clip and threshold events
    pub warnings: Vec<LoadWarning>,
}

impl LoadBreakdown {
    /// Credited hours of a category.
    #[must_use]
    pub fn credited(&self, category: LoadCategory) -> f64 {
        self.subtotals
            .iter()
            .find(|s| s.category == category)
            .map_or(0.0, |s| s.credited)
    }

    /// Raw (pre-ceiling) hours of a category.
    #[must_use]
    pub fn raw(&self, category: LoadCategory) -> f64 {
        self.subtotals
            .iter()
            .find(|s| s.category == category)
            .map_or(0.0, |s| s.raw)
    }

    /// Whether the declared load meets the target obligation.
    #[must_use]
    pub fn meets_target(&self) -> bool {
        self.delta >= 0.0
    }
}

/// Rounds to the two-decimal granularity SWS are declared in.
/// Values too large to scale are returned unchanged.
#[must_use]
pub fn round_sws(value: f64) -> f64 {
    let scaled = value * 100.0;
    if scaled.is_finite() {
        scaled.round() / 100.0
    } else {
        value
    }
}

/// Configured coefficient for a supervision of the given kind.
#[must_use]
pub fn supervision_coefficient(
    rules: &LoadRules,
    degree: DegreeLevel,
    supervision: SupervisionType,
) -> f64 {
    match (degree, supervision) {
        (DegreeLevel::Doctoral, _) => rules.sws_doktorarbeit,
        (DegreeLevel::Bachelor, SupervisionType::Thesis) => rules.sws_bachelor_arbeit,
        (DegreeLevel::Master, SupervisionType::Thesis) => rules.sws_master_arbeit,
        (DegreeLevel::Bachelor, SupervisionType::Seminar) => rules.sws_seminar_ba,
        (DegreeLevel::Master, SupervisionType::Seminar) => rules.sws_seminar_ma,
        (DegreeLevel::Bachelor, SupervisionType::Project) => rules.sws_projekt_ba,
        (DegreeLevel::Master, SupervisionType::Project) => rules.sws_projekt_ma,
    }
}

/// Hours a single item contributes before category ceilings.
///
/// Supervision items use their manual override if present, otherwise the coefficient for
/// their degree level and supervision type. A supervision row missing either attribute is
/// treated as a bachelor thesis. All other categories count at face value.
#[must_use]
pub fn item_hours(item: &load_item::Model, rules: &LoadRules) -> f64 {
    match item.category {
        LoadCategory::Supervision => item.override_sws.unwrap_or_else(|| {
            supervision_coefficient(
                rules,
                item.degree_level.unwrap_or(DegreeLevel::Bachelor),
                item.supervision_type.unwrap_or(SupervisionType::Thesis),
            )
        }),
        _ => item.sws,
    }
}

fn hard_ceiling(rules: &LoadRules, kind: TeachingKind) -> Option<f64> {
    match kind {
        TeachingKind::Praxisseminar => rules.max_sws_praxisseminar,
        TeachingKind::Projektveranstaltung => rules.max_sws_projektveranstaltung,
        TeachingKind::SeminarMaster => rules.max_sws_seminar_master,
        TeachingKind::Lecture | TeachingKind::Exercise | TeachingKind::Seminar | TeachingKind::Lab => {
            None
        }
    }
}

/// Clips `raw` to `ceiling`, recording a warning when it bites.
fn clip(
    raw: f64,
    ceiling: Option<f64>,
    category: LoadCategory,
    teaching_kind: Option<TeachingKind>,
    hard: bool,
    warnings: &mut Vec<LoadWarning>,
) -> f64 {
    match ceiling {
        Some(ceiling) if raw > ceiling => {
            warn!(%category, raw, ceiling, hard, "load ceiling applied");
            warnings.push(LoadWarning::CeilingClipped {
                category,
                teaching_kind,
                raw,
                ceiling,
                hard,
            });
            ceiling
        }
        _ => raw,
    }
}

fn teaching_subtotal(
    items: &[&load_item::Model],
    rules: &LoadRules,
    warnings: &mut Vec<LoadWarning>,
) -> (f64, f64) {
    // Items without a kind count as lectures
    let mut by_kind: BTreeMap<TeachingKind, f64> = BTreeMap::new();
    for item in items {
        *by_kind
            .entry(item.teaching_kind.unwrap_or(TeachingKind::Lecture))
            .or_insert(0.0) += item.sws;
    }

    let mut raw_total = 0.0;
    let mut credited_total = 0.0;
    for (kind, sum) in by_kind {
        let raw = round_sws(sum);
        raw_total += raw;
        credited_total += clip(
            raw,
            hard_ceiling(rules, kind),
            LoadCategory::Teaching,
            Some(kind),
            true,
            warnings,
        );
    }
    (round_sws(raw_total), round_sws(credited_total))
}

/// Computes the creditable load of a statement.
///
/// `target_override` is the statement's personal net obligation; without it
/// `default_netto_lehrverpflichtung` of `rules` applies.
#[must_use]
pub fn compute_load(
    items: &[load_item::Model],
    rules: &LoadRules,
    target_override: Option<f64>,
) -> LoadBreakdown {
    let mut warnings = Vec::new();
    let mut subtotals = Vec::with_capacity(LoadCategory::ALL.len());

    for category in LoadCategory::ALL {
        let in_category: Vec<&load_item::Model> =
            items.iter().filter(|i| i.category == category).collect();

        let (raw, credited) = match category {
            LoadCategory::Teaching => teaching_subtotal(&in_category, rules, &mut warnings),
            LoadCategory::Export | LoadCategory::Substitution => {
                let raw = round_sws(in_category.iter().map(|i| i.sws).sum());
                (raw, raw)
            }
            LoadCategory::Reduction => {
                let raw = round_sws(in_category.iter().map(|i| i.sws).sum());
                let credited = clip(
                    raw,
                    rules.max_sws_ermaessigung,
                    category,
                    None,
                    false,
                    &mut warnings,
                );
                if let Some(threshold) = rules.warn_ermaessigung_ueber {
                    if credited > threshold {
                        warnings.push(LoadWarning::ReductionAboveThreshold {
                            value: credited,
                            threshold,
                        });
                    }
                }
                (raw, credited)
            }
            LoadCategory::Supervision => {
                let raw = round_sws(in_category.iter().map(|i| item_hours(i, rules)).sum());
                let credited = clip(
                    raw,
                    rules.max_sws_betreuung,
                    category,
                    None,
                    false,
                    &mut warnings,
                );
                (raw, credited)
            }
        };

        subtotals.push(CategorySubtotal {
            category,
            raw,
            credited,
            item_count: in_category.len(),
        });
    }

    let total = round_sws(subtotals.iter().map(|s| s.credited).sum());
    let target = target_override.unwrap_or(rules.default_netto_lehrverpflichtung);
    let delta = round_sws(total - target);

    LoadBreakdown {
        subtotals,
        total,
        target,
        delta,
        warnings,
    }
}

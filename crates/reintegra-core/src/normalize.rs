//! Category normalizer and column selector.
//!
//! Maps raw survey values onto the vocabulary the trained trees were fitted
//! on, then keeps only the columns the selected variant consumes. Every rule
//! is a `(column, source value) → canonical value` entry in a lookup table;
//! no two rules share a source, so evaluation order is irrelevant.
//!
//! Values outside the known vocabularies pass through unchanged. Checking
//! raw input is the form layer's job ([`crate::vocab::validate_raw`]).

use std::collections::HashMap;
use std::sync::LazyLock;

use tracing::debug;

use crate::attribute::Attribute;
use crate::row::{AttributeRow, AttributeValue};
use crate::variant::{MINIMAL_SCHEMA, ModelVariant};

/// Count sentinel for "no record".
pub const NO_RECORD: i64 = -1;

/// Legacy count sentinel folded into [`NO_RECORD`] in full mode.
pub const LEGACY_NO_RECORD: i64 = -2;

/// Rewrites applied in both modes.
const BASE_REWRITES: &[(Attribute, &str, &str)] = &[
    (Attribute::OccupationalStatus, "No Aplica", "<No Registra>"),
    (Attribute::SpouseStatus, "<No Registra>", "<No Aplica>"),
    (Attribute::TrainingTrack, "<No Registra>", "<No Aplica>"),
];

/// Many-to-one collapses applied in full mode only.
const FULL_REWRITES: &[(Attribute, &str, &str)] = &[
    (Attribute::MaxTrainingLevel, "Técnico Laboral", "Técnico"),
    (Attribute::MaxTrainingLevel, "Técnico Profesional", "Técnico"),
    (Attribute::MaxTrainingLevel, "Técnico Laboral por Competencias", "Técnico"),
    (Attribute::MaxTrainingLevel, "Especialización Técnica", "Técnico"),
    (Attribute::MaxTrainingLevel, "Especialización Tecnológica", "Tecnológico"),
    (Attribute::MaxTrainingLevel, "Operario", "Otro"),
    (Attribute::MaxTrainingLevel, "Auxiliar", "Otro"),
    (
        Attribute::MaxTrainingLevel,
        "Certificación por Evaluación de Competencias",
        "Otro",
    ),
    (Attribute::AgeGroup, "Entre 18 y 25 años", "Entre 18 y 40 años"),
    (Attribute::AgeGroup, "Entre 26 y 40 años", "Entre 18 y 40 años"),
    (Attribute::HousingTenure, "Propia, totalmente pagada", "Propia"),
    (Attribute::HousingTenure, "Propia, la están pagando", "Propia"),
    (Attribute::HousingTenure, "Sana posesión con título", "Propia"),
    (
        Attribute::HousingTenure,
        "Es usufructo",
        "Con permiso del propietario, sin pago alguno",
    ),
    (
        Attribute::HousingTenure,
        "Familiar",
        "Con permiso del propietario, sin pago alguno",
    ),
    (
        Attribute::HousingTenure,
        "Posesión sin título (ocupante de hecho) o propiedad colectiva",
        "Otra",
    ),
    // The survey export carries a double space after "tenencia"; the form
    // offers the single-spaced spelling. Both collapse.
    (
        Attribute::HousingTenure,
        "Otra forma de tenencia  (posesión sin título, ocupante de hecho, propiedad colectiva, etc)",
        "Otra",
    ),
    (
        Attribute::HousingTenure,
        "Otra forma de tenencia (posesión sin título, ocupante de hecho, propiedad colectiva, etc)",
        "Otra",
    ),
    (Attribute::HousingType, "Casa-Lote", "Casa"),
    (Attribute::HousingType, "Cuarto(s)", "Habitación"),
    (Attribute::HousingType, "Rancho", "Finca"),
    (Attribute::HousingType, "Vivienda (casa) indígena", "Casa"),
    (
        Attribute::HousingType,
        "Otro tipo de vivienda (carpa, tienda, vagón, embarcación, cueva, refugio natural, puente, calle, etc.)",
        "Otro",
    ),
];

/// Columns dropped in full mode regardless of the bias flag.
pub const ALWAYS_EXCLUDED: &[Attribute] = &[
    Attribute::ExDemobGroup,
    Attribute::DemobYear,
    Attribute::EnrollmentStatus,
    Attribute::IndependenceYear,
    Attribute::ResidenceDepartment,
    Attribute::ResidenceMunicipality,
    Attribute::BenefitTRV,
    Attribute::BenefitFA,
    Attribute::BenefitFPT,
    Attribute::BenefitPDT,
    Attribute::BIEBenefitType,
    Attribute::ISUNStatus,
    Attribute::HasSocialService,
    Attribute::HasFamilyCensus,
    Attribute::HasHousingCensus,
    Attribute::SpecificComponentClass,
    Attribute::CutoffDate,
    Attribute::UpdateDate,
];

type RewriteTable = HashMap<Attribute, HashMap<&'static str, &'static str>>;

static BASE_TABLE: LazyLock<RewriteTable> = LazyLock::new(|| build_table(BASE_REWRITES));
static FULL_TABLE: LazyLock<RewriteTable> = LazyLock::new(|| build_table(FULL_REWRITES));

fn build_table(rules: &[(Attribute, &'static str, &'static str)]) -> RewriteTable {
    let mut table: RewriteTable = HashMap::new();
    for &(attr, from, to) in rules {
        table.entry(attr).or_default().insert(from, to);
    }
    table
}

fn lookup(table: &RewriteTable, attr: Attribute, value: &str) -> Option<&'static str> {
    table.get(&attr).and_then(|m| m.get(value)).copied()
}

/// Normalize a raw row.
///
/// `include_all = false` keeps only the five minimal columns after the base
/// rewrites. `include_all = true` applies the full-mode collapses, upper-cases
/// `Sex`, folds the legacy `-2` count sentinel into `-1`, and drops the
/// administrative columns (plus `DisbursementBreakdown` unless
/// `include_bias`). Columns keep their input order. The input is untouched.
pub fn normalize(row: &AttributeRow, include_all: bool, include_bias: bool) -> AttributeRow {
    let out: AttributeRow = row
        .iter()
        .filter_map(|(key, value)| {
            let attr = Attribute::from_name(key);
            if !is_retained(attr, include_all, include_bias) {
                return None;
            }
            let value = match attr {
                Some(a) => canonical_value(a, value, include_all),
                None => value.clone(),
            };
            Some((key, value))
        })
        .collect();

    debug!(
        include_all,
        include_bias,
        columns_in = row.len(),
        columns_out = out.len(),
        "normalized row"
    );
    out
}

/// [`normalize`] in the mode matching `variant`.
pub fn normalize_for(row: &AttributeRow, variant: ModelVariant, include_bias: bool) -> AttributeRow {
    normalize(row, variant.include_all(), include_bias)
}

/// Canonical form of a single value.
pub fn canonical_value(attr: Attribute, value: &AttributeValue, include_all: bool) -> AttributeValue {
    match value {
        AttributeValue::Category(s) => {
            if let Some(to) = lookup(&BASE_TABLE, attr, s) {
                return AttributeValue::from(to);
            }
            if !include_all {
                return value.clone();
            }
            if let Some(to) = lookup(&FULL_TABLE, attr, s) {
                return AttributeValue::from(to);
            }
            if attr == Attribute::Sex {
                return AttributeValue::Category(s.to_uppercase());
            }
            value.clone()
        }
        AttributeValue::Count(LEGACY_NO_RECORD)
            if include_all
                && matches!(attr, Attribute::NumChildren | Attribute::HouseholdSize) =>
        {
            AttributeValue::Count(NO_RECORD)
        }
        _ => value.clone(),
    }
}

fn is_retained(attr: Option<Attribute>, include_all: bool, include_bias: bool) -> bool {
    match attr {
        // Unknown columns survive full mode untouched.
        None => include_all,
        Some(a) if !include_all => MINIMAL_SCHEMA.contains(&a),
        Some(Attribute::DisbursementBreakdown) => include_bias,
        Some(a) => !ALWAYS_EXCLUDED.contains(&a),
    }
}

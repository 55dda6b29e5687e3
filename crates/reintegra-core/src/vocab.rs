//! Raw survey vocabularies.
//!
//! These are the option lists the intake form offers, plus the survey
//! export spellings the normalizer rewrites. The normalizer never consults
//! them; [`validate_raw`] is for the form layer.

use std::ops::RangeInclusive;

use crate::attribute::{Attribute, AttributeKind};
use crate::error::CoreError;
use crate::normalize::{LEGACY_NO_RECORD, NO_RECORD, canonical_value};
use crate::row::{AttributeRow, AttributeValue};
use crate::variant::ModelVariant;

pub const TRAINING_TRACK: &[&str] = &[
    "<No Aplica>",
    "OTROS",
    "OPERADORES DE MAQUINAS, EQUIPO Y TRANSPORTE",
    "SERVICIOS",
    "CARPINTERIA Y EBANISTERIA",
    "SALUD",
    "MECANICA AUTOMOTRIZ Y DE MOTOS",
    "SISTEMAS",
    "FINANZAS Y ADMINISTRACION",
    "AGROPECUARIA",
    "ALIMENTOS Y BEBIDAS",
    "ELECTRICIDAD",
    "CONSTRUCCION",
    "MERCADEO Y VENTAS",
    "MECANICA INDUSTRIAL",
    "TRANSVERSAL",
    "ELECTRONICA",
    "CONFECCION, MARROQUINERIA Y CALZADO",
    "AMBIENTAL",
    "ARTESANIAS Y JOYERIA",
    "ESTETICA",
    "EXPLOTACION MINERA, PETROLEO Y GAS",
    "DISEÑO Y ARTES GRAFICAS",
    "<No Registra>",
];

pub const OCCUPATIONAL_STATUS: &[&str] = &[
    "Ocupados en el sector Informal",
    "<No Registra>",
    "Población Económicamente Inactiva",
    "Desocupados",
    "No Aplica",
];

pub const DISBURSED_BENEFIT: &[&str] = &["Sí", "No"];

pub const SOCIAL_SERVICE_STATUS: &[&str] = &[
    "<No Aplica>",
    "Certificado",
    "Abandono sin justa causa",
    "Abandono con justa causa",
    "Vinculado",
];

pub const SPOUSE_STATUS: &[&str] = &["<No Aplica>", "No", "Sí", "<No Registra>"];

pub const DEMOBILIZATION_TYPE: &[&str] = &["Colectiva", "Individual"];

pub const EDUCATION_LEVEL: &[&str] = &[
    "Alfabetización",
    "Bachiller",
    "Básica Primaria",
    "Básica Secundaria",
    "Por Establecer",
];

pub const SOCIAL_SERVICE_TYPE: &[&str] = &[
    "<No Aplica>",
    "Acompañamiento a la atención en Salud y atención Alimentaria a comunidades vulnerables",
    "Embellecimiento de Espacio Publico",
    "Aporte de habilidades Especiales que le participante ponga a disposición de la comunidad",
    "Multiplicadores del Conocimiento",
    "Generación de espacios de recreación, Arte, Cultura y Deporte",
    "Recuperación Ambiental",
];

pub const HOUSING_TENURE: &[&str] = &[
    "<No Aplica>",
    "Con permiso del propietario, sin pago alguno",
    "En arriendo o subarriendo",
    "Es usufructo",
    "Familiar",
    "Otra forma de tenencia (posesión sin título, ocupante de hecho, propiedad colectiva, etc)",
    "Posesión sin título (ocupante de hecho) o propiedad colectiva",
    "Propia, la están pagando",
    "Propia, totalmente pagada",
    "Sana posesión con título",
    "Otra forma de tenencia  (posesión sin título, ocupante de hecho, propiedad colectiva, etc)",
];

pub const AGE_GROUP: &[&str] = &[
    "Entre 18 y 25 años",
    "Entre 26 y 40 años",
    "Entre 41 y 60 años",
    "Mayor de 60 años",
];

pub const MAX_TRAINING_LEVEL: &[&str] = &[
    "<No Aplica>",
    "Complementario",
    "Técnico",
    "Semicalificado",
    "Tecnológico",
    "Operario",
    "Transversal",
    "Técnico Profesional",
    "Técnico Laboral",
    "Auxiliar",
    "Técnico Laboral por Competencias",
    "Especialización Tecnológica",
    "Certificación por Evaluación de Competencias",
    "Especialización Técnica",
];

pub const BASIC_UTILITIES: &[&str] = &["<No Aplica>", "No", "Sí"];

pub const SEX: &[&str] = &["Masculino", "Femenino"];

pub const HOUSING_TYPE: &[&str] = &[
    "<No Aplica>",
    "Casa",
    "Apartamento",
    "Casa-Lote",
    "Habitación",
    "Finca",
    "Rancho",
    "Otro",
    "Cuarto(s)",
    "Vivienda (casa) indígena",
    "Otro tipo de vivienda (carpa, tienda, vagón, embarcación, cueva, refugio natural, puente, calle, etc.)",
];

pub const HEALTH_REGIME: &[&str] = &["S - SUBSIDIADO", "<No Registra>", "C - CONTRIBUTIVO"];

/// Raw option list for a category column, if the form restricts it.
pub fn raw_vocabulary(attr: Attribute) -> Option<&'static [&'static str]> {
    let vocab = match attr {
        Attribute::TrainingTrack => TRAINING_TRACK,
        Attribute::OccupationalStatus => OCCUPATIONAL_STATUS,
        Attribute::DisbursedBenefit => DISBURSED_BENEFIT,
        Attribute::SocialServiceStatus => SOCIAL_SERVICE_STATUS,
        Attribute::SpouseStatus => SPOUSE_STATUS,
        Attribute::DemobilizationType => DEMOBILIZATION_TYPE,
        Attribute::EducationLevel => EDUCATION_LEVEL,
        Attribute::SocialServiceType => SOCIAL_SERVICE_TYPE,
        Attribute::HousingTenure => HOUSING_TENURE,
        Attribute::AgeGroup => AGE_GROUP,
        Attribute::MaxTrainingLevel => MAX_TRAINING_LEVEL,
        Attribute::BasicUtilities => BASIC_UTILITIES,
        Attribute::Sex => SEX,
        Attribute::HousingType => HOUSING_TYPE,
        Attribute::HealthRegime => HEALTH_REGIME,
        _ => return None,
    };
    Some(vocab)
}

/// Recorded range of a count column, excluding the no-record sentinels.
pub fn count_range(attr: Attribute) -> Option<RangeInclusive<i64>> {
    match attr {
        Attribute::NumChildren => Some(1..=10),
        Attribute::HouseholdSize => Some(1..=20),
        _ => None,
    }
}

/// Canonical vocabulary of a category column under `variant`: the raw list
/// mapped through the normalizer, first occurrence kept.
pub fn canonical_vocabulary(attr: Attribute, variant: ModelVariant) -> Option<Vec<String>> {
    let raw = raw_vocabulary(attr)?;
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for &value in raw {
        let canonical = canonical_value(attr, &AttributeValue::from(value), variant.include_all());
        if let AttributeValue::Category(s) = canonical
            && !out.contains(&s)
        {
            out.push(s);
        }
    }
    Some(out)
}

/// Check a raw row against the form's vocabularies for `variant`.
///
/// Every schema column must be present. Category columns must hold one of
/// their raw options (columns without a fixed list accept any category).
/// Count columns must be a no-record sentinel or within their range.
pub fn validate_raw(
    row: &AttributeRow,
    variant: ModelVariant,
    include_bias: bool,
) -> Result<(), CoreError> {
    let bias = (include_bias && variant.include_all()).then_some(Attribute::DisbursementBreakdown);

    for attr in variant.input_schema().iter().copied().chain(bias) {
        let value = row
            .get_attr(attr)
            .filter(|v| !v.is_missing())
            .ok_or_else(|| CoreError::MissingAttribute(attr.to_string()))?;
        check_value(attr, value)?;
    }
    Ok(())
}

fn check_value(attr: Attribute, value: &AttributeValue) -> Result<(), CoreError> {
    let unrecognized = || CoreError::UnrecognizedCategory {
        attribute: attr.to_string(),
        value: value.to_string(),
    };

    match (attr.kind(), value) {
        (AttributeKind::Category, AttributeValue::Category(s)) => match raw_vocabulary(attr) {
            Some(vocab) if !vocab.contains(&s.as_str()) => Err(unrecognized()),
            _ => Ok(()),
        },
        (AttributeKind::Count, AttributeValue::Count(n)) => {
            if *n == NO_RECORD || *n == LEGACY_NO_RECORD {
                return Ok(());
            }
            match count_range(attr) {
                Some(range) if !range.contains(n) => Err(CoreError::CountOutOfRange {
                    attribute: attr.to_string(),
                    value: *n,
                }),
                _ => Ok(()),
            }
        }
        _ => Err(unrecognized()),
    }
}

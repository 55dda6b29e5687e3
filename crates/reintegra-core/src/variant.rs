//! The two trained model variants and the column sets they expect.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::attribute::Attribute;
use crate::error::CoreError;

/// Columns of the minimal ("Simple") schema, in form order.
pub const MINIMAL_SCHEMA: &[Attribute] = &[
    Attribute::TrainingTrack,
    Attribute::OccupationalStatus,
    Attribute::DisbursedBenefit,
    Attribute::SocialServiceStatus,
    Attribute::SpouseStatus,
];

/// Columns of the full ("Completo") schema, in form order.
///
/// [`Attribute::DisbursementBreakdown`] is bias-sensitive and not part of
/// the base schema; see [`ModelVariant::expected_columns`].
pub const FULL_SCHEMA: &[Attribute] = &[
    Attribute::DemobilizationType,
    Attribute::AgeGroup,
    Attribute::Sex,
    Attribute::EducationLevel,
    Attribute::MaxTrainingLevel,
    Attribute::TrainingTrack,
    Attribute::OccupationalStatus,
    Attribute::DisbursedBenefit,
    Attribute::SocialServiceStatus,
    Attribute::SocialServiceType,
    Attribute::SpouseStatus,
    Attribute::NumChildren,
    Attribute::HouseholdSize,
    Attribute::HousingType,
    Attribute::HousingTenure,
    Attribute::BasicUtilities,
    Attribute::HealthRegime,
];

/// A trained classifier variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ModelVariant {
    /// Five-column model.
    Simple,
    /// Seventeen-column model.
    Completo,
}

impl ModelVariant {
    pub const ALL: [ModelVariant; 2] = [Self::Simple, Self::Completo];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Simple => "Simple",
            Self::Completo => "Completo",
        }
    }

    /// Whether the normalizer runs in full mode for this variant.
    pub fn include_all(&self) -> bool {
        matches!(self, Self::Completo)
    }

    /// Columns a raw row must carry for this variant.
    pub fn input_schema(&self) -> &'static [Attribute] {
        match self {
            Self::Simple => MINIMAL_SCHEMA,
            Self::Completo => FULL_SCHEMA,
        }
    }

    /// Artifact file name inside the models directory.
    pub fn artifact_file(&self) -> &'static str {
        match self {
            Self::Simple => "tree_unbiased.json",
            Self::Completo => "tree_full_unbiased.json",
        }
    }

    /// Columns of a normalized row, in form order.
    ///
    /// With `include_bias`, the full variant also carries
    /// `DisbursementBreakdown`. The minimal variant never does.
    pub fn expected_columns(&self, include_bias: bool) -> Vec<&'static str> {
        let mut cols: Vec<&'static str> = self.input_schema().iter().map(|a| a.as_str()).collect();
        if include_bias && self.include_all() {
            cols.push(Attribute::DisbursementBreakdown.as_str());
        }
        cols
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelVariant {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "completo" | "full" => Ok(Self::Completo),
            _ => Err(CoreError::UnknownVariant(s.to_string())),
        }
    }
}

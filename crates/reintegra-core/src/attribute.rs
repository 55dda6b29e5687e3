//! Column names of the reintegration survey.
//!
//! Every column has a stable English name used throughout the workspace and
//! in model artifacts. The Spanish header of the original survey export is
//! accepted as an alias when parsing, so rows exported from the program's
//! spreadsheets can be fed in without renaming.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Value kind a column carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// Free-text-like category drawn from a fixed vocabulary.
    Category,
    /// Small integer where `-1` means "no record".
    Count,
}

/// A known survey column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attribute {
    // Minimal schema.
    OccupationalStatus,
    SpouseStatus,
    TrainingTrack,
    DisbursedBenefit,
    SocialServiceStatus,
    // Full schema.
    DemobilizationType,
    AgeGroup,
    Sex,
    EducationLevel,
    MaxTrainingLevel,
    SocialServiceType,
    NumChildren,
    HouseholdSize,
    HousingType,
    HousingTenure,
    BasicUtilities,
    HealthRegime,
    // Bias-sensitive.
    DisbursementBreakdown,
    // Administrative columns never fed to a model.
    ExDemobGroup,
    DemobYear,
    EnrollmentStatus,
    IndependenceYear,
    ResidenceDepartment,
    ResidenceMunicipality,
    BenefitTRV,
    BenefitFA,
    BenefitFPT,
    BenefitPDT,
    BIEBenefitType,
    ISUNStatus,
    HasSocialService,
    HasFamilyCensus,
    HasHousingCensus,
    SpecificComponentClass,
    CutoffDate,
    UpdateDate,
}

impl Attribute {
    pub const ALL: [Attribute; 36] = [
        Self::OccupationalStatus,
        Self::SpouseStatus,
        Self::TrainingTrack,
        Self::DisbursedBenefit,
        Self::SocialServiceStatus,
        Self::DemobilizationType,
        Self::AgeGroup,
        Self::Sex,
        Self::EducationLevel,
        Self::MaxTrainingLevel,
        Self::SocialServiceType,
        Self::NumChildren,
        Self::HouseholdSize,
        Self::HousingType,
        Self::HousingTenure,
        Self::BasicUtilities,
        Self::HealthRegime,
        Self::DisbursementBreakdown,
        Self::ExDemobGroup,
        Self::DemobYear,
        Self::EnrollmentStatus,
        Self::IndependenceYear,
        Self::ResidenceDepartment,
        Self::ResidenceMunicipality,
        Self::BenefitTRV,
        Self::BenefitFA,
        Self::BenefitFPT,
        Self::BenefitPDT,
        Self::BIEBenefitType,
        Self::ISUNStatus,
        Self::HasSocialService,
        Self::HasFamilyCensus,
        Self::HasHousingCensus,
        Self::SpecificComponentClass,
        Self::CutoffDate,
        Self::UpdateDate,
    ];

    /// Canonical column name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OccupationalStatus => "OccupationalStatus",
            Self::SpouseStatus => "SpouseStatus",
            Self::TrainingTrack => "TrainingTrack",
            Self::DisbursedBenefit => "DisbursedBenefit",
            Self::SocialServiceStatus => "SocialServiceStatus",
            Self::DemobilizationType => "DemobilizationType",
            Self::AgeGroup => "AgeGroup",
            Self::Sex => "Sex",
            Self::EducationLevel => "EducationLevel",
            Self::MaxTrainingLevel => "MaxTrainingLevel",
            Self::SocialServiceType => "SocialServiceType",
            Self::NumChildren => "NumChildren",
            Self::HouseholdSize => "HouseholdSize",
            Self::HousingType => "HousingType",
            Self::HousingTenure => "HousingTenure",
            Self::BasicUtilities => "BasicUtilities",
            Self::HealthRegime => "HealthRegime",
            Self::DisbursementBreakdown => "DisbursementBreakdown",
            Self::ExDemobGroup => "ExDemobGroup",
            Self::DemobYear => "DemobYear",
            Self::EnrollmentStatus => "EnrollmentStatus",
            Self::IndependenceYear => "IndependenceYear",
            Self::ResidenceDepartment => "ResidenceDepartment",
            Self::ResidenceMunicipality => "ResidenceMunicipality",
            Self::BenefitTRV => "BenefitTRV",
            Self::BenefitFA => "BenefitFA",
            Self::BenefitFPT => "BenefitFPT",
            Self::BenefitPDT => "BenefitPDT",
            Self::BIEBenefitType => "BIEBenefitType",
            Self::ISUNStatus => "ISUNStatus",
            Self::HasSocialService => "HasSocialService",
            Self::HasFamilyCensus => "HasFamilyCensus",
            Self::HasHousingCensus => "HasHousingCensus",
            Self::SpecificComponentClass => "SpecificComponentClass",
            Self::CutoffDate => "CutoffDate",
            Self::UpdateDate => "UpdateDate",
        }
    }

    /// Header used by the program's survey export.
    pub fn survey_header(&self) -> &'static str {
        match self {
            Self::OccupationalStatus => "OcupacionEconomica",
            Self::SpouseStatus => "Posee Cónyuge o Compañero(a)?",
            Self::TrainingTrack => "Línea de FpT para el Máx. Nivel",
            Self::DisbursedBenefit => "Desembolso BIE",
            Self::SocialServiceStatus => "Estado de la vinculación ASS",
            Self::DemobilizationType => "Tipo de Desmovilización",
            Self::AgeGroup => "Grupo Etario",
            Self::Sex => "Sexo",
            Self::EducationLevel => "Nivel Educativo",
            Self::MaxTrainingLevel => "Máximo Nivel FpT Reportado",
            Self::SocialServiceType => "Tipo de ASS Vinculada",
            Self::NumChildren => "N° de Hijos",
            Self::HouseholdSize => "Total Integrantes grupo familiar",
            Self::HousingType => "Tipo de Vivienda",
            Self::HousingTenure => "Régimen de tenencia Vivienda",
            Self::BasicUtilities => "Posee Serv. Públicos Básicos",
            Self::HealthRegime => "Régimen de salud",
            Self::DisbursementBreakdown => "DesagregadoDesembolsoBIE",
            Self::ExDemobGroup => "Ex Grupo",
            Self::DemobYear => "Año desmovilización",
            Self::EnrollmentStatus => "Ingresó/No ingresó",
            Self::IndependenceYear => "Año de Independización/Ingreso",
            Self::ResidenceDepartment => "Departamento de residencia",
            Self::ResidenceMunicipality => "Municipio de residencia",
            Self::BenefitTRV => "BeneficioTRV",
            Self::BenefitFA => "BeneficioFA",
            Self::BenefitFPT => "BeneficioFPT",
            Self::BenefitPDT => "BeneficioPDT",
            Self::BIEBenefitType => "Tipo de BIE Accedido",
            Self::ISUNStatus => "Estado ISUN",
            Self::HasSocialService => "Posee Servicio Social?",
            Self::HasFamilyCensus => "Posee Censo de Familia?",
            Self::HasHousingCensus => "Posee Censo de Habitabilidad?",
            Self::SpecificComponentClass => "Clasificación Componente Específico",
            Self::CutoffDate => "FechaCorte",
            Self::UpdateDate => "FechaActualizacion",
        }
    }

    pub fn kind(&self) -> AttributeKind {
        match self {
            Self::NumChildren | Self::HouseholdSize | Self::DemobYear | Self::IndependenceYear => {
                AttributeKind::Count
            }
            _ => AttributeKind::Category,
        }
    }

    /// Resolve a column name or survey header. Exact match only.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == name || a.survey_header() == name)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Attribute {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| CoreError::UnknownAttribute(s.to_string()))
    }
}

//! Core types for Reintegra: survey columns, attribute rows, the two model
//! variants, raw vocabularies, and the category normalizer.

pub mod attribute;
mod error;
pub mod normalize;
pub mod row;
pub mod variant;
pub mod vocab;

pub use attribute::{Attribute, AttributeKind};
pub use error::CoreError;
pub use normalize::{normalize, normalize_for};
pub use row::{AttributeRow, AttributeValue};
pub use variant::{FULL_SCHEMA, MINIMAL_SCHEMA, ModelVariant};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown model variant: {0} (expected Simple or Completo)")]
    UnknownVariant(String),

    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),

    #[error("missing attribute: {0}")]
    MissingAttribute(String),

    #[error("unrecognized value {value:?} for {attribute}")]
    UnrecognizedCategory { attribute: String, value: String },

    #[error("{attribute} = {value} is outside the allowed range")]
    CountOutOfRange { attribute: String, value: i64 },

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

// Error taxonomy for form definition, composition, rendering and validation

use thiserror::Error;

/// Result type used across the form core.
pub type FormResult<T> = Result<T, FormError>;

/// Failures surfaced by [`Form`](super::Form) and its registry.
///
/// Collaborator failures (renderer, validator) are carried through without
/// interpretation.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("Please provide a valid field name for form [{form}]")]
    InvalidFieldName { form: String },

    #[error("Field [{name}] already exists in the form")]
    DuplicateField { name: String },

    #[error("Field [{name}] does not exist in the form")]
    UnknownField { name: String },

    #[error("Unsupported field type [{0}]")]
    UnknownFieldType(String),

    #[error("[{0}] is invalid. Please provide a registered form type, Form or ChildForm")]
    InvalidCompositionSource(String),

    #[error("Form {0} was not validated. To validate it, call `is_valid` before retrieving the errors")]
    NotValidated(String),

    #[error("Form rendering failed: {0}")]
    Render(#[source] anyhow::Error),

    #[error("Form validation failed: {0}")]
    Validation(#[source] anyhow::Error),

    #[error("Model could not be converted: {0}")]
    Model(#[from] serde_json::Error),
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BondSimError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl BondSimError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        BondSimError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for BondSimError {
    fn from(e: serde_json::Error) -> Self {
        BondSimError::SerializationError(e.to_string())
    }
}

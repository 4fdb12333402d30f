use thiserror::Error;

#[derive(Debug, Error)]
pub enum RentalFinanceError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Computation failure in {context}")]
    Computation { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for RentalFinanceError {
    fn from(e: serde_json::Error) -> Self {
        RentalFinanceError::SerializationError(e.to_string())
    }
}

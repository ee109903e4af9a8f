#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid assignment to {field}: {message}")]
    InvalidAssignment {
        field: &'static str,
        message: String,
    },
}

use thiserror::Error;

/// Core error type for the gradflow workflow engines
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Referenced workflow, thesis, defense, or person does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate thesis for a student or duplicate defense for a thesis
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Requested transition does not match the entity's current status
    #[error("Invalid workflow state: {0}")]
    InvalidState(String),

    /// Malformed input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Actor role does not hold the permission for the requested transition
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// State store error
    #[error("State store error: {0}")]
    StateStoreError(String),
}

impl CoreError {
    /// Stable machine-readable code for the error kind.
    ///
    /// Codes are part of the external contract and must not change even
    /// when the human-readable messages do.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::NotFound(_) => "not_found",
            CoreError::Conflict(_) => "conflict",
            CoreError::InvalidState(_) => "invalid_state",
            CoreError::Validation(_) => "validation",
            CoreError::Unauthorized(_) => "unauthorized",
            CoreError::StateStoreError(_) => "state_store",
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::StateStoreError(err.to_string())
    }
}

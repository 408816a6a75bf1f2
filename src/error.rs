//! Domain error taxonomy for the homework core.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HomeworkError {
    /// Blocking user-facing rejection; the action is aborted and state is unchanged.
    #[error("{0}")]
    Validation(String),

    /// PIN mismatch at the teacher gate.
    #[error("incorrect PIN")]
    Auth,

    /// Backing blob store read/write failure.
    #[error("storage failure on key {key}: {message}")]
    Storage { key: String, message: String },

    /// Teacher-only operation attempted outside the teacher views.
    #[error("teacher login required")]
    AuthRequired,

    /// Operation not allowed in the current view or session state.
    #[error("{0}")]
    InvalidState(String),

    #[error("{0} not found")]
    NotFound(String),
}

impl HomeworkError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    pub fn storage(key: &str, message: impl ToString) -> Self {
        Self::Storage {
            key: key.to_string(),
            message: message.to_string(),
        }
    }

    /// Stable code reported over IPC.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::Auth => "auth_failed",
            Self::AuthRequired => "auth_required",
            Self::Storage { .. } => "storage_failed",
            Self::InvalidState(_) => "invalid_state",
            Self::NotFound(_) => "not_found",
        }
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }
}

pub type HomeworkResult<T> = Result<T, HomeworkError>;

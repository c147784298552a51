use thiserror::Error;

use crate::api::ApiError;
use crate::domain::{Expense, GroupId, UserId, ValidationError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Group not found: {0}")]
    GroupNotFound(GroupId),

    #[error("An expense for group {0} is already being submitted")]
    SubmissionInFlight(GroupId),

    #[error("Request failed: {0}")]
    Api(#[from] ApiError),

    /// The expense was created but the group could not be reloaded afterwards.
    /// Retrying the submission would record it twice.
    #[error("Expense {} was saved, but reloading the group failed: {source}", .expense.id)]
    RefreshFailed {
        expense: Box<Expense>,
        #[source]
        source: Box<AppError>,
    },
}

/// Coarse failure classes, for callers that only need to pick a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The input was rejected, locally or by the server
    Validation,
    NotFound,
    /// A duplicate submission was refused
    Conflict,
    /// The server could not be reached or failed
    Request,
    /// The write went through; only the follow-up read failed
    Stale,
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::Validation(_) => ErrorCategory::Validation,
            AppError::UserNotFound(_) | AppError::GroupNotFound(_) => ErrorCategory::NotFound,
            AppError::SubmissionInFlight(_) => ErrorCategory::Conflict,
            AppError::Api(err) if err.is_not_found() => ErrorCategory::NotFound,
            AppError::Api(err) if err.is_client_error() => ErrorCategory::Validation,
            AppError::Api(_) => ErrorCategory::Request,
            AppError::RefreshFailed { .. } => ErrorCategory::Stale,
        }
    }

    /// The expense the server already recorded, if this error came after the write.
    pub fn recorded_expense(&self) -> Option<&Expense> {
        match self {
            AppError::RefreshFailed { expense, .. } => Some(&**expense),
            _ => None,
        }
    }
}

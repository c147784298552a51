use thiserror::Error;

use super::{NewGroup, NewUser, UserId};

/// Input rejected on the client before any request is sent.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Name must not be empty")]
    EmptyName,

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("A group needs at least one member")]
    NoMembers,

    #[error("Description must not be empty")]
    EmptyDescription,

    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(f64),

    #[error("Payer {0} is not a member of the group")]
    PayerNotMember(UserId),

    #[error("Expense has no splits")]
    NoSplits,

    #[error("User {0} is not a member of the group")]
    SplitUserNotMember(UserId),

    #[error("User {0} appears in more than one split")]
    DuplicateSplitUser(UserId),

    #[error("Equal split covers {actual} users, the group has {expected} members")]
    SplitMembersMismatch { expected: usize, actual: usize },

    #[error("Percentage split for user {0} has no percentage")]
    MissingPercentage(UserId),

    #[error("Percentage {percentage} for user {user_id} is outside 0..=100")]
    PercentageOutOfRange { user_id: UserId, percentage: f64 },

    #[error("Percentages add up to {0}, expected 100")]
    PercentageSumMismatch(f64),

    #[error("Share for user {user_id} is {actual:.2}, expected {expected:.2}")]
    ShareMismatch {
        user_id: UserId,
        expected: f64,
        actual: f64,
    },

    #[error("Splits add up to {actual:.2}, expected {expected:.2}")]
    SplitSumMismatch { expected: f64, actual: f64 },
}

impl NewUser {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        // Same shape check a browser applies to an email input
        let valid = match self.email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty() && !domain.is_empty() && !domain.contains('@')
            }
            None => false,
        };
        if !valid {
            return Err(ValidationError::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }
}

impl NewGroup {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.user_ids.is_empty() {
            return Err(ValidationError::NoMembers);
        }
        Ok(())
    }
}

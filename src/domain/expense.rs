use serde::{Deserialize, Serialize};

use super::{Group, GroupId, UserId, ValidationError, amounts_match};

pub type ExpenseId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitType {
    /// Amount divided evenly across members
    Equal,
    /// Each member owes a chosen percentage of the amount
    Percentage,
}

impl SplitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitType::Equal => "equal",
            SplitType::Percentage => "percentage",
        }
    }
}

impl std::str::FromStr for SplitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "equal" => Ok(SplitType::Equal),
            "percentage" | "percent" => Ok(SplitType::Percentage),
            other => Err(format!("unknown split type '{}'", other)),
        }
    }
}

impl std::fmt::Display for SplitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One participant's share of a recorded expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split {
    pub id: i64,
    pub user_id: UserId,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
}

/// An expense as stored by the backend. Splits are fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub description: String,
    pub amount: f64,
    pub split_type: SplitType,
    pub paid_by: UserId,
    pub group_id: GroupId,
    pub splits: Vec<Split>,
}

impl Expense {
    pub fn share_of(&self, user_id: UserId) -> Option<&Split> {
        self.splits.iter().find(|s| s.user_id == user_id)
    }
}

/// A share computed on the client before it is submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSplit {
    pub user_id: UserId,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
}

impl NewSplit {
    pub fn equal(user_id: UserId, amount: f64) -> Self {
        Self {
            user_id,
            amount,
            percentage: None,
        }
    }

    pub fn percentage(user_id: UserId, amount: f64, percentage: f64) -> Self {
        Self {
            user_id,
            amount,
            percentage: Some(percentage),
        }
    }
}

/// Request body for recording an expense in a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub description: String,
    pub amount: f64,
    pub paid_by: UserId,
    pub split_type: SplitType,
    pub splits: Vec<NewSplit>,
}

impl NewExpense {
    /// Check the expense against the group it is being recorded in.
    ///
    /// The backend repeats the membership checks; the share arithmetic is
    /// only ever checked here.
    pub fn validate(&self, group: &Group) -> Result<(), ValidationError> {
        if self.description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(ValidationError::NonPositiveAmount(self.amount));
        }
        if !group.is_member(self.paid_by) {
            return Err(ValidationError::PayerNotMember(self.paid_by));
        }
        if self.splits.is_empty() {
            return Err(ValidationError::NoSplits);
        }

        let mut seen = Vec::with_capacity(self.splits.len());
        for split in &self.splits {
            if !group.is_member(split.user_id) {
                return Err(ValidationError::SplitUserNotMember(split.user_id));
            }
            if seen.contains(&split.user_id) {
                return Err(ValidationError::DuplicateSplitUser(split.user_id));
            }
            seen.push(split.user_id);
        }

        match self.split_type {
            SplitType::Equal => self.validate_equal(group)?,
            SplitType::Percentage => self.validate_percentage()?,
        }

        let total: f64 = self.splits.iter().map(|s| s.amount).sum();
        if !amounts_match(total, self.amount) {
            return Err(ValidationError::SplitSumMismatch {
                expected: self.amount,
                actual: total,
            });
        }

        Ok(())
    }

    /// An equal split has exactly one share per group member.
    fn validate_equal(&self, group: &Group) -> Result<(), ValidationError> {
        // Split users are already known to be distinct members
        if self.splits.len() != group.members.len() {
            return Err(ValidationError::SplitMembersMismatch {
                expected: group.members.len(),
                actual: self.splits.len(),
            });
        }
        let expected = self.amount / group.members.len() as f64;
        for split in &self.splits {
            if !amounts_match(split.amount, expected) {
                return Err(ValidationError::ShareMismatch {
                    user_id: split.user_id,
                    expected,
                    actual: split.amount,
                });
            }
        }
        Ok(())
    }

    fn validate_percentage(&self) -> Result<(), ValidationError> {
        let mut total_percentage = 0.0;
        for split in &self.splits {
            let percentage = split
                .percentage
                .ok_or(ValidationError::MissingPercentage(split.user_id))?;
            if !(0.0..=100.0).contains(&percentage) {
                return Err(ValidationError::PercentageOutOfRange {
                    user_id: split.user_id,
                    percentage,
                });
            }
            let expected = self.amount * percentage / 100.0;
            if !amounts_match(split.amount, expected) {
                return Err(ValidationError::ShareMismatch {
                    user_id: split.user_id,
                    expected,
                    actual: split.amount,
                });
            }
            total_percentage += percentage;
        }

        if !amounts_match(total_percentage, 100.0) {
            return Err(ValidationError::PercentageSumMismatch(total_percentage));
        }
        Ok(())
    }
}

//! Split calculation.
//!
//! Pure functions that turn an expense amount and a split strategy into
//! per-member shares, plus [`ExpenseForm`], the draft state that calls them
//! every time one of its inputs changes.

use super::{NewExpense, NewSplit, SplitType, UserId};

/// Divide `amount` evenly across `members`.
///
/// Each share is `amount / members.len()` with no remainder correction, so
/// the shares may sum to `amount` only within a cent. Returns an empty list
/// when there are no members.
pub fn compute_equal_split(amount: f64, members: &[UserId]) -> Vec<NewSplit> {
    if members.is_empty() {
        return Vec::new();
    }
    let per_member = amount / members.len() as f64;
    members
        .iter()
        .map(|&user_id| NewSplit::equal(user_id, per_member))
        .collect()
}

/// Set one member's percentage share and keep everyone else's entry.
///
/// The result covers every member in `members` order. The updated member
/// gets `amount * percentage / 100`; other members keep their entry from
/// `prior` untouched, or `0` / `0%` when they have none. Percentages are
/// not checked to sum to 100 here.
pub fn compute_split_from_percentage(
    amount: f64,
    members: &[UserId],
    member_id: UserId,
    percentage: f64,
    prior: &[NewSplit],
) -> Vec<NewSplit> {
    members
        .iter()
        .map(|&user_id| {
            if user_id == member_id {
                return NewSplit::percentage(user_id, amount * percentage / 100.0, percentage);
            }
            prior
                .iter()
                .find(|s| s.user_id == user_id)
                .cloned()
                .unwrap_or_else(|| NewSplit::percentage(user_id, 0.0, 0.0))
        })
        .collect()
}

/// Draft of an expense for one group.
///
/// Every setter recomputes the split list, so `splits()` always reflects the
/// current amount, strategy and member list.
#[derive(Debug, Clone)]
pub struct ExpenseForm {
    members: Vec<UserId>,
    amount: f64,
    split_type: SplitType,
    splits: Vec<NewSplit>,
}

impl ExpenseForm {
    /// Start an equal-split draft with a zero amount.
    pub fn new(members: Vec<UserId>) -> Self {
        let splits = compute_equal_split(0.0, &members);
        Self {
            members,
            amount: 0.0,
            split_type: SplitType::Equal,
            splits,
        }
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn split_type(&self) -> SplitType {
        self.split_type
    }

    pub fn splits(&self) -> &[NewSplit] {
        &self.splits
    }

    pub fn members(&self) -> &[UserId] {
        &self.members
    }

    pub fn set_amount(&mut self, amount: f64) {
        self.amount = amount;
        match self.split_type {
            SplitType::Equal => {
                self.splits = compute_equal_split(self.amount, &self.members);
            }
            SplitType::Percentage => {
                // Re-derive each share from the percentage already chosen
                let chosen: Vec<(UserId, f64)> = self
                    .splits
                    .iter()
                    .filter_map(|s| s.percentage.map(|p| (s.user_id, p)))
                    .collect();
                for (user_id, percentage) in chosen {
                    self.splits = compute_split_from_percentage(
                        self.amount,
                        &self.members,
                        user_id,
                        percentage,
                        &self.splits,
                    );
                }
            }
        }
    }

    /// Switch strategy. Switching to percentage starts every member at 0%.
    pub fn set_split_type(&mut self, split_type: SplitType) {
        self.split_type = split_type;
        self.splits = match split_type {
            SplitType::Equal => compute_equal_split(self.amount, &self.members),
            SplitType::Percentage => self
                .members
                .iter()
                .map(|&user_id| NewSplit::percentage(user_id, 0.0, 0.0))
                .collect(),
        };
    }

    /// Set one member's percentage. Ignored while the draft is an equal split.
    pub fn set_percentage(&mut self, member_id: UserId, percentage: f64) {
        if self.split_type != SplitType::Percentage {
            return;
        }
        self.splits = compute_split_from_percentage(
            self.amount,
            &self.members,
            member_id,
            percentage,
            &self.splits,
        );
    }

    /// Sum of the percentages chosen so far.
    pub fn percentage_total(&self) -> f64 {
        self.splits.iter().filter_map(|s| s.percentage).sum()
    }

    pub fn into_new_expense(self, description: impl Into<String>, paid_by: UserId) -> NewExpense {
        NewExpense {
            description: description.into(),
            amount: self.amount,
            paid_by,
            split_type: self.split_type,
            splits: self.splits,
        }
    }
}

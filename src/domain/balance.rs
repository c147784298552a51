use serde::{Deserialize, Serialize};
use std::fmt;

use super::{GroupId, UserId, format_amount, to_cents};

/// A member's signed net position in one group.
///
/// Positive means the member owes into the group, negative means they are
/// owed. The sign is assigned by the backend; the client only renders it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub user_id: UserId,
    pub user_name: String,
    pub amount: f64,
}

impl Balance {
    pub fn statement(&self) -> BalanceStatement {
        describe_balance(self.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupBalance {
    pub group_id: GroupId,
    pub group_name: String,
    pub balances: Vec<Balance>,
}

impl GroupBalance {
    pub fn entry_for(&self, user_id: UserId) -> Option<&Balance> {
        find_user_entry_in_group(self, user_id)
    }
}

/// One user's balances across every group they belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserBalance {
    pub user_id: UserId,
    pub user_name: String,
    pub group_balances: Vec<GroupBalance>,
}

impl UserBalance {
    /// The user's own entries summed across groups. Groups without an entry count as zero.
    pub fn net_total(&self) -> f64 {
        self.group_balances
            .iter()
            .filter_map(|gb| gb.entry_for(self.user_id))
            .map(|b| b.amount)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceDirection {
    Owes,
    IsOwed,
    Settled,
}

impl BalanceDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            BalanceDirection::Owes => "owes",
            BalanceDirection::IsOwed => "is_owed",
            BalanceDirection::Settled => "settled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BalanceDirection::Owes => "Owes",
            BalanceDirection::IsOwed => "Is Owed",
            BalanceDirection::Settled => "Settled",
        }
    }
}

impl fmt::Display for BalanceDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// "Who owes whom" reading of a signed balance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalanceStatement {
    pub direction: BalanceDirection,
    /// Always non-negative
    pub magnitude: f64,
}

impl BalanceStatement {
    pub fn magnitude_text(&self) -> String {
        format_amount(self.magnitude)
    }
}

impl fmt::Display for BalanceStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ${}", self.direction.label(), self.magnitude_text())
    }
}

/// Interpret a signed balance: positive owes, negative is owed, zero is settled.
///
/// Amounts that round to zero cents count as settled, so residue such as
/// `1e-14` from thirds never reads as "Owes $0.00".
pub fn describe_balance(amount: f64) -> BalanceStatement {
    let cents = to_cents(amount);
    let direction = match cents.signum() {
        1 => BalanceDirection::Owes,
        -1 => BalanceDirection::IsOwed,
        _ => BalanceDirection::Settled,
    };
    let magnitude = if cents == 0 { 0.0 } else { amount.abs() };
    BalanceStatement {
        direction,
        magnitude,
    }
}

/// Find a user's entry in a group's balances.
///
/// `None` is an expected answer (the user has no entry in that group) and
/// should be shown as "no data" rather than treated as a failure.
pub fn find_user_entry_in_group(group_balance: &GroupBalance, user_id: UserId) -> Option<&Balance> {
    group_balance.balances.iter().find(|b| b.user_id == user_id)
}

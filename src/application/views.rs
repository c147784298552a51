use serde::{Deserialize, Serialize};

use crate::domain::{
    Balance, BalanceStatement, Expense, Group, GroupBalance, GroupId, User, UserId,
    describe_balance, display_name, find_user_entry_in_group,
};

/// Result of creating a group, with the refreshed group list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupCreated {
    pub group: Group,
    pub groups: Vec<Group>,
}

/// Everything the group page shows, loaded together
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDetails {
    pub group: Group,
    pub expenses: Vec<Expense>,
    pub users: Vec<User>,
    pub balances: GroupBalance,
}

impl GroupDetails {
    pub fn user_name(&self, user_id: UserId) -> &str {
        display_name(&self.users, user_id)
    }

    /// One line per balance entry, with names resolved from the user list
    pub fn balance_lines(&self) -> Vec<BalanceLine> {
        self.balances
            .balances
            .iter()
            .map(|b| BalanceLine {
                user_id: b.user_id,
                user_name: self.user_name(b.user_id).to_string(),
                amount: b.amount,
                statement: describe_balance(b.amount),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceLine {
    pub user_id: UserId,
    pub user_name: String,
    pub amount: f64,
    pub statement: BalanceStatement,
}

/// Result of recording an expense, with the re-fetched group state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseRecorded {
    pub expense: Expense,
    pub expenses: Vec<Expense>,
    pub balances: GroupBalance,
}

/// One user's position in each of their groups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserBalanceView {
    pub user_id: UserId,
    pub user_name: String,
    pub groups: Vec<UserGroupLine>,
    pub net_total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserGroupLine {
    pub group_id: GroupId,
    pub group_name: String,
    /// `None` when the group has no entry for the user
    pub entry: Option<Balance>,
}

impl UserGroupLine {
    pub fn from_group_balance(group_balance: &GroupBalance, user_id: UserId) -> Self {
        Self {
            group_id: group_balance.group_id,
            group_name: group_balance.group_name.clone(),
            entry: find_user_entry_in_group(group_balance, user_id).cloned(),
        }
    }

    pub fn statement(&self) -> Option<BalanceStatement> {
        self.entry.as_ref().map(Balance::statement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BalanceDirection;

    #[test]
    fn test_balance_lines_resolve_names() {
        let details = GroupDetails {
            group: Group {
                id: 1,
                name: "Trip".into(),
                members: vec![],
                total_expenses: 0.0,
            },
            expenses: vec![],
            users: vec![User {
                id: 1,
                name: "Alice".into(),
                email: "alice@example.com".into(),
            }],
            balances: GroupBalance {
                group_id: 1,
                group_name: "Trip".into(),
                balances: vec![
                    Balance {
                        user_id: 1,
                        user_name: "Alice".into(),
                        amount: -12.34,
                    },
                    Balance {
                        user_id: 2,
                        user_name: "Bob".into(),
                        amount: 12.34,
                    },
                ],
            },
        };

        let lines = details.balance_lines();
        assert_eq!(lines[0].user_name, "Alice");
        assert_eq!(lines[0].statement.to_string(), "Is Owed $12.34");
        assert_eq!(lines[1].user_name, "Unknown");
        assert_eq!(lines[1].statement.direction, BalanceDirection::Owes);
    }

    #[test]
    fn test_user_group_line_without_entry() {
        let group_balance = GroupBalance {
            group_id: 4,
            group_name: "Flat".into(),
            balances: vec![],
        };
        let line = UserGroupLine::from_group_balance(&group_balance, 1);
        assert_eq!(line.group_name, "Flat");
        assert!(line.entry.is_none());
        assert!(line.statement().is_none());
    }
}

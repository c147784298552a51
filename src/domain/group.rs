use serde::{Deserialize, Serialize};

use super::{User, UserId};

pub type GroupId = i64;

/// A group's member set is fixed when it is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub members: Vec<User>,
    /// Sum of all expense amounts, reported by the backend on single-group reads
    #[serde(default)]
    pub total_expenses: f64,
}

impl Group {
    pub fn member_ids(&self) -> Vec<UserId> {
        self.members.iter().map(|m| m.id).collect()
    }

    pub fn is_member(&self, user_id: UserId) -> bool {
        self.members.iter().any(|m| m.id == user_id)
    }

    pub fn member(&self, user_id: UserId) -> Option<&User> {
        self.members.iter().find(|m| m.id == user_id)
    }
}

/// Request body for creating a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGroup {
    pub name: String,
    pub user_ids: Vec<UserId>,
}

impl NewGroup {
    /// Build a request, dropping repeated member ids while keeping their first position.
    pub fn new(name: impl Into<String>, user_ids: impl IntoIterator<Item = UserId>) -> Self {
        let mut unique = Vec::new();
        for id in user_ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        Self {
            name: name.into().trim().to_string(),
            user_ids: unique,
        }
    }
}

use std::collections::HashSet;
use std::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError, ClientConfig};
use crate::domain::{
    Expense, ExpenseForm, Group, GroupBalance, GroupId, NewExpense, NewGroup, NewUser, SplitType,
    User, UserId, ValidationError,
};

use super::{
    AppError, ExpenseRecorded, GroupCreated, GroupDetails, UserBalanceView, UserGroupLine,
};

/// Application service providing the client's use cases.
/// This is the primary interface for any front end (CLI, TUI, etc.).
pub struct SplitService {
    api: ApiClient,
    /// Groups with an expense submission currently awaiting a response
    in_flight: Mutex<HashSet<GroupId>>,
}

/// Marks a group as having a submission in flight until dropped.
struct SubmissionGuard<'a> {
    in_flight: &'a Mutex<HashSet<GroupId>>,
    group_id: GroupId,
}

impl<'a> SubmissionGuard<'a> {
    fn acquire(in_flight: &'a Mutex<HashSet<GroupId>>, group_id: GroupId) -> Result<Self, AppError> {
        let mut groups = in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if !groups.insert(group_id) {
            return Err(AppError::SubmissionInFlight(group_id));
        }
        Ok(Self {
            in_flight,
            group_id,
        })
    }
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        let mut groups = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        groups.remove(&self.group_id);
    }
}

impl SplitService {
    /// Create a new service on top of the given API client.
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Build the API client from configuration.
    pub fn connect(config: ClientConfig) -> Result<Self, AppError> {
        Ok(Self::new(ApiClient::new(config)?))
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    // ========================
    // Users
    // ========================

    /// Create a user after checking the name and email locally.
    pub async fn create_user(&self, name: &str, email: &str) -> Result<User, AppError> {
        let request = NewUser::new(name, email);
        request.validate()?;
        let user = self.api.create_user(&request).await?;
        info!(user_id = user.id, name = %user.name, "created user");
        Ok(user)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        Ok(self.api.list_users().await?)
    }

    pub async fn get_user(&self, id: UserId) -> Result<User, AppError> {
        self.api
            .get_user(id)
            .await
            .map_err(|e| not_found_as(e, AppError::UserNotFound(id)))
    }

    // ========================
    // Groups
    // ========================

    /// Create a group and return it with the refreshed group list.
    pub async fn create_group(
        &self,
        name: &str,
        member_ids: &[UserId],
    ) -> Result<GroupCreated, AppError> {
        let request = NewGroup::new(name, member_ids.iter().copied());
        request.validate()?;
        let group = self.api.create_group(&request).await?;
        info!(group_id = group.id, members = group.members.len(), "created group");

        let groups = self.api.list_groups().await?;
        Ok(GroupCreated { group, groups })
    }

    pub async fn list_groups(&self) -> Result<Vec<Group>, AppError> {
        Ok(self.api.list_groups().await?)
    }

    pub async fn get_group(&self, id: GroupId) -> Result<Group, AppError> {
        self.api
            .get_group(id)
            .await
            .map_err(|e| not_found_as(e, AppError::GroupNotFound(id)))
    }

    /// Load a group with its expenses, the user directory and its balances.
    /// Any failing request fails the whole load.
    pub async fn load_group_details(&self, group_id: GroupId) -> Result<GroupDetails, AppError> {
        let (group, expenses, users, balances) = tokio::try_join!(
            self.get_group(group_id),
            self.list_group_expenses(group_id),
            self.list_users(),
            self.group_balances(group_id),
        )?;
        debug!(group_id, expenses = expenses.len(), "loaded group details");

        Ok(GroupDetails {
            group,
            expenses,
            users,
            balances,
        })
    }

    // ========================
    // Expenses
    // ========================

    pub async fn list_group_expenses(&self, group_id: GroupId) -> Result<Vec<Expense>, AppError> {
        self.api
            .list_group_expenses(group_id)
            .await
            .map_err(|e| not_found_as(e, AppError::GroupNotFound(group_id)))
    }

    /// Record a prepared expense in a group.
    pub async fn add_expense(
        &self,
        group_id: GroupId,
        expense: NewExpense,
    ) -> Result<ExpenseRecorded, AppError> {
        self.record_expense(group_id, |_| Ok(expense)).await
    }

    /// Record an expense split evenly across every group member.
    pub async fn add_equal_expense(
        &self,
        group_id: GroupId,
        description: &str,
        amount: f64,
        paid_by: UserId,
    ) -> Result<ExpenseRecorded, AppError> {
        self.record_expense(group_id, |group| {
            let mut form = ExpenseForm::new(group.member_ids());
            form.set_amount(amount);
            Ok(form.into_new_expense(description, paid_by))
        })
        .await
    }

    /// Record an expense split by percentage. Members not listed in `shares` get 0%.
    pub async fn add_percentage_expense(
        &self,
        group_id: GroupId,
        description: &str,
        amount: f64,
        paid_by: UserId,
        shares: &[(UserId, f64)],
    ) -> Result<ExpenseRecorded, AppError> {
        self.record_expense(group_id, |group| {
            let mut form = ExpenseForm::new(group.member_ids());
            form.set_split_type(SplitType::Percentage);
            form.set_amount(amount);
            for &(user_id, percentage) in shares {
                if !group.is_member(user_id) {
                    return Err(ValidationError::SplitUserNotMember(user_id));
                }
                form.set_percentage(user_id, percentage);
            }
            Ok(form.into_new_expense(description, paid_by))
        })
        .await
    }

    /// Validate, submit, then re-fetch the group's expenses and balances.
    ///
    /// Only one submission per group may be in flight; a second one fails
    /// with [`AppError::SubmissionInFlight`] instead of being sent. If the
    /// reload fails after the server accepted the expense, the error is
    /// [`AppError::RefreshFailed`] and carries the created expense.
    async fn record_expense<F>(&self, group_id: GroupId, build: F) -> Result<ExpenseRecorded, AppError>
    where
        F: FnOnce(&Group) -> Result<NewExpense, ValidationError>,
    {
        let _guard = SubmissionGuard::acquire(&self.in_flight, group_id)?;

        let group = self.get_group(group_id).await?;
        let request = build(&group)?;
        request.validate(&group)?;

        let expense = self.api.create_expense(group_id, &request).await?;
        info!(
            group_id,
            expense_id = expense.id,
            amount = expense.amount,
            split_type = %expense.split_type,
            "recorded expense"
        );

        // Read back only after the write has been acknowledged
        let (expenses, balances) = match tokio::try_join!(
            self.list_group_expenses(group_id),
            self.group_balances(group_id),
        ) {
            Ok(refreshed) => refreshed,
            Err(source) => {
                warn!(group_id, expense_id = expense.id, error = %source, "refresh after create failed");
                return Err(AppError::RefreshFailed {
                    expense: Box::new(expense),
                    source: Box::new(source),
                });
            }
        };

        Ok(ExpenseRecorded {
            expense,
            expenses,
            balances,
        })
    }

    // ========================
    // Balances
    // ========================

    pub async fn group_balances(&self, group_id: GroupId) -> Result<GroupBalance, AppError> {
        self.api
            .get_group_balances(group_id)
            .await
            .map_err(|e| not_found_as(e, AppError::GroupNotFound(group_id)))
    }

    /// One user's balance in each of their groups.
    pub async fn user_balances(&self, user_id: UserId) -> Result<UserBalanceView, AppError> {
        let balance = self
            .api
            .get_user_balances(user_id)
            .await
            .map_err(|e| not_found_as(e, AppError::UserNotFound(user_id)))?;

        let groups = balance
            .group_balances
            .iter()
            .map(|gb| UserGroupLine::from_group_balance(gb, balance.user_id))
            .collect();

        Ok(UserBalanceView {
            user_id: balance.user_id,
            user_name: balance.user_name.clone(),
            net_total: balance.net_total(),
            groups,
        })
    }
}

/// Replace a 404 with a domain-specific error; keep everything else.
fn not_found_as(err: ApiError, replacement: AppError) -> AppError {
    if err.is_not_found() {
        replacement
    } else {
        AppError::Api(err)
    }
}

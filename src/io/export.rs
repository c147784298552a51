use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::SplitService;
use crate::domain::{Expense, Group, GroupBalance, GroupId, format_amount};

/// Point-in-time copy of one group for JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub group: Group,
    pub expenses: Vec<Expense>,
    pub balances: GroupBalance,
}

/// Exporter for writing group data to CSV or JSON
pub struct Exporter<'a> {
    service: &'a SplitService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a SplitService) -> Self {
        Self { service }
    }

    /// Export a group's expenses to CSV, one row per split. Returns the number of rows.
    pub async fn export_expenses_csv<W: Write>(&self, group_id: GroupId, writer: W) -> Result<usize> {
        let expenses = self.service.list_group_expenses(group_id).await?;
        write_expenses_csv(&expenses, writer)
    }

    /// Export a group's balances to CSV
    pub async fn export_group_balances_csv<W: Write>(
        &self,
        group_id: GroupId,
        writer: W,
    ) -> Result<usize> {
        let balances = self.service.group_balances(group_id).await?;
        write_balances_csv(&balances, writer)
    }

    /// Export a group with its expenses and balances as a JSON snapshot
    pub async fn export_group_json<W: Write>(
        &self,
        group_id: GroupId,
        mut writer: W,
    ) -> Result<GroupSnapshot> {
        let details = self.service.load_group_details(group_id).await?;

        let snapshot = GroupSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            group: details.group,
            expenses: details.expenses,
            balances: details.balances,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}

pub fn write_expenses_csv<W: Write>(expenses: &[Expense], writer: W) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record([
        "id",
        "description",
        "amount",
        "paid_by",
        "split_type",
        "user_id",
        "share",
        "percentage",
    ])?;

    let mut count = 0;
    for expense in expenses {
        for split in &expense.splits {
            csv_writer.write_record([
                expense.id.to_string(),
                expense.description.clone(),
                format_amount(expense.amount),
                expense.paid_by.to_string(),
                expense.split_type.as_str().to_string(),
                split.user_id.to_string(),
                format_amount(split.amount),
                split.percentage.map(|p| p.to_string()).unwrap_or_default(),
            ])?;
            count += 1;
        }
    }

    csv_writer.flush()?;
    Ok(count)
}

pub fn write_balances_csv<W: Write>(balances: &GroupBalance, writer: W) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(["user_id", "user_name", "amount", "direction"])?;

    for balance in &balances.balances {
        csv_writer.write_record([
            balance.user_id.to_string(),
            balance.user_name.clone(),
            format_amount(balance.amount),
            balance.statement().direction.as_str().to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(balances.balances.len())
}

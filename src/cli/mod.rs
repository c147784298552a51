use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::time::Duration;

use crate::api::{ClientConfig, DEFAULT_API_URL};
use crate::application::{
    AppError, ErrorCategory, ExpenseRecorded, GroupDetails, SplitService, UserBalanceView,
};
use crate::domain::{
    Expense, Group, GroupBalance, GroupId, SplitType, User, UserId, describe_balance,
    display_name, format_amount, parse_amount,
};

/// Splitclient - Shared expense splitting from the command line
#[derive(Parser)]
#[command(name = "splitclient")]
#[command(about = "Record shared expenses and check who owes whom")]
#[command(version)]
pub struct Cli {
    /// Base URL of the expense-splitting API
    #[arg(long, env = "SPLITCLIENT_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "SPLITCLIENT_TIMEOUT", default_value_t = 30, global = true)]
    pub timeout: u64,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// User management commands
    #[command(subcommand)]
    User(UserCommands),

    /// Group management commands
    #[command(subcommand)]
    Group(GroupCommands),

    /// Expense commands
    #[command(subcommand)]
    Expense(ExpenseCommands),

    /// Show balances for a group or a user
    #[command(subcommand)]
    Balance(BalanceCommands),

    /// Export a group's data to CSV or JSON
    Export {
        /// What to export: expenses, balances, group
        export_type: String,

        /// Group ID
        #[arg(short, long)]
        group: GroupId,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a new user
    Create {
        /// Display name
        name: String,

        /// Email address
        email: String,
    },

    /// List all users
    List {
        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show a single user
    Show {
        /// User ID
        id: UserId,
    },
}

#[derive(Subcommand)]
pub enum GroupCommands {
    /// Create a new group
    Create {
        /// Group name
        name: String,

        /// Member user ID (repeat for each member)
        #[arg(short, long = "member", required = true)]
        members: Vec<UserId>,
    },

    /// List all groups
    List {
        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show a group with its members, balances and expenses
    Show {
        /// Group ID
        id: GroupId,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },
}

#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Record an expense in a group
    Add {
        /// Group ID
        #[arg(short, long)]
        group: GroupId,

        /// What the expense was for
        description: String,

        /// Amount paid (e.g., "50.00" or "50")
        amount: String,

        /// User ID of the member who paid
        #[arg(long)]
        paid_by: UserId,

        /// Split strategy: equal, percentage
        #[arg(short, long, default_value = "equal")]
        split: String,

        /// Percentage share as USER=PERCENT (repeat per member, percentage splits only)
        #[arg(long = "share", value_parser = parse_share)]
        shares: Vec<(UserId, f64)>,
    },

    /// List a group's expenses
    List {
        /// Group ID
        #[arg(short, long)]
        group: GroupId,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },
}

#[derive(Subcommand)]
pub enum BalanceCommands {
    /// Balances of every member of a group
    Group {
        /// Group ID
        id: GroupId,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// One user's balance in each of their groups
    User {
        /// User ID
        id: UserId,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },
}

impl Cli {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.api_url.clone()).with_timeout(Duration::from_secs(self.timeout))
    }

    pub async fn run(self) -> Result<()> {
        let service = SplitService::connect(self.client_config())?;

        match self.command {
            Commands::User(cmd) => run_user_command(&service, cmd).await?,
            Commands::Group(cmd) => run_group_command(&service, cmd).await?,
            Commands::Expense(cmd) => run_expense_command(&service, cmd).await?,
            Commands::Balance(cmd) => run_balance_command(&service, cmd).await?,
            Commands::Export {
                export_type,
                group,
                output,
            } => run_export_command(&service, &export_type, group, output.as_deref()).await?,
        }

        Ok(())
    }
}

/// Render a failure for the terminal, naming its category.
pub fn describe_error(err: &anyhow::Error) -> String {
    match err.downcast_ref::<AppError>() {
        Some(app_err) => {
            let label = match app_err.category() {
                ErrorCategory::Validation => "Rejected",
                ErrorCategory::NotFound => "Not found",
                ErrorCategory::Conflict => "Busy",
                ErrorCategory::Request => "Request failed",
                ErrorCategory::Stale => "Recorded, but refresh failed",
            };
            format!("{}: {}", label, app_err)
        }
        None => format!("Error: {:#}", err),
    }
}

/// Parse a `USER=PERCENT` share argument.
pub fn parse_share(input: &str) -> Result<(UserId, f64), String> {
    let (user, percent) = input
        .split_once('=')
        .ok_or_else(|| format!("expected USER=PERCENT, got '{}'", input))?;
    let user_id: UserId = user
        .trim()
        .parse()
        .map_err(|_| format!("invalid user ID '{}'", user.trim()))?;
    let percentage: f64 = percent
        .trim()
        .trim_end_matches('%')
        .parse()
        .map_err(|_| format!("invalid percentage '{}'", percent.trim()))?;
    if !percentage.is_finite() {
        return Err(format!("invalid percentage '{}'", percent.trim()));
    }
    Ok((user_id, percentage))
}

async fn run_user_command(service: &SplitService, cmd: UserCommands) -> Result<()> {
    match cmd {
        UserCommands::Create { name, email } => {
            let user = service.create_user(&name, &email).await?;
            println!("Created user: {} <{}> ({})", user.name, user.email, user.id);
        }

        UserCommands::List { format } => {
            let users = service.list_users().await?;
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&users)?);
            } else {
                print_users(&users);
            }
        }

        UserCommands::Show { id } => {
            let user = service.get_user(id).await?;
            println!("User: {}", user.name);
            println!("  ID:     {}", user.id);
            println!("  Email:  {}", user.email);
        }
    }
    Ok(())
}

async fn run_group_command(service: &SplitService, cmd: GroupCommands) -> Result<()> {
    match cmd {
        GroupCommands::Create { name, members } => {
            let created = service.create_group(&name, &members).await?;
            println!(
                "Created group: {} ({}) with {} member(s)",
                created.group.name,
                created.group.id,
                created.group.members.len()
            );
            println!();
            print_groups(&created.groups);
        }

        GroupCommands::List { format } => {
            let groups = service.list_groups().await?;
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&groups)?);
            } else {
                print_groups(&groups);
            }
        }

        GroupCommands::Show { id, format } => {
            let details = service.load_group_details(id).await?;
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&details)?);
            } else {
                print_group_details(&details);
            }
        }
    }
    Ok(())
}

async fn run_expense_command(service: &SplitService, cmd: ExpenseCommands) -> Result<()> {
    match cmd {
        ExpenseCommands::Add {
            group,
            description,
            amount,
            paid_by,
            split,
            shares,
        } => {
            let amount =
                parse_amount(&amount).context("Invalid amount format. Use '50.00' or '50'")?;
            let split_type: SplitType = split.parse().map_err(|e| {
                anyhow::anyhow!(
                    "Invalid split '{}'. Valid splits: equal, percentage. Error: {}",
                    split,
                    e
                )
            })?;

            let recorded = match split_type {
                SplitType::Equal => {
                    if !shares.is_empty() {
                        anyhow::bail!("--share only applies to percentage splits");
                    }
                    service
                        .add_equal_expense(group, &description, amount, paid_by)
                        .await?
                }
                SplitType::Percentage => {
                    service
                        .add_percentage_expense(group, &description, amount, paid_by, &shares)
                        .await?
                }
            };

            print_recorded(&recorded);
        }

        ExpenseCommands::List { group, format } => {
            let details = service.load_group_details(group).await?;
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&details.expenses)?);
            } else if details.expenses.is_empty() {
                println!("No expenses recorded.");
            } else {
                for expense in &details.expenses {
                    print_expense(expense, &details.users);
                }
            }
        }
    }
    Ok(())
}

async fn run_balance_command(service: &SplitService, cmd: BalanceCommands) -> Result<()> {
    match cmd {
        BalanceCommands::Group { id, format } => {
            let balances = service.group_balances(id).await?;
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&balances)?);
            } else {
                println!("Balances for {}", balances.group_name);
                print_group_balance(&balances);
            }
        }

        BalanceCommands::User { id, format } => {
            let view = service.user_balances(id).await?;
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_user_balances(&view);
            }
        }
    }
    Ok(())
}

async fn run_export_command(
    service: &SplitService,
    export_type: &str,
    group_id: GroupId,
    output: Option<&str>,
) -> Result<()> {
    use crate::io::Exporter;
    use std::io::{Write, stdout};

    let exporter = Exporter::new(service);

    // Fetch into memory so a failed request leaves no output file behind
    let mut buffer = Vec::new();
    let summary = match export_type {
        "expenses" => {
            let count = exporter.export_expenses_csv(group_id, &mut buffer).await?;
            format!("Exported {} expense splits", count)
        }
        "balances" => {
            let count = exporter
                .export_group_balances_csv(group_id, &mut buffer)
                .await?;
            format!("Exported {} balances", count)
        }
        "group" => {
            let snapshot = exporter.export_group_json(group_id, &mut buffer).await?;
            format!(
                "Exported group '{}': {} expenses, {} balances",
                snapshot.group.name,
                snapshot.expenses.len(),
                snapshot.balances.balances.len()
            )
        }
        _ => {
            anyhow::bail!(
                "Invalid export type '{}'. Valid types: expenses, balances, group",
                export_type
            );
        }
    };

    match output {
        Some(path) => {
            std::fs::write(path, &buffer)
                .with_context(|| format!("Failed to write output file: {}", path))?;
            eprintln!("{}", summary);
        }
        None => stdout().write_all(&buffer)?,
    }

    Ok(())
}

fn print_users(users: &[User]) {
    if users.is_empty() {
        println!("No users found.");
        return;
    }
    println!("{:<6} {:<20} {:<30}", "ID", "NAME", "EMAIL");
    println!("{}", "-".repeat(58));
    for user in users {
        println!(
            "{:<6} {:<20} {:<30}",
            user.id,
            truncate(&user.name, 20),
            truncate(&user.email, 30)
        );
    }
}

fn print_groups(groups: &[Group]) {
    if groups.is_empty() {
        println!("No groups found.");
        return;
    }
    println!("{:<6} {:<24} {:<8}", "ID", "NAME", "MEMBERS");
    println!("{}", "-".repeat(40));
    for group in groups {
        println!(
            "{:<6} {:<24} {:<8}",
            group.id,
            truncate(&group.name, 24),
            group.members.len()
        );
    }
}

fn print_group_details(details: &GroupDetails) {
    let group = &details.group;
    println!("Group: {} ({})", group.name, group.id);
    println!("  Total expenses: ${}", format_amount(group.total_expenses));
    println!();
    println!("Members:");
    for member in &group.members {
        println!("  {} ({})", member.name, member.email);
    }

    println!();
    println!("Balances:");
    let lines = details.balance_lines();
    if lines.is_empty() {
        println!("  No balances yet.");
    }
    for line in lines {
        println!("  {:<20} {}", truncate(&line.user_name, 20), line.statement);
    }

    println!();
    println!("Expenses:");
    if details.expenses.is_empty() {
        println!("  No expenses recorded.");
    }
    for expense in &details.expenses {
        print_expense(expense, &details.users);
    }
}

fn print_expense(expense: &Expense, users: &[User]) {
    println!(
        "  {} - ${} (paid by {}, {} split)",
        expense.description,
        format_amount(expense.amount),
        display_name(users, expense.paid_by),
        expense.split_type
    );
    for split in &expense.splits {
        match split.percentage {
            Some(p) => println!(
                "    {:<20} ${} ({}%)",
                truncate(display_name(users, split.user_id), 20),
                format_amount(split.amount),
                p
            ),
            None => println!(
                "    {:<20} ${}",
                truncate(display_name(users, split.user_id), 20),
                format_amount(split.amount)
            ),
        }
    }
}

fn print_recorded(recorded: &ExpenseRecorded) {
    let expense = &recorded.expense;
    println!(
        "Recorded expense: {} ${} ({})",
        expense.description,
        format_amount(expense.amount),
        expense.id
    );
    println!();
    println!("Balances for {}", recorded.balances.group_name);
    print_group_balance(&recorded.balances);
}

fn print_group_balance(balances: &GroupBalance) {
    if balances.balances.is_empty() {
        println!("  No balances yet.");
        return;
    }
    for balance in &balances.balances {
        println!(
            "  {:<20} {}",
            truncate(&balance.user_name, 20),
            balance.statement()
        );
    }
}

fn print_user_balances(view: &UserBalanceView) {
    println!("Balances for {}", view.user_name);
    if view.groups.is_empty() {
        println!("  Not a member of any group.");
        return;
    }
    println!("{:<24} {:>20}", "GROUP", "BALANCE");
    println!("{}", "-".repeat(45));
    for line in &view.groups {
        let text = line
            .statement()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "no data".to_string());
        println!("{:<24} {:>20}", truncate(&line.group_name, 24), text);
    }
    println!("{}", "-".repeat(45));
    println!(
        "{:<24} {:>20}",
        "NET",
        describe_balance(view.net_total).to_string()
    );
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

//! These structs provide the CLI interface for the expenses CLI. The argument structs for the
//! individual operations double as the parameter types of the MCP tools.

use crate::model::{Amount, IncomeItem};
use clap::{Parser, Subcommand};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// expenses: A command-line tool for tracking personal expenses.
///
/// Expenses are recorded against categories (e.g. "Food" or "Transport") and stored in a local
/// SQLite database. A monthly report combines a month's expenses with your salary and any other
/// income to show what is left over.
///
/// There is also a mode in which an AI agent, like Claude or Claude Code, can use this program
/// through the mcp subcommand.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory, the configuration file and an empty database.
    ///
    /// This is the first command you should run. Decide what directory you want to store data in
    /// and pass this as --expenses-home. By default, it will be $HOME/expenses.
    Init,
    /// Run an MCP server over stdio so that an AI agent can manage your expenses.
    Mcp,
    /// List expenses or categories.
    List(ListArgs),
    /// Show a single expense or category.
    Get(GetArgs),
    /// Create an expense or a category.
    Create(CreateArgs),
    /// Replace the fields of an expense or change the fields of a category.
    Update(UpdateArgs),
    /// Permanently delete an expense or a category.
    Delete(DeleteArgs),
    /// Produce the financial report for one calendar month.
    Report(MonthlyReportArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the expenses database and configuration are held. Defaults to
    /// ~/expenses
    #[arg(long, env = "EXPENSES_HOME", default_value_t = default_expenses_home())]
    expenses_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, expenses_home: PathBuf) -> Self {
        Self {
            log_level,
            expenses_home: expenses_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn expenses_home(&self) -> &DisplayPath {
        &self.expenses_home
    }
}

/// (Not shown): Args for the `expenses list` command.
#[derive(Debug, Parser, Clone)]
pub struct ListArgs {
    #[command(subcommand)]
    entity: ListSubcommand,
}

impl ListArgs {
    pub fn entity(&self) -> &ListSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ListSubcommand {
    /// List expenses, newest first, optionally filtered by category and/or month.
    Expenses(ListExpensesArgs),
    /// List all categories in alphabetical order.
    Categories,
}

/// (Not shown): Args for the `expenses get` command.
#[derive(Debug, Parser, Clone)]
pub struct GetArgs {
    #[command(subcommand)]
    entity: GetSubcommand,
}

impl GetArgs {
    pub fn entity(&self) -> &GetSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum GetSubcommand {
    /// Show one expense.
    Expense(IdArgs),
    /// Show one category.
    Category(IdArgs),
}

/// (Not shown): Args for the `expenses create` command.
#[derive(Debug, Parser, Clone)]
pub struct CreateArgs {
    #[command(subcommand)]
    entity: CreateSubcommand,
}

impl CreateArgs {
    pub fn entity(&self) -> &CreateSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum CreateSubcommand {
    /// Record a new expense.
    Expense(CreateExpenseArgs),
    /// Create a new category.
    Category(CreateCategoryArgs),
}

/// (Not shown): Args for the `expenses update` command.
#[derive(Debug, Parser, Clone)]
pub struct UpdateArgs {
    #[command(subcommand)]
    entity: UpdateSubcommand,
}

impl UpdateArgs {
    pub fn entity(&self) -> &UpdateSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum UpdateSubcommand {
    /// Replace all the fields of an expense.
    Expense(UpdateExpenseArgs),
    /// Change some or all of the fields of a category.
    Category(UpdateCategoryArgs),
}

/// (Not shown): Args for the `expenses delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    #[command(subcommand)]
    entity: DeleteSubcommand,
}

impl DeleteArgs {
    pub fn entity(&self) -> &DeleteSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum DeleteSubcommand {
    /// Delete one expense.
    Expense(IdArgs),
    /// Delete one category. Fails while any expense still belongs to it.
    Category(IdArgs),
}

/// Identifies a single expense or category.
#[derive(Debug, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct IdArgs {
    /// The ID of the record.
    pub id: String,
}

impl IdArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Filters for listing expenses. With no filters, every expense is returned. `month` and `year`
/// must be given together. When both a category and a month are given, only expenses matching
/// both are returned.
#[derive(Debug, Default, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct ListExpensesArgs {
    /// Only return expenses in the category with this ID.
    #[arg(long)]
    pub category_id: Option<String>,

    /// Only return expenses in this month, 1 (January) through 12 (December). Requires `year`.
    #[arg(long, requires = "year")]
    pub month: Option<u32>,

    /// The year of the `month` filter, e.g. 2025. Requires `month`.
    #[arg(long, requires = "month")]
    pub year: Option<i32>,
}

/// The fields of a new expense.
#[derive(Debug, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct CreateExpenseArgs {
    /// What the money was spent on. Must not be blank and must be at most 500 characters.
    #[arg(long)]
    pub description: String,

    /// How much was spent. Must be greater than zero. Given as a decimal string like "12.50"
    /// (a number is also accepted).
    #[arg(long)]
    #[schemars(with = "String")]
    pub amount: Amount,

    /// When the money was spent, either as a date like "2025-03-15" or as an RFC 3339 date-time
    /// like "2025-03-15T18:30:00Z".
    #[arg(long)]
    pub date: String,

    /// The ID of the category the expense belongs to. The category must exist.
    #[arg(long)]
    pub category_id: String,
}

/// The new fields of an existing expense. All fields are replaced, so any field that should stay
/// the same must be supplied with its current value.
#[derive(Debug, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct UpdateExpenseArgs {
    /// The ID of the expense to update.
    pub id: String,

    /// What the money was spent on. Must not be blank and must be at most 500 characters.
    #[arg(long)]
    pub description: String,

    /// How much was spent. Must be greater than zero. Given as a decimal string like "12.50"
    /// (a number is also accepted).
    #[arg(long)]
    #[schemars(with = "String")]
    pub amount: Amount,

    /// When the money was spent, either as a date like "2025-03-15" or as an RFC 3339 date-time.
    #[arg(long)]
    pub date: String,

    /// The ID of the category the expense belongs to. The category must exist.
    #[arg(long)]
    pub category_id: String,
}

/// The fields of a new category.
#[derive(Debug, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct CreateCategoryArgs {
    /// The name of the category, e.g. "Food". Must not be blank and must be unique.
    #[arg(long)]
    pub name: String,

    /// An optional longer description of the category.
    #[arg(long)]
    pub description: Option<String>,

    /// An optional display color such as "#ff8800". Defaults to "#000000".
    #[arg(long)]
    pub color: Option<String>,
}

/// Changes to an existing category. Only the fields that are given are changed.
#[derive(Debug, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct UpdateCategoryArgs {
    /// The ID of the category to update.
    pub id: String,

    /// A new name for the category. Must not be blank and must be unique.
    #[arg(long)]
    pub name: Option<String>,

    /// A new description. An empty string removes the description.
    #[arg(long)]
    pub description: Option<String>,

    /// A new display color. An empty string resets the color to "#000000".
    #[arg(long)]
    pub color: Option<String>,
}

/// The inputs of a monthly report.
#[derive(Debug, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct MonthlyReportArgs {
    /// The month of the report, 1 (January) through 12 (December).
    #[arg(long)]
    pub month: u32,

    /// The year of the report, e.g. 2025.
    #[arg(long)]
    pub year: i32,

    /// The salary received in the month, as a decimal string like "3000.00".
    #[arg(long)]
    #[schemars(with = "String")]
    pub salary: Amount,

    /// Other income received in the month, e.g. a bonus. On the command line, pass each item as
    /// `--income DESCRIPTION=AMOUNT`, repeating the flag for more than one item.
    #[arg(long = "income")]
    #[serde(default)]
    pub additional_income: Vec<IncomeItem>,
}

fn default_expenses_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("expenses"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --expenses-home or EXPENSES_HOME instead of relying on the \
                default expenses home directory. If you continue using the program right now, \
                you may have problems!",
            );
            PathBuf::from("expenses")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

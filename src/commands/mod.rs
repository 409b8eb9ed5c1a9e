//! Command handlers shared by the CLI and the MCP server.
//!
//! Each operation is one async function that takes the `Config` and a typed argument struct and
//! returns an `Out`. Errors leaving this module are tagged with an `ErrorType`.

mod categories;
mod expenses;
mod init;
mod mcp;
mod report;

use serde::Serialize;
use std::fmt::Debug;
use tracing::{error, info};

pub use categories::{
    create_category, delete_category, get_category, list_categories, update_category,
};
pub use expenses::{create_expense, delete_expense, get_expense, list_expenses, update_expense};
pub use init::init;
pub use mcp::mcp;
pub use report::monthly_report;

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data to both the command line and MCP server interfaces.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as pretty JSON to
    /// stdout. Logs go to stderr, so the JSON can be piped into other tools.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            match serde_json::to_string_pretty(structure) {
                Ok(json) => println!("{json}"),
                Err(e) => error!("Unable to serialize command output: {e}"),
            }
        }
    }
}

//! The MCP tools. Queries read expenses, categories and reports; mutations create, update and
//! delete expenses and categories. Each tool delegates to the matching function in `commands`.

use crate::args::{
    CreateCategoryArgs, CreateExpenseArgs, IdArgs, ListExpensesArgs, MonthlyReportArgs,
    UpdateCategoryArgs, UpdateExpenseArgs,
};
use crate::commands;
use crate::mcp::mcp_utils::tool_result;
use crate::mcp::ExpenseServer;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::ErrorData as McpError;
use rmcp::{tool, tool_router};
use tracing::info;

#[tool_router(vis = "pub(super)")]
impl ExpenseServer {
    /// Initialize the expenses MCP service for this session and return usage instructions. You
    /// **MUST** call this **ONCE** before using other tools so that you have the full usage
    /// instructions. You **MAY** call it more than once if you have forgotten the usage
    /// instructions.
    #[tool]
    async fn initialize_service(&self) -> Result<CallToolResult, McpError> {
        let mut initialized = self.initialized.lock().await;
        *initialized = true;
        Ok(CallToolResult::success(vec![rmcp::model::Content::text(
            include_str!("docs/INSTRUCTIONS.md"),
        )]))
    }

    // ---------------------------------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------------------------------

    /// List expenses, newest first.
    ///
    /// With no parameters every expense is returned. `category_id` limits the list to one
    /// category. `month` and `year` (which must be given together) limit it to one calendar month
    /// in UTC. Both filters can be combined.
    ///
    /// Returns a JSON array of expenses. Amounts are decimal strings and dates are RFC 3339 UTC
    /// date-times.
    #[tool]
    async fn list_expenses(
        &self,
        Parameters(args): Parameters<ListExpensesArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!("MCP: list_expenses called with {args:?}");
        tool_result(commands::list_expenses(self.config(), args).await)
    }

    /// Get a single expense by its ID.
    #[tool]
    async fn get_expense(
        &self,
        Parameters(args): Parameters<IdArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::get_expense(self.config(), args).await)
    }

    /// List all categories in alphabetical order by name. Use this to find the `category_id` to
    /// use when creating an expense.
    #[tool]
    async fn list_categories(&self) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::list_categories(self.config()).await)
    }

    /// Get a single category by its ID.
    #[tool]
    async fn get_category(
        &self,
        Parameters(args): Parameters<IdArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::get_category(self.config(), args).await)
    }

    /// Produce the financial report for one calendar month.
    ///
    /// The report contains the month's expenses, their total, the salary, any additional income
    /// items with their total, and the net income (`salary + additional income - expenses`).
    ///
    /// # Example
    ///
    /// ```json
    /// {
    ///   "month": 3,
    ///   "year": 2025,
    ///   "salary": "3000.00",
    ///   "additional_income": [{ "description": "bonus", "amount": "250.00" }]
    /// }
    /// ```
    #[tool]
    async fn monthly_report(
        &self,
        Parameters(args): Parameters<MonthlyReportArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!(
            "MCP: monthly_report called for {}-{:02}",
            args.year, args.month
        );
        tool_result(commands::monthly_report(self.config(), args).await)
    }

    // ---------------------------------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------------------------------

    /// Record a new expense. The category must already exist. Returns the stored expense,
    /// including its generated ID.
    ///
    /// # Example
    ///
    /// ```json
    /// {
    ///   "description": "Weekly groceries",
    ///   "amount": "84.20",
    ///   "date": "2025-03-15",
    ///   "category_id": "6f1c0d9e-2b7a-4d55-9a43-1e0c5b8f2a77"
    /// }
    /// ```
    #[tool]
    async fn create_expense(
        &self,
        Parameters(args): Parameters<CreateExpenseArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::create_expense(self.config(), args).await)
    }

    /// Replace the description, amount, date and category of an existing expense. All four must
    /// be supplied; to change one field, resupply the current values of the others.
    #[tool]
    async fn update_expense(
        &self,
        Parameters(args): Parameters<UpdateExpenseArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::update_expense(self.config(), args).await)
    }

    /// Permanently delete an expense by its ID.
    #[tool]
    async fn delete_expense(
        &self,
        Parameters(args): Parameters<IdArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::delete_expense(self.config(), args).await)
    }

    /// Create a new category. The name must be unique. The color defaults to "#000000".
    #[tool]
    async fn create_category(
        &self,
        Parameters(args): Parameters<CreateCategoryArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::create_category(self.config(), args).await)
    }

    /// Change some or all of the fields of a category. Fields that are left out keep their
    /// current values.
    #[tool]
    async fn update_category(
        &self,
        Parameters(args): Parameters<UpdateCategoryArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::update_category(self.config(), args).await)
    }

    /// Permanently delete a category by its ID. This fails with a `[referential_integrity]`
    /// error while any expense still belongs to the category; move or delete those expenses
    /// first.
    #[tool]
    async fn delete_category(
        &self,
        Parameters(args): Parameters<IdArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::delete_category(self.config(), args).await)
    }
}

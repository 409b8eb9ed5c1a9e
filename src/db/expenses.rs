//! Expense queries.

use super::{format_timestamp, parse_timestamp, Db};
use crate::error::{bail_typed, ErrorType};
use crate::model::report::month_range;
use crate::model::{Amount, Expense, MAX_YEAR};
use crate::Result;
use anyhow::Context;
use chrono::Datelike;
use sqlx::SqliteConnection;
use std::str::FromStr;
use tracing::trace;

const SELECT_EXPENSES: &str = "SELECT id, description, amount, date, category_id, created_at, \
    updated_at FROM expenses";

/// Newest expense first; expenses on the same date are ordered by when they were recorded.
const NEWEST_FIRST: &str = "ORDER BY date DESC, created_at DESC";

#[derive(Debug, sqlx::FromRow)]
struct ExpenseRow {
    id: String,
    description: String,
    amount: String,
    date: String,
    category_id: String,
    created_at: String,
    updated_at: Option<String>,
}

impl TryFrom<ExpenseRow> for Expense {
    type Error = crate::Error;

    fn try_from(row: ExpenseRow) -> Result<Self> {
        let amount = Amount::from_str(&row.amount)
            .with_context(|| format!("Invalid amount stored for expense {}", row.id))?;
        let updated_at = row.updated_at.as_deref().map(parse_timestamp).transpose()?;
        Ok(Expense::reconstruct(
            row.id,
            row.description,
            amount,
            parse_timestamp(&row.date)?,
            row.category_id,
            parse_timestamp(&row.created_at)?,
            updated_at,
        ))
    }
}

fn into_expenses(rows: Vec<ExpenseRow>) -> Result<Vec<Expense>> {
    rows.into_iter().map(Expense::try_from).collect()
}

impl Db {
    /// Returns the expense with the given ID, or `None` if there is no such expense.
    pub(crate) async fn find_expense(&self, id: &str) -> Result<Option<Expense>> {
        trace!("find_expense {id}");
        let row: Option<ExpenseRow> = sqlx::query_as(&format!("{SELECT_EXPENSES} WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .context("Failed to query expense")?;
        row.map(Expense::try_from).transpose()
    }

    /// Returns every expense, newest first.
    pub(crate) async fn find_all_expenses(&self) -> Result<Vec<Expense>> {
        let rows: Vec<ExpenseRow> = sqlx::query_as(&format!("{SELECT_EXPENSES} {NEWEST_FIRST}"))
            .fetch_all(self.pool())
            .await
            .context("Failed to query expenses")?;
        into_expenses(rows)
    }

    /// Returns the expenses in the given category, newest first.
    pub(crate) async fn find_expenses_by_category(
        &self,
        category_id: &str,
    ) -> Result<Vec<Expense>> {
        let rows: Vec<ExpenseRow> = sqlx::query_as(&format!(
            "{SELECT_EXPENSES} WHERE category_id = ? {NEWEST_FIRST}"
        ))
        .bind(category_id)
        .fetch_all(self.pool())
        .await
        .context("Failed to query expenses by category")?;
        into_expenses(rows)
    }

    /// Returns the expenses dated within the given calendar month (UTC), newest first.
    ///
    /// # Errors
    /// - Returns a `Validation` error if `month` is not in `1..=12` or the year is out of range.
    pub(crate) async fn find_expenses_by_month(
        &self,
        month: u32,
        year: i32,
    ) -> Result<Vec<Expense>> {
        let (start, end) = month_range(month, year)?;
        // Past MAX_YEAR the end bound would not format as a four-digit year, and no stored date
        // can be that late anyway.
        let end = (end.year() <= MAX_YEAR).then(|| format_timestamp(&end));
        let rows: Vec<ExpenseRow> = sqlx::query_as(&format!(
            "{SELECT_EXPENSES} WHERE date >= ? AND (? IS NULL OR date < ?) {NEWEST_FIRST}"
        ))
        .bind(format_timestamp(&start))
        .bind(end.as_deref())
        .bind(end.as_deref())
        .fetch_all(self.pool())
        .await
        .context("Failed to query expenses by month")?;
        into_expenses(rows)
    }

    /// Inserts a new expense.
    ///
    /// # Errors
    /// - Returns a `NotFound` error if the expense's category does not exist.
    pub(crate) async fn create_expense(&self, expense: &Expense) -> Result<Expense> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .context("Failed to begin transaction")?;

        require_category(&mut tx, expense.category_id()).await?;

        sqlx::query(
            "INSERT INTO expenses \
            (id, description, amount, date, category_id, created_at, updated_at) \
            VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(expense.id())
        .bind(expense.description())
        .bind(expense.amount().to_string())
        .bind(format_timestamp(&expense.date()))
        .bind(expense.category_id())
        .bind(format_timestamp(&expense.created_at()))
        .bind(expense.updated_at().as_ref().map(format_timestamp))
        .execute(&mut *tx)
        .await
        .context("Failed to insert expense")?;

        tx.commit().await.context("Failed to commit transaction")?;
        Ok(expense.clone())
    }

    /// Writes the mutable fields of an existing expense.
    ///
    /// # Errors
    /// - Returns a `NotFound` error if the expense or its category does not exist.
    pub(crate) async fn update_expense(&self, expense: &Expense) -> Result<Expense> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .context("Failed to begin transaction")?;

        require_category(&mut tx, expense.category_id()).await?;

        let result = sqlx::query(
            "UPDATE expenses \
            SET description = ?, amount = ?, date = ?, category_id = ?, updated_at = ? \
            WHERE id = ?",
        )
        .bind(expense.description())
        .bind(expense.amount().to_string())
        .bind(format_timestamp(&expense.date()))
        .bind(expense.category_id())
        .bind(expense.updated_at().as_ref().map(format_timestamp))
        .bind(expense.id())
        .execute(&mut *tx)
        .await
        .context("Failed to update expense")?;

        if result.rows_affected() == 0 {
            bail_typed!(ErrorType::NotFound, "Expense not found: {}", expense.id());
        }

        tx.commit().await.context("Failed to commit transaction")?;
        Ok(expense.clone())
    }

    /// Permanently removes an expense.
    ///
    /// # Errors
    /// - Returns a `NotFound` error if there is no expense with the given ID.
    pub(crate) async fn delete_expense(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await
            .context("Failed to delete expense")?;
        if result.rows_affected() == 0 {
            bail_typed!(ErrorType::NotFound, "Expense not found: {id}");
        }
        Ok(())
    }
}

/// Fails with `NotFound` unless a category with `category_id` exists.
async fn require_category(conn: &mut SqliteConnection, category_id: &str) -> Result<()> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM categories WHERE id = ?")
        .bind(category_id)
        .fetch_one(&mut *conn)
        .await
        .context("Failed to look up category")?;
    if count == 0 {
        bail_typed!(ErrorType::NotFound, "Category not found: {category_id}");
    }
    Ok(())
}

//! Expense command handlers.

use crate::args::{CreateExpenseArgs, IdArgs, ListExpensesArgs, UpdateExpenseArgs};
use crate::commands::Out;
use crate::error::{bail_typed, ErrorType, IntoResult};
use crate::model::{parse_date, Expense, ExpenseRecord};
use crate::{Config, Result};
use tracing::{debug, info};

/// Lists expenses, newest first.
///
/// - With no filters, every expense is returned.
/// - With `category_id`, only expenses in that category are returned.
/// - With `month` and `year`, only expenses dated within that calendar month (UTC) are returned.
/// - With both, only expenses matching both filters are returned.
///
/// # Errors
/// - Returns a `Validation` error if only one of `month` and `year` is given, or if `month` is
///   not in `1..=12`.
/// - Returns a `Database` error if the query fails.
pub async fn list_expenses(
    config: Config,
    args: ListExpensesArgs,
) -> Result<Out<Vec<ExpenseRecord>>> {
    let db = config.db();
    let expenses = match (args.month, args.year) {
        (Some(month), Some(year)) => {
            let in_month = db
                .find_expenses_by_month(month, year)
                .await
                .pub_result(ErrorType::Database)?;
            match args.category_id.as_deref() {
                Some(category_id) => in_month
                    .into_iter()
                    .filter(|e| e.category_id() == category_id)
                    .collect(),
                None => in_month,
            }
        }
        (None, None) => match args.category_id.as_deref() {
            Some(category_id) => db
                .find_expenses_by_category(category_id)
                .await
                .pub_result(ErrorType::Database)?,
            None => db
                .find_all_expenses()
                .await
                .pub_result(ErrorType::Database)?,
        },
        _ => bail_typed!(
            ErrorType::Validation,
            "The month and year filters must be given together"
        ),
    };

    debug!("Listing {} expenses", expenses.len());
    let records: Vec<ExpenseRecord> = expenses.iter().map(Expense::to_record).collect();
    let message = match records.len() {
        1 => "Found 1 expense".to_string(),
        n => format!("Found {n} expenses"),
    };
    Ok(Out::new(message, records))
}

/// Returns a single expense.
///
/// # Errors
/// - Returns a `NotFound` error if there is no expense with the given ID.
pub async fn get_expense(config: Config, args: IdArgs) -> Result<Out<ExpenseRecord>> {
    let expense = find_existing(&config, &args.id).await?;
    Ok(Out::new(
        format!("Expense {}: {}", expense.id(), expense.description()),
        expense.to_record(),
    ))
}

/// Records a new expense. A unique ID is generated and returned as part of the stored record.
///
/// # Errors
/// - Returns a `Validation` error if the description is blank or too long, the amount is not
///   greater than zero, or the date cannot be parsed.
/// - Returns a `NotFound` error if the category does not exist.
/// - Returns a `Database` error if the insert fails.
pub async fn create_expense(config: Config, args: CreateExpenseArgs) -> Result<Out<ExpenseRecord>> {
    let date = parse_date(&args.date)?;
    let expense = Expense::create(args.description, args.amount, date, args.category_id)?;
    let expense = config
        .db()
        .create_expense(&expense)
        .await
        .pub_result(ErrorType::Database)?;

    info!("Created expense {}", expense.id());
    Ok(Out::new(
        format!("Created expense with ID: {}", expense.id()),
        expense.to_record(),
    ))
}

/// Replaces the description, amount, date and category of an existing expense.
///
/// The new values are validated in the same way as when an expense is created. On failure the
/// stored expense is left unchanged.
///
/// # Errors
/// - Returns a `NotFound` error if the expense or the new category does not exist.
/// - Returns a `Validation` error if any of the new values is invalid.
/// - Returns a `Database` error if the update fails.
pub async fn update_expense(config: Config, args: UpdateExpenseArgs) -> Result<Out<ExpenseRecord>> {
    let mut expense = find_existing(&config, &args.id).await?;
    let date = parse_date(&args.date)?;
    expense.update(args.description, args.amount, date, args.category_id)?;
    let expense = config
        .db()
        .update_expense(&expense)
        .await
        .pub_result(ErrorType::Database)?;

    info!("Updated expense {}", expense.id());
    Ok(Out::new(
        format!("Updated expense with ID: {}", expense.id()),
        expense.to_record(),
    ))
}

/// Permanently deletes an expense and returns its ID.
///
/// # Errors
/// - Returns a `NotFound` error if there is no expense with the given ID.
/// - Returns a `Database` error if the delete fails.
pub async fn delete_expense(config: Config, args: IdArgs) -> Result<Out<String>> {
    config
        .db()
        .delete_expense(&args.id)
        .await
        .pub_result(ErrorType::Database)?;

    info!("Deleted expense {}", args.id);
    Ok(Out::new(format!("Deleted expense with ID: {}", args.id), args.id))
}

async fn find_existing(config: &Config, id: &str) -> Result<Expense> {
    match config
        .db()
        .find_expense(id)
        .await
        .pub_result(ErrorType::Database)?
    {
        Some(expense) => Ok(expense),
        None => bail_typed!(ErrorType::NotFound, "Expense not found: {id}"),
    }
}

//! The monthly financial report.
//!
//! `monthly_report` is a pure function: the caller fetches the month's expenses and hands them
//! in together with the income figures. Nothing here touches the database.

use crate::error::{bail_typed, ErrorType};
use crate::model::{check_year, Amount, ExpenseRecord};
use crate::Result;
use anyhow::Context;
use chrono::{DateTime, Month, NaiveDate, NaiveTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A named line of income on top of the salary, e.g. a bonus.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct IncomeItem {
    /// What the income is, e.g. "bonus".
    pub description: String,
    /// The amount received, as a decimal string such as "300.00" or a number.
    #[schemars(with = "String")]
    pub amount: Amount,
}

impl IncomeItem {
    pub fn new(description: impl Into<String>, amount: Amount) -> Self {
        Self {
            description: description.into(),
            amount,
        }
    }
}

/// Parses the `DESCRIPTION=AMOUNT` form used on the command line, e.g. `bonus=300`.
impl FromStr for IncomeItem {
    type Err = crate::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (description, amount) = s
            .rsplit_once('=')
            .with_context(|| format!("Expected DESCRIPTION=AMOUNT, got '{s}'"))?;
        let amount = Amount::from_str(amount)
            .with_context(|| format!("Invalid amount in income item '{s}'"))?;
        Ok(IncomeItem::new(description.trim(), amount))
    }
}

/// The summary of one month's finances.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MonthlyReport {
    pub month_name: String,
    pub year: i32,
    pub salary: Amount,
    /// The income items exactly as they were supplied.
    pub additional_income: Vec<IncomeItem>,
    pub total_additional_income: Amount,
    pub total_expenses: Amount,
    /// `salary + total_additional_income - total_expenses`
    pub net_income: Amount,
    /// The expenses exactly as they were supplied.
    pub expenses: Vec<ExpenseRecord>,
}

/// Combines a month's expenses with the salary and additional income into a `MonthlyReport`.
///
/// `expenses` must already be limited to the requested month; they are summed as given.
///
/// # Errors
/// - Returns a `Validation` error if `month` is not in `1..=12`.
/// - Returns a `Validation` error if the totals overflow.
pub fn monthly_report(
    month: u32,
    year: i32,
    salary: Amount,
    additional_income: Vec<IncomeItem>,
    expenses: Vec<ExpenseRecord>,
) -> Result<MonthlyReport> {
    let month_name = month_name(month)?;

    let total_expenses = Amount::checked_sum(expenses.iter().map(|e| e.amount));
    let total_additional_income = Amount::checked_sum(additional_income.iter().map(|i| i.amount));
    let (Some(total_expenses), Some(total_additional_income)) =
        (total_expenses, total_additional_income)
    else {
        bail_typed!(ErrorType::Validation, "The report totals are too large");
    };
    let Some(net_income) = salary
        .checked_add(total_additional_income)
        .and_then(|income| income.checked_sub(total_expenses))
    else {
        bail_typed!(ErrorType::Validation, "The report net income is too large");
    };

    Ok(MonthlyReport {
        month_name: month_name.to_string(),
        year,
        salary,
        additional_income,
        total_additional_income,
        total_expenses,
        net_income,
        expenses,
    })
}

/// Returns the English name of `month`, where 1 is "January" and 12 is "December".
pub fn month_name(month: u32) -> Result<&'static str> {
    Ok(to_month(month)?.name())
}

/// Returns the half-open UTC interval `[start, end)` that covers the calendar month.
///
/// The end of December `MAX_YEAR` is the first instant of the following year.
///
/// # Errors
/// - Returns a `Validation` error if `month` is not in `1..=12` or `year` is outside
///   `MIN_YEAR..=MAX_YEAR`.
pub fn month_range(month: u32, year: i32) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let _ = to_month(month)?;
    check_year(year)?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let start = NaiveDate::from_ymd_opt(year, month, 1);
    let end = NaiveDate::from_ymd_opt(next_year, next_month, 1);
    let (Some(start), Some(end)) = (start, end) else {
        bail_typed!(ErrorType::Validation, "Year {year} is out of range");
    };
    Ok((
        start.and_time(NaiveTime::MIN).and_utc(),
        end.and_time(NaiveTime::MIN).and_utc(),
    ))
}

fn to_month(month: u32) -> Result<Month> {
    match u8::try_from(month).ok().and_then(|m| Month::try_from(m).ok()) {
        Some(m) => Ok(m),
        None => bail_typed!(
            ErrorType::Validation,
            "Month must be between 1 and 12, got {month}"
        ),
    }
}

//! Types that represent the core data model: `Expense`, `Category` and the monthly report.
mod amount;
mod category;
mod expense;
pub mod report;

pub use amount::{Amount, AmountError};
pub use category::{Category, CategoryRecord, DEFAULT_COLOR};
pub use expense::{Expense, ExpenseRecord, MAX_DESCRIPTION_LEN};
pub use report::{IncomeItem, MonthlyReport};

use crate::error::{bail_typed, ErrorType};
use crate::Result;
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

/// Generates a fresh, opaque, unique identifier for a new entity.
pub(crate) fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// The earliest year an expense date may fall in.
pub const MIN_YEAR: i32 = 0;

/// The latest year an expense date may fall in. Stored dates are four-digit-year RFC 3339 text
/// and are compared as strings, so nothing past this year can be stored.
pub const MAX_YEAR: i32 = 9999;

/// Returns a `Validation` error unless `year` is in `MIN_YEAR..=MAX_YEAR`.
pub(crate) fn check_year(year: i32) -> Result<()> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        bail_typed!(
            ErrorType::Validation,
            "Year {year} is out of range, expected {MIN_YEAR} through {MAX_YEAR}"
        );
    }
    Ok(())
}

/// Parses a date as it arrives from a caller: either a calendar date like `2025-03-15`, which is
/// taken as midnight UTC, or an RFC 3339 date-time like `2025-03-15T12:30:00-05:00`.
///
/// # Errors
/// - Returns a `Validation` error if `s` is in neither form or, once converted to UTC, falls
///   outside the years `MIN_YEAR` through `MAX_YEAR`.
pub fn parse_date(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    let date = if let Ok(date_time) = DateTime::parse_from_rfc3339(s) {
        date_time.with_timezone(&Utc)
    } else if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        date.and_time(NaiveTime::MIN).and_utc()
    } else {
        bail_typed!(
            ErrorType::Validation,
            "Invalid date '{s}', expected YYYY-MM-DD or an RFC 3339 date-time"
        )
    };
    check_year(date.year())?;
    Ok(date)
}

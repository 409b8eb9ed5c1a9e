use crate::error::{bail_typed, ErrorType};
use crate::model::{check_year, generate_id, Amount};
use crate::Result;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// The longest description, in characters, that an expense may have.
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// A single recorded expense.
///
/// New expenses are built with `Expense::create`, which validates the inputs. Expenses read back
/// from the database are rebuilt with `Expense::reconstruct`, which trusts them because they were
/// validated when they were written.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Expense {
    id: String,
    description: String,
    amount: Amount,
    date: DateTime<Utc>,
    category_id: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl Expense {
    /// Creates a new expense with a freshly generated ID and `created_at` set to now.
    ///
    /// # Errors
    /// - Returns a `Validation` error if `description` is blank or longer than
    ///   `MAX_DESCRIPTION_LEN` characters.
    /// - Returns a `Validation` error if `amount` is not greater than zero.
    /// - Returns a `Validation` error if `date` falls outside the years `MIN_YEAR` through
    ///   `MAX_YEAR`.
    pub fn create<S1, S2>(
        description: S1,
        amount: Amount,
        date: DateTime<Utc>,
        category_id: S2,
    ) -> Result<Self>
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        let description = description.into();
        validate(&description, amount, date)?;
        Ok(Self {
            id: generate_id(),
            description,
            amount,
            date,
            category_id: category_id.into(),
            created_at: Utc::now(),
            updated_at: None,
        })
    }

    /// Rebuilds an expense from previously persisted values without validating them.
    pub fn reconstruct(
        id: String,
        description: String,
        amount: Amount,
        date: DateTime<Utc>,
        category_id: String,
        created_at: DateTime<Utc>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            description,
            amount,
            date,
            category_id,
            created_at,
            updated_at,
        }
    }

    /// Replaces the description, amount, date and category together and refreshes `updated_at`.
    /// There is no partial update: callers changing one field must resupply the others.
    ///
    /// The inputs are validated exactly as in `create`. If validation fails, the expense is left
    /// unchanged.
    pub fn update<S1, S2>(
        &mut self,
        description: S1,
        amount: Amount,
        date: DateTime<Utc>,
        category_id: S2,
    ) -> Result<()>
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        let description = description.into();
        validate(&description, amount, date)?;
        self.description = description;
        self.amount = amount;
        self.date = date;
        self.category_id = category_id.into();

        // Never let updated_at move backwards if the clock does.
        let previous = self.updated_at.unwrap_or(self.created_at);
        self.updated_at = Some(Utc::now().max(previous));
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn category_id(&self) -> &str {
        &self.category_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Returns the plain, serializable form of this expense.
    pub fn to_record(&self) -> ExpenseRecord {
        ExpenseRecord {
            id: self.id.clone(),
            description: self.description.clone(),
            amount: self.amount,
            date: self.date,
            category_id: self.category_id.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

fn validate(description: &str, amount: Amount, date: DateTime<Utc>) -> Result<()> {
    if description.trim().is_empty() {
        bail_typed!(ErrorType::Validation, "Expense description cannot be empty");
    }
    let len = description.chars().count();
    if len > MAX_DESCRIPTION_LEN {
        bail_typed!(
            ErrorType::Validation,
            "Expense description is {len} characters long, the maximum is {MAX_DESCRIPTION_LEN}"
        );
    }
    if !amount.is_positive() {
        bail_typed!(
            ErrorType::Validation,
            "Expense amount must be greater than zero, got {amount}"
        );
    }
    check_year(date.year())
}

/// The plain record form of an `Expense`, as handed to the CLI and MCP outputs.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExpenseRecord {
    pub id: String,
    pub description: String,
    pub amount: Amount,
    pub date: DateTime<Utc>,
    pub category_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<ExpenseRecord> for Expense {
    fn from(record: ExpenseRecord) -> Self {
        Expense::reconstruct(
            record.id,
            record.description,
            record.amount,
            record.date,
            record.category_id,
            record.created_at,
            record.updated_at,
        )
    }
}

impl From<&Expense> for ExpenseRecord {
    fn from(expense: &Expense) -> Self {
        expense.to_record()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type;
    use chrono::{Duration, TimeZone};
    use std::str::FromStr;

    fn amount(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    fn march(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap()
    }

    fn assert_validation<T: std::fmt::Debug>(result: Result<T>) {
        let err = result.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Validation), "{err}");
    }

    #[test]
    fn test_create() {
        let before = Utc::now();
        let expense = Expense::create("Groceries", amount("42.10"), march(3), "cat-1").unwrap();
        let after = Utc::now();

        assert!(!expense.id().is_empty());
        assert_eq!(expense.description(), "Groceries");
        assert_eq!(expense.amount(), amount("42.10"));
        assert_eq!(expense.date(), march(3));
        assert_eq!(expense.category_id(), "cat-1");
        assert!(expense.created_at() >= before && expense.created_at() <= after);
        assert!(expense.updated_at().is_none());
    }

    #[test]
    fn test_create_generates_distinct_ids() {
        let a = Expense::create("Coffee", amount("3"), march(1), "cat-1").unwrap();
        let b = Expense::create("Coffee", amount("3"), march(1), "cat-1").unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_create_rejects_blank_description() {
        assert_validation(Expense::create("", amount("10"), march(1), "cat-1"));
        assert_validation(Expense::create("   ", amount("10"), march(1), "cat-1"));
    }

    #[test]
    fn test_create_rejects_non_positive_amount() {
        assert_validation(Expense::create("Rent", amount("0"), march(1), "cat-1"));
        assert_validation(Expense::create("Rent", amount("-5"), march(1), "cat-1"));
    }

    #[test]
    fn test_create_and_update_reject_unstorable_years() {
        let far = Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap();
        let negative = Utc.with_ymd_and_hms(-1, 6, 1, 0, 0, 0).unwrap();
        assert_validation(Expense::create("Rent", amount("5"), far, "cat-1"));
        assert_validation(Expense::create("Rent", amount("5"), negative, "cat-1"));

        let mut expense = Expense::create("Rent", amount("5"), march(1), "cat-1").unwrap();
        let before = expense.clone();
        assert_validation(expense.update("Rent", amount("5"), far, "cat-1"));
        assert_eq!(expense, before);
    }

    #[test]
    fn test_create_description_length_limit() {
        let longest = "x".repeat(MAX_DESCRIPTION_LEN);
        assert!(Expense::create(longest, amount("1"), march(1), "cat-1").is_ok());

        let too_long = "x".repeat(MAX_DESCRIPTION_LEN + 1);
        assert_validation(Expense::create(too_long, amount("1"), march(1), "cat-1"));
    }

    #[test]
    fn test_update_replaces_all_fields() {
        let mut expense = Expense::create("Lunch", amount("12"), march(1), "cat-1").unwrap();
        let id = expense.id().to_string();
        let created_at = expense.created_at();

        expense
            .update("Dinner", amount("30.75"), march(2), "cat-2")
            .unwrap();

        assert_eq!(expense.id(), id);
        assert_eq!(expense.created_at(), created_at);
        assert_eq!(expense.description(), "Dinner");
        assert_eq!(expense.amount(), amount("30.75"));
        assert_eq!(expense.date(), march(2));
        assert_eq!(expense.category_id(), "cat-2");
        assert!(expense.updated_at().unwrap() >= created_at);
    }

    #[test]
    fn test_update_never_moves_updated_at_backwards() {
        let future = Utc::now() + Duration::days(1);
        let mut expense = Expense::reconstruct(
            "e-1".to_string(),
            "Taxi".to_string(),
            amount("20"),
            march(1),
            "cat-1".to_string(),
            march(1),
            Some(future),
        );
        expense
            .update("Taxi home", amount("25"), march(1), "cat-1")
            .unwrap();
        assert!(expense.updated_at().unwrap() >= future);
    }

    #[test]
    fn test_update_validates_and_leaves_expense_unchanged() {
        let mut expense = Expense::create("Lunch", amount("12"), march(1), "cat-1").unwrap();
        let original = expense.clone();

        assert_validation(expense.update(" ", amount("12"), march(2), "cat-2"));
        assert_validation(expense.update("Lunch", amount("-1"), march(2), "cat-2"));
        assert_eq!(expense, original);
    }

    #[test]
    fn test_reconstruct_is_idempotent() {
        let build = || {
            Expense::reconstruct(
                "e-1".to_string(),
                "Books".to_string(),
                amount("19.99"),
                march(4),
                "cat-1".to_string(),
                march(4),
                None,
            )
        };
        assert_eq!(build().to_record(), build().to_record());
    }

    #[test]
    fn test_reconstruct_does_not_validate() {
        let expense = Expense::reconstruct(
            "e-1".to_string(),
            String::new(),
            amount("0"),
            march(4),
            "cat-1".to_string(),
            march(4),
            None,
        );
        assert_eq!(expense.description(), "");
    }

    #[test]
    fn test_record_round_trip_keeps_precision() {
        let expense = Expense::create(
            "Many small things",
            amount("1234567.891234"),
            march(5),
            "cat-1",
        )
        .unwrap();
        let rebuilt = Expense::from(expense.to_record());
        assert_eq!(rebuilt, expense);
        assert_eq!(rebuilt.amount().to_string(), "1234567.891234");
    }

    #[test]
    fn test_record_json_round_trip() {
        let expense = Expense::create("Gym", amount("45.00"), march(6), "cat-1").unwrap();
        let json = serde_json::to_string(&expense.to_record()).unwrap();
        assert!(json.contains("\"amount\":\"45.00\""));
        assert!(json.contains("\"updated_at\":null"));
        let record: ExpenseRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(Expense::from(record), expense);
    }
}

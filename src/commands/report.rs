use crate::args::MonthlyReportArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::report;
use crate::model::{Expense, ExpenseRecord, MonthlyReport};
use crate::{Config, Result};
use tracing::debug;

/// Builds the financial report for one calendar month: every expense dated in the month (UTC),
/// their total, the salary plus additional income, and what is left over.
///
/// # Errors
/// - Returns a `Validation` error if `month` is not in `1..=12` or the totals overflow.
/// - Returns a `Database` error if the month's expenses cannot be read.
pub async fn monthly_report(config: Config, args: MonthlyReportArgs) -> Result<Out<MonthlyReport>> {
    let expenses = config
        .db()
        .find_expenses_by_month(args.month, args.year)
        .await
        .pub_result(ErrorType::Database)?;
    debug!(
        "Found {} expenses for {}-{:02}",
        expenses.len(),
        args.year,
        args.month
    );

    let records: Vec<ExpenseRecord> = expenses.iter().map(Expense::to_record).collect();
    let report = report::monthly_report(
        args.month,
        args.year,
        args.salary,
        args.additional_income,
        records,
    )?;

    let message = format!(
        "{} {}: income {} + {}, expenses {}, net {}",
        report.month_name,
        report.year,
        report.salary,
        report.total_additional_income,
        report.total_expenses,
        report.net_income
    );
    Ok(Out::new(message, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type;
    use crate::model::{Amount, IncomeItem};
    use crate::test::{date, TestEnv};
    use std::str::FromStr;

    fn amount(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    #[tokio::test]
    async fn test_monthly_report() {
        let env = TestEnv::new().await;
        let food = env.insert_category("Food").await;
        env.insert_expense(food.id(), "Groceries", "120.40", date(2025, 3, 3))
            .await;
        env.insert_expense(food.id(), "Dinner", "79.60", date(2025, 3, 31))
            .await;
        env.insert_expense(food.id(), "Breakfast", "15", date(2025, 4, 1))
            .await;

        let args = MonthlyReportArgs {
            month: 3,
            year: 2025,
            salary: amount("3000"),
            additional_income: vec![IncomeItem::new("bonus", amount("250.50"))],
        };
        let out = monthly_report(env.config(), args).await.unwrap();
        let report = out.structure().unwrap();

        assert_eq!(report.month_name, "March");
        assert_eq!(report.expenses.len(), 2);
        assert_eq!(report.total_expenses, amount("200.00"));
        assert_eq!(report.total_additional_income, amount("250.50"));
        assert_eq!(report.net_income, amount("3050.50"));
        assert!(out.message().starts_with("March 2025"));
    }

    #[tokio::test]
    async fn test_monthly_report_empty_month() {
        let env = TestEnv::new().await;
        let args = MonthlyReportArgs {
            month: 2,
            year: 2024,
            salary: amount("1000"),
            additional_income: Vec::new(),
        };
        let out = monthly_report(env.config(), args).await.unwrap();
        let report = out.structure().unwrap();
        assert_eq!(report.month_name, "February");
        assert!(report.expenses.is_empty());
        assert_eq!(report.total_expenses, Amount::ZERO);
        assert_eq!(report.net_income, amount("1000"));
    }

    #[tokio::test]
    async fn test_monthly_report_invalid_month() {
        let env = TestEnv::new().await;
        let args = MonthlyReportArgs {
            month: 0,
            year: 2025,
            salary: amount("1000"),
            additional_income: Vec::new(),
        };
        let err = monthly_report(env.config(), args).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Validation));
    }
}

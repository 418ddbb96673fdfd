use chrono::{Datelike, NaiveDate};

use super::{
    aggregate::{category_totals, total_for_day, CategoryTotal, TransactionFilter},
    balance::total_balance,
    budget::{budget_consumption, BudgetReport},
    series::{bucket_series, Bucket, Period},
    trend::{forecast, Forecast},
};
use crate::ledger::{Ledger, TransactionKind};

/// Materialized balance of one account as shown to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountBalance {
    pub account_id: String,
    pub name: String,
    pub balance: f64,
}

/// Read-only derived view of a ledger for the month containing `today`.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerView {
    pub today: NaiveDate,
    pub balances: Vec<AccountBalance>,
    pub total_balance: f64,
    pub spent_today: f64,
    pub month_income: f64,
    pub month_expense: f64,
    pub expense_ranking: Vec<CategoryTotal>,
    pub daily_series: Vec<Bucket>,
    pub budgets: BudgetReport,
    pub forecast: Forecast,
}

/// Recomputes every derived figure from scratch.
pub fn derive_view(ledger: &Ledger, today: NaiveDate) -> LedgerView {
    let period = Period::month_of(today);
    let (month_start, month_end) = period.bounds().unwrap_or((today, today));
    let month_filter = TransactionFilter::new().between(month_start, month_end);

    let daily_series = bucket_series(&ledger.transactions, period);
    let month_income = daily_series.iter().map(|bucket| bucket.income).sum();
    let month_expense = daily_series.iter().map(|bucket| bucket.expense).sum();

    LedgerView {
        today,
        balances: ledger
            .accounts
            .iter()
            .map(|account| AccountBalance {
                account_id: account.id.clone(),
                name: account.name.clone(),
                balance: account.balance,
            })
            .collect(),
        total_balance: total_balance(ledger),
        spent_today: total_for_day(&ledger.transactions, TransactionKind::Expense, today),
        month_income,
        month_expense,
        expense_ranking: category_totals(
            &ledger.transactions,
            &ledger.categories,
            &month_filter.kind(TransactionKind::Expense),
        ),
        daily_series,
        budgets: budget_consumption(&ledger.categories, &ledger.transactions, period),
        forecast: forecast(&ledger.transactions, today.year(), today.month()),
    }
}

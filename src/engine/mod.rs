//! Pure derivations over a ledger: balances, aggregates, series, projections and budgets.
//!
//! Nothing here mutates state or caches results between calls.

pub mod aggregate;
pub mod balance;
pub mod budget;
pub mod series;
pub mod trend;
pub mod view;

pub use aggregate::{category_totals, total_for_day, CategoryTotal, TransactionFilter};
pub use balance::{drift_report, fold_balance, total_balance, Drift};
pub use budget::{budget_consumption, consumption_percent, BudgetLine, BudgetReport};
pub use series::{bucket_series, days_in_month, monthly_history, Bucket, MonthTotals, Period};
pub use trend::{forecast, project, Forecast, PROJECTION_MONTHS, TREND_WINDOW};
pub use view::{derive_view, AccountBalance, LedgerView};

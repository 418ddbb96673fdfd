//! Budget consumption per expense category.

use super::series::Period;
use crate::ledger::{Category, Transaction, TransactionKind};

/// Spending against one category budget.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetLine {
    pub category_id: String,
    pub label: String,
    pub budget: f64,
    pub spent: f64,
    pub percent: u32,
}

/// Budget lines plus the rollup over categories that have a budget.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BudgetReport {
    pub lines: Vec<BudgetLine>,
    pub total_budget: f64,
    pub total_spent: f64,
    pub total_percent: u32,
}

/// `round(spent / budget * 100)`, or 0 when there is nothing to divide by.
pub fn consumption_percent(spent: f64, budget: f64) -> u32 {
    if budget <= 0.0 || !budget.is_finite() || !spent.is_finite() {
        return 0;
    }
    let percent = (spent / budget * 100.0).round();
    if percent > 0.0 {
        percent as u32
    } else {
        0
    }
}

/// Computes consumption for each expense category with a budget over `period`.
pub fn budget_consumption(
    categories: &[Category],
    transactions: &[Transaction],
    period: Period,
) -> BudgetReport {
    let mut report = BudgetReport::default();
    for category in categories {
        let Some(budget) = category.effective_budget() else {
            continue;
        };
        let spent: f64 = transactions
            .iter()
            .filter(|txn| {
                txn.kind == TransactionKind::Expense
                    && txn.category_id == category.id
                    && period.contains(txn.date)
            })
            .map(|txn| txn.amount)
            .sum();
        report.total_budget += budget;
        report.total_spent += spent;
        report.lines.push(BudgetLine {
            category_id: category.id.clone(),
            label: category.label.clone(),
            budget,
            spent,
            percent: consumption_percent(spent, budget),
        });
    }
    report.total_percent = consumption_percent(report.total_spent, report.total_budget);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::CategoryKind;
    use chrono::NaiveDate;

    fn spend(amount: f64, category: &str, month: u32) -> Transaction {
        Transaction::new(
            TransactionKind::Expense,
            amount,
            category,
            "acc_1",
            NaiveDate::from_ymd_opt(2025, month, 3).unwrap(),
        )
    }

    #[test]
    fn percent_rounds_and_guards_zero_budget() {
        assert_eq!(consumption_percent(1.0, 3.0), 33);
        assert_eq!(consumption_percent(2.0, 3.0), 67);
        assert_eq!(consumption_percent(50.0, 0.0), 0);
        assert_eq!(consumption_percent(150.0, 100.0), 150);
    }

    #[test]
    fn unset_budgets_are_excluded_from_rollup() {
        let categories = vec![
            Category::new("food", "Food", CategoryKind::Expense).with_budget(200.0),
            Category::new("fun", "Fun", CategoryKind::Expense),
            Category::new("salary", "Salary", CategoryKind::Income).with_budget(1.0),
        ];
        let txns = vec![
            spend(50.0, "food", 6),
            spend(25.0, "food", 6),
            spend(80.0, "fun", 6),
            spend(500.0, "food", 5),
        ];
        let report = budget_consumption(&categories, &txns, Period::Month { year: 2025, month: 6 });
        assert_eq!(report.lines.len(), 1);
        assert_eq!(report.lines[0].spent, 75.0);
        assert_eq!(report.lines[0].percent, 38);
        assert_eq!(report.total_budget, 200.0);
        assert_eq!(report.total_percent, 38);
    }

    #[test]
    fn zero_total_budget_yields_zero_percent() {
        let categories = vec![Category::new("food", "Food", CategoryKind::Expense).with_budget(0.0)];
        let report = budget_consumption(
            &categories,
            &[spend(10.0, "food", 1)],
            Period::Month { year: 2025, month: 1 },
        );
        assert_eq!(report.total_percent, 0);
        assert_eq!(report.lines[0].percent, 0);
    }
}

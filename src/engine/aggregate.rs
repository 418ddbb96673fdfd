//! Filtering and per-category ranking.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::ledger::{Category, Transaction, TransactionKind, UNKNOWN_LABEL};

/// Selects transactions by type, account, category and inclusive date range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub kind: Option<TransactionKind>,
    pub account_id: Option<String>,
    pub category_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Matches transactions touching the account on either side.
    pub fn account(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    pub fn matches(&self, txn: &Transaction) -> bool {
        if self.kind.is_some_and(|kind| kind != txn.kind) {
            return false;
        }
        if let Some(account) = &self.account_id {
            let touches = txn.account_id == *account
                || txn.to_account_id.as_deref() == Some(account.as_str());
            if !touches {
                return false;
            }
        }
        if let Some(category) = &self.category_id {
            if txn.category_id != *category {
                return false;
            }
        }
        if self.from.is_some_and(|from| txn.date < from) {
            return false;
        }
        if self.to.is_some_and(|to| txn.date > to) {
            return false;
        }
        true
    }
}

/// Sum of one category's matching transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category_id: String,
    pub label: String,
    pub total: f64,
    pub count: usize,
}

/// Groups matching transactions by category, largest total first.
///
/// Equal totals keep registry order; categories missing from the registry
/// sort after registered ones and are labelled "unknown".
pub fn category_totals(
    transactions: &[Transaction],
    categories: &[Category],
    filter: &TransactionFilter,
) -> Vec<CategoryTotal> {
    let mut sums: HashMap<&str, (f64, usize)> = HashMap::new();
    for txn in transactions.iter().filter(|txn| filter.matches(txn)) {
        let entry = sums.entry(txn.category_id.as_str()).or_insert((0.0, 0));
        entry.0 += txn.amount;
        entry.1 += 1;
    }

    let registry_rank = |id: &str| {
        categories
            .iter()
            .position(|category| category.id == id)
            .unwrap_or(usize::MAX)
    };

    let mut totals: Vec<(usize, CategoryTotal)> = sums
        .into_iter()
        .map(|(id, (total, count))| {
            let label = categories
                .iter()
                .find(|category| category.id == id)
                .map(|category| category.label.clone())
                .unwrap_or_else(|| UNKNOWN_LABEL.to_string());
            (
                registry_rank(id),
                CategoryTotal {
                    category_id: id.to_string(),
                    label,
                    total,
                    count,
                },
            )
        })
        .collect();

    totals.sort_by(|(rank_a, a), (rank_b, b)| {
        b.total
            .total_cmp(&a.total)
            .then(rank_a.cmp(rank_b))
            .then_with(|| a.category_id.cmp(&b.category_id))
    });
    totals.into_iter().map(|(_, total)| total).collect()
}

/// Total of one transaction type on a single ledger date.
pub fn total_for_day(transactions: &[Transaction], kind: TransactionKind, day: NaiveDate) -> f64 {
    transactions
        .iter()
        .filter(|txn| txn.kind == kind && txn.date == day)
        .map(|txn| txn.amount)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{defaults::default_categories, CategoryKind};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, d).unwrap()
    }

    fn expense(amount: f64, category: &str, d: u32) -> Transaction {
        Transaction::new(TransactionKind::Expense, amount, category, "acc_1", day(d))
    }

    #[test]
    fn ranks_by_total_then_registry_order() {
        let categories = default_categories();
        let txns = vec![
            expense(40.0, "transport", 1),
            expense(40.0, "food", 2),
            expense(90.0, "shopping", 3),
            expense(40.0, "ghost", 4),
        ];
        let filter = TransactionFilter::new().kind(TransactionKind::Expense);
        let totals = category_totals(&txns, &categories, &filter);
        let order: Vec<_> = totals.iter().map(|t| t.category_id.as_str()).collect();
        assert_eq!(order, vec!["shopping", "food", "transport", "ghost"]);
        assert_eq!(totals[3].label, UNKNOWN_LABEL);
    }

    #[test]
    fn date_range_is_inclusive_and_type_filtered() {
        let categories = vec![Category::new("food", "Food", CategoryKind::Expense)];
        let mut txns = vec![
            expense(10.0, "food", 1),
            expense(20.0, "food", 15),
            expense(30.0, "food", 31),
        ];
        txns.push(Transaction::new(
            TransactionKind::Income,
            99.0,
            "food",
            "acc_1",
            day(15),
        ));
        let filter = TransactionFilter::new()
            .kind(TransactionKind::Expense)
            .between(day(1), day(15));
        let totals = category_totals(&txns, &categories, &filter);
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].total, 30.0);
        assert_eq!(totals[0].count, 2);
    }

    #[test]
    fn aggregation_is_repeatable() {
        let categories = default_categories();
        let txns = vec![expense(12.5, "food", 3), expense(7.5, "daily", 4)];
        let filter = TransactionFilter::new();
        let first = category_totals(&txns, &categories, &filter);
        let second = category_totals(&txns, &categories, &filter);
        assert_eq!(first, second);
    }

    #[test]
    fn account_filter_matches_transfer_destination() {
        let txn = Transaction::new(TransactionKind::Transfer, 5.0, "", "acc_1", day(2))
            .transfer_to("acc_2", None);
        assert!(TransactionFilter::new().account("acc_2").matches(&txn));
        assert!(!TransactionFilter::new().account("acc_3").matches(&txn));
    }

    #[test]
    fn daily_total_ignores_other_days_and_types() {
        let txns = vec![
            expense(10.0, "food", 2),
            expense(15.0, "food", 2),
            expense(99.0, "food", 3),
        ];
        assert_eq!(total_for_day(&txns, TransactionKind::Expense, day(2)), 25.0);
        assert_eq!(total_for_day(&txns, TransactionKind::Income, day(2)), 0.0);
    }
}

//! Balance fold and drift detection.

use crate::ledger::{Ledger, Transaction};

const DRIFT_TOLERANCE: f64 = 1e-6;

/// Sums the effect of `transactions` on `account_id` on top of `opening`.
///
/// A pure sum: the result does not depend on transaction order.
pub fn fold_balance(account_id: &str, opening: f64, transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .flat_map(Transaction::balance_legs)
        .filter(|leg| leg.account_id == account_id)
        .fold(opening, |balance, leg| balance + leg.delta)
}

/// A materialized balance that disagrees with the fold of the log.
#[derive(Debug, Clone, PartialEq)]
pub struct Drift {
    pub account_id: String,
    pub name: String,
    pub recorded: f64,
    pub expected: f64,
}

impl Drift {
    pub fn difference(&self) -> f64 {
        self.recorded - self.expected
    }
}

/// Lists every account whose stored balance drifted from its recomputed value.
///
/// Accounts without a known opening balance cannot be checked and are skipped.
pub fn drift_report(ledger: &Ledger) -> Vec<Drift> {
    ledger
        .accounts
        .iter()
        .filter_map(|account| {
            let opening = account.opening_balance?;
            let expected = fold_balance(&account.id, opening, &ledger.transactions);
            if (account.balance - expected).abs() > DRIFT_TOLERANCE {
                Some(Drift {
                    account_id: account.id.clone(),
                    name: account.name.clone(),
                    recorded: account.balance,
                    expected,
                })
            } else {
                None
            }
        })
        .collect()
}

/// Sum of every materialized account balance.
pub fn total_balance(ledger: &Ledger) -> f64 {
    ledger.accounts.iter().map(|account| account.balance).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Account, TransactionKind};
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, d).unwrap()
    }

    fn sample() -> Vec<Transaction> {
        vec![
            Transaction::new(TransactionKind::Income, 300.0, "salary", "a", day(1)),
            Transaction::new(TransactionKind::Expense, 120.0, "food", "a", day(2)),
            Transaction::new(TransactionKind::Transfer, 50.0, "", "a", day(3))
                .transfer_to("b", Some(5.0)),
        ]
    }

    #[test]
    fn fold_applies_each_rule() {
        let txns = sample();
        assert_eq!(fold_balance("a", 1000.0, &txns), 1000.0 + 300.0 - 120.0 - 55.0);
        assert_eq!(fold_balance("b", 500.0, &txns), 550.0);
        assert_eq!(fold_balance("c", 7.0, &txns), 7.0);
    }

    #[test]
    fn fold_is_order_independent() {
        let mut txns = sample();
        let forward = fold_balance("a", 0.0, &txns);
        txns.reverse();
        assert_eq!(fold_balance("a", 0.0, &txns), forward);
    }

    #[test]
    fn drift_report_flags_out_of_sync_accounts() {
        let mut ledger = Ledger::new();
        ledger.accounts.push(Account::new("a", "Checking", 1000.0));
        ledger.accounts.push(Account::new("b", "Savings", 500.0));
        ledger.transactions = sample();
        ledger.account_mut("a").unwrap().balance = 1125.0;
        ledger.account_mut("b").unwrap().balance = 500.0;

        let drift = drift_report(&ledger);
        assert_eq!(drift.len(), 1);
        assert_eq!(drift[0].account_id, "b");
        assert_eq!(drift[0].difference(), -50.0);
    }
}

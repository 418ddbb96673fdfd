use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{
    account::Account,
    category::Category,
    defaults::{default_accounts, default_categories},
    recurring::RecurringTemplate,
    transaction::{BalanceLeg, Transaction},
};

/// Label rendered for dangling category/account references.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Complete state of one user's tracker: the log plus its reference data.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub recurring_templates: Vec<RecurringTemplate>,
}

impl Ledger {
    /// Empty ledger with no registries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger seeded with the built-in categories and accounts.
    pub fn with_defaults() -> Self {
        Self {
            categories: default_categories(),
            accounts: default_accounts(),
            ..Self::default()
        }
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn category_mut(&mut self, id: &str) -> Option<&mut Category> {
        self.categories.iter_mut().find(|category| category.id == id)
    }

    pub fn account(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == id)
    }

    pub fn account_mut(&mut self, id: &str) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|account| account.id == id)
    }

    pub fn transaction(&self, id: i64) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    pub fn template(&self, id: &str) -> Option<&RecurringTemplate> {
        self.recurring_templates
            .iter()
            .find(|template| template.id == id)
    }

    pub fn template_mut(&mut self, id: &str) -> Option<&mut RecurringTemplate> {
        self.recurring_templates
            .iter_mut()
            .find(|template| template.id == id)
    }

    pub fn category_label(&self, id: &str) -> &str {
        self.category(id)
            .map(|category| category.label.as_str())
            .unwrap_or(UNKNOWN_LABEL)
    }

    pub fn account_name(&self, id: &str) -> &str {
        self.account(id)
            .map(|account| account.name.as_str())
            .unwrap_or(UNKNOWN_LABEL)
    }

    /// Returns `candidate`, or the next millisecond not already used as an id.
    pub fn next_transaction_id(&self, candidate: i64) -> i64 {
        let mut id = candidate;
        while self.transaction(id).is_some() {
            id += 1;
        }
        id
    }

    /// Applies balance legs; legs for accounts that no longer exist are skipped.
    ///
    /// Returns the number of skipped legs.
    pub(crate) fn apply_legs(&mut self, legs: &[BalanceLeg]) -> usize {
        let mut skipped = 0;
        for leg in legs {
            match self.account_mut(&leg.account_id) {
                Some(account) => account.apply_delta(leg.delta),
                None => {
                    warn!(
                        account = %leg.account_id,
                        delta = leg.delta,
                        "skipping balance effect for missing account"
                    );
                    skipped += 1;
                }
            }
        }
        skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::TransactionKind;
    use chrono::NaiveDate;

    #[test]
    fn dangling_references_resolve_to_unknown() {
        let ledger = Ledger::with_defaults();
        assert_eq!(ledger.category_label("food"), "Food");
        assert_eq!(ledger.category_label("deleted"), UNKNOWN_LABEL);
        assert_eq!(ledger.account_name("acc_9"), UNKNOWN_LABEL);
    }

    #[test]
    fn next_transaction_id_skips_taken_ids() {
        let mut ledger = Ledger::new();
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let mut txn = Transaction::new(TransactionKind::Expense, 1.0, "food", "acc_1", date);
        txn.id = 1_000;
        ledger.transactions.push(txn.clone());
        txn.id = 1_001;
        ledger.transactions.push(txn);
        assert_eq!(ledger.next_transaction_id(1_000), 1_002);
        assert_eq!(ledger.next_transaction_id(5), 5);
    }

    #[test]
    fn missing_accounts_are_skipped_not_fatal() {
        let mut ledger = Ledger::with_defaults();
        let legs = vec![
            BalanceLeg {
                account_id: "acc_1".into(),
                delta: -10.0,
            },
            BalanceLeg {
                account_id: "gone".into(),
                delta: 10.0,
            },
        ];
        assert_eq!(ledger.apply_legs(&legs), 1);
        assert_eq!(ledger.account("acc_1").unwrap().balance, 49_990.0);
    }
}

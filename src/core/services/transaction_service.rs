//! Balance-consistent CRUD for the transaction log.

use tracing::debug;

use crate::core::time::Clock;
use crate::engine::TransactionFilter;
use crate::errors::{LedgerError, Result};
use crate::ledger::{Ledger, Transaction, TransactionPatch};

const TIME_FORMAT: &str = "%H:%M";

/// Provides validated CRUD helpers that keep account balances in step with the log.
pub struct TransactionService;

impl TransactionService {
    /// Validates and appends `transaction`, applying its balance effect once.
    ///
    /// An id of `0` is replaced with the creation instant from `clock`.
    pub fn add(ledger: &mut Ledger, mut transaction: Transaction, clock: &dyn Clock) -> Result<i64> {
        transaction.validate()?;
        if transaction.id == 0 {
            transaction.id = ledger.next_transaction_id(clock.now_millis());
        } else if ledger.transaction(transaction.id).is_some() {
            return Err(LedgerError::Duplicate(transaction.id.to_string()));
        }
        if transaction.time.is_empty() {
            transaction.time = clock.now().format(TIME_FORMAT).to_string();
        }

        let legs = transaction.balance_legs();
        ledger.apply_legs(&legs);
        let id = transaction.id;
        debug!(id, kind = %transaction.kind, amount = transaction.amount, "transaction added");
        ledger.transactions.push(transaction);
        Ok(id)
    }

    /// Applies `patch` to the transaction identified by `id`.
    ///
    /// The original effect is always reversed on the original accounts and the new
    /// effect applied on the new ones, even when neither account changed. Nothing
    /// is touched when the patched transaction fails validation.
    pub fn update(ledger: &mut Ledger, id: i64, patch: &TransactionPatch) -> Result<Transaction> {
        let index = Self::position(ledger, id)?;
        let original = ledger.transactions[index].clone();
        let updated = patch.apply_to(&original);
        updated.validate()?;

        let reversal = original.reversal_legs();
        let forward = updated.balance_legs();
        ledger.apply_legs(&reversal);
        ledger.apply_legs(&forward);
        ledger.transactions[index] = updated.clone();
        debug!(id, "transaction updated");
        Ok(updated)
    }

    /// Reverses the transaction's effect and removes it, returning the removed record.
    pub fn remove(ledger: &mut Ledger, id: i64) -> Result<Transaction> {
        let index = Self::position(ledger, id)?;
        let reversal = ledger.transactions[index].reversal_legs();
        ledger.apply_legs(&reversal);
        debug!(id, "transaction removed");
        Ok(ledger.transactions.remove(index))
    }

    pub fn get(ledger: &Ledger, id: i64) -> Result<&Transaction> {
        ledger
            .transaction(id)
            .ok_or(LedgerError::TransactionNotFound(id))
    }

    /// Matching transactions, newest ledger date first (creation order breaks ties).
    pub fn list<'a>(ledger: &'a Ledger, filter: &TransactionFilter) -> Vec<&'a Transaction> {
        let mut matches: Vec<&Transaction> = ledger
            .transactions
            .iter()
            .filter(|txn| filter.matches(txn))
            .collect();
        matches.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        matches
    }

    fn position(ledger: &Ledger, id: i64) -> Result<usize> {
        ledger
            .transactions
            .iter()
            .position(|txn| txn.id == id)
            .ok_or(LedgerError::TransactionNotFound(id))
    }
}

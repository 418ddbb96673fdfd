use tracing::info;
use uuid::Uuid;

use crate::errors::{LedgerError, Result};
use crate::ledger::{Account, AccountPatch, Ledger};

pub struct AccountService;

impl AccountService {
    /// Registers `account`, assigning an id when empty and recording its opening balance.
    pub fn add(ledger: &mut Ledger, mut account: Account) -> Result<String> {
        Self::validate(&account)?;
        if account.id.trim().is_empty() {
            account.id = Uuid::new_v4().to_string();
        }
        if ledger.account(&account.id).is_some() {
            return Err(LedgerError::Duplicate(account.id));
        }
        if account.opening_balance.is_none() {
            account.opening_balance = Some(account.balance);
        }
        let id = account.id.clone();
        ledger.accounts.push(account);
        Ok(id)
    }

    pub fn update(ledger: &mut Ledger, id: &str, patch: &AccountPatch) -> Result<()> {
        let account = ledger
            .account_mut(id)
            .ok_or_else(|| LedgerError::AccountNotFound(id.to_string()))?;
        let mut candidate = account.clone();
        patch.apply(&mut candidate);
        Self::validate(&candidate)?;
        *account = candidate;
        Ok(())
    }

    /// Removes the account. Transactions referencing it are kept as-is.
    pub fn remove(ledger: &mut Ledger, id: &str) -> Result<Account> {
        let index = ledger
            .accounts
            .iter()
            .position(|account| account.id == id)
            .ok_or_else(|| LedgerError::AccountNotFound(id.to_string()))?;
        let orphaned = ledger
            .transactions
            .iter()
            .filter(|txn| txn.account_id == id || txn.to_account_id.as_deref() == Some(id))
            .count();
        if orphaned > 0 {
            info!(account = id, orphaned, "account removed with linked transactions");
        }
        Ok(ledger.accounts.remove(index))
    }

    pub fn list(ledger: &Ledger) -> Vec<&Account> {
        ledger.accounts.iter().collect()
    }

    fn validate(account: &Account) -> Result<()> {
        if account.name.trim().is_empty() {
            return Err(LedgerError::Validation("account name is required".into()));
        }
        if !account.balance.is_finite() {
            return Err(LedgerError::Validation(
                "account balance must be a number".into(),
            ));
        }
        Ok(())
    }
}

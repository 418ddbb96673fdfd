use std::{io::Write, sync::Arc};

use tracing::{info, warn};

use crate::backup::{
    BackupReceipt, BackupResult, BackupService, BackupSnapshot, ConfirmRestore, Outcome, Picker,
    RestoreSummary,
};
use crate::core::services::{AccountService, CategoryService, RecurringService, TransactionService};
use crate::core::time::Clock;
use crate::engine::{derive_view, drift_report, Drift, LedgerView, TransactionFilter};
use crate::errors::Result;
use crate::export;
use crate::ledger::{
    Account, AccountPatch, Category, CategoryPatch, Ledger, RecurringPatch, RecurringTemplate,
    Transaction, TransactionPatch,
};
use crate::storage::{KeyValueStore, UserStore};

/// What happened while a session was opened.
#[derive(Debug, Clone, Default)]
pub struct OpenReport {
    pub warnings: Vec<String>,
    pub generated: Vec<i64>,
}

/// One user's ledger session: owns the state, writes every change through to
/// storage and hands derived views to readers.
pub struct LedgerManager {
    ledger: Ledger,
    user: String,
    store: Box<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    report: OpenReport,
}

impl LedgerManager {
    /// Loads `user`'s namespace and runs the recurring scheduler. Anything the
    /// scheduler generated is persisted before the session is returned.
    pub fn open(store: Box<dyn KeyValueStore>, user: &str, clock: Arc<dyn Clock>) -> Result<Self> {
        let namespace = UserStore::new(store.as_ref(), user);
        let loaded = namespace.load();
        for warning in &loaded.warnings {
            warn!(user = namespace.user(), "{}", warning);
        }
        let mut ledger = loaded.ledger;
        let generated = RecurringService::run_due(&mut ledger, clock.as_ref());
        if !generated.is_empty() {
            namespace.save(&ledger)?;
        }
        info!(user = namespace.user(), transactions = ledger.transactions.len(), "ledger opened");
        Ok(Self {
            ledger,
            user: user.to_string(),
            store,
            clock,
            report: OpenReport {
                warnings: loaded.warnings,
                generated,
            },
        })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The user id as given to [`LedgerManager::open`].
    pub fn user(&self) -> &str {
        &self.user
    }

    fn namespace(&self) -> UserStore<'_> {
        UserStore::new(self.store.as_ref(), &self.user)
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn open_report(&self) -> &OpenReport {
        &self.report
    }

    pub fn view(&self) -> LedgerView {
        derive_view(&self.ledger, self.clock.today())
    }

    pub fn drift(&self) -> Vec<Drift> {
        drift_report(&self.ledger)
    }

    pub fn transactions(&self, filter: &TransactionFilter) -> Vec<&Transaction> {
        TransactionService::list(&self.ledger, filter)
    }

    pub fn add_transaction(&mut self, transaction: Transaction) -> Result<i64> {
        let clock = Arc::clone(&self.clock);
        self.commit(|ledger| TransactionService::add(ledger, transaction, clock.as_ref()))
    }

    pub fn update_transaction(&mut self, id: i64, patch: &TransactionPatch) -> Result<Transaction> {
        self.commit(|ledger| TransactionService::update(ledger, id, patch))
    }

    pub fn remove_transaction(&mut self, id: i64) -> Result<Transaction> {
        self.commit(|ledger| TransactionService::remove(ledger, id))
    }

    pub fn add_category(&mut self, category: Category) -> Result<String> {
        self.commit(|ledger| CategoryService::add(ledger, category))
    }

    pub fn update_category(&mut self, id: &str, patch: &CategoryPatch) -> Result<()> {
        self.commit(|ledger| CategoryService::update(ledger, id, patch))
    }

    pub fn set_budget(&mut self, id: &str, budget: Option<f64>) -> Result<()> {
        self.commit(|ledger| CategoryService::set_budget(ledger, id, budget))
    }

    pub fn remove_category(&mut self, id: &str) -> Result<Category> {
        self.commit(|ledger| CategoryService::remove(ledger, id))
    }

    pub fn add_account(&mut self, account: Account) -> Result<String> {
        self.commit(|ledger| AccountService::add(ledger, account))
    }

    pub fn update_account(&mut self, id: &str, patch: &AccountPatch) -> Result<()> {
        self.commit(|ledger| AccountService::update(ledger, id, patch))
    }

    pub fn remove_account(&mut self, id: &str) -> Result<Account> {
        self.commit(|ledger| AccountService::remove(ledger, id))
    }

    pub fn add_template(&mut self, template: RecurringTemplate) -> Result<String> {
        self.commit(|ledger| RecurringService::add(ledger, template))
    }

    pub fn update_template(&mut self, id: &str, patch: &RecurringPatch) -> Result<()> {
        self.commit(|ledger| RecurringService::update(ledger, id, patch))
    }

    pub fn set_template_active(&mut self, id: &str, active: bool) -> Result<()> {
        self.commit(|ledger| RecurringService::set_active(ledger, id, active))
    }

    pub fn remove_template(&mut self, id: &str) -> Result<RecurringTemplate> {
        self.commit(|ledger| RecurringService::remove(ledger, id))
    }

    pub fn backup(&self, service: &BackupService) -> BackupResult<BackupReceipt> {
        service.backup(&self.ledger, self.clock.as_ref())
    }

    /// Replaces the ledger with `snapshot` after confirmation and persists it.
    pub fn restore(
        &mut self,
        service: &BackupService,
        snapshot: &BackupSnapshot,
        confirm: &dyn ConfirmRestore,
    ) -> BackupResult<Outcome<RestoreSummary>> {
        let mut working = self.ledger.clone();
        let outcome = service.restore(&mut working, snapshot, confirm);
        if let Outcome::Completed(_) = &outcome {
            self.namespace().save(&working)?;
            self.ledger = working;
        }
        Ok(outcome)
    }

    /// Parses a user-picked backup file and restores it. A file that fails to
    /// parse leaves both the session and storage untouched.
    pub fn restore_picked(
        &mut self,
        service: &BackupService,
        picker: &dyn Picker,
        confirm: &dyn ConfirmRestore,
    ) -> BackupResult<Outcome<RestoreSummary>> {
        match service.read_picked(picker)? {
            Outcome::Completed(snapshot) => self.restore(service, &snapshot, confirm),
            Outcome::Cancelled => Ok(Outcome::Cancelled),
        }
    }

    pub fn export_csv<W: Write>(&self, out: W) -> Result<usize> {
        export::write_csv(&self.ledger, out)
    }

    /// Applies `change` to a copy, persists the copy and only then swaps it in,
    /// so a failed validation or write leaves the session untouched.
    fn commit<T>(&mut self, change: impl FnOnce(&mut Ledger) -> Result<T>) -> Result<T> {
        let mut working = self.ledger.clone();
        let value = change(&mut working)?;
        self.namespace().save(&working)?;
        self.ledger = working;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::FixedClock;
    use crate::ledger::{Frequency, TransactionKind};
    use crate::storage::{MemoryStore, DEFAULT_USER};
    use chrono::NaiveDate;

    /// Shares one memory store between sessions.
    struct Shared(Arc<MemoryStore>);

    impl KeyValueStore for Shared {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.0.get(key)
        }
        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.0.set(key, value)
        }
        fn remove(&self, key: &str) -> Result<()> {
            self.0.remove(key)
        }
        fn keys(&self) -> Result<Vec<String>> {
            self.0.keys()
        }
    }

    fn clock_on(y: i32, m: u32, d: u32) -> Arc<dyn Clock> {
        Arc::new(FixedClock::at(NaiveDate::from_ymd_opt(y, m, d).unwrap(), 9, 0).unwrap())
    }

    #[test]
    fn mutations_write_through() {
        let store = Arc::new(MemoryStore::new());
        let mut session =
            LedgerManager::open(Box::new(Shared(store.clone())), DEFAULT_USER, clock_on(2025, 5, 1))
                .unwrap();
        let day = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        session
            .add_transaction(Transaction::new(TransactionKind::Expense, 15.0, "food", "acc_2", day))
            .unwrap();

        let reopened =
            LedgerManager::open(Box::new(Shared(store)), DEFAULT_USER, clock_on(2025, 5, 1)).unwrap();
        assert_eq!(reopened.ledger(), session.ledger());
        assert_eq!(reopened.view().spent_today, 15.0);
    }

    #[test]
    fn failed_mutation_persists_nothing() {
        let store = Arc::new(MemoryStore::new());
        let mut session =
            LedgerManager::open(Box::new(Shared(store.clone())), "alice", clock_on(2025, 5, 1))
                .unwrap();
        assert!(session.remove_transaction(42).is_err());
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn scheduler_output_is_persisted_on_open() {
        let store = Arc::new(MemoryStore::new());
        let mut session =
            LedgerManager::open(Box::new(Shared(store.clone())), "bob", clock_on(2025, 1, 20))
                .unwrap();
        session
            .add_template(RecurringTemplate::new(
                "Rent",
                TransactionKind::Expense,
                800.0,
                "housing",
                "acc_1",
                Frequency::Monthly,
                NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
            ))
            .unwrap();

        let later =
            LedgerManager::open(Box::new(Shared(store.clone())), "bob", clock_on(2025, 4, 3)).unwrap();
        assert_eq!(later.open_report().generated.len(), 1);

        let again = LedgerManager::open(Box::new(Shared(store)), "bob", clock_on(2025, 4, 3)).unwrap();
        assert!(again.open_report().generated.is_empty());
        assert_eq!(again.ledger().transactions.len(), 1);
        assert_eq!(again.ledger().account("acc_1").unwrap().balance, 49_200.0);
    }
}

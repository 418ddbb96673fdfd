//! Per-user namespacing of the four persisted collections.

use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use super::KeyValueStore;
use crate::errors::Result;
use crate::ledger::{
    defaults::{default_accounts, default_categories},
    Ledger,
};

pub const DEFAULT_USER: &str = "default";
const KEY_PREFIX: &str = "qm";

/// One independently stored collection of the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Transactions,
    Categories,
    Accounts,
    Recurring,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Transactions,
        Collection::Categories,
        Collection::Accounts,
        Collection::Recurring,
    ];

    pub fn suffix(&self) -> &'static str {
        match self {
            Collection::Transactions => "transactions",
            Collection::Categories => "categories",
            Collection::Accounts => "accounts",
            Collection::Recurring => "recurring",
        }
    }
}

/// A loaded ledger together with the keys that had to fall back to defaults.
#[derive(Debug, Clone)]
pub struct LoadedLedger {
    pub ledger: Ledger,
    pub warnings: Vec<String>,
}

/// View of a [`KeyValueStore`] scoped to one user id.
pub struct UserStore<'a> {
    store: &'a dyn KeyValueStore,
    user: String,
}

impl<'a> UserStore<'a> {
    pub fn new(store: &'a dyn KeyValueStore, user: &str) -> Self {
        Self {
            store,
            user: canonical_user(user),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// `qm_<user>_<collection>`
    pub fn key(&self, collection: Collection) -> String {
        format!("{}_{}_{}", KEY_PREFIX, self.user, collection.suffix())
    }

    /// Reads all four collections. Missing or unreadable keys fall back to the
    /// built-in registries (or an empty list) and are reported as warnings.
    pub fn load(&self) -> LoadedLedger {
        let mut warnings = Vec::new();
        let transactions = self.read(Collection::Transactions, Vec::new, &mut warnings);
        let categories = self.read(Collection::Categories, default_categories, &mut warnings);
        let accounts = self.read(Collection::Accounts, default_accounts, &mut warnings);
        let recurring_templates = self.read(Collection::Recurring, Vec::new, &mut warnings);
        LoadedLedger {
            ledger: Ledger {
                transactions,
                categories,
                accounts,
                recurring_templates,
            },
            warnings,
        }
    }

    pub fn save(&self, ledger: &Ledger) -> Result<()> {
        self.write(Collection::Transactions, &ledger.transactions)?;
        self.write(Collection::Categories, &ledger.categories)?;
        self.write(Collection::Accounts, &ledger.accounts)?;
        self.write(Collection::Recurring, &ledger.recurring_templates)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        for collection in Collection::ALL {
            self.store.remove(&self.key(collection))?;
        }
        Ok(())
    }

    fn read<T, F>(&self, collection: Collection, fallback: F, warnings: &mut Vec<String>) -> Vec<T>
    where
        T: DeserializeOwned,
        F: FnOnce() -> Vec<T>,
    {
        let key = self.key(collection);
        let raw = match self.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return fallback(),
            Err(err) => {
                warn!(key = %key, error = %err, "storage read failed; using defaults");
                warnings.push(format!("{}: {}", key, err));
                return fallback();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(err) => {
                warn!(key = %key, error = %err, "stored collection is corrupt; using defaults");
                warnings.push(format!("{}: {}", key, err));
                fallback()
            }
        }
    }

    fn write<T: Serialize>(&self, collection: Collection, items: &[T]) -> Result<()> {
        let json = serde_json::to_string(items)?;
        self.store.set(&self.key(collection), &json)
    }
}

/// Keeps `[A-Za-z0-9-]` and writes every other byte (including `_`) as `_XX`
/// hex, so distinct ids never share a namespace and keys stay file-name safe.
fn canonical_user(user: &str) -> String {
    let trimmed = user.trim();
    if trimmed.is_empty() {
        return DEFAULT_USER.into();
    }
    let mut encoded = String::with_capacity(trimmed.len());
    for byte in trimmed.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' => encoded.push(byte as char),
            _ => encoded.push_str(&format!("_{:02X}", byte)),
        }
    }
    encoded
}

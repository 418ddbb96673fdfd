use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{BackupError, BackupResult};
use crate::ledger::{Account, Category, Ledger, RecurringTemplate, Transaction};
use crate::storage::Collection;

/// Highest snapshot format this build reads and the one it writes.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serialized copy of a whole ledger.
///
/// Every collection is optional on the way in so snapshots from older builds,
/// which may lack recurring templates, still restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupSnapshot {
    #[serde(default = "legacy_version")]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transactions: Option<Vec<Transaction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Category>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accounts: Option<Vec<Account>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_templates: Option<Vec<RecurringTemplate>>,
}

fn legacy_version() -> u32 {
    1
}

impl BackupSnapshot {
    pub fn capture(ledger: &Ledger, exported_at: DateTime<Utc>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            exported_at: Some(exported_at),
            transactions: Some(ledger.transactions.clone()),
            categories: Some(ledger.categories.clone()),
            accounts: Some(ledger.accounts.clone()),
            recurring_templates: Some(ledger.recurring_templates.clone()),
        }
    }

    /// Pretty-printed JSON, identical for folder and download targets.
    pub fn to_json(&self) -> BackupResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| BackupError::Storage(format!("snapshot serialization failed: {}", err)))
    }

    /// Parses backup text without touching any ledger.
    pub fn parse(text: &str) -> BackupResult<Self> {
        let value: Value = serde_json::from_str(text.trim_start_matches('\u{feff}'))?;
        if !value.is_object() {
            return Err(BackupError::Parse("expected a JSON object".into()));
        }
        let snapshot: BackupSnapshot = serde_json::from_value(value)?;
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(BackupError::UnsupportedVersion {
                found: snapshot.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        if snapshot.present().is_empty() {
            return Err(BackupError::Parse("no ledger collections found".into()));
        }
        Ok(snapshot)
    }

    /// Collections carried by this snapshot.
    pub fn present(&self) -> Vec<Collection> {
        Collection::ALL
            .into_iter()
            .filter(|collection| match collection {
                Collection::Transactions => self.transactions.is_some(),
                Collection::Categories => self.categories.is_some(),
                Collection::Accounts => self.accounts.is_some(),
                Collection::Recurring => self.recurring_templates.is_some(),
            })
            .collect()
    }

    /// Replaces every collection present in the snapshot; the rest are left alone.
    pub fn apply_to(&self, ledger: &mut Ledger) {
        if let Some(transactions) = &self.transactions {
            ledger.transactions = transactions.clone();
        }
        if let Some(categories) = &self.categories {
            ledger.categories = categories.clone();
        }
        if let Some(accounts) = &self.accounts {
            ledger.accounts = accounts.clone();
        }
        if let Some(templates) = &self.recurring_templates {
            ledger.recurring_templates = templates.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Frequency, TransactionKind};
    use chrono::{NaiveDate, TimeZone};

    fn sample() -> Ledger {
        let mut ledger = Ledger::with_defaults();
        let day = NaiveDate::from_ymd_opt(2025, 2, 14).unwrap();
        let mut txn = Transaction::new(TransactionKind::Expense, 42.5, "food", "acc_2", day)
            .with_note("dinner \"out\"")
            .with_time("19:45");
        txn.id = 1_739_560_000_000;
        ledger.transactions.push(txn);
        let mut template = RecurringTemplate::new(
            "Gym",
            TransactionKind::Expense,
            30.0,
            "entertainment",
            "acc_1",
            Frequency::Monthly,
            day,
        );
        template.id = "tpl-1".into();
        ledger.recurring_templates.push(template);
        ledger
    }

    #[test]
    fn capture_then_parse_is_lossless() {
        let ledger = sample();
        let at = Utc.with_ymd_and_hms(2025, 2, 14, 20, 0, 0).unwrap();
        let json = BackupSnapshot::capture(&ledger, at).to_json().unwrap();
        assert!(json.contains("\"recurringTemplates\""));
        assert!(json.contains("\"exportedAt\""));

        let parsed = BackupSnapshot::parse(&json).unwrap();
        let mut restored = Ledger::new();
        parsed.apply_to(&mut restored);
        assert_eq!(restored, ledger);
    }

    #[test]
    fn older_snapshot_keeps_missing_collections() {
        let mut ledger = sample();
        let text = r#"{"version":1,"transactions":[],"accounts":[]}"#;
        let snapshot = BackupSnapshot::parse(text).unwrap();
        snapshot.apply_to(&mut ledger);
        assert!(ledger.transactions.is_empty());
        assert!(ledger.accounts.is_empty());
        assert_eq!(ledger.categories.len(), 13);
        assert_eq!(ledger.recurring_templates.len(), 1);
    }

    #[test]
    fn malformed_input_is_a_parse_error() {
        for text in ["not json", "[1,2,3]", "{}", r#"{"transactions": 5}"#] {
            let err = BackupSnapshot::parse(text).unwrap_err();
            assert!(matches!(err, BackupError::Parse(_)), "{text}: {err:?}");
        }
    }

    #[test]
    fn newer_versions_are_refused() {
        let err = BackupSnapshot::parse(r#"{"version":2,"transactions":[]}"#).unwrap_err();
        assert!(matches!(
            err,
            BackupError::UnsupportedVersion { found: 2, supported: 1 }
        ));
    }
}

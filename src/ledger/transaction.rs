use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, Result};

pub const DEFAULT_STATUS: &str = "completed";

/// Direction of money movement recorded by a transaction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
}

impl TransactionKind {
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
            TransactionKind::Transfer => "Transfer",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single money movement in the log.
///
/// `id` is the creation instant in milliseconds and serves only as identity and
/// tie-breaking sort key. Reports bucket by `date`, which the user may edit freely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default)]
    pub id: i64,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default)]
    pub category_id: String,
    pub account_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<f64>,
    pub date: NaiveDate,
    #[serde(default)]
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

/// One account-side effect of a transaction on a materialized balance.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceLeg {
    pub account_id: String,
    pub delta: f64,
}

impl Transaction {
    /// Creates an unsaved transaction; the id is assigned when it enters the log.
    pub fn new(
        kind: TransactionKind,
        amount: f64,
        category_id: impl Into<String>,
        account_id: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: 0,
            amount,
            kind,
            category_id: category_id.into(),
            account_id: account_id.into(),
            to_account_id: None,
            fee: None,
            date,
            time: String::new(),
            note: None,
            status: default_status(),
        }
    }

    /// Turns the transaction into a transfer towards `to_account_id`.
    pub fn transfer_to(mut self, to_account_id: impl Into<String>, fee: Option<f64>) -> Self {
        self.kind = TransactionKind::Transfer;
        self.to_account_id = Some(to_account_id.into());
        self.fee = fee;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = time.into();
        self
    }

    pub fn fee_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Transfer => self.fee.unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// Forward balance effects under the fold rules.
    pub fn balance_legs(&self) -> Vec<BalanceLeg> {
        match self.kind {
            TransactionKind::Income => vec![BalanceLeg {
                account_id: self.account_id.clone(),
                delta: self.amount,
            }],
            TransactionKind::Expense => vec![BalanceLeg {
                account_id: self.account_id.clone(),
                delta: -self.amount,
            }],
            TransactionKind::Transfer => {
                let mut legs = vec![BalanceLeg {
                    account_id: self.account_id.clone(),
                    delta: -(self.amount + self.fee_amount()),
                }];
                if let Some(to) = &self.to_account_id {
                    legs.push(BalanceLeg {
                        account_id: to.clone(),
                        delta: self.amount,
                    });
                }
                legs
            }
        }
    }

    /// Inverse of [`Transaction::balance_legs`].
    pub fn reversal_legs(&self) -> Vec<BalanceLeg> {
        self.balance_legs()
            .into_iter()
            .map(|leg| BalanceLeg {
                account_id: leg.account_id,
                delta: -leg.delta,
            })
            .collect()
    }

    /// Mirrors the entry form: non-numeric or non-positive amounts block the save.
    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(LedgerError::Validation(format!(
                "amount must be a positive number, got {}",
                self.amount
            )));
        }
        if self.account_id.trim().is_empty() {
            return Err(LedgerError::Validation("account is required".into()));
        }
        match self.kind {
            TransactionKind::Transfer => {
                let to = self.to_account_id.as_deref().unwrap_or("").trim();
                if to.is_empty() {
                    return Err(LedgerError::Validation(
                        "transfer requires a destination account".into(),
                    ));
                }
                if let Some(fee) = self.fee {
                    if !fee.is_finite() || fee < 0.0 {
                        return Err(LedgerError::Validation(format!(
                            "transfer fee must be zero or positive, got {}",
                            fee
                        )));
                    }
                }
            }
            _ => {
                if self.to_account_id.is_some() || self.fee.is_some() {
                    return Err(LedgerError::Validation(
                        "destination account and fee only apply to transfers".into(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Partial update for [`Transaction`]; `None` keeps the stored value.
///
/// The doubly-optional fields distinguish "leave alone" from "clear".
#[derive(Debug, Clone, Default)]
pub struct TransactionPatch {
    pub amount: Option<f64>,
    pub kind: Option<TransactionKind>,
    pub category_id: Option<String>,
    pub account_id: Option<String>,
    pub to_account_id: Option<Option<String>>,
    pub fee: Option<Option<f64>>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub note: Option<Option<String>>,
    pub status: Option<String>,
}

impl TransactionPatch {
    /// Returns the patched copy of `original`; the id never changes.
    pub fn apply_to(&self, original: &Transaction) -> Transaction {
        let mut next = original.clone();
        if let Some(amount) = self.amount {
            next.amount = amount;
        }
        if let Some(kind) = self.kind {
            next.kind = kind;
        }
        if let Some(category_id) = &self.category_id {
            next.category_id = category_id.clone();
        }
        if let Some(account_id) = &self.account_id {
            next.account_id = account_id.clone();
        }
        if let Some(to) = &self.to_account_id {
            next.to_account_id = to.clone();
        }
        if let Some(fee) = self.fee {
            next.fee = fee;
        }
        if let Some(date) = self.date {
            next.date = date;
        }
        if let Some(time) = &self.time {
            next.time = time.clone();
        }
        if let Some(note) = &self.note {
            next.note = note.clone();
        }
        if let Some(status) = &self.status {
            next.status = status.clone();
        }
        // Leaving the transfer type drops the transfer-only fields.
        if next.kind != TransactionKind::Transfer {
            next.to_account_id = None;
            next.fee = None;
        }
        next
    }
}

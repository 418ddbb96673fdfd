use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::transaction::{Transaction, TransactionKind};

pub const AUTO_NOTE_PREFIX: &str = "[auto]";
const WEEK_DAYS: i64 = 7;

/// How often a recurring template materializes a transaction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    /// Whether a new period has started since `last_generated`.
    ///
    /// At most one period is ever reported, however many have elapsed.
    pub fn is_due(&self, last_generated: NaiveDate, today: NaiveDate) -> bool {
        if today <= last_generated {
            return false;
        }
        match self {
            Frequency::Daily => true,
            Frequency::Weekly => (today - last_generated).num_days() >= WEEK_DAYS,
            Frequency::Monthly => {
                today.month() != last_generated.month() || today.year() != last_generated.year()
            }
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
        };
        f.write_str(label)
    }
}

/// User-defined rule that periodically materializes a transaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecurringTemplate {
    #[serde(default)]
    pub id: String,
    pub label: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default)]
    pub category_id: String,
    pub account_id: String,
    pub frequency: Frequency,
    pub last_generated: NaiveDate,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl RecurringTemplate {
    pub fn new(
        label: impl Into<String>,
        kind: TransactionKind,
        amount: f64,
        category_id: impl Into<String>,
        account_id: impl Into<String>,
        frequency: Frequency,
        last_generated: NaiveDate,
    ) -> Self {
        Self {
            id: String::new(),
            label: label.into(),
            amount,
            kind,
            category_id: category_id.into(),
            account_id: account_id.into(),
            frequency,
            last_generated,
            active: true,
        }
    }

    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.active && self.frequency.is_due(self.last_generated, today)
    }

    /// Builds the transaction this template emits on `today`.
    pub fn materialize(&self, today: NaiveDate, time: impl Into<String>) -> Transaction {
        Transaction::new(
            self.kind,
            self.amount,
            self.category_id.clone(),
            self.account_id.clone(),
            today,
        )
        .with_time(time)
        .with_note(format!("{} {}", AUTO_NOTE_PREFIX, self.label))
    }
}

/// Partial update for [`RecurringTemplate`]. `last_generated` is owned by the scheduler.
#[derive(Debug, Clone, Default)]
pub struct RecurringPatch {
    pub label: Option<String>,
    pub amount: Option<f64>,
    pub kind: Option<TransactionKind>,
    pub category_id: Option<String>,
    pub account_id: Option<String>,
    pub frequency: Option<Frequency>,
    pub active: Option<bool>,
}

impl RecurringPatch {
    pub fn apply(&self, template: &mut RecurringTemplate) {
        if let Some(label) = &self.label {
            template.label = label.clone();
        }
        if let Some(amount) = self.amount {
            template.amount = amount;
        }
        if let Some(kind) = self.kind {
            template.kind = kind;
        }
        if let Some(category_id) = &self.category_id {
            template.category_id = category_id.clone();
        }
        if let Some(account_id) = &self.account_id {
            template.account_id = account_id.clone();
        }
        if let Some(frequency) = self.frequency {
            template.frequency = frequency;
        }
        if let Some(active) = self.active {
            template.active = active;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn daily_fires_on_any_later_date() {
        assert!(Frequency::Daily.is_due(date(2025, 1, 1), date(2025, 1, 2)));
        assert!(!Frequency::Daily.is_due(date(2025, 1, 2), date(2025, 1, 2)));
    }

    #[test]
    fn weekly_needs_seven_full_days() {
        assert!(!Frequency::Weekly.is_due(date(2025, 1, 1), date(2025, 1, 7)));
        assert!(Frequency::Weekly.is_due(date(2025, 1, 1), date(2025, 1, 8)));
    }

    #[test]
    fn monthly_compares_calendar_month_and_year() {
        assert!(!Frequency::Monthly.is_due(date(2025, 1, 1), date(2025, 1, 31)));
        assert!(Frequency::Monthly.is_due(date(2025, 1, 31), date(2025, 2, 1)));
        assert!(Frequency::Monthly.is_due(date(2024, 3, 15), date(2025, 3, 1)));
    }

    #[test]
    fn inactive_templates_are_never_due() {
        let mut template = RecurringTemplate::new(
            "Rent",
            TransactionKind::Expense,
            900.0,
            "housing",
            "acc_1",
            Frequency::Monthly,
            date(2025, 1, 1),
        );
        assert!(template.is_due(date(2025, 2, 1)));
        template.active = false;
        assert!(!template.is_due(date(2025, 2, 1)));
    }

    #[test]
    fn materialized_note_marks_system_generation() {
        let template = RecurringTemplate::new(
            "Salary",
            TransactionKind::Income,
            3000.0,
            "salary",
            "acc_1",
            Frequency::Monthly,
            date(2025, 1, 1),
        );
        let txn = template.materialize(date(2025, 2, 1), "08:00");
        assert_eq!(txn.note.as_deref(), Some("[auto] Salary"));
        assert_eq!(txn.date, date(2025, 2, 1));
        assert_eq!(txn.kind, TransactionKind::Income);
    }
}

//! Recurring template registry and the idempotent due-template scheduler.

use tracing::{info, warn};
use uuid::Uuid;

use super::TransactionService;
use crate::core::time::Clock;
use crate::errors::{LedgerError, Result};
use crate::ledger::{Ledger, RecurringPatch, RecurringTemplate, TransactionKind};

const TIME_FORMAT: &str = "%H:%M";

pub struct RecurringService;

impl RecurringService {
    pub fn add(ledger: &mut Ledger, mut template: RecurringTemplate) -> Result<String> {
        Self::validate(&template)?;
        if template.id.trim().is_empty() {
            template.id = Uuid::new_v4().to_string();
        }
        if ledger.template(&template.id).is_some() {
            return Err(LedgerError::Duplicate(template.id));
        }
        let id = template.id.clone();
        ledger.recurring_templates.push(template);
        Ok(id)
    }

    pub fn update(ledger: &mut Ledger, id: &str, patch: &RecurringPatch) -> Result<()> {
        let template = ledger
            .template_mut(id)
            .ok_or_else(|| LedgerError::TemplateNotFound(id.to_string()))?;
        let mut candidate = template.clone();
        patch.apply(&mut candidate);
        Self::validate(&candidate)?;
        *template = candidate;
        Ok(())
    }

    pub fn set_active(ledger: &mut Ledger, id: &str, active: bool) -> Result<()> {
        let patch = RecurringPatch {
            active: Some(active),
            ..RecurringPatch::default()
        };
        Self::update(ledger, id, &patch)
    }

    pub fn remove(ledger: &mut Ledger, id: &str) -> Result<RecurringTemplate> {
        let index = ledger
            .recurring_templates
            .iter()
            .position(|template| template.id == id)
            .ok_or_else(|| LedgerError::TemplateNotFound(id.to_string()))?;
        Ok(ledger.recurring_templates.remove(index))
    }

    pub fn list(ledger: &Ledger) -> Vec<&RecurringTemplate> {
        ledger.recurring_templates.iter().collect()
    }

    /// Materializes one transaction for every active template whose period has
    /// rolled over since its last generation, then stamps `last_generated` with today.
    ///
    /// Missed periods are never backfilled, and a second run on the same day is a
    /// no-op. A template whose transaction is rejected keeps its old stamp so the
    /// next run retries it. Returns the ids of the generated transactions.
    pub fn run_due(ledger: &mut Ledger, clock: &dyn Clock) -> Vec<i64> {
        let today = clock.today();
        let time = clock.now().format(TIME_FORMAT).to_string();
        let mut generated = Vec::new();

        for index in 0..ledger.recurring_templates.len() {
            let template = &ledger.recurring_templates[index];
            if !template.is_due(today) {
                continue;
            }
            if template.kind == TransactionKind::Transfer {
                warn!(template = %template.id, "recurring transfers are not supported; skipping");
                continue;
            }
            let transaction = template.materialize(today, time.clone());
            let template_id = template.id.clone();
            match TransactionService::add(ledger, transaction, clock) {
                Ok(id) => {
                    ledger.recurring_templates[index].last_generated = today;
                    generated.push(id);
                }
                Err(err) => {
                    warn!(template = %template_id, error = %err, "recurring template could not be materialized");
                }
            }
        }

        if !generated.is_empty() {
            info!(count = generated.len(), %today, "recurring transactions generated");
        }
        generated
    }

    fn validate(template: &RecurringTemplate) -> Result<()> {
        if template.label.trim().is_empty() {
            return Err(LedgerError::Validation("template label is required".into()));
        }
        if !template.amount.is_finite() || template.amount <= 0.0 {
            return Err(LedgerError::Validation(format!(
                "template amount must be positive, got {}",
                template.amount
            )));
        }
        if template.kind == TransactionKind::Transfer {
            return Err(LedgerError::Validation(
                "recurring templates cannot be transfers".into(),
            ));
        }
        if template.account_id.trim().is_empty() {
            return Err(LedgerError::Validation("template account is required".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::FixedClock;
    use crate::ledger::{Frequency, AUTO_NOTE_PREFIX};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn clock_on(day: NaiveDate) -> FixedClock {
        FixedClock::at(day, 8, 0).unwrap()
    }

    fn rent(last: NaiveDate) -> RecurringTemplate {
        RecurringTemplate::new(
            "Rent",
            TransactionKind::Expense,
            900.0,
            "housing",
            "acc_1",
            Frequency::Monthly,
            last,
        )
    }

    #[test]
    fn monthly_template_generates_once_without_backfill() {
        let mut ledger = Ledger::with_defaults();
        RecurringService::add(&mut ledger, rent(date(2025, 1, 15))).unwrap();

        let ids = RecurringService::run_due(&mut ledger, &clock_on(date(2025, 4, 2)));
        assert_eq!(ids.len(), 1);
        let txn = ledger.transaction(ids[0]).unwrap();
        assert_eq!(txn.date, date(2025, 4, 2));
        assert_eq!(txn.note.as_deref(), Some(format!("{} Rent", AUTO_NOTE_PREFIX).as_str()));
        assert_eq!(ledger.recurring_templates[0].last_generated, date(2025, 4, 2));
        assert_eq!(ledger.account("acc_1").unwrap().balance, 49_100.0);
    }

    #[test]
    fn second_run_same_day_is_a_no_op() {
        let mut ledger = Ledger::with_defaults();
        let daily = RecurringTemplate::new(
            "Coffee",
            TransactionKind::Expense,
            3.5,
            "food",
            "acc_2",
            Frequency::Daily,
            date(2025, 3, 9),
        );
        RecurringService::add(&mut ledger, daily).unwrap();
        let clock = clock_on(date(2025, 3, 10));
        assert_eq!(RecurringService::run_due(&mut ledger, &clock).len(), 1);
        assert!(RecurringService::run_due(&mut ledger, &clock).is_empty());
        assert_eq!(ledger.transactions.len(), 1);
    }

    #[test]
    fn weekly_waits_seven_days() {
        let mut ledger = Ledger::with_defaults();
        let weekly = RecurringTemplate::new(
            "Allowance",
            TransactionKind::Income,
            20.0,
            "other_inc",
            "acc_2",
            Frequency::Weekly,
            date(2025, 3, 1),
        );
        RecurringService::add(&mut ledger, weekly).unwrap();
        assert!(RecurringService::run_due(&mut ledger, &clock_on(date(2025, 3, 7))).is_empty());
        assert_eq!(RecurringService::run_due(&mut ledger, &clock_on(date(2025, 3, 8))).len(), 1);
    }

    #[test]
    fn inactive_templates_are_skipped() {
        let mut ledger = Ledger::with_defaults();
        let id = RecurringService::add(&mut ledger, rent(date(2025, 1, 15))).unwrap();
        RecurringService::set_active(&mut ledger, &id, false).unwrap();
        assert!(RecurringService::run_due(&mut ledger, &clock_on(date(2025, 4, 2))).is_empty());
        assert_eq!(ledger.recurring_templates[0].last_generated, date(2025, 1, 15));
    }

    #[test]
    fn transfer_templates_are_rejected() {
        let mut ledger = Ledger::with_defaults();
        let mut template = rent(date(2025, 1, 1));
        template.kind = TransactionKind::Transfer;
        assert!(RecurringService::add(&mut ledger, template).is_err());
    }

    #[test]
    fn failed_materialization_keeps_stamp() {
        let mut ledger = Ledger::with_defaults();
        let mut template = rent(date(2025, 1, 15));
        template.id = "broken".into();
        template.account_id = "acc_1".into();
        ledger.recurring_templates.push(RecurringTemplate {
            amount: -5.0,
            ..template
        });
        assert!(RecurringService::run_due(&mut ledger, &clock_on(date(2025, 4, 2))).is_empty());
        assert_eq!(ledger.recurring_templates[0].last_generated, date(2025, 1, 15));
    }
}

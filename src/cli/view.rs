//! Every screen the CLI can show, as one sum type with per-view payloads.

use std::fmt::Write;

use chrono::NaiveDate;

use super::output::{money, status_kind, styled, MessageKind};
use crate::backup::BackupStatus;
use crate::engine::{BudgetReport, Drift, Forecast, LedgerView};
use crate::ledger::{Ledger, Transaction, TransactionKind};

/// A transaction with its registry labels resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRow {
    pub id: i64,
    pub date: NaiveDate,
    pub time: String,
    pub kind: TransactionKind,
    pub category: String,
    pub account: String,
    pub amount: f64,
    pub note: String,
}

impl TransactionRow {
    pub fn resolve(ledger: &Ledger, txn: &Transaction) -> Self {
        let account = match &txn.to_account_id {
            Some(to) if txn.kind == TransactionKind::Transfer => format!(
                "{} -> {}",
                ledger.account_name(&txn.account_id),
                ledger.account_name(to)
            ),
            _ => ledger.account_name(&txn.account_id).to_string(),
        };
        Self {
            id: txn.id,
            date: txn.date,
            time: txn.time.clone(),
            kind: txn.kind,
            category: ledger.category_label(&txn.category_id).to_string(),
            account,
            amount: txn.amount,
            note: txn.note.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum View {
    Summary { view: LedgerView, drift: Vec<Drift> },
    Transactions(Vec<TransactionRow>),
    Budgets(BudgetReport),
    Trend(Forecast),
    Backups(Vec<String>),
    Status(BackupStatus),
}

impl View {
    pub fn render(&self, currency: &str) -> String {
        let mut out = String::new();
        match self {
            View::Summary { view, drift } => render_summary(&mut out, view, drift, currency),
            View::Transactions(rows) => render_transactions(&mut out, rows, currency),
            View::Budgets(report) => render_budgets(&mut out, report, currency),
            View::Trend(forecast) => render_trend(&mut out, forecast, currency),
            View::Backups(names) => {
                line(&mut out, styled(MessageKind::Section, "Backups"));
                if names.is_empty() {
                    line(&mut out, "No backups found.");
                }
                for name in names {
                    line(&mut out, format!("  {}", name));
                }
            }
            View::Status(status) => line(&mut out, styled(status_kind(status), &status.message)),
        }
        out
    }
}

fn line(out: &mut String, text: impl std::fmt::Display) {
    let _ = writeln!(out, "{}", text);
}

fn render_summary(out: &mut String, view: &LedgerView, drift: &[Drift], currency: &str) {
    line(out, styled(MessageKind::Section, format!("Summary {}", view.today)));
    line(out, format!("Total balance: {}", money(currency, view.total_balance)));
    for account in &view.balances {
        line(out, format!("  {:<20} {}", account.name, money(currency, account.balance)));
    }
    line(out, format!("Spent today: {}", money(currency, view.spent_today)));
    line(
        out,
        format!(
            "This month: income {} / expense {}",
            money(currency, view.month_income),
            money(currency, view.month_expense)
        ),
    );
    if !view.expense_ranking.is_empty() {
        line(out, "Top expenses:");
        for total in &view.expense_ranking {
            line(
                out,
                format!("  {:<20} {} ({})", total.label, money(currency, total.total), total.count),
            );
        }
    }
    for entry in drift {
        line(
            out,
            styled(
                MessageKind::Warning,
                format!(
                    "{} balance {} differs from ledger {}",
                    entry.name,
                    money(currency, entry.recorded),
                    money(currency, entry.expected)
                ),
            ),
        );
    }
}

fn render_transactions(out: &mut String, rows: &[TransactionRow], currency: &str) {
    line(out, styled(MessageKind::Section, "Transactions"));
    if rows.is_empty() {
        line(out, "No transactions recorded.");
        return;
    }
    for row in rows {
        line(
            out,
            format!(
                "{} {} {:<5} {:<8} {:<16} {:<24} {:>12} {}",
                row.id,
                row.date,
                row.time,
                row.kind.label(),
                row.category,
                row.account,
                money(currency, row.amount),
                row.note
            ),
        );
    }
}

fn render_budgets(out: &mut String, report: &BudgetReport, currency: &str) {
    line(out, styled(MessageKind::Section, "Budgets"));
    if report.lines.is_empty() {
        line(out, "No budgets set.");
        return;
    }
    for budget in &report.lines {
        let text = format!(
            "  {:<20} {} / {} ({}%)",
            budget.label,
            money(currency, budget.spent),
            money(currency, budget.budget),
            budget.percent
        );
        if budget.percent > 100 {
            line(out, styled(MessageKind::Warning, text));
        } else {
            line(out, text);
        }
    }
    line(
        out,
        format!(
            "Total: {} / {} ({}%)",
            money(currency, report.total_spent),
            money(currency, report.total_budget),
            report.total_percent
        ),
    );
}

fn render_trend(out: &mut String, forecast: &Forecast, currency: &str) {
    line(out, styled(MessageKind::Section, "Trend"));
    for month in &forecast.history {
        line(
            out,
            format!(
                "  {}-{:02}  income {:>12}  expense {:>12}",
                month.year,
                month.month,
                money(currency, month.income),
                money(currency, month.expense)
            ),
        );
    }
    line(out, "Projection:");
    for (index, (year, month)) in forecast.months.iter().enumerate() {
        line(
            out,
            format!(
                "  {}-{:02}  income {:>12}  expense {:>12}",
                year,
                month,
                money(currency, forecast.income[index]),
                money(currency, forecast.expense[index])
            ),
        );
    }
}

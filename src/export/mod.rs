//! CSV export of the transaction log.

use std::io::Write;

use csv::{QuoteStyle, WriterBuilder};

use crate::errors::{LedgerError, Result};
use crate::ledger::{Ledger, Transaction, TransactionKind};

/// Lets spreadsheet tools detect UTF-8.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
pub const CSV_HEADER: [&str; 8] = [
    "date", "time", "type", "category", "account", "amount", "note", "status",
];

/// Writes every transaction as one fully quoted row, oldest first.
pub fn write_csv<W: Write>(ledger: &Ledger, mut out: W) -> Result<usize> {
    out.write_all(UTF8_BOM)?;
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(out);
    writer.write_record(CSV_HEADER)?;

    let mut rows: Vec<&Transaction> = ledger.transactions.iter().collect();
    rows.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
    for txn in &rows {
        writer.write_record([
            txn.date.format("%Y-%m-%d").to_string(),
            txn.time.clone(),
            txn.kind.label().to_string(),
            category_cell(ledger, txn),
            account_cell(ledger, txn),
            txn.amount.to_string(),
            txn.note.clone().unwrap_or_default(),
            txn.status.clone(),
        ])?;
    }
    writer.flush()?;
    Ok(rows.len())
}

pub fn csv_string(ledger: &Ledger) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(ledger, &mut buffer)?;
    String::from_utf8(buffer).map_err(|err| LedgerError::Storage(err.to_string()))
}

fn category_cell(ledger: &Ledger, txn: &Transaction) -> String {
    if txn.kind == TransactionKind::Transfer && txn.category_id.is_empty() {
        return String::new();
    }
    ledger.category_label(&txn.category_id).to_string()
}

fn account_cell(ledger: &Ledger, txn: &Transaction) -> String {
    let source = ledger.account_name(&txn.account_id);
    match (&txn.kind, &txn.to_account_id) {
        (TransactionKind::Transfer, Some(to)) => {
            format!("{} -> {}", source, ledger.account_name(to))
        }
        _ => source.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, d).unwrap()
    }

    #[test]
    fn output_starts_with_bom_and_quoted_header() {
        let text = csv_string(&Ledger::with_defaults()).unwrap();
        assert!(text.starts_with('\u{feff}'));
        assert_eq!(
            text.trim_start_matches('\u{feff}').trim_end(),
            r#""date","time","type","category","account","amount","note","status""#
        );
    }

    #[test]
    fn notes_with_quotes_are_escaped_and_rows_sorted() {
        let mut ledger = Ledger::with_defaults();
        let mut later = Transaction::new(TransactionKind::Expense, 12.5, "food", "acc_2", day(9))
            .with_time("12:00")
            .with_note("lunch, \"big\"");
        later.id = 2;
        let mut earlier = Transaction::new(TransactionKind::Income, 100.0, "ghost", "acc_1", day(3))
            .with_time("08:00");
        earlier.id = 1;
        ledger.transactions = vec![later, earlier];

        let text = csv_string(&ledger).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            r#""2025-07-03","08:00","Income","unknown","Current Account","100","","completed""#
        );
        assert!(lines[2].contains(r#""lunch, ""big""""#));
    }

    #[test]
    fn transfers_show_both_accounts() {
        let mut ledger = Ledger::with_defaults();
        ledger.transactions.push(
            Transaction::new(TransactionKind::Transfer, 50.0, "", "acc_1", day(1))
                .transfer_to("acc_2", Some(1.0)),
        );
        let text = csv_string(&ledger).unwrap();
        assert!(text.contains(r#""Transfer","","Current Account -> Cash","50""#));
    }
}

//! Fixed-length time-bucketed income/expense series.

use chrono::{Datelike, Duration, NaiveDate};

use crate::ledger::{Transaction, TransactionKind};

/// Reporting period for bucketed series and budget consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// Buckets by day of month.
    Month { year: i32, month: u32 },
    /// Buckets by month of year.
    Year { year: i32 },
}

impl Period {
    pub fn month_of(date: NaiveDate) -> Self {
        Period::Month {
            year: date.year(),
            month: date.month(),
        }
    }

    /// First and last day of the period, or `None` for an invalid month.
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        match *self {
            Period::Month { year, month } => {
                let start = NaiveDate::from_ymd_opt(year, month, 1)?;
                let end = NaiveDate::from_ymd_opt(year, month, days_in_month(year, month))?;
                Some((start, end))
            }
            Period::Year { year } => Some((
                NaiveDate::from_ymd_opt(year, 1, 1)?,
                NaiveDate::from_ymd_opt(year, 12, 31)?,
            )),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.bounds()
            .is_some_and(|(start, end)| date >= start && date <= end)
    }

    pub fn bucket_count(&self) -> usize {
        match *self {
            Period::Month { year, month } => days_in_month(year, month) as usize,
            Period::Year { .. } => 12,
        }
    }

    fn bucket_of(&self, date: NaiveDate) -> Option<usize> {
        if !self.contains(date) {
            return None;
        }
        match self {
            Period::Month { .. } => Some(date.day0() as usize),
            Period::Year { .. } => Some(date.month0() as usize),
        }
    }
}

/// Income and expense summed within one bucket. `index` is 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub index: u32,
    pub income: f64,
    pub expense: f64,
}

/// Buckets income and expense over `period`; empty buckets report zero.
pub fn bucket_series(transactions: &[Transaction], period: Period) -> Vec<Bucket> {
    let mut buckets: Vec<Bucket> = (1..=period.bucket_count() as u32)
        .map(|index| Bucket {
            index,
            income: 0.0,
            expense: 0.0,
        })
        .collect();

    for txn in transactions {
        let Some(slot) = period.bucket_of(txn.date) else {
            continue;
        };
        match txn.kind {
            TransactionKind::Income => buckets[slot].income += txn.amount,
            TransactionKind::Expense => buckets[slot].expense += txn.amount,
            TransactionKind::Transfer => {}
        }
    }
    buckets
}

/// Income and expense totals for one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthTotals {
    pub year: i32,
    pub month: u32,
    pub income: f64,
    pub expense: f64,
}

/// Totals for the `months` calendar months ending with `end_year/end_month`, oldest first.
pub fn monthly_history(
    transactions: &[Transaction],
    end_year: i32,
    end_month: u32,
    months: usize,
) -> Vec<MonthTotals> {
    let mut history: Vec<MonthTotals> = (0..months as i32)
        .rev()
        .map(|back| {
            let (year, month) = shift_month(end_year, end_month, -back);
            MonthTotals {
                year,
                month,
                income: 0.0,
                expense: 0.0,
            }
        })
        .collect();

    for txn in transactions {
        let Some(slot) = history
            .iter_mut()
            .find(|entry| entry.year == txn.date.year() && entry.month == txn.date.month())
        else {
            continue;
        };
        match txn.kind {
            TransactionKind::Income => slot.income += txn.amount,
            TransactionKind::Expense => slot.expense += txn.amount,
            TransactionKind::Transfer => {}
        }
    }
    history
}

/// Moves a (year, month) pair by `delta` months.
pub fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let index = year * 12 + month as i32 - 1 + delta;
    (index.div_euclid(12), (index.rem_euclid(12) + 1) as u32)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = shift_month(year, month, 1);
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .map(|first_next| (first_next - Duration::days(1)).day())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn(kind: TransactionKind, amount: f64, y: i32, m: u32, d: u32) -> Transaction {
        Transaction::new(
            kind,
            amount,
            "food",
            "acc_1",
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
        )
    }

    #[test]
    fn month_series_has_one_bucket_per_day() {
        let series = bucket_series(&[], Period::Month { year: 2025, month: 4 });
        assert_eq!(series.len(), 30);
        assert!(series.iter().all(|b| b.income == 0.0 && b.expense == 0.0));
        assert_eq!(bucket_series(&[], Period::Month { year: 2024, month: 2 }).len(), 29);
        assert_eq!(bucket_series(&[], Period::Year { year: 2024 }).len(), 12);
    }

    #[test]
    fn buckets_use_ledger_date() {
        let txns = vec![
            txn(TransactionKind::Expense, 10.0, 2025, 4, 1),
            txn(TransactionKind::Expense, 5.0, 2025, 4, 30),
            txn(TransactionKind::Income, 100.0, 2025, 4, 30),
            txn(TransactionKind::Expense, 99.0, 2025, 5, 1),
        ];
        let series = bucket_series(&txns, Period::Month { year: 2025, month: 4 });
        assert_eq!(series[0].expense, 10.0);
        assert_eq!(series[29].expense, 5.0);
        assert_eq!(series[29].income, 100.0);
        let total: f64 = series.iter().map(|b| b.expense).sum();
        assert_eq!(total, 15.0);
    }

    #[test]
    fn year_series_buckets_by_month() {
        let txns = vec![
            txn(TransactionKind::Income, 10.0, 2025, 1, 31),
            txn(TransactionKind::Income, 20.0, 2025, 12, 1),
        ];
        let series = bucket_series(&txns, Period::Year { year: 2025 });
        assert_eq!(series[0].income, 10.0);
        assert_eq!(series[11].income, 20.0);
        assert_eq!(series[11].index, 12);
    }

    #[test]
    fn history_crosses_year_boundary() {
        let txns = vec![
            txn(TransactionKind::Expense, 7.0, 2024, 11, 5),
            txn(TransactionKind::Expense, 3.0, 2025, 2, 5),
        ];
        let history = monthly_history(&txns, 2025, 2, 6);
        let months: Vec<_> = history.iter().map(|m| (m.year, m.month)).collect();
        assert_eq!(
            months,
            vec![(2024, 9), (2024, 10), (2024, 11), (2024, 12), (2025, 1), (2025, 2)]
        );
        assert_eq!(history[2].expense, 7.0);
        assert_eq!(history[5].expense, 3.0);
    }

    #[test]
    fn shift_month_wraps_both_ways() {
        assert_eq!(shift_month(2025, 1, -1), (2024, 12));
        assert_eq!(shift_month(2025, 12, 1), (2026, 1));
        assert_eq!(days_in_month(2025, 12), 31);
    }
}

//! Linear-trend projection of monthly totals.

use super::series::{monthly_history, shift_month, MonthTotals};
use crate::ledger::Transaction;

/// Number of trailing months fitted by the projection.
pub const TREND_WINDOW: usize = 6;
/// Number of months projected past the history.
pub const PROJECTION_MONTHS: usize = 3;

/// Projects the next three values from the last six points of `history`.
///
/// Ordinary least squares over `x = 0..n`; projected values are rounded and
/// floored at zero. With fewer than two points every projection repeats the
/// single value, or zero for an empty history.
pub fn project(history: &[f64]) -> [f64; PROJECTION_MONTHS] {
    let window = &history[history.len().saturating_sub(TREND_WINDOW)..];
    let n = window.len();
    match n {
        0 => [0.0; PROJECTION_MONTHS],
        1 => [clamp_money(window[0]); PROJECTION_MONTHS],
        _ => {
            let (slope, intercept) = least_squares(window);
            let mut projected = [0.0; PROJECTION_MONTHS];
            for (step, value) in projected.iter_mut().enumerate() {
                let x = (n + step) as f64;
                *value = clamp_money(slope * x + intercept);
            }
            projected
        }
    }
}

/// Fits `y = slope * x + intercept` with `x` the point index.
fn least_squares(points: &[f64]) -> (f64, f64) {
    let n = points.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = points.iter().sum::<f64>() / n;
    let (mut covariance, mut variance) = (0.0, 0.0);
    for (x, y) in points.iter().enumerate() {
        let dx = x as f64 - mean_x;
        covariance += dx * (y - mean_y);
        variance += dx * dx;
    }
    let slope = if variance == 0.0 {
        0.0
    } else {
        covariance / variance
    };
    (slope, mean_y - slope * mean_x)
}

fn clamp_money(value: f64) -> f64 {
    let rounded = value.round();
    if rounded.is_finite() && rounded > 0.0 {
        rounded
    } else {
        0.0
    }
}

/// Income and expense projections for the months after a given month.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub history: Vec<MonthTotals>,
    /// (year, month) of each projected value.
    pub months: Vec<(i32, u32)>,
    pub income: [f64; PROJECTION_MONTHS],
    pub expense: [f64; PROJECTION_MONTHS],
}

/// Fits the six months ending with `year/month` and projects the next three.
pub fn forecast(transactions: &[Transaction], year: i32, month: u32) -> Forecast {
    let history = monthly_history(transactions, year, month, TREND_WINDOW);
    let income: Vec<f64> = history.iter().map(|m| m.income).collect();
    let expense: Vec<f64> = history.iter().map(|m| m.expense).collect();
    let months = (1..=PROJECTION_MONTHS as i32)
        .map(|ahead| shift_month(year, month, ahead))
        .collect();
    Forecast {
        income: project(&income),
        expense: project(&expense),
        months,
        history,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::TransactionKind;
    use chrono::NaiveDate;

    #[test]
    fn flat_history_projects_flat() {
        assert_eq!(project(&[100.0; 6]), [100.0, 100.0, 100.0]);
    }

    #[test]
    fn rising_history_continues_the_line() {
        let history = [100.0, 200.0, 300.0, 400.0, 500.0, 600.0];
        assert_eq!(project(&history), [700.0, 800.0, 900.0]);
    }

    #[test]
    fn falling_history_clamps_at_zero() {
        let history = [600.0, 500.0, 400.0, 300.0, 200.0, 100.0];
        assert_eq!(project(&history), [0.0, 0.0, 0.0]);
        let steep = [900.0, 500.0, 300.0, 100.0, 50.0, 10.0];
        assert!(project(&steep).iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn degenerate_histories() {
        assert_eq!(project(&[]), [0.0, 0.0, 0.0]);
        assert_eq!(project(&[42.4]), [42.0, 42.0, 42.0]);
        assert_eq!(project(&[-5.0]), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn only_last_six_points_are_fitted() {
        let history = [5000.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0];
        assert_eq!(project(&history), [100.0, 100.0, 100.0]);
    }

    #[test]
    fn forecast_uses_ledger_dates_and_labels_next_months() {
        let txns: Vec<Transaction> = (7..=12)
            .map(|m| {
                Transaction::new(
                    TransactionKind::Expense,
                    100.0,
                    "food",
                    "acc_1",
                    NaiveDate::from_ymd_opt(2024, m, 10).unwrap(),
                )
            })
            .collect();
        let forecast = forecast(&txns, 2024, 12);
        assert_eq!(forecast.expense, [100.0, 100.0, 100.0]);
        assert_eq!(forecast.income, [0.0, 0.0, 0.0]);
        assert_eq!(forecast.months, vec![(2025, 1), (2025, 2), (2025, 3)]);
        assert_eq!(forecast.history.len(), TREND_WINDOW);
    }
}

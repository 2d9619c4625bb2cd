//! Volatility statistics over the returns table.
//!
//! Standard deviation of daily returns measures risk; the annualized figure
//! scales by the square root of the trading-day count.

use crate::data::TickerFrame;

/// Trading days per year, used for annualization.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Per-ticker volatility summary.
#[derive(Debug, Clone, PartialEq)]
pub struct VolatilityStat {
    pub ticker: String,
    /// Sample standard deviation of daily returns (NaNs skipped).
    pub daily_std: f64,
    /// Daily std scaled by sqrt(252).
    pub annual_std: f64,
}

/// Compute volatility for every column of a returns frame, in column order.
///
/// A column with fewer than two finite observations has no meaningful
/// deviation and reports NaN.
pub fn volatility(returns: &TickerFrame) -> Vec<VolatilityStat> {
    returns
        .tickers()
        .iter()
        .map(|ticker| {
            let daily_std = sample_std(returns.column(ticker).unwrap_or(&[]));
            VolatilityStat {
                ticker: ticker.clone(),
                daily_std,
                annual_std: daily_std * TRADING_DAYS_PER_YEAR.sqrt(),
            }
        })
        .collect()
}

/// Sample standard deviation (n-1 denominator), skipping NaN observations.
fn sample_std(values: &[f64]) -> f64 {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let n = finite.len();
    if n < 2 {
        return f64::NAN;
    }
    let mean = finite.iter().sum::<f64>() / n as f64;
    let var = finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn std_matches_hand_computation() {
        // Values 0.01, 0.03: mean 0.02, sample variance 2e-4, std ~0.01414.
        let frame = TickerFrame::new(
            vec![d(2), d(3)],
            vec!["A".into()],
            vec![vec![0.01, 0.03]],
        );
        let stats = volatility(&frame);
        assert_eq!(stats.len(), 1);
        assert!((stats[0].daily_std - 0.014142135623).abs() < 1e-9);
        assert!((stats[0].annual_std - 0.014142135623 * 252.0_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn nan_observations_are_skipped() {
        let with_gap = TickerFrame::new(
            vec![d(2), d(3), d(4)],
            vec!["A".into()],
            vec![vec![0.01, f64::NAN, 0.03]],
        );
        let without_gap = TickerFrame::new(
            vec![d(2), d(3)],
            vec!["A".into()],
            vec![vec![0.01, 0.03]],
        );
        assert_eq!(
            volatility(&with_gap)[0].daily_std,
            volatility(&without_gap)[0].daily_std
        );
    }

    #[test]
    fn too_few_observations_report_nan() {
        let frame = TickerFrame::new(vec![d(2)], vec!["A".into()], vec![vec![0.01]]);
        assert!(volatility(&frame)[0].daily_std.is_nan());
    }

    #[test]
    fn column_order_is_preserved() {
        let frame = TickerFrame::new(
            vec![d(2), d(3)],
            vec!["B".into(), "A".into()],
            vec![vec![0.01, 0.02], vec![0.03, 0.04]],
        );
        let stats = volatility(&frame);
        assert_eq!(stats[0].ticker, "B");
        assert_eq!(stats[1].ticker, "A");
    }
}

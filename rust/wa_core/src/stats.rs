//! Performance statistics over a daily strategy return series.
//!
//! Sharpe, volatility, drawdown and win rate, annualized on 252 trading days.

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BacktestMetrics {
    pub sharpe: f64,
    pub total_return: f64,
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    /// Largest peak-to-trough decline, as a non-positive fraction.
    pub max_drawdown: f64,
    pub win_rate: f64,
    pub market_total_return: f64,
}

/// Compute every metric. Empty input yields all zeros.
pub fn compute_metrics(strategy_returns: &[f64], market_returns: &[f64]) -> BacktestMetrics {
    let n = strategy_returns.len();
    if n == 0 {
        return BacktestMetrics::default();
    }

    let curve = cumulative(strategy_returns);
    let total_return = curve.last().copied().unwrap_or(1.0) - 1.0;
    let market_total_return = cumulative(market_returns).last().copied().unwrap_or(1.0) - 1.0;

    let annualized_return = mean(strategy_returns) * TRADING_DAYS_PER_YEAR;
    let annualized_volatility = std_dev(strategy_returns) * TRADING_DAYS_PER_YEAR.sqrt();
    let sharpe = if annualized_volatility != 0.0 {
        annualized_return / annualized_volatility
    } else {
        0.0
    };

    let wins = strategy_returns.iter().filter(|&&r| r > 0.0).count();

    BacktestMetrics {
        sharpe,
        total_return,
        annualized_return,
        annualized_volatility,
        max_drawdown: max_drawdown(&curve),
        win_rate: wins as f64 / n as f64,
        market_total_return,
    }
}

/// Running product of `1 + r`, starting from 1.
pub fn cumulative(returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(1.0, |acc, &r| {
            *acc *= 1.0 + r;
            Some(*acc)
        })
        .collect()
}

/// Minimum of `(c - peak) / peak`, the peak being the running max of the
/// curve itself.
pub fn max_drawdown(curve: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd: f64 = 0.0;
    for &c in curve {
        peak = peak.max(c);
        if peak != 0.0 {
            max_dd = max_dd.min((c - peak) / peak);
        }
    }
    max_dd
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 || values.iter().all(|&v| v == values[0]) {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|&x| (x - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_empty() {
        assert_eq!(compute_metrics(&[], &[]), BacktestMetrics::default());
    }

    #[test]
    fn metrics_simple_returns() {
        let returns = vec![0.01, -0.005, 0.02, -0.01, 0.015];
        let m = compute_metrics(&returns, &returns);
        let expected_total = returns.iter().fold(1.0, |acc, r| acc * (1.0 + r)) - 1.0;
        assert!((m.total_return - expected_total).abs() < 1e-12);
        assert!((m.market_total_return - expected_total).abs() < 1e-12);
        assert!((m.annualized_return - 0.006 * 252.0).abs() < 1e-12);
        assert!(m.sharpe > 0.0);
        assert_eq!(m.win_rate, 0.6);
    }

    #[test]
    fn zero_volatility_gives_zero_sharpe() {
        let m = compute_metrics(&[0.01; 10], &[0.0; 10]);
        assert_eq!(m.annualized_volatility, 0.0);
        assert_eq!(m.sharpe, 0.0);

        let single = compute_metrics(&[0.03], &[0.01]);
        assert_eq!(single.sharpe, 0.0);
        assert!((single.total_return - 0.03).abs() < 1e-12);
    }

    #[test]
    fn drawdown_calculation() {
        // 1.1 -> 0.9: 18.18% off the peak
        let curve = cumulative(&[0.10, -0.18182]);
        let dd = max_drawdown(&curve);
        assert!((dd + 0.18182).abs() < 1e-4);
    }

    #[test]
    fn drawdown_zero_when_non_decreasing() {
        assert_eq!(max_drawdown(&cumulative(&[0.01, 0.0, 0.02, 0.0])), 0.0);
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    #[test]
    fn drawdown_measured_from_first_observation() {
        // the curve starts below 1 but never falls under its own running peak
        assert_eq!(max_drawdown(&cumulative(&[-0.05, 0.01])), 0.0);
    }

    #[test]
    fn drawdown_never_positive() {
        let returns: Vec<f64> = (0..200).map(|i| ((i as f64) * 0.37).sin() * 0.03).collect();
        let m = compute_metrics(&returns, &returns);
        assert!(m.max_drawdown <= 0.0);
        assert!(m.max_drawdown > -1.0);
    }

    #[test]
    fn volatility_uses_sample_std() {
        let m = compute_metrics(&[0.01, -0.01], &[0.0, 0.0]);
        let expected = (0.0002f64).sqrt() * 252f64.sqrt();
        assert!((m.annualized_volatility - expected).abs() < 1e-12);
    }
}

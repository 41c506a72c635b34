//! Cross-sectional long/short backtest over the lagged composite score.
//!
//! Each trading day the universe is ranked on its lagged signal. The lowest
//! `k` form the long bucket and the highest `k` the short bucket, each held
//! at half weight, equal-weighted inside the bucket. When `2k > n` the two
//! buckets overlap; that is accepted.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use polars::prelude::*;
use tracing::debug;

use crate::conditioner::{condition, TradableRow};
use crate::config::BacktestParams;
use crate::dataset::Panel;
use crate::error::Result;
use crate::stats::{self, cumulative, BacktestMetrics};
use crate::types::format_date;

/// Outcome of one trading day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyDay {
    pub date: NaiveDate,
    pub strategy_return: f64,
    pub market_return: f64,
    /// Companies ranked that day.
    pub universe: usize,
    /// Members of each of the long and short buckets.
    pub bucket_size: usize,
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub params: BacktestParams,
    pub days: Vec<StrategyDay>,
    pub cum_strategy: Vec<f64>,
    pub cum_market: Vec<f64>,
    pub metrics: BacktestMetrics,
}

impl BacktestResult {
    pub fn strategy_returns(&self) -> Vec<f64> {
        self.days.iter().map(|d| d.strategy_return).collect()
    }

    pub fn market_returns(&self) -> Vec<f64> {
        self.days.iter().map(|d| d.market_return).collect()
    }

    /// Columns: `date, strategy, market, cum_strategy, cum_market`.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let dates: Vec<String> = self.days.iter().map(|d| format_date(d.date)).collect();
        DataFrame::new(vec![
            Column::new("date".into(), &dates),
            Column::new("strategy".into(), &self.strategy_returns()),
            Column::new("market".into(), &self.market_returns()),
            Column::new("cum_strategy".into(), &self.cum_strategy),
            Column::new("cum_market".into(), &self.cum_market),
        ])
    }
}

/// `max(1, floor(n * quantile))`.
pub fn bucket_size(n: usize, quantile: f64) -> usize {
    ((n as f64 * quantile).floor() as usize).max(1)
}

fn mean_return(rows: &[TradableRow]) -> f64 {
    rows.iter().map(|r| r.ret).sum::<f64>() / rows.len() as f64
}

/// Rank one day's cross-section. `None` when fewer than two companies trade.
pub fn trade_day(date: NaiveDate, rows: &mut [TradableRow], quantile: f64) -> Option<StrategyDay> {
    let n = rows.len();
    if n < 2 {
        return None;
    }
    let k = bucket_size(n, quantile);
    rows.sort_by(|a, b| a.signal.total_cmp(&b.signal).then(a.company_id.cmp(&b.company_id)));

    let long = &rows[..k];
    let short = &rows[n - k..];

    Some(StrategyDay {
        date,
        strategy_return: 0.5 * mean_return(long) - 0.5 * mean_return(short),
        market_return: mean_return(rows),
        universe: n,
        bucket_size: k,
    })
}

/// Day-by-day results in date order.
pub fn simulate(tradable: Vec<TradableRow>, quantile: f64) -> Vec<StrategyDay> {
    let mut by_date: BTreeMap<NaiveDate, Vec<TradableRow>> = BTreeMap::new();
    for row in tradable {
        by_date.entry(row.date).or_default().push(row);
    }
    by_date
        .into_iter()
        .filter_map(|(date, mut rows)| trade_day(date, &mut rows, quantile))
        .collect()
}

pub fn run_backtest(panel: &Panel, params: &BacktestParams) -> Result<BacktestResult> {
    params.validate()?;

    let tradable = condition(panel, params.smoothing);
    let days = simulate(tradable, params.quantile);

    let strategy: Vec<f64> = days.iter().map(|d| d.strategy_return).collect();
    let market: Vec<f64> = days.iter().map(|d| d.market_return).collect();
    let metrics = stats::compute_metrics(&strategy, &market);

    debug!(
        quantile = params.quantile,
        smoothing = params.smoothing,
        days = days.len(),
        sharpe = metrics.sharpe,
        "backtest complete"
    );

    Ok(BacktestResult {
        params: *params,
        cum_strategy: cumulative(&strategy),
        cum_market: cumulative(&market),
        days,
        metrics,
    })
}

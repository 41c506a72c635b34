//! Parallel grid sweep over `(quantile, smoothing)`.
//!
//! Every combination runs a full backtest on the same panel, shared by
//! reference across a dedicated rayon pool. Results come back in grid order.

use polars::prelude::*;
use rayon::prelude::*;
use tracing::info;

use crate::backtest::run_backtest;
use crate::config::{Objective, SweepConfig};
use crate::dataset::Panel;
use crate::error::Result;
use crate::stats::BacktestMetrics;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepRow {
    pub quantile: f64,
    pub smoothing: usize,
    pub sharpe: f64,
    pub total_return: f64,
    pub annualized_volatility: f64,
    pub max_drawdown: f64,
    pub win_rate: f64,
}

impl SweepRow {
    fn new(quantile: f64, smoothing: usize, m: &BacktestMetrics) -> Self {
        Self {
            quantile,
            smoothing,
            sharpe: m.sharpe,
            total_return: m.total_return,
            annualized_volatility: m.annualized_volatility,
            max_drawdown: m.max_drawdown,
            win_rate: m.win_rate,
        }
    }

    pub fn score(&self, objective: Objective) -> f64 {
        match objective {
            Objective::Sharpe => self.sharpe,
            Objective::TotalReturn => self.total_return,
            // drawdowns are non-positive, so the largest is the shallowest
            Objective::MaxDrawdown => self.max_drawdown,
            Objective::WinRate => self.win_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepReport {
    pub objective: Objective,
    /// One row per combination, quantile-major.
    pub rows: Vec<SweepRow>,
    pub best: Option<SweepRow>,
}

impl SweepReport {
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let metric = |name: &str, f: fn(&SweepRow) -> f64| {
            let values: Vec<f64> = self.rows.iter().map(f).collect();
            Column::new(name.into(), &values)
        };
        let smoothing: Vec<u64> = self.rows.iter().map(|r| r.smoothing as u64).collect();

        DataFrame::new(vec![
            metric("quantile", |r: &SweepRow| r.quantile),
            Column::new("smoothing".into(), &smoothing),
            metric("sharpe", |r: &SweepRow| r.sharpe),
            metric("total_return", |r: &SweepRow| r.total_return),
            metric("annualized_volatility", |r: &SweepRow| r.annualized_volatility),
            metric("max_drawdown", |r: &SweepRow| r.max_drawdown),
            metric("win_rate", |r: &SweepRow| r.win_rate),
        ])
    }
}

/// First row with the highest score. NaN scores never win.
pub fn select_best(rows: &[SweepRow], objective: Objective) -> Option<SweepRow> {
    let mut best: Option<SweepRow> = None;
    for row in rows.iter().filter(|r| !r.score(objective).is_nan()) {
        match best {
            Some(b) if row.score(objective) > b.score(objective) => best = Some(*row),
            None => best = Some(*row),
            _ => {}
        }
    }
    best
}

pub fn optimize(panel: &Panel, config: &SweepConfig) -> Result<SweepReport> {
    config.validate()?;
    let grid = config.grid();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers.unwrap_or(0))
        .build()?;

    let rows = pool.install(|| {
        grid.par_iter()
            .map(|params| {
                let result = run_backtest(panel, params)?;
                Ok(SweepRow::new(params.quantile, params.smoothing, &result.metrics))
            })
            .collect::<Result<Vec<_>>>()
    })?;

    let best = select_best(&rows, config.objective);
    if let Some(b) = &best {
        info!(
            combinations = rows.len(),
            threads = pool.current_num_threads(),
            quantile = b.quantile,
            smoothing = b.smoothing,
            objective = ?config.objective,
            score = b.score(config.objective),
            "sweep complete"
        );
    }

    Ok(SweepReport { objective: config.objective, rows, best })
}

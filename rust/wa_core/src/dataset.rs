//! Factor × price panel the backtest runs on.
//!
//! Factor rows are inner-joined with closes on `(company_id, date)` and
//! sorted by company then date. A company-day missing from either side
//! simply drops out of the join.

use chrono::NaiveDate;
use polars::prelude::*;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::store::WorkforceStore;
use crate::types::{format_date, parse_date, DailyFactorRecord, MarketPriceSnapshot};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelRow {
    pub company_id: i64,
    pub date: NaiveDate,
    pub close: f64,
    pub wsi: f64,
}

/// Immutable joined dataset, sorted by `(company_id, date)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Panel {
    rows: Vec<PanelRow>,
}

impl Panel {
    pub fn from_rows(mut rows: Vec<PanelRow>) -> Self {
        rows.sort_by(|a, b| a.company_id.cmp(&b.company_id).then(a.date.cmp(&b.date)));
        Self { rows }
    }

    pub fn rows(&self) -> &[PanelRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Contiguous per-company slices in company order.
    pub fn companies(&self) -> impl Iterator<Item = &[PanelRow]> {
        self.rows.chunk_by(|a, b| a.company_id == b.company_id)
    }
}

pub fn factor_frame(records: &[DailyFactorRecord]) -> PolarsResult<DataFrame> {
    let ids: Vec<i64> = records.iter().map(|r| r.company_id).collect();
    let dates: Vec<String> = records.iter().map(|r| format_date(r.date)).collect();
    let pev: Vec<f64> = records.iter().map(|r| r.pev_score).collect();
    let exodus: Vec<f64> = records.iter().map(|r| r.exodus_score).collect();
    let hiring: Vec<f64> = records.iter().map(|r| r.hiring_freeze_score).collect();
    let exec: Vec<f64> = records.iter().map(|r| r.exec_volatility).collect();
    let wsi: Vec<f64> = records.iter().map(|r| r.wsi_composite).collect();

    DataFrame::new(vec![
        Column::new("company_id".into(), &ids),
        Column::new("date".into(), &dates),
        Column::new("pev_score".into(), &pev),
        Column::new("exodus_score".into(), &exodus),
        Column::new("hiring_freeze_score".into(), &hiring),
        Column::new("exec_volatility".into(), &exec),
        Column::new("wsi_composite".into(), &wsi),
    ])
}

pub fn price_frame(prices: &[MarketPriceSnapshot]) -> PolarsResult<DataFrame> {
    let ids: Vec<i64> = prices.iter().map(|p| p.company_id).collect();
    let dates: Vec<String> = prices.iter().map(|p| format_date(p.date)).collect();
    let closes: Vec<f64> = prices.iter().map(|p| p.close).collect();

    DataFrame::new(vec![
        Column::new("company_id".into(), &ids),
        Column::new("date".into(), &dates),
        Column::new("close".into(), &closes),
    ])
}

/// Inner join on `(company_id, date)` and materialize the panel.
pub fn join_panel(factors: &DataFrame, prices: &DataFrame) -> Result<Panel> {
    let joined = factors
        .clone()
        .lazy()
        .join(
            prices.clone().lazy(),
            [col("company_id"), col("date")],
            [col("company_id"), col("date")],
            JoinArgs::new(JoinType::Inner),
        )
        .select([col("company_id"), col("date"), col("close"), col("wsi_composite")])
        .sort(["company_id", "date"], SortMultipleOptions::default())
        .collect()?;

    let ids = joined.column("company_id")?.i64()?;
    let dates = joined.column("date")?.str()?;
    let closes = joined.column("close")?.f64()?;
    let wsi = joined.column("wsi_composite")?.f64()?;

    let entity = "panel row";
    let mut rows = Vec::with_capacity(joined.height());
    for i in 0..joined.height() {
        let (Some(company_id), Some(date), Some(close), Some(wsi)) =
            (ids.get(i), dates.get(i), closes.get(i), wsi.get(i))
        else {
            return Err(Error::integrity(entity, format!("null value in joined row {i}")));
        };
        rows.push(PanelRow { company_id, date: parse_date(entity, date)?, close, wsi });
    }

    Ok(Panel::from_rows(rows))
}

/// Read factors and prices from the store and join them.
pub fn load_panel<S: WorkforceStore + ?Sized>(store: &mut S) -> Result<Panel> {
    let factors = store.daily_factors()?;
    let mut prices = Vec::new();
    let mut missing = 0usize;
    for raw in store.market_prices()? {
        match raw.validate()? {
            Some(p) => prices.push(p),
            None => missing += 1,
        }
    }
    debug!(factors = factors.len(), prices = prices.len(), missing_close = missing, "loaded backtest inputs");

    let panel = join_panel(&factor_frame(&factors)?, &price_frame(&prices)?)?;
    info!(rows = panel.len(), "backtest panel ready");
    Ok(panel)
}

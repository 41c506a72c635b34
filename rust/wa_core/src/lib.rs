//! Workforce Stress Index.
//!
//! Daily per-company workforce factors derived from HR events and job
//! postings, a cross-sectionally standardized composite score, and a
//! long/short backtest with a parallel parameter sweep on top of it.
//!
//! Persistence sits behind [`store::WorkforceStore`]; the SQLite adapter
//! lives in the `wa_store` crate.

pub mod backtest;
pub mod calendar;
pub mod conditioner;
pub mod config;
pub mod dataset;
pub mod error;
pub mod factors;
pub mod normalize;
pub mod rolling;
pub mod signals;
pub mod stats;
pub mod store;
pub mod sweep;
pub mod types;

pub use backtest::{run_backtest, BacktestResult, StrategyDay};
pub use config::{BacktestParams, FactorConfig, Objective, SweepConfig, WsiConfig};
pub use dataset::{load_panel, Panel};
pub use error::{Error, Result};
pub use signals::{compute_signals, SignalRunReport};
pub use stats::BacktestMetrics;
pub use store::{MemoryStore, WorkforceStore};
pub use sweep::{optimize, SweepReport, SweepRow};
pub use types::DailyFactorRecord;

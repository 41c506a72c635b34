//! Layered run configuration.
//!
//! Sources, highest precedence first:
//! 1. Environment variables with the `WSI_` prefix, `__` separating sections
//!    (`WSI_BACKTEST__QUANTILE=0.2`, `WSI_SWEEP__WORKERS=4`)
//! 2. `wsi.toml` in the working directory, if present
//! 3. Built-in defaults
//!
//! [`WsiConfig::load_with_dotenv`] reads a `.env` file first.

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::factors::DEFAULT_WINDOW;

pub const CONFIG_FILE: &str = "wsi.toml";
pub const ENV_PREFIX: &str = "WSI_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorConfig {
    /// Trailing window length in calendar days.
    pub window: usize,
}

impl Default for FactorConfig {
    fn default() -> Self {
        Self { window: DEFAULT_WINDOW }
    }
}

impl FactorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(Error::invalid("window", "must be at least 1"));
        }
        Ok(())
    }
}

/// Parameters for a single long/short backtest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestParams {
    /// Fraction of the cross-section in each bucket, in `(0, 0.5]`.
    pub quantile: f64,
    /// Trailing mean length applied to the composite before lagging.
    pub smoothing: usize,
}

impl Default for BacktestParams {
    fn default() -> Self {
        Self { quantile: 0.4, smoothing: 3 }
    }
}

impl BacktestParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.quantile > 0.0 && self.quantile <= 0.5) {
            return Err(Error::invalid("quantile", format!("{} is outside (0, 0.5]", self.quantile)));
        }
        if self.smoothing == 0 {
            return Err(Error::invalid("smoothing", "must be at least 1"));
        }
        Ok(())
    }
}

/// Metric the sweep maximizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    #[default]
    Sharpe,
    TotalReturn,
    MaxDrawdown,
    WinRate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub quantiles: Vec<f64>,
    pub smoothings: Vec<usize>,
    pub objective: Objective,
    /// Worker threads; `None` uses every core.
    pub workers: Option<usize>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            quantiles: vec![0.1, 0.2, 0.3, 0.4, 0.5],
            smoothings: vec![1, 3, 5, 10],
            objective: Objective::Sharpe,
            workers: None,
        }
    }
}

impl SweepConfig {
    /// Every `(quantile, smoothing)` pair, quantile-major.
    pub fn grid(&self) -> Vec<BacktestParams> {
        self.quantiles
            .iter()
            .flat_map(|&quantile| {
                self.smoothings
                    .iter()
                    .map(move |&smoothing| BacktestParams { quantile, smoothing })
            })
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.quantiles.is_empty() || self.smoothings.is_empty() {
            return Err(Error::invalid("sweep grid", "quantile and smoothing sets must be non-empty"));
        }
        if self.workers == Some(0) {
            return Err(Error::invalid("workers", "must be at least 1"));
        }
        self.grid().iter().try_for_each(BacktestParams::validate)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WsiConfig {
    /// SQLite database path handed to the store adapter.
    pub database_url: String,
    pub factors: FactorConfig,
    pub backtest: BacktestParams,
    pub sweep: SweepConfig,
}

impl Default for WsiConfig {
    fn default() -> Self {
        Self {
            database_url: "data/db/quant.db".into(),
            factors: FactorConfig::default(),
            backtest: BacktestParams::default(),
            sweep: SweepConfig::default(),
        }
    }
}

impl WsiConfig {
    pub fn figment() -> Figment {
        Self::figment_from(Path::new(CONFIG_FILE))
    }

    pub fn figment_from(path: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if path.exists() {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load and validate from defaults, `wsi.toml` and the environment.
    pub fn load() -> Result<Self> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`load`](Self::load), after reading `.env` if one exists.
    pub fn load_with_dotenv() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::load()
    }

    pub fn validate(&self) -> Result<()> {
        self.factors.validate()?;
        self.backtest.validate()?;
        self.sweep.validate()
    }
}

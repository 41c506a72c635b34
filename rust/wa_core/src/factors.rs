//! Per-company rolling factor engine.
//!
//! Turns one company's irregular event stream and job-posting snapshots into
//! daily raw scores on its own calendar axis:
//!
//! - `pev`: promotions + title changes over the window, per head
//! - `exodus`: smoothed ratio of departures to hires over the window
//! - `hiring_momentum`: change in open roles versus `window` days earlier
//! - `exec_volatility`: executive joins + leaves over the window, per ever-executive
//!
//! Companies are independent until cross-sectional normalization, so
//! [`compute_universe`] fans them out over rayon.

use chrono::NaiveDate;
use rayon::prelude::*;

use crate::calendar::{forward_fill_open_roles, reindex_events, DailyAxis, DailyCounts};
use crate::rolling::{lag, trailing_sum};
use crate::types::{JobPostingSnapshot, WorkforceEvent};

pub const DEFAULT_WINDOW: usize = 30;

/// Everything the engine needs for one company, already validated.
#[derive(Debug, Clone, Default)]
pub struct CompanyHistory {
    pub company_id: i64,
    pub events: Vec<WorkforceEvent>,
    pub postings: Vec<JobPostingSnapshot>,
    /// Every employee row on record for the company, active or not.
    pub employee_count: usize,
    /// Employees whose current seniority is EXEC.
    pub exec_count: usize,
}

/// Un-normalized scores for one company on one day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorRow {
    pub company_id: i64,
    pub date: NaiveDate,
    pub pev: f64,
    pub exodus: f64,
    pub hiring_momentum: f64,
    pub exec_volatility: f64,
}

/// Headcount per axis day, walked backward from `terminal`.
///
/// This is an approximation. `terminal` is the count of every employee on
/// record as of the latest snapshot, not a point-in-time active headcount,
/// so the series inherits whatever that count over- or under-states.
pub fn reconstruct_headcount(terminal: i64, counts: &DailyCounts) -> Vec<i64> {
    let len = counts.joins.len();
    let mut headcount = vec![0; len];
    let mut current = terminal;
    for i in (0..len).rev() {
        headcount[i] = current;
        current = current - counts.joins[i] + counts.leaves[i];
    }
    headcount
}

/// Raw factor rows for a single company. Empty when the company has no
/// events or the history is too short to fill every window.
pub fn compute_company_factors(history: &CompanyHistory, window: usize) -> Vec<FactorRow> {
    let Some(axis) = DailyAxis::spanning(history.events.iter().map(|e| e.date)) else {
        return Vec::new();
    };

    let counts = reindex_events(&axis, &history.events);
    let headcount = reconstruct_headcount(history.employee_count as i64, &counts);

    let advancement = trailing_sum(&counts.advancement(), window);
    let joins = trailing_sum(&counts.joins, window);
    let leaves = trailing_sum(&counts.leaves, window);
    let exec_churn = trailing_sum(&counts.exec_churn(), window);

    let open_roles = forward_fill_open_roles(&axis, &history.postings);
    let open_roles_prior = lag(&open_roles.iter().copied().map(Some).collect::<Vec<_>>(), window);

    let exec_base = history.exec_count.max(1) as f64;

    axis.dates()
        .enumerate()
        .filter_map(|(i, date)| {
            let promos = advancement[i]?;
            let joined = joins[i]?;
            let left = leaves[i]?;
            let churn = exec_churn[i]?;
            let prior = open_roles_prior[i]?;

            Some(FactorRow {
                company_id: history.company_id,
                date,
                pev: promos as f64 / headcount[i].max(1) as f64,
                exodus: (left + 1) as f64 / (joined + 1) as f64,
                hiring_momentum: (open_roles[i] - prior) as f64 / (prior + 1) as f64,
                exec_volatility: churn as f64 / exec_base,
            })
        })
        .collect()
}

/// Raw factor rows for every company, sorted by `(company_id, date)`.
pub fn compute_universe(histories: &[CompanyHistory], window: usize) -> Vec<FactorRow> {
    let mut rows: Vec<FactorRow> = histories
        .par_iter()
        .flat_map_iter(|h| compute_company_factors(h, window))
        .collect();
    rows.sort_by(|a, b| a.company_id.cmp(&b.company_id).then(a.date.cmp(&b.date)));
    rows
}

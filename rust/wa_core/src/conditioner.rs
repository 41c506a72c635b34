//! Turns the panel into tradable rows: per-company returns paired with a
//! smoothed composite lagged by one observation.
//!
//! The score seen at row t-1 ranks the return realized from t-1 to t, so no
//! row is ever ranked on information from its own period.

use chrono::NaiveDate;

use crate::dataset::Panel;
use crate::rolling::{lag, trailing_mean};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradableRow {
    pub company_id: i64,
    pub date: NaiveDate,
    pub ret: f64,
    pub signal: f64,
}

/// Simple returns between consecutive observations. The first is undefined,
/// as is any return off a non-positive close.
pub fn simple_returns(closes: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(closes.len());
    if closes.is_empty() {
        return out;
    }
    out.push(None);
    out.extend(
        closes
            .windows(2)
            .map(|w| (w[0] > 0.0).then(|| w[1] / w[0] - 1.0)),
    );
    out
}

/// Rows with both a defined return and a defined lagged signal.
pub fn condition(panel: &Panel, smoothing: usize) -> Vec<TradableRow> {
    let mut out = Vec::with_capacity(panel.len());
    for rows in panel.companies() {
        let closes: Vec<f64> = rows.iter().map(|r| r.close).collect();
        let scores: Vec<f64> = rows.iter().map(|r| r.wsi).collect();

        let returns = simple_returns(&closes);
        let signals = lag(&trailing_mean(&scores, smoothing), 1);

        out.extend(rows.iter().zip(returns).zip(signals).filter_map(|((row, ret), signal)| {
            Some(TradableRow {
                company_id: row.company_id,
                date: row.date,
                ret: ret?,
                signal: signal?,
            })
        }));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::PanelRow;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 2, day).unwrap()
    }

    fn panel(company_id: i64, closes: &[f64], wsi: &[f64]) -> Vec<PanelRow> {
        closes
            .iter()
            .zip(wsi)
            .enumerate()
            .map(|(i, (&close, &wsi))| PanelRow { company_id, date: d(i as u32 + 1), close, wsi })
            .collect()
    }

    #[test]
    fn returns_between_rows() {
        let r = simple_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(r[0], None);
        assert!((r[1].unwrap() - 0.1).abs() < 1e-12);
        assert!((r[2].unwrap() + 0.1).abs() < 1e-12);
        assert_eq!(simple_returns(&[0.0, 1.0]), vec![None, None]);
        assert!(simple_returns(&[]).is_empty());
    }

    #[test]
    fn unsmoothed_signal_is_previous_score() {
        let p = Panel::from_rows(panel(1, &[10.0, 11.0, 12.0], &[0.5, -0.2, 0.9]));
        let rows = condition(&p, 1);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, d(2));
        assert_eq!(rows[0].signal, 0.5);
        assert_eq!(rows[1].signal, -0.2);
    }

    #[test]
    fn smoothing_delays_first_signal() {
        let p = Panel::from_rows(panel(1, &[1.0, 1.0, 1.0, 1.0, 1.0], &[1.0, 2.0, 3.0, 4.0, 5.0]));
        let rows = condition(&p, 3);
        // smoothed defined from row 2, lagged to row 3
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, d(4));
        assert_eq!(rows[0].signal, 2.0);
        assert_eq!(rows[1].signal, 3.0);
    }

    #[test]
    fn companies_never_leak_into_each_other() {
        let mut rows = panel(1, &[1.0, 2.0], &[0.1, 0.2]);
        rows.extend(panel(2, &[5.0, 4.0], &[0.7, 0.8]));
        let out = condition(&Panel::from_rows(rows), 1);
        assert_eq!(out.len(), 2);
        assert_eq!((out[0].company_id, out[0].signal), (1, 0.1));
        assert_eq!((out[1].company_id, out[1].signal), (2, 0.7));
        assert!((out[1].ret + 0.2).abs() < 1e-12);
    }
}

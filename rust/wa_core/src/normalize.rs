//! Cross-sectional normalization and the composite stress score.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::factors::FactorRow;
use crate::types::DailyFactorRecord;

/// Weighted linear combination of standardized factors.
///
/// Order is `[pev, exodus, hiring_momentum, exec_volatility]`. Hiring
/// momentum lowers stress, so it enters with a negative weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeWeights {
    weights: [f64; 4],
}

impl CompositeWeights {
    pub const fn new(weights: [f64; 4]) -> Self {
        Self { weights }
    }

    pub fn combine(&self, z: &[f64; 4]) -> f64 {
        z.iter().zip(self.weights.iter()).map(|(f, w)| f * w).sum()
    }

    pub fn weights(&self) -> &[f64; 4] {
        &self.weights
    }
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self::new([1.0, 1.0, -1.0, 1.0])
    }
}

/// Population z-scores. A cross-section without spread (all values equal,
/// which includes a single value) maps to zeros.
pub fn zscores(values: &[f64]) -> Vec<f64> {
    let Some(&first) = values.first() else {
        return Vec::new();
    };
    if values.iter().all(|&v| v == first) {
        return vec![0.0; values.len()];
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = var.sqrt();
    if std == 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|&v| (v - mean) / std).collect()
}

/// Standardize every factor within each date and attach the composite.
/// Output is sorted by `(company_id, date)`.
pub fn normalize(rows: &[FactorRow], weights: &CompositeWeights) -> Vec<DailyFactorRecord> {
    let mut by_date: BTreeMap<NaiveDate, Vec<usize>> = BTreeMap::new();
    for (i, row) in rows.iter().enumerate() {
        by_date.entry(row.date).or_default().push(i);
    }

    let mut z = vec![[0.0; 4]; rows.len()];
    for members in by_date.values() {
        let columns: [Vec<f64>; 4] = [
            members.iter().map(|&i| rows[i].pev).collect(),
            members.iter().map(|&i| rows[i].exodus).collect(),
            members.iter().map(|&i| rows[i].hiring_momentum).collect(),
            members.iter().map(|&i| rows[i].exec_volatility).collect(),
        ];
        for (factor, column) in columns.iter().enumerate() {
            for (&i, score) in members.iter().zip(zscores(column)) {
                z[i][factor] = score;
            }
        }
    }

    let mut records: Vec<DailyFactorRecord> = rows
        .iter()
        .zip(&z)
        .map(|(row, z)| DailyFactorRecord {
            company_id: row.company_id,
            date: row.date,
            pev_score: row.pev,
            exodus_score: row.exodus,
            hiring_freeze_score: row.hiring_momentum,
            exec_volatility: row.exec_volatility,
            wsi_composite: weights.combine(z),
        })
        .collect();
    records.sort_by(|a, b| a.company_id.cmp(&b.company_id).then(a.date.cmp(&b.date)));
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(company_id: i64, day: u32, vals: [f64; 4]) -> FactorRow {
        FactorRow {
            company_id,
            date: NaiveDate::from_ymd_opt(2020, 3, day).unwrap(),
            pev: vals[0],
            exodus: vals[1],
            hiring_momentum: vals[2],
            exec_volatility: vals[3],
        }
    }

    fn mean_std(v: &[f64]) -> (f64, f64) {
        let n = v.len() as f64;
        let m = v.iter().sum::<f64>() / n;
        (m, (v.iter().map(|x| (x - m).powi(2)).sum::<f64>() / n).sqrt())
    }

    #[test]
    fn zscores_have_zero_mean_unit_std() {
        let z = zscores(&[0.1, 0.7, 0.3, 2.5, -1.0]);
        let (m, s) = mean_std(&z);
        assert!(m.abs() < 1e-12);
        assert!((s - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zscores_without_spread_are_zero() {
        assert_eq!(zscores(&[0.1, 0.1, 0.1]), vec![0.0; 3]);
        assert_eq!(zscores(&[4.2]), vec![0.0]);
        assert!(zscores(&[]).is_empty());
    }

    #[test]
    fn composite_subtracts_hiring() {
        let w = CompositeWeights::default();
        assert_eq!(w.combine(&[1.0, 2.0, 3.0, 4.0]), 1.0 + 2.0 - 3.0 + 4.0);
    }

    #[test]
    fn normalizes_within_each_date() {
        let rows = vec![
            row(1, 1, [0.0, 1.0, 0.5, 0.0]),
            row(2, 1, [1.0, 3.0, 0.5, 0.0]),
            row(1, 2, [5.0, 1.0, 0.0, 1.0]),
            row(2, 2, [5.0, 2.0, 1.0, 3.0]),
            row(3, 2, [5.0, 3.0, 2.0, 2.0]),
        ];
        let out = normalize(&rows, &CompositeWeights::default());
        assert_eq!(out.len(), 5);

        // day 1: pev z = [-1, 1], exodus z = [-1, 1], hiring and exec flat
        let a = out.iter().find(|r| r.company_id == 1 && r.date.format("%d").to_string() == "01").unwrap();
        assert!((a.wsi_composite - (-2.0)).abs() < 1e-12);

        // day 2: composite sums to zero across the cross-section
        let day2: Vec<f64> = out
            .iter()
            .filter(|r| r.date == NaiveDate::from_ymd_opt(2020, 3, 2).unwrap())
            .map(|r| r.wsi_composite)
            .collect();
        assert_eq!(day2.len(), 3);
        assert!(day2.iter().sum::<f64>().abs() < 1e-12);
    }

    #[test]
    fn single_company_date_scores_zero() {
        let out = normalize(&[row(4, 9, [0.3, 1.2, -0.4, 0.1])], &CompositeWeights::default());
        assert_eq!(out[0].wsi_composite, 0.0);
        assert_eq!(out[0].pev_score, 0.3);
    }

    #[test]
    fn output_sorted_by_company_then_date() {
        let rows = vec![row(2, 1, [0.0; 4]), row(1, 2, [0.0; 4]), row(1, 1, [0.0; 4])];
        let out = normalize(&rows, &CompositeWeights::default());
        let keys: Vec<(i64, u32)> = out
            .iter()
            .map(|r| (r.company_id, r.date.format("%d").to_string().parse().unwrap()))
            .collect();
        assert_eq!(keys, vec![(1, 1), (1, 2), (2, 1)]);
    }
}

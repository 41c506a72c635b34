//! Full signal computation run: load, validate, compute, replace.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info, warn};

use crate::config::FactorConfig;
use crate::error::{Error, Result};
use crate::factors::{compute_universe, CompanyHistory};
use crate::normalize::{normalize, CompositeWeights};
use crate::store::WorkforceStore;
use crate::types::{
    Company, DailyFactorRecord, Employee, JobPostingSnapshot, RawEmployee, RawJobPosting,
    RawWorkforceEvent, WorkforceEvent,
};

/// A company dropped from the run because its upstream records are corrupt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub company_id: i64,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct SignalRunReport {
    pub companies: usize,
    pub skipped_without_events: Vec<i64>,
    pub rejected: Vec<Rejection>,
    pub records: Vec<DailyFactorRecord>,
    pub written: usize,
}

#[derive(Default)]
struct Bucket {
    employees: Vec<Employee>,
    events: Vec<WorkforceEvent>,
    postings: Vec<JobPostingSnapshot>,
    fault: Option<Error>,
}

impl Bucket {
    fn accept<T, R>(&mut self, raw: R, sink: impl FnOnce(&mut Self, T))
    where
        R: TryInto<T, Error = Error>,
    {
        if self.fault.is_some() {
            return;
        }
        match raw.try_into() {
            Ok(v) => sink(self, v),
            Err(e) => self.fault = Some(e),
        }
    }
}

#[derive(Debug, Default)]
pub struct Histories {
    pub histories: Vec<CompanyHistory>,
    pub skipped_without_events: Vec<i64>,
    pub rejected: Vec<Rejection>,
}

/// Group raw rows by company and validate them. A company with any corrupt
/// row is rejected as a whole; rows for unknown companies are ignored.
pub fn build_histories(
    companies: &[Company],
    employees: Vec<RawEmployee>,
    events: Vec<RawWorkforceEvent>,
    postings: Vec<RawJobPosting>,
) -> Histories {
    let mut buckets: BTreeMap<i64, Bucket> =
        companies.iter().map(|c| (c.id, Bucket::default())).collect();

    for raw in employees {
        if let Some(b) = buckets.get_mut(&raw.company_id) {
            b.accept(raw, |b, e: Employee| b.employees.push(e));
        }
    }
    for raw in events {
        if let Some(b) = buckets.get_mut(&raw.company_id) {
            b.accept(raw, |b, e: WorkforceEvent| b.events.push(e));
        }
    }
    for raw in postings {
        if let Some(b) = buckets.get_mut(&raw.company_id) {
            b.accept(raw, |b, p: JobPostingSnapshot| b.postings.push(p));
        }
    }

    let mut out = Histories::default();
    for (company_id, mut bucket) in buckets {
        if bucket.fault.is_none() {
            let known: HashSet<i64> = bucket.employees.iter().map(|e| e.id).collect();
            if let Some(ev) = bucket.events.iter().find(|ev| !known.contains(&ev.employee_id)) {
                bucket.fault = Some(Error::integrity(
                    "workforce event",
                    format!("event references unknown employee {}", ev.employee_id),
                ));
            }
        }
        if let Some(err) = bucket.fault {
            out.rejected.push(Rejection { company_id, reason: err.to_string() });
            continue;
        }
        if bucket.events.is_empty() {
            out.skipped_without_events.push(company_id);
            continue;
        }
        out.histories.push(CompanyHistory {
            company_id,
            employee_count: bucket.employees.len(),
            exec_count: bucket.employees.iter().filter(|e| e.seniority.is_exec()).count(),
            events: bucket.events,
            postings: bucket.postings,
        });
    }
    out
}

/// Factor engine followed by cross-sectional normalization.
pub fn compute_factor_records(histories: &[CompanyHistory], config: &FactorConfig) -> Vec<DailyFactorRecord> {
    let rows = compute_universe(histories, config.window);
    normalize(&rows, &CompositeWeights::default())
}

/// Recompute every factor record from the store and replace the table.
pub fn compute_signals<S: WorkforceStore + ?Sized>(
    store: &mut S,
    config: &FactorConfig,
) -> Result<SignalRunReport> {
    config.validate()?;

    info!("loading workforce data");
    let companies = store.companies()?;
    let employees = store.employees()?;
    let events = store.workforce_events()?;
    let postings = store.job_postings()?;
    debug!(
        companies = companies.len(),
        employees = employees.len(),
        events = events.len(),
        postings = postings.len(),
        "loaded source rows"
    );

    let grouped = build_histories(&companies, employees, events, postings);
    for r in &grouped.rejected {
        warn!(company_id = r.company_id, reason = %r.reason, "rejecting company with corrupt input");
    }
    for id in &grouped.skipped_without_events {
        debug!(company_id = id, "no workforce events, skipping");
    }

    info!(companies = grouped.histories.len(), window = config.window, "computing factors");
    let records = compute_factor_records(&grouped.histories, config);

    let written = store.replace_daily_factors(&records)?;
    info!(records = written, "factor table replaced");

    Ok(SignalRunReport {
        companies: companies.len(),
        skipped_without_events: grouped.skipped_without_events,
        rejected: grouped.rejected,
        records,
        written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::{Days, NaiveDate};

    fn date(offset: u64) -> String {
        let d = NaiveDate::from_ymd_opt(2021, 6, 1).unwrap() + Days::new(offset);
        d.format("%Y-%m-%d").to_string()
    }

    fn company(id: i64) -> Company {
        Company { id, ticker: format!("MOCK_{id:02}"), sector: None, industry: None }
    }

    fn employee(id: i64, company_id: i64, seniority: &str) -> RawEmployee {
        RawEmployee { id, company_id, seniority: Some(seniority.into()) }
    }

    fn event(employee_id: i64, company_id: i64, offset: u64, kind: &str, seniority: &str) -> RawWorkforceEvent {
        RawWorkforceEvent {
            employee_id,
            company_id,
            event_date: date(offset),
            event_kind: Some(kind.into()),
            seniority: Some(seniority.into()),
            metadata: Some("{}".into()),
        }
    }

    fn posting(company_id: i64, offset: u64, open: i64) -> RawJobPosting {
        RawJobPosting {
            company_id,
            date: date(offset),
            total_open_roles: Some(open),
            roles_added: Some(0),
            roles_closed: Some(0),
        }
    }

    /// Three companies with 60 days of varied activity; company 4 has no events.
    fn sample_store() -> MemoryStore {
        let mut store = MemoryStore {
            companies: (1..=4).map(company).collect(),
            ..Default::default()
        };
        let mut next_emp = 1;
        for c in 1..=3i64 {
            for k in 0..(10 * c) {
                let seniority = if k % 5 == 0 { "EXEC" } else { "MID" };
                store.employees.push(employee(next_emp, c, seniority));
                next_emp += 1;
            }
            let first = store.employees.iter().find(|e| e.company_id == c).map(|e| e.id).unwrap();
            for day in 0..60u64 {
                if day % (c as u64 + 2) == 0 {
                    store.events.push(event(first, c, day, "JOIN", "EXEC"));
                }
                if day % (7 - c as u64) == 0 {
                    store.events.push(event(first + 1, c, day, "LEAVE", "MID"));
                }
                if day % 11 == (c as u64) {
                    store.events.push(event(first + 2, c, day, "PROMOTION", "MID"));
                }
                store.postings.push(posting(c, day, (day as i64 / (c + 1)) % 17));
            }
            store.events.push(event(first + 2, c, 59, "TITLE_CHANGE", "MID"));
        }
        store.employees.push(employee(next_emp, 4, "JUNIOR"));
        store
    }

    #[test]
    fn run_writes_records_and_skips_empty_company() {
        let mut store = sample_store();
        let report = compute_signals(&mut store, &FactorConfig::default()).unwrap();
        assert_eq!(report.companies, 4);
        assert_eq!(report.skipped_without_events, vec![4]);
        assert!(report.rejected.is_empty());
        assert_eq!(report.written, report.records.len());
        assert_eq!(store.factors, report.records);
        // each company spans 60 axis days and emits from index 30
        assert_eq!(report.records.len(), 3 * 30);
    }

    #[test]
    fn rebuild_is_idempotent() {
        let mut store = sample_store();
        let first = compute_signals(&mut store, &FactorConfig::default()).unwrap().records;
        let second = compute_signals(&mut store, &FactorConfig::default()).unwrap().records;
        assert_eq!(first, second);
        assert_eq!(store.factors.len(), first.len());
    }

    #[test]
    fn composite_matches_zscore_sum() {
        let mut store = sample_store();
        let report = compute_signals(&mut store, &FactorConfig::default()).unwrap();
        let mut by_date: BTreeMap<NaiveDate, Vec<&DailyFactorRecord>> = BTreeMap::new();
        for r in &report.records {
            by_date.entry(r.date).or_default().push(r);
        }
        for rows in by_date.values() {
            // z-scores sum to zero per factor, so the composite does too
            let total: f64 = rows.iter().map(|r| r.wsi_composite).sum();
            assert!(total.abs() < 1e-9);
        }
    }

    #[test]
    fn corrupt_event_rejects_only_its_company() {
        let mut store = sample_store();
        store.events.push(event(1, 1, 3, "REORG", "MID"));
        let report = compute_signals(&mut store, &FactorConfig::default()).unwrap();
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].company_id, 1);
        assert!(report.records.iter().all(|r| r.company_id != 1));
        assert!(report.records.iter().any(|r| r.company_id == 2));
    }

    #[test]
    fn unknown_employee_rejects_company() {
        let mut store = sample_store();
        store.events.push(event(9999, 2, 5, "JOIN", "MID"));
        let report = compute_signals(&mut store, &FactorConfig::default()).unwrap();
        assert_eq!(report.rejected.iter().map(|r| r.company_id).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn bad_posting_date_rejects_company() {
        let mut store = sample_store();
        store.postings.push(RawJobPosting {
            company_id: 3,
            date: "not-a-date".into(),
            total_open_roles: Some(1),
            roles_added: None,
            roles_closed: None,
        });
        let grouped = build_histories(
            &store.companies,
            store.employees.clone(),
            store.events.clone(),
            store.postings.clone(),
        );
        assert_eq!(grouped.rejected.len(), 1);
        assert_eq!(grouped.rejected[0].company_id, 3);
        assert_eq!(grouped.histories.len(), 2);
    }

    #[test]
    fn invalid_window_is_rejected() {
        let mut store = sample_store();
        let err = compute_signals(&mut store, &FactorConfig { window: 0 });
        assert!(matches!(err, Err(Error::InvalidParameter { .. })));
    }
}

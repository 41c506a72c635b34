//! Per-company daily calendar and reindexing of sparse inputs onto it.

use chrono::NaiveDate;

use crate::types::{EventKind, JobPostingSnapshot, WorkforceEvent};

/// Contiguous run of calendar days, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyAxis {
    start: NaiveDate,
    len: usize,
}

impl DailyAxis {
    /// Axis covering `[min(dates), max(dates)]`. `None` when `dates` is empty.
    pub fn spanning<I>(dates: I) -> Option<Self>
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let mut iter = dates.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        let len = max.signed_duration_since(min).num_days() as usize + 1;
        Some(Self { start: min, len })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        let offset = date.signed_duration_since(self.start).num_days();
        if offset < 0 || offset as usize >= self.len {
            return None;
        }
        Some(offset as usize)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take(self.len)
    }
}

/// Event counts per axis day, zero-filled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyCounts {
    pub joins: Vec<i64>,
    pub leaves: Vec<i64>,
    pub promotions: Vec<i64>,
    pub title_changes: Vec<i64>,
    pub exec_joins: Vec<i64>,
    pub exec_leaves: Vec<i64>,
}

impl DailyCounts {
    fn zeros(len: usize) -> Self {
        Self {
            joins: vec![0; len],
            leaves: vec![0; len],
            promotions: vec![0; len],
            title_changes: vec![0; len],
            exec_joins: vec![0; len],
            exec_leaves: vec![0; len],
        }
    }

    /// PROMOTION + TITLE_CHANGE per day.
    pub fn advancement(&self) -> Vec<i64> {
        self.promotions.iter().zip(&self.title_changes).map(|(p, t)| p + t).collect()
    }

    /// EXEC-seniority JOIN + LEAVE per day.
    pub fn exec_churn(&self) -> Vec<i64> {
        self.exec_joins.iter().zip(&self.exec_leaves).map(|(j, l)| j + l).collect()
    }
}

pub fn reindex_events(axis: &DailyAxis, events: &[WorkforceEvent]) -> DailyCounts {
    let mut counts = DailyCounts::zeros(axis.len());
    for ev in events {
        let Some(i) = axis.index_of(ev.date) else { continue };
        let exec = ev.seniority.is_exec();
        match ev.kind {
            EventKind::Join => {
                counts.joins[i] += 1;
                if exec {
                    counts.exec_joins[i] += 1;
                }
            }
            EventKind::Leave => {
                counts.leaves[i] += 1;
                if exec {
                    counts.exec_leaves[i] += 1;
                }
            }
            EventKind::Promotion => counts.promotions[i] += 1,
            EventKind::TitleChange => counts.title_changes[i] += 1,
        }
    }
    counts
}

/// Open roles per axis day: on-axis snapshots carried forward, zero before
/// the first one. Snapshots dated off the axis are ignored.
pub fn forward_fill_open_roles(axis: &DailyAxis, postings: &[JobPostingSnapshot]) -> Vec<i64> {
    let mut observed: Vec<Option<i64>> = vec![None; axis.len()];
    for p in postings {
        if let Some(i) = axis.index_of(p.date) {
            observed[i] = Some(p.total_open_roles);
        }
    }

    let mut last = 0;
    observed
        .into_iter()
        .map(|v| {
            if let Some(v) = v {
                last = v;
            }
            last
        })
        .collect()
}

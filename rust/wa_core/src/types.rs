//! Core domain types and the raw-row validation done at the store boundary.
//!
//! Raw rows carry dates and enum fields as text exactly as the store holds
//! them. Conversion into typed entities rejects anything unrecognised.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::error::Error;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(entity: &'static str, raw: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|e| Error::integrity(entity, format!("unparseable date {raw:?}: {e}")))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Join,
    Leave,
    Promotion,
    TitleChange,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Join => "JOIN",
            EventKind::Leave => "LEAVE",
            EventKind::Promotion => "PROMOTION",
            EventKind::TitleChange => "TITLE_CHANGE",
        }
    }
}

impl FromStr for EventKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "JOIN" => Ok(EventKind::Join),
            "LEAVE" => Ok(EventKind::Leave),
            "PROMOTION" => Ok(EventKind::Promotion),
            "TITLE_CHANGE" => Ok(EventKind::TitleChange),
            other => Err(Error::integrity("workforce event", format!("unknown event kind {other:?}"))),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Seniority {
    Junior,
    Mid,
    Senior,
    Exec,
}

impl Seniority {
    pub fn as_str(self) -> &'static str {
        match self {
            Seniority::Junior => "JUNIOR",
            Seniority::Mid => "MID",
            Seniority::Senior => "SENIOR",
            Seniority::Exec => "EXEC",
        }
    }

    pub fn is_exec(self) -> bool {
        self == Seniority::Exec
    }
}

impl FromStr for Seniority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "JUNIOR" => Ok(Seniority::Junior),
            "MID" => Ok(Seniority::Mid),
            "SENIOR" => Ok(Seniority::Senior),
            "EXEC" => Ok(Seniority::Exec),
            other => Err(Error::integrity("employee", format!("unknown seniority {other:?}"))),
        }
    }
}

impl fmt::Display for Seniority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    pub id: i64,
    pub ticker: String,
    pub sector: Option<String>,
    pub industry: Option<String>,
}

// ---------- raw rows, as read from the store ----------

#[derive(Debug, Clone, PartialEq)]
pub struct RawEmployee {
    pub id: i64,
    pub company_id: i64,
    pub seniority: Option<String>,
}

/// Event row with the owning employee's company and seniority joined in.
#[derive(Debug, Clone, PartialEq)]
pub struct RawWorkforceEvent {
    pub employee_id: i64,
    pub company_id: i64,
    pub event_date: String,
    pub event_kind: Option<String>,
    pub seniority: Option<String>,
    pub metadata: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawJobPosting {
    pub company_id: i64,
    pub date: String,
    pub total_open_roles: Option<i64>,
    pub roles_added: Option<i64>,
    pub roles_closed: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawMarketPrice {
    pub company_id: i64,
    pub date: String,
    pub close: Option<f64>,
}

// ---------- validated entities ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Employee {
    pub id: i64,
    pub company_id: i64,
    pub seniority: Seniority,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkforceEvent {
    pub employee_id: i64,
    pub company_id: i64,
    pub date: NaiveDate,
    pub kind: EventKind,
    pub seniority: Seniority,
    pub metadata: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobPostingSnapshot {
    pub company_id: i64,
    pub date: NaiveDate,
    pub total_open_roles: i64,
    pub roles_added: i64,
    pub roles_closed: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketPriceSnapshot {
    pub company_id: i64,
    pub date: NaiveDate,
    pub close: f64,
}

fn required<T>(entity: &'static str, field: &str, value: Option<T>) -> Result<T, Error> {
    value.ok_or_else(|| Error::integrity(entity, format!("missing {field}")))
}

impl TryFrom<RawEmployee> for Employee {
    type Error = Error;

    fn try_from(raw: RawEmployee) -> Result<Self, Self::Error> {
        let seniority = required("employee", "seniority", raw.seniority)?.parse()?;
        Ok(Employee { id: raw.id, company_id: raw.company_id, seniority })
    }
}

impl TryFrom<RawWorkforceEvent> for WorkforceEvent {
    type Error = Error;

    fn try_from(raw: RawWorkforceEvent) -> Result<Self, Self::Error> {
        let entity = "workforce event";
        Ok(WorkforceEvent {
            employee_id: raw.employee_id,
            company_id: raw.company_id,
            date: parse_date(entity, &raw.event_date)?,
            kind: required(entity, "event kind", raw.event_kind)?.parse()?,
            seniority: required(entity, "seniority", raw.seniority)?.parse()?,
            metadata: raw.metadata,
        })
    }
}

impl TryFrom<RawJobPosting> for JobPostingSnapshot {
    type Error = Error;

    fn try_from(raw: RawJobPosting) -> Result<Self, Self::Error> {
        let entity = "job posting";
        let total_open_roles = required(entity, "total open roles", raw.total_open_roles)?;
        if total_open_roles < 0 {
            return Err(Error::integrity(entity, format!("negative open roles {total_open_roles}")));
        }
        Ok(JobPostingSnapshot {
            company_id: raw.company_id,
            date: parse_date(entity, &raw.date)?,
            total_open_roles,
            roles_added: raw.roles_added.unwrap_or(0),
            roles_closed: raw.roles_closed.unwrap_or(0),
        })
    }
}

impl RawMarketPrice {
    /// `Ok(None)` for a row without a close: a missing price, not a fault.
    /// A NaN or infinite close is a fault.
    pub fn validate(self) -> Result<Option<MarketPriceSnapshot>, Error> {
        let entity = "market price";
        let date = parse_date(entity, &self.date)?;
        match self.close {
            None => Ok(None),
            Some(close) if !close.is_finite() => Err(Error::integrity(
                entity,
                format!("non-finite close {close} for company {} on {}", self.company_id, self.date),
            )),
            Some(close) => Ok(Some(MarketPriceSnapshot { company_id: self.company_id, date, close })),
        }
    }
}

/// One persisted factor row per company per day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyFactorRecord {
    pub company_id: i64,
    pub date: NaiveDate,
    pub pev_score: f64,
    pub exodus_score: f64,
    pub hiring_freeze_score: f64,
    pub exec_volatility: f64,
    pub wsi_composite: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_event(kind: &str, seniority: &str, date: &str) -> RawWorkforceEvent {
        RawWorkforceEvent {
            employee_id: 7,
            company_id: 1,
            event_date: date.into(),
            event_kind: Some(kind.into()),
            seniority: Some(seniority.into()),
            metadata: None,
        }
    }

    #[test]
    fn event_kind_round_trips_names() {
        for kind in [EventKind::Join, EventKind::Leave, EventKind::Promotion, EventKind::TitleChange] {
            assert_eq!(kind.as_str().parse::<EventKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!("HIRE".parse::<EventKind>().is_err());
        assert!("join".parse::<EventKind>().is_err());
        let err = WorkforceEvent::try_from(raw_event("EventType.JOIN", "EXEC", "2020-01-01"));
        assert!(matches!(err, Err(Error::Integrity { .. })));
    }

    #[test]
    fn unknown_seniority_is_rejected() {
        assert!("Exec".parse::<Seniority>().is_err());
        assert!(WorkforceEvent::try_from(raw_event("JOIN", "INTERN", "2020-01-01")).is_err());
    }

    #[test]
    fn bad_date_is_rejected() {
        assert!(WorkforceEvent::try_from(raw_event("JOIN", "MID", "2020-13-01")).is_err());
        assert!(WorkforceEvent::try_from(raw_event("JOIN", "MID", "")).is_err());
    }

    #[test]
    fn valid_event_converts() {
        let ev = WorkforceEvent::try_from(raw_event("TITLE_CHANGE", "SENIOR", "2020-02-29")).unwrap();
        assert_eq!(ev.kind, EventKind::TitleChange);
        assert_eq!(ev.seniority, Seniority::Senior);
        assert_eq!(ev.date, NaiveDate::from_ymd_opt(2020, 2, 29).unwrap());
    }

    #[test]
    fn posting_requires_open_roles() {
        let raw = RawJobPosting {
            company_id: 1,
            date: "2020-01-01".into(),
            total_open_roles: None,
            roles_added: Some(1),
            roles_closed: None,
        };
        assert!(JobPostingSnapshot::try_from(raw).is_err());
    }

    #[test]
    fn price_without_close_is_missing_not_fault() {
        let raw = RawMarketPrice { company_id: 1, date: "2020-01-01".into(), close: None };
        assert_eq!(raw.validate().unwrap(), None);
        let raw = RawMarketPrice { company_id: 1, date: "01/01/2020".into(), close: Some(1.0) };
        assert!(raw.validate().is_err());
    }

    #[test]
    fn non_finite_close_is_fault() {
        for close in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let raw = RawMarketPrice { company_id: 2, date: "2020-01-03".into(), close: Some(close) };
            assert!(matches!(raw.validate(), Err(Error::Integrity { .. })));
        }
    }
}

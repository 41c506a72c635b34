use diesel::prelude::*;

use wa_core::error::Error;
use wa_core::types::{
    format_date, parse_date, Company, DailyFactorRecord, RawEmployee, RawJobPosting,
    RawMarketPrice, RawWorkforceEvent,
};

use crate::schema::{companies, daily_factors, employees, job_postings, market_data};

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = companies)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CompanyRow {
    pub id: i64,
    pub ticker: String,
    pub sector: Option<String>,
    pub industry: Option<String>,
}

impl From<CompanyRow> for Company {
    fn from(row: CompanyRow) -> Self {
        Company { id: row.id, ticker: row.ticker, sector: row.sector, industry: row.industry }
    }
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = employees)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct EmployeeRow {
    pub id: i64,
    pub company_id: i64,
    pub current_seniority: Option<String>,
}

impl From<EmployeeRow> for RawEmployee {
    fn from(row: EmployeeRow) -> Self {
        RawEmployee { id: row.id, company_id: row.company_id, seniority: row.current_seniority }
    }
}

/// `employee_events` joined with `employees`, in select order.
#[derive(Queryable, Debug)]
pub struct EventRow {
    pub employee_id: i64,
    pub company_id: i64,
    pub event_date: String,
    pub event_type: Option<String>,
    pub current_seniority: Option<String>,
    pub metadata_json: Option<String>,
}

impl From<EventRow> for RawWorkforceEvent {
    fn from(row: EventRow) -> Self {
        RawWorkforceEvent {
            employee_id: row.employee_id,
            company_id: row.company_id,
            event_date: row.event_date,
            event_kind: row.event_type,
            seniority: row.current_seniority,
            metadata: row.metadata_json,
        }
    }
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = job_postings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct JobPostingRow {
    pub company_id: i64,
    pub date: String,
    pub total_open_roles: Option<i64>,
    pub new_roles_added: Option<i64>,
    pub roles_closed: Option<i64>,
}

impl From<JobPostingRow> for RawJobPosting {
    fn from(row: JobPostingRow) -> Self {
        RawJobPosting {
            company_id: row.company_id,
            date: row.date,
            total_open_roles: row.total_open_roles,
            roles_added: row.new_roles_added,
            roles_closed: row.roles_closed,
        }
    }
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = market_data)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MarketDataRow {
    pub company_id: i64,
    pub date: String,
    pub close: Option<f64>,
}

impl From<MarketDataRow> for RawMarketPrice {
    fn from(row: MarketDataRow) -> Self {
        RawMarketPrice { company_id: row.company_id, date: row.date, close: row.close }
    }
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = daily_factors)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DailyFactorRow {
    pub company_id: i64,
    pub date: String,
    pub pev_score: f64,
    pub exodus_score: f64,
    pub hiring_freeze_score: f64,
    pub exec_volatility: f64,
    pub wsi_composite: f64,
}

impl TryFrom<DailyFactorRow> for DailyFactorRecord {
    type Error = Error;

    fn try_from(row: DailyFactorRow) -> Result<Self, Self::Error> {
        Ok(DailyFactorRecord {
            company_id: row.company_id,
            date: parse_date("daily factor", &row.date)?,
            pev_score: row.pev_score,
            exodus_score: row.exodus_score,
            hiring_freeze_score: row.hiring_freeze_score,
            exec_volatility: row.exec_volatility,
            wsi_composite: row.wsi_composite,
        })
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = daily_factors)]
pub struct NewDailyFactor {
    pub company_id: i64,
    pub date: String,
    pub pev_score: f64,
    pub exodus_score: f64,
    pub hiring_freeze_score: f64,
    pub exec_volatility: f64,
    pub wsi_composite: f64,
}

impl From<&DailyFactorRecord> for NewDailyFactor {
    fn from(r: &DailyFactorRecord) -> Self {
        NewDailyFactor {
            company_id: r.company_id,
            date: format_date(r.date),
            pev_score: r.pev_score,
            exodus_score: r.exodus_score,
            hiring_freeze_score: r.hiring_freeze_score,
            exec_volatility: r.exec_volatility,
            wsi_composite: r.wsi_composite,
        }
    }
}

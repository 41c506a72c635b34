use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use thiserror::Error;
use tracing::{debug, info};

use wa_core::config::WsiConfig;
use wa_core::store::WorkforceStore;
use wa_core::types::{
    Company, DailyFactorRecord, RawEmployee, RawJobPosting, RawMarketPrice, RawWorkforceEvent,
};

use crate::models::{
    CompanyRow, DailyFactorRow, EmployeeRow, EventRow, JobPostingRow, MarketDataRow, NewDailyFactor,
};
use crate::schema::{
    companies, daily_factors, employee_events, employees, job_postings, market_data, CREATE_TABLES,
};

/// Rows per multi-value insert, kept under SQLite's bound-parameter limit.
const INSERT_CHUNK: usize = 100;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("error connecting to database: {0}")]
    Connection(#[from] ConnectionError),

    #[error("query failed: {0}")]
    Query(#[from] diesel::result::Error),
}

impl From<StoreError> for wa_core::Error {
    fn from(err: StoreError) -> Self {
        wa_core::Error::store(err)
    }
}

pub struct SqliteStore {
    conn: SqliteConnection,
}

impl SqliteStore {
    pub fn establish(database_url: &str) -> Result<Self, StoreError> {
        let conn = SqliteConnection::establish(database_url)?;
        debug!(database_url, "connected to sqlite");
        Ok(Self { conn })
    }

    pub fn open(config: &WsiConfig) -> Result<Self, StoreError> {
        Self::establish(&config.database_url)
    }

    /// Create any missing tables.
    pub fn ensure_schema(&mut self) -> Result<(), StoreError> {
        self.conn.batch_execute(CREATE_TABLES)?;
        Ok(())
    }

    pub fn connection(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }
}

impl WorkforceStore for SqliteStore {
    fn companies(&mut self) -> wa_core::Result<Vec<Company>> {
        let rows = companies::table
            .select(CompanyRow::as_select())
            .order(companies::id)
            .load(&mut self.conn)
            .map_err(StoreError::from)?;
        Ok(rows.into_iter().map(Company::from).collect())
    }

    fn employees(&mut self) -> wa_core::Result<Vec<RawEmployee>> {
        let rows = employees::table
            .select(EmployeeRow::as_select())
            .order(employees::id)
            .load(&mut self.conn)
            .map_err(StoreError::from)?;
        Ok(rows.into_iter().map(RawEmployee::from).collect())
    }

    /// Events whose employee row is missing do not survive the join.
    fn workforce_events(&mut self) -> wa_core::Result<Vec<RawWorkforceEvent>> {
        let rows = employee_events::table
            .inner_join(employees::table)
            .select((
                employee_events::employee_id,
                employees::company_id,
                employee_events::event_date,
                employee_events::event_type,
                employees::current_seniority,
                employee_events::metadata_json,
            ))
            .order((employee_events::event_date, employee_events::id))
            .load::<EventRow>(&mut self.conn)
            .map_err(StoreError::from)?;
        Ok(rows.into_iter().map(RawWorkforceEvent::from).collect())
    }

    fn job_postings(&mut self) -> wa_core::Result<Vec<RawJobPosting>> {
        let rows = job_postings::table
            .select(JobPostingRow::as_select())
            .order((job_postings::company_id, job_postings::date))
            .load(&mut self.conn)
            .map_err(StoreError::from)?;
        Ok(rows.into_iter().map(RawJobPosting::from).collect())
    }

    fn market_prices(&mut self) -> wa_core::Result<Vec<RawMarketPrice>> {
        let rows = market_data::table
            .select(MarketDataRow::as_select())
            .order((market_data::company_id, market_data::date))
            .load(&mut self.conn)
            .map_err(StoreError::from)?;
        Ok(rows.into_iter().map(RawMarketPrice::from).collect())
    }

    fn daily_factors(&mut self) -> wa_core::Result<Vec<DailyFactorRecord>> {
        let rows = daily_factors::table
            .select(DailyFactorRow::as_select())
            .order((daily_factors::company_id, daily_factors::date))
            .load(&mut self.conn)
            .map_err(StoreError::from)?;
        rows.into_iter().map(DailyFactorRecord::try_from).collect()
    }

    fn replace_daily_factors(&mut self, records: &[DailyFactorRecord]) -> wa_core::Result<usize> {
        let new_rows: Vec<NewDailyFactor> = records.iter().map(NewDailyFactor::from).collect();

        let (deleted, written) = self
            .conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                let deleted = diesel::delete(daily_factors::table).execute(conn)?;
                let mut written = 0;
                for chunk in new_rows.chunks(INSERT_CHUNK) {
                    written += diesel::insert_into(daily_factors::table).values(chunk).execute(conn)?;
                }
                Ok((deleted, written))
            })
            .map_err(StoreError::from)?;

        info!(deleted, written, "replaced daily factors");
        Ok(written)
    }
}

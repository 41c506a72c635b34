//! Read/write contract with the persistent store.
//!
//! Reads return full historical sets as raw rows; validation into typed
//! entities happens in the pipeline so a corrupt row can be attributed to
//! its company. The only write is a wholesale replacement of factor rows.

use crate::error::Result;
use crate::types::{
    Company, DailyFactorRecord, RawEmployee, RawJobPosting, RawMarketPrice, RawWorkforceEvent,
};

pub trait WorkforceStore {
    fn companies(&mut self) -> Result<Vec<Company>>;

    fn employees(&mut self) -> Result<Vec<RawEmployee>>;

    /// Events with the employee's company and current seniority joined in.
    fn workforce_events(&mut self) -> Result<Vec<RawWorkforceEvent>>;

    fn job_postings(&mut self) -> Result<Vec<RawJobPosting>>;

    fn market_prices(&mut self) -> Result<Vec<RawMarketPrice>>;

    fn daily_factors(&mut self) -> Result<Vec<DailyFactorRecord>>;

    /// Delete every factor row and insert `records`. Returns rows written.
    fn replace_daily_factors(&mut self, records: &[DailyFactorRecord]) -> Result<usize>;
}

/// Snapshot held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub companies: Vec<Company>,
    pub employees: Vec<RawEmployee>,
    pub events: Vec<RawWorkforceEvent>,
    pub postings: Vec<RawJobPosting>,
    pub prices: Vec<RawMarketPrice>,
    pub factors: Vec<DailyFactorRecord>,
}

impl WorkforceStore for MemoryStore {
    fn companies(&mut self) -> Result<Vec<Company>> {
        Ok(self.companies.clone())
    }

    fn employees(&mut self) -> Result<Vec<RawEmployee>> {
        Ok(self.employees.clone())
    }

    fn workforce_events(&mut self) -> Result<Vec<RawWorkforceEvent>> {
        Ok(self.events.clone())
    }

    fn job_postings(&mut self) -> Result<Vec<RawJobPosting>> {
        Ok(self.postings.clone())
    }

    fn market_prices(&mut self) -> Result<Vec<RawMarketPrice>> {
        Ok(self.prices.clone())
    }

    fn daily_factors(&mut self) -> Result<Vec<DailyFactorRecord>> {
        Ok(self.factors.clone())
    }

    fn replace_daily_factors(&mut self, records: &[DailyFactorRecord]) -> Result<usize> {
        self.factors = records.to_vec();
        Ok(records.len())
    }
}

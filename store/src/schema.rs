// Dates are ISO-8601 `TEXT`, parsed at the boundary.

diesel::table! {
    companies (id) {
        id -> BigInt,
        ticker -> Text,
        sector -> Nullable<Text>,
        industry -> Nullable<Text>,
    }
}

diesel::table! {
    market_data (id) {
        id -> BigInt,
        company_id -> BigInt,
        date -> Text,
        close -> Nullable<Double>,
        adjusted_close -> Nullable<Double>,
        volume -> Nullable<Double>,
    }
}

diesel::table! {
    employees (id) {
        id -> BigInt,
        company_id -> BigInt,
        anonymized_hash -> Nullable<Text>,
        current_seniority -> Nullable<Text>,
    }
}

diesel::table! {
    job_postings (id) {
        id -> BigInt,
        company_id -> BigInt,
        date -> Text,
        total_open_roles -> Nullable<BigInt>,
        new_roles_added -> Nullable<BigInt>,
        roles_closed -> Nullable<BigInt>,
    }
}

diesel::table! {
    employee_events (id) {
        id -> BigInt,
        employee_id -> BigInt,
        event_date -> Text,
        event_type -> Nullable<Text>,
        metadata_json -> Nullable<Text>,
    }
}

diesel::table! {
    daily_factors (id) {
        id -> BigInt,
        company_id -> BigInt,
        date -> Text,
        pev_score -> Double,
        exodus_score -> Double,
        hiring_freeze_score -> Double,
        exec_volatility -> Double,
        wsi_composite -> Double,
    }
}

diesel::joinable!(employee_events -> employees (employee_id));
diesel::joinable!(employees -> companies (company_id));
diesel::joinable!(job_postings -> companies (company_id));
diesel::joinable!(market_data -> companies (company_id));
diesel::joinable!(daily_factors -> companies (company_id));

diesel::allow_tables_to_appear_in_same_query!(
    companies,
    market_data,
    employees,
    job_postings,
    employee_events,
    daily_factors,
);

pub const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS companies (
    id INTEGER PRIMARY KEY,
    ticker TEXT NOT NULL UNIQUE,
    sector TEXT,
    industry TEXT
);
CREATE TABLE IF NOT EXISTS market_data (
    id INTEGER PRIMARY KEY,
    company_id INTEGER NOT NULL REFERENCES companies(id),
    date TEXT NOT NULL,
    close REAL,
    adjusted_close REAL,
    volume REAL
);
CREATE TABLE IF NOT EXISTS employees (
    id INTEGER PRIMARY KEY,
    company_id INTEGER NOT NULL REFERENCES companies(id),
    anonymized_hash TEXT UNIQUE,
    current_seniority TEXT
);
CREATE TABLE IF NOT EXISTS job_postings (
    id INTEGER PRIMARY KEY,
    company_id INTEGER NOT NULL REFERENCES companies(id),
    date TEXT NOT NULL,
    total_open_roles INTEGER,
    new_roles_added INTEGER,
    roles_closed INTEGER
);
CREATE TABLE IF NOT EXISTS employee_events (
    id INTEGER PRIMARY KEY,
    employee_id INTEGER NOT NULL REFERENCES employees(id),
    event_date TEXT NOT NULL,
    event_type TEXT,
    metadata_json TEXT
);
CREATE TABLE IF NOT EXISTS daily_factors (
    id INTEGER PRIMARY KEY,
    company_id INTEGER NOT NULL REFERENCES companies(id),
    date TEXT NOT NULL,
    pev_score REAL NOT NULL,
    exodus_score REAL NOT NULL,
    hiring_freeze_score REAL NOT NULL,
    exec_volatility REAL NOT NULL,
    wsi_composite REAL NOT NULL
);
";

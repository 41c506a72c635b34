//! SQLite adapter for [`wa_core::store::WorkforceStore`], built on diesel.

pub mod models;
pub mod schema;
pub mod storage;

pub use storage::{SqliteStore, StoreError};

//! Error types shared by every stage of the pipeline.

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// An upstream record could not be converted into a typed entity.
    #[error("data integrity fault in {entity}: {reason}")]
    Integrity { entity: &'static str, reason: String },

    /// A run parameter is outside its legal range.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error(transparent)]
    Polars(#[from] polars::error::PolarsError),

    /// Failure reported by a [`crate::store::WorkforceStore`] implementation.
    #[error("store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Config(#[from] Box<figment::Error>),
}

impl Error {
    pub(crate) fn integrity(entity: &'static str, reason: impl Into<String>) -> Self {
        Error::Integrity { entity, reason: reason.into() }
    }

    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidParameter { name, reason: reason.into() }
    }

    /// Wrap any store-side error.
    pub fn store<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Store(Box::new(err))
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error(transparent)]
    InvalidQuery(#[from] scout_query::QueryError),

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("canceled")]
    Canceled,

    #[error("backend error: {0}")]
    Backend(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl SearchError {
    /// A branch that ran out of time or was cancelled. Recovered per branch:
    /// it contributes zero candidates and never fails the request.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::DeadlineExceeded | Self::Canceled)
    }

    /// Malformed user input. Suppressed silently at aggregation time; other
    /// sources may still understand the query.
    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        matches!(self, Self::InvalidPattern(_) | Self::InvalidQuery(_))
    }
}

impl From<tokio::time::error::Elapsed> for SearchError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Self::DeadlineExceeded
    }
}

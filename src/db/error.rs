//! Errors from the score database.

use derive_more::{Display, Error};
use tracing::{instrument, warn};

/// Failure reading or writing the `scores` table, tagged with the call
/// site that raised it.
#[derive(Debug, Clone, Display, Error)]
#[display("Score database error: {} at {}:{}", message, file, line)]
pub struct DbError {
    /// What went wrong.
    pub message: String,
    /// Line of the call site.
    pub line: u32,
    /// File of the call site.
    pub file: &'static str,
}

impl DbError {
    /// Creates an error located at the caller.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        let message = message.into();
        warn!(%message, file = loc.file(), line = loc.line(), "Score database failure");
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<diesel::result::Error> for DbError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        Self::new(format!("scores query failed: {}", err))
    }
}

impl From<diesel::ConnectionError> for DbError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        Self::new(format!("cannot open score database: {}", err))
    }
}

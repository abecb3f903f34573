//! Error types for the dispatcher.
//!
//! This module defines all error types using `thiserror`. Driver failures are
//! wrapped untouched so callers can match on the underlying `sqlx::Error`; the
//! helper accessors only inspect them.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("Transaction error: {message}")]
    TransactionState {
        message: String,
        transaction_id: Option<String>,
    },

    #[error("Database error: {0}")]
    Driver(#[from] sqlx::Error),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl DbError {
    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a transaction state error.
    pub fn transaction_state(message: impl Into<String>, transaction_id: Option<&str>) -> Self {
        Self::TransactionState {
            message: message.into(),
            transaction_id: transaction_id.map(String::from),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// SQLSTATE code reported by the server, if this is a database error.
    pub fn sql_state(&self) -> Option<String> {
        match self {
            Self::Driver(sqlx::Error::Database(db_err)) => db_err.code().map(|c| c.to_string()),
            _ => None,
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            Self::TransactionState { .. } => {
                Some("Use begin_transaction and issue commit/rollback on the returned dispatcher")
            }
            Self::Driver(err) => Some(driver_suggestion(err)),
            Self::InvalidInput { .. } => None,
        }
    }

    /// Check if this error is retryable.
    ///
    /// Informational only: nothing in this crate retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Driver(sqlx::Error::PoolTimedOut | sqlx::Error::Io(_))
        )
    }
}

fn driver_suggestion(err: &sqlx::Error) -> &'static str {
    match err {
        sqlx::Error::Configuration(_) => "Check the connection string format and credentials",
        sqlx::Error::Database(_) => "Check the SQL syntax and referenced objects",
        sqlx::Error::PoolTimedOut => "Increase pool.acquire or pool.max",
        sqlx::Error::PoolClosed => "Create a new connection",
        sqlx::Error::Io(_) => "Check network connectivity and database server status",
        sqlx::Error::Tls(_) => "Verify TLS configuration and certificates",
        sqlx::Error::Protocol(_) => "Check database server compatibility",
        _ => "See the driver error for details",
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;

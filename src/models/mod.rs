//! Data models for mysql-dispatch.
//!
//! This module re-exports all model types used throughout the crate.

pub mod connection;
pub mod query;
pub mod value;

// Re-export commonly used types
pub use connection::{
    ConnectionOptions, ConnectionSource, LogHook, QueryLog, ReplicationOptions, ResolvedOptions,
    ServerOptions, masked_connection_string,
};
pub use query::{
    IsolationLevel, NOOP_STATEMENT, PreparedStatement, QueryOptions, QueryOutcome, ResultHeader,
    Row, Statement, StatementKind, StatementResult,
};
pub use value::SqlValue;

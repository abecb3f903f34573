//! Driver boundary.
//!
//! The dispatcher only talks to these traits. `db::mysql` is the production
//! implementation; tests plug in their own.

use crate::error::DbResult;
use crate::models::{IsolationLevel, QueryOptions, StatementResult};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Shared handle to an open transaction.
pub type TransactionHandle = Arc<dyn DriverTransaction>;

/// A database connection (usually a pool) that runs statement batches.
#[async_trait]
pub trait Driver: Send + Sync + fmt::Debug {
    /// Run `sql`, which may hold several `;`-separated statements, and return
    /// one entry per statement in order.
    ///
    /// When `options.transaction` is set the batch runs inside it.
    async fn query(&self, sql: &str, options: QueryOptions) -> DbResult<Vec<StatementResult>>;

    /// Open a transaction on a dedicated connection.
    async fn begin_transaction(&self, isolation: IsolationLevel) -> DbResult<TransactionHandle>;
}

/// An open transaction. Once committed or rolled back it rejects further use.
#[async_trait]
pub trait DriverTransaction: Send + Sync + fmt::Debug {
    fn id(&self) -> &str;

    fn isolation_level(&self) -> IsolationLevel;

    async fn query(&self, sql: &str, options: &QueryOptions) -> DbResult<Vec<StatementResult>>;

    async fn commit(&self) -> DbResult<()>;

    async fn rollback(&self) -> DbResult<()>;
}

/// Generate a unique transaction ID.
pub fn generate_transaction_id() -> String {
    format!("tx_{}", uuid::Uuid::new_v4().simple())
}

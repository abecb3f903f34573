//! Statement dispatcher and transaction context.
//!
//! A [`Dispatcher`] pairs a connection with an optional transaction handle.
//! It is immutable: `begin_transaction` returns a new dispatcher bound to the
//! transaction and leaves the caller untouched, so the same connection can
//! back many independent transaction contexts.

use crate::callback::spawn_with_callback;
use crate::db::{Driver, TransactionHandle};
use crate::error::{DbError, DbResult};
use crate::models::{IsolationLevel, QueryOutcome, SqlValue, Statement};
use crate::sqlstring;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Isolation level used for every transaction the dispatcher opens.
pub const TRANSACTION_ISOLATION: IsolationLevel = IsolationLevel::ReadCommitted;

#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    connection: Option<Arc<dyn Driver>>,
    transaction: Option<TransactionHandle>,
}

impl Dispatcher {
    /// A dispatcher over `driver`, outside any transaction.
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        Self {
            connection: Some(driver),
            transaction: None,
        }
    }

    /// A dispatcher with no connection. Every statement fails with
    /// [`DbError::Connection`].
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// The transaction this dispatcher is bound to, if any.
    pub fn transaction(&self) -> Option<&TransactionHandle> {
        self.transaction.as_ref()
    }

    pub fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    pub fn escape_id(&self, identifier: &str) -> String {
        sqlstring::escape_id(identifier)
    }

    pub fn escape(&self, value: &SqlValue) -> String {
        sqlstring::escape(value)
    }

    pub fn format(&self, sql: &str, values: &[SqlValue]) -> String {
        sqlstring::format(sql, values)
    }

    pub fn raw(&self, sql: impl Into<String>) -> SqlValue {
        sqlstring::raw(sql)
    }

    fn driver(&self) -> DbResult<&Arc<dyn Driver>> {
        self.connection.as_ref().ok_or_else(|| {
            DbError::connection(
                "No database connection",
                "Check the connection options or URL passed to connect",
            )
        })
    }

    /// Run a statement (or `;`-separated batch).
    ///
    /// Statements starting with `SELECT` return their rows. Anything else is
    /// run behind a `SELECT 1;` prefix whose result is dropped again: a single
    /// mutating statement returns its own result entry, a batch returns the
    /// list of entries. `params` are used unless the statement carries its
    /// own values.
    pub async fn execute(
        &self,
        statement: impl Into<Statement>,
        params: Vec<SqlValue>,
    ) -> DbResult<QueryOutcome> {
        let driver = self.driver()?;
        let prepared = statement.into().prepare(params, self.transaction.clone());
        let kind = prepared.options.kind;

        debug!(
            kind = ?kind,
            nest = prepared.options.nest,
            transaction_id = prepared.options.transaction.as_ref().map(|t| t.id()),
            "Dispatching statement"
        );

        let results = driver.query(&prepared.sql, prepared.options).await?;
        Ok(QueryOutcome::reshape(kind, results))
    }

    /// Open a READ COMMITTED transaction and return a dispatcher bound to it.
    pub async fn begin_transaction(&self) -> DbResult<Dispatcher> {
        let driver = self.driver()?;
        let transaction = driver.begin_transaction(TRANSACTION_ISOLATION).await?;
        info!(transaction_id = %transaction.id(), "Transaction context created");

        Ok(Dispatcher {
            connection: Some(Arc::clone(driver)),
            transaction: Some(transaction),
        })
    }

    fn bound_transaction(&self, action: &str) -> DbResult<&TransactionHandle> {
        self.transaction.as_ref().ok_or_else(|| {
            DbError::transaction_state(
                format!("Transaction not initiated use beginTransaction before {action}."),
                None,
            )
        })
    }

    /// Commit the bound transaction.
    pub async fn commit(&self) -> DbResult<()> {
        let transaction = self.bound_transaction("commit")?;
        transaction.commit().await?;
        info!(transaction_id = %transaction.id(), "Transaction committed");
        Ok(())
    }

    /// Roll back the bound transaction.
    pub async fn rollback(&self) -> DbResult<()> {
        let transaction = self.bound_transaction("rollback")?;
        transaction.rollback().await?;
        info!(transaction_id = %transaction.id(), "Transaction rolled back");
        Ok(())
    }

    /// Callback form of [`Dispatcher::execute`].
    pub fn execute_callback<C>(
        &self,
        statement: impl Into<Statement>,
        params: Vec<SqlValue>,
        callback: C,
    ) -> JoinHandle<()>
    where
        C: FnOnce(DbResult<QueryOutcome>) + Send + 'static,
    {
        let this = self.clone();
        let statement = statement.into();
        spawn_with_callback(async move { this.execute(statement, params).await }, callback)
    }

    /// Callback form of [`Dispatcher::begin_transaction`].
    pub fn begin_transaction_callback<C>(&self, callback: C) -> JoinHandle<()>
    where
        C: FnOnce(DbResult<Dispatcher>) + Send + 'static,
    {
        let this = self.clone();
        spawn_with_callback(async move { this.begin_transaction().await }, callback)
    }

    /// Callback form of [`Dispatcher::commit`].
    pub fn commit_callback<C>(&self, callback: C) -> JoinHandle<()>
    where
        C: FnOnce(DbResult<()>) + Send + 'static,
    {
        let this = self.clone();
        spawn_with_callback(async move { this.commit().await }, callback)
    }

    /// Callback form of [`Dispatcher::rollback`].
    pub fn rollback_callback<C>(&self, callback: C) -> JoinHandle<()>
    where
        C: FnOnce(DbResult<()>) + Send + 'static,
    {
        let this = self.clone();
        spawn_with_callback(async move { this.rollback().await }, callback)
    }
}

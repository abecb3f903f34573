//! Shared test driver that records what the dispatcher sends.

#![allow(dead_code)]

use async_trait::async_trait;
use mysql_dispatch::db::{Driver, DriverTransaction, TransactionHandle};
use mysql_dispatch::error::{DbError, DbResult};
use mysql_dispatch::models::{
    IsolationLevel, QueryOptions, ResultHeader, Row, StatementKind, StatementResult,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One batch as seen by the driver.
#[derive(Debug, Clone)]
pub struct Call {
    pub sql: String,
    pub options: QueryOptions,
}

#[derive(Debug, Default)]
pub struct StubDriver {
    calls: Mutex<Vec<Call>>,
    responses: Mutex<VecDeque<DbResult<Vec<StatementResult>>>>,
    begun: Mutex<Vec<IsolationLevel>>,
    next_tx: AtomicUsize,
}

impl StubDriver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue the reply for the next batch. Without a queued reply the driver
    /// answers like a server would for a single statement.
    pub fn respond(&self, response: DbResult<Vec<StatementResult>>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_call(&self) -> Call {
        self.calls().pop().expect("driver was called")
    }

    pub fn begun(&self) -> Vec<IsolationLevel> {
        self.begun.lock().unwrap().clone()
    }

    fn default_response(options: &QueryOptions) -> Vec<StatementResult> {
        match options.kind {
            StatementKind::Read => vec![StatementResult::Rows(vec![])],
            StatementKind::Mutating => vec![
                StatementResult::Rows(vec![row(serde_json::json!({"1": 1}))]),
                StatementResult::Header(ResultHeader {
                    affected_rows: 1,
                    insert_id: 0,
                }),
            ],
        }
    }
}

#[async_trait]
impl Driver for StubDriver {
    async fn query(&self, sql: &str, options: QueryOptions) -> DbResult<Vec<StatementResult>> {
        self.calls.lock().unwrap().push(Call {
            sql: sql.to_string(),
            options: options.clone(),
        });
        if let Some(transaction) = &options.transaction {
            transaction.query(sql, &options).await?;
        }
        let queued = self.responses.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| Ok(Self::default_response(&options)))
    }

    async fn begin_transaction(&self, isolation: IsolationLevel) -> DbResult<TransactionHandle> {
        self.begun.lock().unwrap().push(isolation);
        let n = self.next_tx.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(StubTransaction::new(format!("tx_stub_{n}"), isolation)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    Open,
    Committed,
    RolledBack,
}

#[derive(Debug)]
pub struct StubTransaction {
    id: String,
    isolation: IsolationLevel,
    state: Mutex<TxState>,
    statements: Mutex<Vec<String>>,
}

impl StubTransaction {
    pub fn new(id: impl Into<String>, isolation: IsolationLevel) -> Self {
        Self {
            id: id.into(),
            isolation,
            state: Mutex::new(TxState::Open),
            statements: Mutex::new(Vec::new()),
        }
    }

    pub fn state(&self) -> TxState {
        *self.state.lock().unwrap()
    }

    pub fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }

    fn finish(&self, next: TxState) -> DbResult<()> {
        let mut state = self.state.lock().unwrap();
        if *state != TxState::Open {
            return Err(DbError::transaction_state(
                "Transaction is no longer active",
                Some(&self.id),
            ));
        }
        *state = next;
        Ok(())
    }
}

#[async_trait]
impl DriverTransaction for StubTransaction {
    fn id(&self) -> &str {
        &self.id
    }

    fn isolation_level(&self) -> IsolationLevel {
        self.isolation
    }

    async fn query(&self, sql: &str, _options: &QueryOptions) -> DbResult<Vec<StatementResult>> {
        if self.state() != TxState::Open {
            return Err(DbError::transaction_state(
                "Transaction is no longer active",
                Some(&self.id),
            ));
        }
        self.statements.lock().unwrap().push(sql.to_string());
        Ok(vec![])
    }

    async fn commit(&self) -> DbResult<()> {
        self.finish(TxState::Committed)
    }

    async fn rollback(&self) -> DbResult<()> {
        self.finish(TxState::RolledBack)
    }
}

pub fn row(value: serde_json::Value) -> Row {
    value.as_object().cloned().expect("row literal is an object")
}

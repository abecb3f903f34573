//! Query-related data models.
//!
//! This module defines the statement descriptor accepted by the dispatcher,
//! the options handed to the driver, and the shapes results come back in.

use crate::db::TransactionHandle;
use crate::models::SqlValue;
use crate::sqlstring;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Prepended to mutating statements so every mutating batch yields a leading
/// result entry that is discarded again when the result is reshaped.
pub const NOOP_STATEMENT: &str = "SELECT 1;";

/// One result row, column name to decoded value.
pub type Row = serde_json::Map<String, JsonValue>;

/// How a statement is treated by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    Read,
    Mutating,
}

impl StatementKind {
    /// A statement is a read when its trimmed text starts with `SELECT`
    /// (case-sensitive). Only the empty string counts as a read; text made
    /// of whitespace alone is mutating.
    pub fn classify(sql: &str) -> Self {
        if sql.is_empty() || sql.trim().starts_with("SELECT") {
            Self::Read
        } else {
            Self::Mutating
        }
    }

    pub fn is_read(self) -> bool {
        self == Self::Read
    }
}

/// Transaction isolation levels understood by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::ReadUncommitted => "READ UNCOMMITTED",
            Self::ReadCommitted => "READ COMMITTED",
            Self::RepeatableRead => "REPEATABLE READ",
            Self::Serializable => "SERIALIZABLE",
        }
    }
}

impl std::fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A statement to execute: SQL text plus optional per-statement settings.
///
/// Plain strings convert into a descriptor with no values, no nesting and no
/// transaction.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statement {
    pub sql: String,
    /// When present, used instead of the parameters passed to `execute`.
    #[serde(default)]
    pub values: Option<Vec<SqlValue>>,
    #[serde(default)]
    pub nest_tables: bool,
    /// Used only when the dispatcher has no transaction of its own.
    #[serde(skip)]
    pub transaction: Option<TransactionHandle>,
    /// Unrecognized descriptor fields, carried but not interpreted.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, JsonValue>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            ..Self::default()
        }
    }

    pub fn with_values(mut self, values: Vec<SqlValue>) -> Self {
        self.values = Some(values);
        self
    }

    pub fn with_nest_tables(mut self, nest: bool) -> Self {
        self.nest_tables = nest;
        self
    }

    pub fn with_transaction(mut self, transaction: TransactionHandle) -> Self {
        self.transaction = Some(transaction);
        self
    }

    /// Classify, substitute parameters and build driver options.
    ///
    /// `scoped` is the dispatcher's own transaction; it takes precedence over
    /// the descriptor's.
    pub fn prepare(
        self,
        params: Vec<SqlValue>,
        scoped: Option<TransactionHandle>,
    ) -> PreparedStatement {
        let kind = StatementKind::classify(&self.sql);
        let sql = match kind {
            StatementKind::Read => self.sql,
            StatementKind::Mutating => format!("{NOOP_STATEMENT}{}", self.sql),
        };
        let parameters = self.values.unwrap_or(params);
        let sql = sqlstring::format(&sql, &parameters);

        PreparedStatement {
            sql,
            options: QueryOptions {
                raw: true,
                nest: self.nest_tables,
                transaction: scoped.or(self.transaction),
                kind,
                parameters,
            },
        }
    }
}

impl From<&str> for Statement {
    fn from(sql: &str) -> Self {
        Self::new(sql)
    }
}

impl From<String> for Statement {
    fn from(sql: String) -> Self {
        Self::new(sql)
    }
}

impl From<&String> for Statement {
    fn from(sql: &String) -> Self {
        Self::new(sql.as_str())
    }
}

/// Options handed to the driver with every batch.
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Rows come back as plain maps. Always true from the dispatcher.
    pub raw: bool,
    /// Group dotted column names into nested objects.
    pub nest: bool,
    pub transaction: Option<TransactionHandle>,
    pub kind: StatementKind,
    /// Values already substituted into the SQL; kept for the logging hook.
    pub parameters: Vec<SqlValue>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            raw: true,
            nest: false,
            transaction: None,
            kind: StatementKind::Read,
            parameters: Vec::new(),
        }
    }
}

/// Final SQL text plus the options to send it with.
#[derive(Debug, Clone)]
pub struct PreparedStatement {
    pub sql: String,
    pub options: QueryOptions,
}

/// Outcome of a statement that returns no rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultHeader {
    pub affected_rows: u64,
    pub insert_id: u64,
}

/// The result of one statement within a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatementResult {
    Rows(Vec<Row>),
    Header(ResultHeader),
}

impl StatementResult {
    /// Rows of this entry; a header yields none.
    pub fn into_rows(self) -> Vec<Row> {
        match self {
            Self::Rows(rows) => rows,
            Self::Header(_) => Vec::new(),
        }
    }

    pub fn header(&self) -> Option<&ResultHeader> {
        match self {
            Self::Header(h) => Some(h),
            Self::Rows(_) => None,
        }
    }
}

/// What `execute` returns, after the no-op prefix result is removed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryOutcome {
    /// A read statement's rows.
    Rows(Vec<Row>),
    /// The single remaining entry of a mutating statement.
    Statement(StatementResult),
    /// Several entries: a multi-statement mutating batch, or a batch that
    /// starts with `SELECT` and contains more than one statement.
    Statements(Vec<StatementResult>),
}

impl QueryOutcome {
    pub fn reshape(kind: StatementKind, mut results: Vec<StatementResult>) -> Self {
        match kind {
            StatementKind::Read => match results.len() {
                0 => Self::Rows(Vec::new()),
                1 => Self::Rows(results.remove(0).into_rows()),
                _ => Self::Statements(results),
            },
            StatementKind::Mutating => {
                if !results.is_empty() {
                    results.remove(0);
                }
                if results.len() == 1 {
                    Self::Statement(results.remove(0))
                } else {
                    Self::Statements(results)
                }
            }
        }
    }

    pub fn rows(&self) -> Option<&[Row]> {
        match self {
            Self::Rows(rows) | Self::Statement(StatementResult::Rows(rows)) => Some(rows),
            _ => None,
        }
    }

    pub fn header(&self) -> Option<&ResultHeader> {
        match self {
            Self::Statement(result) => result.header(),
            _ => None,
        }
    }

    /// Affected rows of a single-statement mutation.
    pub fn affected_rows(&self) -> Option<u64> {
        self.header().map(|h| h.affected_rows)
    }

    pub fn statements(&self) -> Option<&[StatementResult]> {
        match self {
            Self::Statements(results) => Some(results),
            _ => None,
        }
    }
}

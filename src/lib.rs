//! mysql-dispatch
//!
//! A uniform statement dispatcher and transaction context over MySQL
//! connection pools. Reads return their rows, mutations return their result
//! header, and `begin_transaction` hands back a dispatcher bound to a READ
//! COMMITTED transaction.
//!
//! ```no_run
//! # async fn demo() -> mysql_dispatch::DbResult<()> {
//! use mysql_dispatch::{ConnectionOptions, connect};
//!
//! let db = connect(ConnectionOptions::new("shop", "app", "secret"));
//! let tx = db.begin_transaction().await?;
//! tx.execute("UPDATE stock SET qty = qty - 1 WHERE id = ?", vec![5.into()])
//!     .await?;
//! tx.commit().await?;
//! # Ok(())
//! # }
//! ```

pub mod callback;
pub mod config;
pub mod db;
pub mod dispatcher;
pub mod error;
pub mod factory;
pub mod models;
pub mod sqlstring;
pub mod timezone;

pub use config::{Config, PoolOptions};
pub use dispatcher::Dispatcher;
pub use error::{DbError, DbResult};
pub use factory::connect;
pub use models::{
    ConnectionOptions, ConnectionSource, QueryLog, QueryOutcome, ReplicationOptions, ResultHeader,
    Row, ServerOptions, SqlValue, Statement, StatementResult,
};

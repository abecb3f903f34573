//! Database abstraction layer.
//!
//! - Driver boundary traits the dispatcher is written against
//! - The sqlx MySQL driver and its transactions
//! - Row decoding and type mappings

pub mod driver;
pub mod mysql;
pub mod types;

pub use driver::{Driver, DriverTransaction, TransactionHandle, generate_transaction_id};
pub use mysql::{MySqlDriver, MySqlTransaction};

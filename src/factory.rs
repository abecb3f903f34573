//! Connection factory.
//!
//! Turns structured options or a connection URL into a [`Dispatcher`] bound
//! to a lazily connecting MySQL pool.

use crate::db::MySqlDriver;
use crate::dispatcher::Dispatcher;
use crate::models::{ConnectionSource, masked_connection_string};
use std::sync::Arc;
use tracing::warn;

/// Build a dispatcher for `source`.
///
/// Nothing is sent to the server here; connection failures surface on the
/// first statement. A URL that cannot be parsed yields a dispatcher without a
/// connection, whose operations fail with a connection error.
///
/// Must be called from within a Tokio runtime.
pub fn connect(source: impl Into<ConnectionSource>) -> Dispatcher {
    match source.into() {
        ConnectionSource::Options(options) => {
            let resolved = options.resolve();
            Dispatcher::new(Arc::new(MySqlDriver::from_resolved(&resolved)))
        }
        ConnectionSource::Url(url) => match MySqlDriver::from_url(&url) {
            Ok(driver) => Dispatcher::new(Arc::new(driver)),
            Err(e) => {
                warn!(
                    url = %masked_connection_string(&url),
                    error = %e,
                    "Could not build a connection from URL"
                );
                Dispatcher::disconnected()
            }
        },
    }
}

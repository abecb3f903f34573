//! Callback adapters for awaited operations.
//!
//! Lets callers that prefer completion callbacks use any `DbResult`-returning
//! future. The callback receives exactly one result.

use crate::error::DbResult;
use std::future::Future;
use tokio::task::JoinHandle;

/// Spawn `future` on the Tokio runtime and hand its result to `callback`.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_with_callback<T, F, C>(future: F, callback: C) -> JoinHandle<()>
where
    T: Send + 'static,
    F: Future<Output = DbResult<T>> + Send + 'static,
    C: FnOnce(DbResult<T>) + Send + 'static,
{
    tokio::spawn(async move {
        let result = future.await;
        callback(result);
    })
}

/// Await `future` in place and hand its result to `callback`.
pub async fn with_callback<T, F, C>(future: F, callback: C)
where
    F: Future<Output = DbResult<T>>,
    C: FnOnce(DbResult<T>),
{
    callback(future.await);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_spawn_with_callback_forwards_success() {
        let (tx, rx) = oneshot::channel();
        spawn_with_callback(async { Ok(7) }, move |result: DbResult<i32>| {
            let _ = tx.send(result);
        })
        .await
        .unwrap();
        assert_eq!(rx.await.unwrap().unwrap(), 7);
    }

    #[tokio::test]
    async fn test_spawn_with_callback_forwards_error() {
        let (tx, rx) = oneshot::channel();
        spawn_with_callback(
            async { Err::<(), _>(DbError::invalid_input("bad")) },
            move |result| {
                let _ = tx.send(result);
            },
        )
        .await
        .unwrap();
        let err = rx.await.unwrap().unwrap_err();
        assert!(matches!(err, DbError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_with_callback_runs_inline() {
        let mut seen = None;
        with_callback(async { Ok("done") }, |result| seen = Some(result)).await;
        assert_eq!(seen.unwrap().unwrap(), "done");
    }
}

//! Bounded collaborator calls.

use powertrip_error::{PowertripResult, TimeoutError};
use std::future::Future;
use std::time::Duration;

/// Run a collaborator call, failing with a [`TimeoutError`] after `limit`.
pub(crate) async fn bounded<T, F>(operation: &'static str, limit: Duration, call: F) -> PowertripResult<T>
where
    F: Future<Output = PowertripResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(TimeoutError::new(operation, limit).into()),
    }
}

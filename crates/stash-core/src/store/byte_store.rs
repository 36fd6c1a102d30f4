//! Async byte store contract.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use crate::{EntryOptions, Result};

/// Async key/value byte store.
///
/// Implementations must be safe to share across concurrent callers. Ordering
/// of concurrent writes to the same key is the store's responsibility
/// (typically last write wins).
#[async_trait]
pub trait ByteStore: Send + Sync {
    /// Returns the raw payload stored under `key`, or `None` on a miss.
    async fn get(&self, key: &str, cancel: &CancellationToken) -> Result<Option<Bytes>>;

    /// Stores `value` under `key`, replacing any previous payload.
    async fn set(
        &self,
        key: &str,
        value: Bytes,
        options: &EntryOptions,
        cancel: &CancellationToken,
    ) -> Result<()>;

    /// Removes the entry stored under `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str, cancel: &CancellationToken) -> Result<()>;

    /// Resets the sliding expiration of the entry stored under `key`, if any.
    async fn refresh(&self, key: &str, cancel: &CancellationToken) -> Result<()>;
}

#[async_trait]
impl<S> ByteStore for Arc<S>
where
    S: ByteStore + ?Sized,
{
    async fn get(&self, key: &str, cancel: &CancellationToken) -> Result<Option<Bytes>> {
        (**self).get(key, cancel).await
    }

    async fn set(
        &self,
        key: &str,
        value: Bytes,
        options: &EntryOptions,
        cancel: &CancellationToken,
    ) -> Result<()> {
        (**self).set(key, value, options, cancel).await
    }

    async fn remove(&self, key: &str, cancel: &CancellationToken) -> Result<()> {
        (**self).remove(key, cancel).await
    }

    async fn refresh(&self, key: &str, cancel: &CancellationToken) -> Result<()> {
        (**self).refresh(key, cancel).await
    }
}

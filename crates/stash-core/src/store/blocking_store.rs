//! Blocking byte store contract.

use std::sync::Arc;

use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use crate::{EntryOptions, Result};

/// Blocking key/value byte store.
///
/// Same contract as [`ByteStore`](crate::ByteStore), but every call blocks the
/// calling thread until the store answers.
pub trait BlockingByteStore: Send + Sync {
    /// Returns the raw payload stored under `key`, or `None` on a miss.
    fn get(&self, key: &str, cancel: &CancellationToken) -> Result<Option<Bytes>>;

    /// Stores `value` under `key`, replacing any previous payload.
    fn set(
        &self,
        key: &str,
        value: Bytes,
        options: &EntryOptions,
        cancel: &CancellationToken,
    ) -> Result<()>;

    /// Removes the entry stored under `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str, cancel: &CancellationToken) -> Result<()>;

    /// Resets the sliding expiration of the entry stored under `key`, if any.
    fn refresh(&self, key: &str, cancel: &CancellationToken) -> Result<()>;
}

impl<S> BlockingByteStore for Arc<S>
where
    S: BlockingByteStore + ?Sized,
{
    fn get(&self, key: &str, cancel: &CancellationToken) -> Result<Option<Bytes>> {
        (**self).get(key, cancel)
    }

    fn set(
        &self,
        key: &str,
        value: Bytes,
        options: &EntryOptions,
        cancel: &CancellationToken,
    ) -> Result<()> {
        (**self).set(key, value, options, cancel)
    }

    fn remove(&self, key: &str, cancel: &CancellationToken) -> Result<()> {
        (**self).remove(key, cancel)
    }

    fn refresh(&self, key: &str, cancel: &CancellationToken) -> Result<()> {
        (**self).refresh(key, cancel)
    }
}

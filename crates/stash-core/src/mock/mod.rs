//! In-memory mock store for testing.
//!
//! [`MockStore`] implements both [`ByteStore`] and [`BlockingByteStore`] on
//! top of a `HashMap`. It records how often each operation was called, can be
//! told to fail a given operation, and can delay async calls so tests can
//! cancel them mid-flight. Absolute expiration hints are honored on read.
//!
//! # Feature Flag
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! stash-core = { version = "...", features = ["test-utils"] }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use stash_core::mock::{MockOperation, MockStore};
//!
//! let store = MockStore::new().with_failure(MockOperation::Set);
//! assert_eq!(store.calls(MockOperation::Get), 0);
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use jiff::Timestamp;
use strum::{AsRefStr, IntoStaticStr};
use tokio_util::sync::CancellationToken;

use crate::{BlockingByteStore, ByteStore, EntryOptions, Error, Result, TRACING_TARGET_STORE};

const OPERATION_COUNT: usize = 4;

/// Store operations tracked by [`MockStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum MockOperation {
    Get,
    Set,
    Remove,
    Refresh,
}

impl MockOperation {
    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// A stored payload together with the options it was written with.
#[derive(Debug, Clone, PartialEq)]
pub struct MockEntry {
    pub payload: Bytes,
    pub options: EntryOptions,
    /// Absolute deadline resolved from `options` at write time.
    pub expires_at: Option<Timestamp>,
    pub refreshed: usize,
}

impl MockEntry {
    fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }
}

/// In-memory [`ByteStore`] and [`BlockingByteStore`] implementation.
#[derive(Debug, Default)]
pub struct MockStore {
    entries: Mutex<HashMap<String, MockEntry>>,
    calls: [AtomicUsize; OPERATION_COUNT],
    failures: Mutex<Vec<MockOperation>>,
    delay: Option<Duration>,
}

impl MockStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call to `operation` fail with a store error.
    #[must_use]
    pub fn with_failure(self, operation: MockOperation) -> Self {
        self.fail(operation);
        self
    }

    /// Delays every async call by `delay` before it touches the map.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Makes every subsequent call to `operation` fail with a store error.
    pub fn fail(&self, operation: MockOperation) {
        let mut failures = lock(&self.failures);
        if !failures.contains(&operation) {
            failures.push(operation);
        }
    }

    /// Clears all injected failures.
    pub fn heal(&self) {
        lock(&self.failures).clear();
    }

    /// Seeds a raw payload, bypassing any codec. The entry never expires.
    pub fn insert_raw(&self, key: impl Into<String>, payload: impl Into<Bytes>) {
        lock(&self.entries).insert(
            key.into(),
            MockEntry {
                payload: payload.into(),
                options: EntryOptions::default(),
                expires_at: None,
                refreshed: 0,
            },
        );
    }

    /// Returns the entry stored under `key`.
    pub fn entry(&self, key: &str) -> Option<MockEntry> {
        lock(&self.entries).get(key).cloned()
    }

    /// Returns `true` if an entry is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        lock(&self.entries).contains_key(key)
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of calls made to `operation`, including failed ones.
    pub fn calls(&self, operation: MockOperation) -> usize {
        self.calls[operation.index()].load(Ordering::SeqCst)
    }

    /// Total number of calls across all operations.
    pub fn total_calls(&self) -> usize {
        self.calls.iter().map(|c| c.load(Ordering::SeqCst)).sum()
    }

    fn enter(&self, operation: MockOperation, cancel: &CancellationToken) -> Result<()> {
        self.calls[operation.index()].fetch_add(1, Ordering::SeqCst);

        if cancel.is_cancelled() {
            return Err(Error::cancelled(operation.into()));
        }

        if lock(&self.failures).contains(&operation) {
            tracing::debug!(
                target: TRACING_TARGET_STORE,
                operation = operation.as_ref(),
                "Injected mock store failure"
            );
            return Err(Error::store(operation.as_ref(), "injected failure"));
        }

        Ok(())
    }

    async fn pause(&self, operation: MockOperation, cancel: &CancellationToken) -> Result<()> {
        let Some(delay) = self.delay else {
            return Ok(());
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::cancelled(operation.into())),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }

    fn read(&self, key: &str) -> Option<Bytes> {
        let mut entries = lock(&self.entries);
        if entries.get(key)?.is_expired(Timestamp::now()) {
            entries.remove(key);
            tracing::trace!(target: TRACING_TARGET_STORE, key, "Evicted expired mock entry");
            return None;
        }
        entries.get(key).map(|e| e.payload.clone())
    }

    fn write(&self, key: &str, value: Bytes, options: &EntryOptions) {
        lock(&self.entries).insert(
            key.to_string(),
            MockEntry {
                payload: value,
                options: options.clone(),
                expires_at: options.absolute_deadline(Timestamp::now()),
                refreshed: 0,
            },
        );
    }

    fn delete(&self, key: &str) {
        lock(&self.entries).remove(key);
    }

    fn touch(&self, key: &str) {
        if let Some(entry) = lock(&self.entries).get_mut(key) {
            entry.refreshed += 1;
        }
    }
}

#[async_trait]
impl ByteStore for MockStore {
    async fn get(&self, key: &str, cancel: &CancellationToken) -> Result<Option<Bytes>> {
        self.enter(MockOperation::Get, cancel)?;
        self.pause(MockOperation::Get, cancel).await?;
        Ok(self.read(key))
    }

    async fn set(
        &self,
        key: &str,
        value: Bytes,
        options: &EntryOptions,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.enter(MockOperation::Set, cancel)?;
        self.pause(MockOperation::Set, cancel).await?;
        self.write(key, value, options);
        Ok(())
    }

    async fn remove(&self, key: &str, cancel: &CancellationToken) -> Result<()> {
        self.enter(MockOperation::Remove, cancel)?;
        self.pause(MockOperation::Remove, cancel).await?;
        self.delete(key);
        Ok(())
    }

    async fn refresh(&self, key: &str, cancel: &CancellationToken) -> Result<()> {
        self.enter(MockOperation::Refresh, cancel)?;
        self.pause(MockOperation::Refresh, cancel).await?;
        self.touch(key);
        Ok(())
    }
}

impl BlockingByteStore for MockStore {
    fn get(&self, key: &str, cancel: &CancellationToken) -> Result<Option<Bytes>> {
        self.enter(MockOperation::Get, cancel)?;
        Ok(self.read(key))
    }

    fn set(
        &self,
        key: &str,
        value: Bytes,
        options: &EntryOptions,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.enter(MockOperation::Set, cancel)?;
        self.write(key, value, options);
        Ok(())
    }

    fn remove(&self, key: &str, cancel: &CancellationToken) -> Result<()> {
        self.enter(MockOperation::Remove, cancel)?;
        self.delete(key);
        Ok(())
    }

    fn refresh(&self, key: &str, cancel: &CancellationToken) -> Result<()> {
        self.enter(MockOperation::Refresh, cancel)?;
        self.touch(key);
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

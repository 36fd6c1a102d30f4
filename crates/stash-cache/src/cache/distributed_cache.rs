//! Async cache-aside accessors.

use std::future::Future;

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use super::{KeyNamespace, cancellable, ensure_active};
use crate::{
    BoxedError, ByteStore, CacheConfig, Codec, EntryOptions, Error, JsonCodec, Result,
    TRACING_TARGET_CACHE,
};

/// Typed async accessors over a [`ByteStore`].
///
/// The cache is stateless apart from its store handle, its codec and an
/// optional key namespace. Every call accepts a [`CancellationToken`] that is
/// forwarded to the store and raced against each suspension point (store read,
/// producer, store write).
///
/// # Concurrency
///
/// No mutual exclusion is provided. Two concurrent misses on the same key both
/// run their producer and both write, and the store decides which write wins.
#[derive(Debug, Clone)]
pub struct DistributedCache<S, C = JsonCodec> {
    store: S,
    codec: C,
    namespace: KeyNamespace,
}

impl<S> DistributedCache<S, JsonCodec>
where
    S: ByteStore,
{
    /// Creates a cache over `store` using the JSON codec.
    pub fn new(store: S) -> Self {
        Self::with_codec(store, JsonCodec)
    }

    /// Creates a cache over `store` using the JSON codec and `config`.
    pub fn from_config(store: S, config: &CacheConfig) -> Result<Self> {
        config.validate()?;
        let cache = Self::new(store);
        Ok(match config.namespace() {
            Some(namespace) => cache.with_namespace(namespace),
            None => cache,
        })
    }
}

impl<S, C> DistributedCache<S, C>
where
    S: ByteStore,
    C: Codec,
{
    /// Creates a cache over `store` using `codec`.
    pub fn with_codec(store: S, codec: C) -> Self {
        Self {
            store,
            codec,
            namespace: KeyNamespace::default(),
        }
    }

    /// Prefixes every key with `namespace:`. A blank namespace disables prefixing.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl AsRef<str>) -> Self {
        self.namespace = KeyNamespace::new(namespace);
        self
    }

    /// Returns the underlying store.
    #[inline]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the codec.
    #[inline]
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Returns the key namespace, if any.
    #[inline]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_str()
    }

    /// Reads and decodes the value stored under `key`.
    ///
    /// Returns `Ok(None)` on a miss, including a stored null marker. A payload
    /// that fails to decode is an [`Error::Deserialization`], never a miss.
    #[tracing::instrument(skip(self, cancel), target = TRACING_TARGET_CACHE)]
    pub async fn get<T>(&self, key: &str, cancel: &CancellationToken) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let key = self.namespace.resolve(key)?;
        self.read(&key, cancel).await
    }

    /// Encodes `value` and writes it under `key`.
    ///
    /// `options` are handed to the store untouched. A value that encodes to the
    /// codec's null marker is rejected before the store is contacted.
    #[tracing::instrument(skip(self, value, options, cancel), target = TRACING_TARGET_CACHE)]
    pub async fn set<T>(
        &self,
        key: &str,
        value: &T,
        options: &EntryOptions,
        cancel: &CancellationToken,
    ) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let key = self.namespace.resolve(key)?;
        let payload = self.codec.encode(value)?;
        if self.codec.is_null(&payload) {
            return Err(Error::validation("cache value must not be null"));
        }
        self.write(&key, payload, options, cancel).await
    }

    /// Returns the cached value for `key`, or computes, stores and returns it.
    ///
    /// On a hit the producer is not invoked, however stale the cached value.
    /// On a miss the producer runs exactly once: a present result is written
    /// with `options` and returned, an absent result is returned as `None` and
    /// nothing is written, so the next call runs the producer again.
    ///
    /// The read completes before the producer is polled, and the producer
    /// completes before the write is issued.
    #[tracing::instrument(skip(self, producer, options, cancel), target = TRACING_TARGET_CACHE)]
    pub async fn get_or_populate<T, F, Fut>(
        &self,
        key: &str,
        producer: F,
        options: &EntryOptions,
        cancel: &CancellationToken,
    ) -> Result<Option<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<T>>,
    {
        let key = self.namespace.resolve(key)?;
        if let Some(cached) = self.read(&key, cancel).await? {
            return Ok(Some(cached));
        }

        let produced =
            cancellable(cancel, "producer", async { Ok::<_, Error>(producer().await) }).await?;
        self.populate(&key, produced, options, cancel).await
    }

    /// Same as [`get_or_populate`](Self::get_or_populate) with a producer that
    /// answers immediately.
    #[tracing::instrument(skip(self, producer, options, cancel), target = TRACING_TARGET_CACHE)]
    pub async fn get_or_populate_with<T, F>(
        &self,
        key: &str,
        producer: F,
        options: &EntryOptions,
        cancel: &CancellationToken,
    ) -> Result<Option<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Option<T>,
    {
        let key = self.namespace.resolve(key)?;
        if let Some(cached) = self.read(&key, cancel).await? {
            return Ok(Some(cached));
        }

        ensure_active(cancel, "producer")?;
        let produced = producer();
        self.populate(&key, produced, options, cancel).await
    }

    /// Same as [`get_or_populate`](Self::get_or_populate) with a fallible
    /// producer. A producer error becomes [`Error::Producer`] and nothing is
    /// written.
    #[tracing::instrument(skip(self, producer, options, cancel), target = TRACING_TARGET_CACHE)]
    pub async fn try_get_or_populate<T, E, F, Fut>(
        &self,
        key: &str,
        producer: F,
        options: &EntryOptions,
        cancel: &CancellationToken,
    ) -> Result<Option<T>>
    where
        T: Serialize + DeserializeOwned,
        E: Into<BoxedError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
    {
        let key = self.namespace.resolve(key)?;
        if let Some(cached) = self.read(&key, cancel).await? {
            return Ok(Some(cached));
        }

        let produced = cancellable(cancel, "producer", async {
            producer().await.map_err(Error::producer)
        })
        .await?;
        self.populate(&key, produced, options, cancel).await
    }

    /// Removes the entry stored under `key`.
    #[tracing::instrument(skip(self, cancel), target = TRACING_TARGET_CACHE)]
    pub async fn remove(&self, key: &str, cancel: &CancellationToken) -> Result<()> {
        let key = self.namespace.resolve(key)?;
        cancellable(cancel, "remove", self.store.remove(&key, cancel)).await?;
        tracing::debug!(target: TRACING_TARGET_CACHE, key = %key, "Removed cached value");
        Ok(())
    }

    /// Resets the sliding expiration of the entry stored under `key`.
    #[tracing::instrument(skip(self, cancel), target = TRACING_TARGET_CACHE)]
    pub async fn refresh(&self, key: &str, cancel: &CancellationToken) -> Result<()> {
        let key = self.namespace.resolve(key)?;
        cancellable(cancel, "refresh", self.store.refresh(&key, cancel)).await?;
        tracing::debug!(target: TRACING_TARGET_CACHE, key = %key, "Refreshed cached value");
        Ok(())
    }

    async fn read<T>(&self, key: &str, cancel: &CancellationToken) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let Some(payload) = cancellable(cancel, "get", self.store.get(key, cancel)).await? else {
            tracing::debug!(target: TRACING_TARGET_CACHE, key = %key, "Cache miss");
            return Ok(None);
        };

        if self.codec.is_null(&payload) {
            tracing::debug!(
                target: TRACING_TARGET_CACHE,
                key = %key,
                codec = C::NAME,
                "Cache miss, stored value is null"
            );
            return Ok(None);
        }

        let value = self.codec.decode(&payload)?;
        tracing::debug!(
            target: TRACING_TARGET_CACHE,
            key = %key,
            codec = C::NAME,
            size_bytes = payload.len(),
            "Cache hit"
        );
        Ok(Some(value))
    }

    async fn write(
        &self,
        key: &str,
        payload: Bytes,
        options: &EntryOptions,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let size = payload.len();
        cancellable(cancel, "set", self.store.set(key, payload, options, cancel)).await?;
        tracing::debug!(
            target: TRACING_TARGET_CACHE,
            key = %key,
            codec = C::NAME,
            size_bytes = size,
            "Cached value"
        );
        Ok(())
    }

    async fn populate<T>(
        &self,
        key: &str,
        produced: Option<T>,
        options: &EntryOptions,
        cancel: &CancellationToken,
    ) -> Result<Option<T>>
    where
        T: Serialize,
    {
        let Some(value) = produced else {
            tracing::debug!(
                target: TRACING_TARGET_CACHE,
                key = %key,
                "Producer returned nothing, skipping write"
            );
            return Ok(None);
        };

        let payload = self.codec.encode(&value)?;
        if self.codec.is_null(&payload) {
            tracing::debug!(
                target: TRACING_TARGET_CACHE,
                key = %key,
                "Producer returned a null value, skipping write"
            );
            return Ok(None);
        }

        self.write(key, payload, options, cancel).await?;
        Ok(Some(value))
    }
}

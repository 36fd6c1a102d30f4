//! Blocking cache-aside accessors.

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use super::{KeyNamespace, ensure_active};
use crate::{
    BlockingByteStore, BoxedError, CacheConfig, Codec, EntryOptions, Error, JsonCodec, Result,
    TRACING_TARGET_CACHE,
};

/// Typed blocking accessors over a [`BlockingByteStore`].
///
/// Mirrors [`DistributedCache`](crate::DistributedCache) for callers without
/// an async runtime. The cancellation token is forwarded to the store and
/// checked before the read, before the producer and before the write.
///
/// Like its async counterpart it provides no mutual exclusion across
/// concurrent misses on the same key.
#[derive(Debug, Clone)]
pub struct BlockingCache<S, C = JsonCodec> {
    store: S,
    codec: C,
    namespace: KeyNamespace,
}

impl<S> BlockingCache<S, JsonCodec>
where
    S: BlockingByteStore,
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

impl<S, C> BlockingCache<S, C>
where
    S: BlockingByteStore,
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

    /// Reads and decodes the value stored under `key`; `Ok(None)` on a miss,
    /// including a stored null marker.
    #[tracing::instrument(skip(self, cancel), target = TRACING_TARGET_CACHE)]
    pub fn get<T>(&self, key: &str, cancel: &CancellationToken) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let key = self.namespace.resolve(key)?;
        self.read(&key, cancel)
    }

    /// Encodes `value` and writes it under `key` with `options`.
    #[tracing::instrument(skip(self, value, options, cancel), target = TRACING_TARGET_CACHE)]
    pub fn set<T>(
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
        self.write(&key, payload, options, cancel)
    }

    /// Returns the cached value for `key`, or runs `producer` once, stores a
    /// present result and returns it. An absent result is not cached.
    pub fn get_or_populate<T, F>(
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
        self.try_get_or_populate(key, || Ok::<_, Error>(producer()), options, cancel)
    }

    /// Same as [`get_or_populate`](Self::get_or_populate) with a fallible
    /// producer. A producer error becomes [`Error::Producer`].
    #[tracing::instrument(skip(self, producer, options, cancel), target = TRACING_TARGET_CACHE)]
    pub fn try_get_or_populate<T, E, F>(
        &self,
        key: &str,
        producer: F,
        options: &EntryOptions,
        cancel: &CancellationToken,
    ) -> Result<Option<T>>
    where
        T: Serialize + DeserializeOwned,
        E: Into<BoxedError>,
        F: FnOnce() -> Result<Option<T>, E>,
    {
        let key = self.namespace.resolve(key)?;
        if let Some(cached) = self.read(&key, cancel)? {
            return Ok(Some(cached));
        }

        ensure_active(cancel, "producer")?;
        let Some(value) = producer().map_err(Error::producer)? else {
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

        self.write(&key, payload, options, cancel)?;
        Ok(Some(value))
    }

    /// Removes the entry stored under `key`.
    #[tracing::instrument(skip(self, cancel), target = TRACING_TARGET_CACHE)]
    pub fn remove(&self, key: &str, cancel: &CancellationToken) -> Result<()> {
        let key = self.namespace.resolve(key)?;
        ensure_active(cancel, "remove")?;
        self.store.remove(&key, cancel)
    }

    /// Resets the sliding expiration of the entry stored under `key`.
    #[tracing::instrument(skip(self, cancel), target = TRACING_TARGET_CACHE)]
    pub fn refresh(&self, key: &str, cancel: &CancellationToken) -> Result<()> {
        let key = self.namespace.resolve(key)?;
        ensure_active(cancel, "refresh")?;
        self.store.refresh(&key, cancel)
    }

    fn read<T>(&self, key: &str, cancel: &CancellationToken) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        ensure_active(cancel, "get")?;
        let Some(payload) = self.store.get(key, cancel)? else {
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

    fn write(
        &self,
        key: &str,
        payload: Bytes,
        options: &EntryOptions,
        cancel: &CancellationToken,
    ) -> Result<()> {
        ensure_active(cancel, "set")?;
        let size = payload.len();
        self.store.set(key, payload, options, cancel)?;
        tracing::debug!(
            target: TRACING_TARGET_CACHE,
            key = %key,
            codec = C::NAME,
            size_bytes = size,
            "Cached value"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use serde::Deserialize;
    use stash_core::mock::{MockOperation, MockStore};

    use super::*;
    use crate::ErrorKind;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct User {
        first: String,
        last: String,
    }

    impl User {
        fn new(first: &str, last: &str) -> Self {
            Self {
                first: first.to_string(),
                last: last.to_string(),
            }
        }
    }

    fn cache() -> BlockingCache<MockStore> {
        BlockingCache::new(MockStore::new())
    }

    #[test]
    fn test_get_on_missing_key_returns_none() -> Result<()> {
        let cache = cache();
        assert_eq!(cache.get::<User>("u1", &CancellationToken::new())?, None);
        Ok(())
    }

    #[test]
    fn test_john_snow_scenario() -> Result<()> {
        let cache = cache();
        let cancel = CancellationToken::new();
        let options = EntryOptions::default();
        let second_invoked = Cell::new(false);

        let first = cache.get_or_populate(
            "u1",
            || Some(User::new("John", "Snow")),
            &options,
            &cancel,
        )?;
        assert_eq!(first, Some(User::new("John", "Snow")));
        assert_eq!(
            cache.get::<User>("u1", &cancel)?,
            Some(User::new("John", "Snow"))
        );

        let second = cache.get_or_populate(
            "u1",
            || {
                second_invoked.set(true);
                Some(User::new("Jane", "Doe"))
            },
            &options,
            &cancel,
        )?;
        assert_eq!(second, Some(User::new("John", "Snow")));
        assert!(!second_invoked.get());
        Ok(())
    }

    #[test]
    fn test_absent_producer_result_is_not_cached() -> Result<()> {
        let cache = cache();
        let cancel = CancellationToken::new();
        let calls = Cell::new(0);

        for _ in 0..3 {
            let user = cache.get_or_populate(
                "u1",
                || {
                    calls.set(calls.get() + 1);
                    None::<User>
                },
                &EntryOptions::default(),
                &cancel,
            )?;
            assert_eq!(user, None);
        }

        assert_eq!(calls.get(), 3);
        assert!(!cache.store().contains("u1"));
        Ok(())
    }

    #[test]
    fn test_validation_skips_store() {
        let cache = cache();
        let cancel = CancellationToken::new();

        assert!(cache.get::<User>("", &cancel).unwrap_err().is_validation());
        assert!(
            cache
                .set("u1", &Option::<User>::None, &EntryOptions::default(), &cancel)
                .unwrap_err()
                .is_validation()
        );
        assert!(
            cache
                .get_or_populate(
                    "",
                    || Some(User::new("John", "Snow")),
                    &EntryOptions::default(),
                    &cancel,
                )
                .unwrap_err()
                .is_validation()
        );
        assert_eq!(cache.store().total_calls(), 0);
    }

    #[test]
    fn test_decode_failure_is_not_a_miss() {
        let cache = cache();
        let cancel = CancellationToken::new();
        cache.store().insert_raw("u1", vec![0xff, 0xfe]);

        let err = cache
            .get_or_populate(
                "u1",
                || Some(User::new("John", "Snow")),
                &EntryOptions::default(),
                &cancel,
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Deserialization);
        assert_eq!(cache.store().calls(MockOperation::Set), 0);
    }

    #[test]
    fn test_stored_null_is_a_miss() -> Result<()> {
        let cache = cache();
        let cancel = CancellationToken::new();
        let calls = Cell::new(0);
        cache.store().insert_raw("u1", "null");

        assert_eq!(cache.get::<User>("u1", &cancel)?, None);

        let user = cache.get_or_populate(
            "u1",
            || {
                calls.set(calls.get() + 1);
                Some(User::new("John", "Snow"))
            },
            &EntryOptions::default(),
            &cancel,
        )?;
        assert_eq!(user, Some(User::new("John", "Snow")));
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.store().calls(MockOperation::Set), 1);
        assert_eq!(
            cache.get::<User>("u1", &cancel)?,
            Some(User::new("John", "Snow"))
        );
        Ok(())
    }

    #[test]
    fn test_set_passes_options_through() -> Result<()> {
        let cache = cache();
        let cancel = CancellationToken::new();
        let options = EntryOptions::new()
            .with_expiration_relative_to_now(Duration::from_secs(300))
            .with_sliding_expiration(Duration::from_secs(30));

        cache.set("u1", &User::new("John", "Snow"), &options, &cancel)?;
        let entry = cache.store().entry("u1").expect("entry should be stored");
        assert_eq!(entry.options, options);
        Ok(())
    }

    #[test]
    fn test_store_read_failure_skips_producer() {
        let cache = BlockingCache::new(MockStore::new().with_failure(MockOperation::Get));
        let cancel = CancellationToken::new();
        let invoked = Cell::new(false);

        let err = cache
            .get_or_populate(
                "u1",
                || {
                    invoked.set(true);
                    Some(User::new("John", "Snow"))
                },
                &EntryOptions::default(),
                &cancel,
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Store);
        assert!(err.is_retryable());
        assert!(!invoked.get());
        assert_eq!(cache.store().calls(MockOperation::Set), 0);
    }

    #[test]
    fn test_store_write_failure_propagates() {
        let cache = BlockingCache::new(MockStore::new().with_failure(MockOperation::Set));
        let cancel = CancellationToken::new();

        let err = cache
            .set("u1", &User::new("John", "Snow"), &EntryOptions::default(), &cancel)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Store);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_producer_error_writes_nothing() {
        let cache = cache();
        let cancel = CancellationToken::new();

        let err = cache
            .try_get_or_populate(
                "u1",
                || Err::<Option<User>, _>("database offline"),
                &EntryOptions::default(),
                &cancel,
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Producer);
        assert!(cache.store().is_empty());
    }

    #[test]
    fn test_cancelled_token_skips_store() {
        let cache = cache();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = cache
            .get_or_populate(
                "u1",
                || Some(User::new("John", "Snow")),
                &EntryOptions::default(),
                &cancel,
            )
            .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(cache.store().total_calls(), 0);
    }

    #[test]
    fn test_cancelled_by_producer_skips_write() {
        let cache = cache();
        let cancel = CancellationToken::new();

        let err = cache
            .get_or_populate(
                "u1",
                || {
                    cancel.cancel();
                    Some(User::new("John", "Snow"))
                },
                &EntryOptions::default(),
                &cancel,
            )
            .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(cache.store().calls(MockOperation::Set), 0);
        assert!(cache.store().is_empty());
    }

    #[test]
    fn test_remove_and_refresh() -> Result<()> {
        let cache = cache().with_namespace("users");
        let cancel = CancellationToken::new();

        cache.set("u1", &User::new("John", "Snow"), &EntryOptions::default(), &cancel)?;
        cache.refresh("u1", &cancel)?;
        assert_eq!(cache.store().entry("users:u1").map(|e| e.refreshed), Some(1));

        cache.remove("u1", &cancel)?;
        assert_eq!(cache.get::<User>("u1", &cancel)?, None);
        Ok(())
    }

    #[test]
    fn test_shared_across_threads() -> Result<()> {
        let cache = Arc::new(BlockingCache::new(Arc::new(MockStore::new())));
        let cancel = CancellationToken::new();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let cache = Arc::clone(&cache);
                let cancel = cancel.clone();
                thread::spawn(move || {
                    let key = format!("u{i}");
                    cache.get_or_populate(
                        &key,
                        || Some(User::new("Bran", "Stark")),
                        &EntryOptions::default(),
                        &cancel,
                    )
                })
            })
            .collect();

        for handle in handles {
            let user = handle.join().expect("worker thread panicked")?;
            assert_eq!(user, Some(User::new("Bran", "Stark")));
        }
        assert_eq!(cache.store().len(), 4);
        Ok(())
    }
}

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for cache accessor operations.
///
/// Use this target for logging hits, misses, producer runs and skipped writes.
pub const TRACING_TARGET_CACHE: &str = "stash_cache::cache";

mod cache;
mod config;

pub mod prelude;

pub use cache::{BlockingCache, DistributedCache};
pub use config::CacheConfig;
// Re-export the shared building blocks so callers need a single dependency
#[cfg(feature = "test-utils")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub use stash_core::mock;
pub use stash_core::{
    BlockingByteStore, BoxedError, ByteStore, CancellationToken, Codec, EntryOptions, Error,
    ErrorKind, JsonCodec, Result, codec, store,
};

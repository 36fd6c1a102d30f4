//! Prelude module for stash-cache.
//!
//! This module re-exports the most commonly used types and traits from
//! stash-cache, so a single `use` statement covers typical call sites.
//!
//! # Example
//!
//! ```rust,ignore
//! use stash_cache::prelude::*;
//!
//! # async fn example(store: impl ByteStore) -> Result<()> {
//! let cache = DistributedCache::new(store);
//! let cancel = CancellationToken::new();
//! let name: Option<String> = cache.get("greeting", &cancel).await?;
//! # Ok(())
//! # }
//! ```

// Accessors
pub use crate::cache::{BlockingCache, DistributedCache};
// Configuration
pub use crate::config::CacheConfig;
// Store and codec contracts
pub use stash_core::{
    BlockingByteStore, ByteStore, CancellationToken, Codec, EntryOptions, JsonCodec,
};
// Error types
pub use stash_core::{BoxedError, Error, ErrorKind, Result};

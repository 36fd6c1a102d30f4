#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for codec operations.
///
/// Use this target for logging encode and decode activity.
pub const TRACING_TARGET_CODEC: &str = "stash_core::codec";

/// Tracing target for byte store operations.
///
/// Use this target for logging store implementations and store-level failures.
pub const TRACING_TARGET_STORE: &str = "stash_core::store";

mod error;
mod options;

pub mod codec;
pub mod store;

#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;

pub mod prelude;

pub use codec::{Codec, JsonCodec};
pub use error::{BoxedError, Error, ErrorKind, Result};
pub use options::EntryOptions;
pub use store::{BlockingByteStore, ByteStore};
// Re-export the cancellation handle threaded through every store call
pub use tokio_util::sync::CancellationToken;

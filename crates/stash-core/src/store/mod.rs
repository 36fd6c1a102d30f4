//! Contracts for the backing key/value byte store.
//!
//! The cache layer consumes a store through one of two traits:
//! - [`ByteStore`]: async, may suspend the calling task at every call
//! - [`BlockingByteStore`]: blocks the calling thread
//!
//! Both receive the caller's [`CancellationToken`](tokio_util::sync::CancellationToken)
//! untouched. Whether a cancelled write still lands is up to the store.
//! Failures are reported as [`Error::Store`](crate::Error::Store) and travel
//! to the caller unchanged.

mod blocking_store;
mod byte_store;

pub use blocking_store::BlockingByteStore;
pub use byte_store::ByteStore;

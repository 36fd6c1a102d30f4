//! Cache-aside orchestration.
//!
//! This module provides typed accessors over a byte store:
//! - [`DistributedCache`]: async accessors over a [`ByteStore`](crate::ByteStore)
//! - [`BlockingCache`]: blocking accessors over a [`BlockingByteStore`](crate::BlockingByteStore)
//!
//! Both share one per-call flow for get-or-populate:
//!
//! ```text
//! read ─┬─ hit ──► decode ──► done(value)
//!       └─ miss ─► producer ─┬─ absent ──► done(none)
//!                            └─ present ─► encode ──► write ──► done(value)
//! ```
//!
//! Nothing is retried and no state is kept between calls.

mod blocking_cache;
mod cache_key;
mod distributed_cache;

use std::future::Future;

use tokio_util::sync::CancellationToken;

pub use blocking_cache::BlockingCache;
pub(crate) use cache_key::KeyNamespace;
pub use distributed_cache::DistributedCache;

use crate::{Error, Result};

/// Races `future` against `cancel`. A token that already fired wins without
/// polling `future`.
pub(crate) async fn cancellable<F, T>(
    cancel: &CancellationToken,
    operation: &'static str,
    future: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::cancelled(operation)),
        result = future => result,
    }
}

/// Fails with [`Error::Cancelled`] if `cancel` already fired.
#[inline]
pub(crate) fn ensure_active(cancel: &CancellationToken, operation: &'static str) -> Result<()> {
    if cancel.is_cancelled() {
        Err(Error::cancelled(operation))
    } else {
        Ok(())
    }
}

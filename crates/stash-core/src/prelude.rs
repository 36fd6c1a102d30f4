//! Convenient re-exports for common use.

pub use crate::codec::{Codec, JsonCodec};
pub use crate::error::{BoxedError, Error, ErrorKind, Result};
pub use crate::options::EntryOptions;
pub use crate::store::{BlockingByteStore, ByteStore};
pub use tokio_util::sync::CancellationToken;

//! JSON codec backed by `serde_json`.

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::Codec;
use crate::{Error, Result, TRACING_TARGET_CODEC};

const JSON_NULL: &[u8] = b"null";

/// Default codec: compact JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonCodec;

impl JsonCodec {
    /// Creates a new JSON codec.
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Codec for JsonCodec {
    const NAME: &'static str = "json";

    fn encode<T>(&self, value: &T) -> Result<Bytes>
    where
        T: Serialize + ?Sized,
    {
        let json = serde_json::to_vec(value).map_err(Error::serialization::<T>)?;
        tracing::trace!(
            target: TRACING_TARGET_CODEC,
            codec = Self::NAME,
            type_name = std::any::type_name::<T>(),
            size_bytes = json.len(),
            "Encoded value"
        );
        Ok(Bytes::from(json))
    }

    fn decode<T>(&self, payload: &[u8]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let value = serde_json::from_slice(payload).map_err(Error::deserialization::<T>)?;
        tracing::trace!(
            target: TRACING_TARGET_CODEC,
            codec = Self::NAME,
            type_name = std::any::type_name::<T>(),
            size_bytes = payload.len(),
            "Decoded payload"
        );
        Ok(value)
    }

    fn is_null(&self, payload: &[u8]) -> bool {
        payload.trim_ascii() == JSON_NULL
    }
}

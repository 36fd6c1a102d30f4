//! Serialization adapter between typed values and opaque payload bytes.
//!
//! A [`Codec`] is a pure, stateless function pair. The only contract is
//! round-trip fidelity: `decode(encode(v))` reconstructs a value equal to `v`
//! for every representable `v`.

mod json_codec;

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub use json_codec::JsonCodec;

use crate::Result;

/// Converts typed values to and from payload bytes.
pub trait Codec: Clone + Send + Sync + 'static {
    /// Short, stable name of the encoding, recorded on codec and cache events.
    const NAME: &'static str;

    /// Encodes a value.
    ///
    /// Fails with [`Error::Serialization`](crate::Error::Serialization) when the
    /// value cannot be represented.
    fn encode<T>(&self, value: &T) -> Result<Bytes>
    where
        T: Serialize + ?Sized;

    /// Decodes a payload.
    ///
    /// Fails with [`Error::Deserialization`](crate::Error::Deserialization) when
    /// the payload is malformed or does not match the target type.
    fn decode<T>(&self, payload: &[u8]) -> Result<T>
    where
        T: DeserializeOwned;

    /// Whether `payload` is this encoding's representation of an absent value.
    fn is_null(&self, payload: &[u8]) -> bool {
        let _ = payload;
        false
    }
}

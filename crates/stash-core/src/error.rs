//! Error types shared by the codec, the store contracts and the cache layer.

use strum::{AsRefStr, IntoStaticStr};

/// Type alias for boxed dynamic errors that can be sent across threads.
///
/// Store implementations and fallible producers wrap their own error types in
/// this alias so they can travel through [`Error`] without losing their source.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for all stash operations.
///
/// Defaults to [`Error`] as the error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of errors that can occur in stash operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// A caller broke an input contract (empty key, absent value).
    Validation,
    /// A value could not be encoded.
    Serialization,
    /// A payload could not be decoded into the requested type.
    Deserialization,
    /// The backing store failed.
    Store,
    /// A fallible producer failed.
    Producer,
    /// The operation was cancelled at a suspension point.
    Cancelled,
}

/// Unified error type for stash operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input contract violation. Never retried, never recovered locally.
    #[error("Validation error: {reason}")]
    Validation { reason: String },

    /// The codec could not represent the value.
    #[error("Failed to serialize value of type '{type_name}': {source}")]
    Serialization {
        type_name: &'static str,
        #[source]
        source: BoxedError,
    },

    /// The payload is not a valid encoding of the target type.
    #[error("Failed to deserialize payload into type '{type_name}': {source}")]
    Deserialization {
        type_name: &'static str,
        #[source]
        source: BoxedError,
    },

    /// Failure reported by the backing store (transport, timeout, capacity).
    #[error("Store operation '{operation}' failed: {source}")]
    Store {
        operation: String,
        #[source]
        source: BoxedError,
    },

    /// Failure reported by a fallible producer.
    #[error("Producer failed: {source}")]
    Producer {
        #[source]
        source: BoxedError,
    },

    /// The caller's cancellation token fired while the operation was pending.
    #[error("Operation '{operation}' was cancelled")]
    Cancelled { operation: &'static str },
}

impl Error {
    /// Create a validation error
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Create a serialization error for values of type `T`
    pub fn serialization<T: ?Sized>(source: impl Into<BoxedError>) -> Self {
        Self::Serialization {
            type_name: std::any::type_name::<T>(),
            source: source.into(),
        }
    }

    /// Create a deserialization error for values of type `T`
    pub fn deserialization<T: ?Sized>(source: impl Into<BoxedError>) -> Self {
        Self::Deserialization {
            type_name: std::any::type_name::<T>(),
            source: source.into(),
        }
    }

    /// Create a store error with the failing operation as context
    pub fn store(operation: impl Into<String>, source: impl Into<BoxedError>) -> Self {
        Self::Store {
            operation: operation.into(),
            source: source.into(),
        }
    }

    /// Create a producer error
    pub fn producer(source: impl Into<BoxedError>) -> Self {
        Self::Producer {
            source: source.into(),
        }
    }

    /// Create a cancellation error
    pub fn cancelled(operation: &'static str) -> Self {
        Self::Cancelled { operation }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation { .. } => ErrorKind::Validation,
            Error::Serialization { .. } => ErrorKind::Serialization,
            Error::Deserialization { .. } => ErrorKind::Deserialization,
            Error::Store { .. } => ErrorKind::Store,
            Error::Producer { .. } => ErrorKind::Producer,
            Error::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }

    /// Returns the error kind as a string.
    pub fn kind_str(&self) -> &'static str {
        self.kind().into()
    }

    /// Whether a caller may reasonably retry the whole operation.
    ///
    /// Only store failures qualify. Nothing in this workspace retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Store { .. })
    }

    /// Returns `true` for [`Error::Validation`].
    #[inline]
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// Returns `true` for [`Error::Cancelled`].
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.kind() == ErrorKind::Cancelled
    }
}

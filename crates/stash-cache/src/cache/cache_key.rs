//! Key validation and namespacing.

use std::borrow::Cow;
use std::sync::Arc;

use crate::{Error, Result};

const NAMESPACE_SEPARATOR: char = ':';

/// Optional prefix applied to every key before it reaches the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct KeyNamespace(Option<Arc<str>>);

impl KeyNamespace {
    /// Creates a namespace. Blank input means no namespace.
    pub fn new(namespace: impl AsRef<str>) -> Self {
        let namespace = namespace.as_ref().trim();
        if namespace.is_empty() {
            Self(None)
        } else {
            Self(Some(Arc::from(namespace)))
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Validates `key` and returns the key the store sees.
    pub fn resolve<'a>(&self, key: &'a str) -> Result<Cow<'a, str>> {
        if key.is_empty() {
            return Err(Error::validation("cache key must not be empty"));
        }

        Ok(match &self.0 {
            Some(ns) => Cow::Owned(format!("{ns}{NAMESPACE_SEPARATOR}{key}")),
            None => Cow::Borrowed(key),
        })
    }
}

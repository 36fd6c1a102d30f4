//! Cache configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{EntryOptions, Error, Result};

/// Configuration for the cache accessors and the default entry options.
///
/// The accessors only use [`namespace`](Self::namespace). The TTL settings are
/// turned into [`EntryOptions`] by [`entry_options`](Self::entry_options) for
/// callers that want one write policy across their call sites.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct CacheConfig {
    /// Prefix applied to every cache key (`namespace:key`)
    #[cfg_attr(
        feature = "config",
        arg(long = "cache-namespace", env = "STASH_CACHE_NAMESPACE")
    )]
    #[serde(default)]
    pub cache_namespace: Option<String>,

    /// Expire entries this many seconds after they are written (optional)
    #[cfg_attr(
        feature = "config",
        arg(long = "cache-absolute-ttl", env = "STASH_CACHE_ABSOLUTE_TTL_SECS")
    )]
    #[serde(default)]
    pub cache_absolute_ttl: Option<u64>,

    /// Expire entries not accessed for this many seconds (optional)
    #[cfg_attr(
        feature = "config",
        arg(long = "cache-sliding-ttl", env = "STASH_CACHE_SLIDING_TTL_SECS")
    )]
    #[serde(default)]
    pub cache_sliding_ttl: Option<u64>,
}

const MAX_NAMESPACE_LEN: usize = 128;

impl CacheConfig {
    /// Create a configuration with no namespace and no expiration policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the namespace, ignoring blank values.
    #[inline]
    pub fn namespace(&self) -> Option<&str> {
        self.cache_namespace
            .as_deref()
            .map(str::trim)
            .filter(|ns| !ns.is_empty())
    }

    /// Returns the absolute TTL as a Duration, if set.
    #[inline]
    pub fn absolute_ttl(&self) -> Option<Duration> {
        self.cache_absolute_ttl.map(Duration::from_secs)
    }

    /// Returns the sliding TTL as a Duration, if set.
    #[inline]
    pub fn sliding_ttl(&self) -> Option<Duration> {
        self.cache_sliding_ttl.map(Duration::from_secs)
    }

    /// Set the key namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.cache_namespace = Some(namespace.into());
        self
    }

    /// Set the absolute TTL in seconds.
    #[must_use]
    pub fn with_absolute_ttl_secs(mut self, secs: u64) -> Self {
        self.cache_absolute_ttl = Some(secs);
        self
    }

    /// Set the sliding TTL in seconds.
    #[must_use]
    pub fn with_sliding_ttl_secs(mut self, secs: u64) -> Self {
        self.cache_sliding_ttl = Some(secs);
        self
    }

    /// Builds entry options from the configured TTLs.
    pub fn entry_options(&self) -> EntryOptions {
        let mut options = EntryOptions::new();
        options.absolute_expiration_relative_to_now = self.absolute_ttl();
        options.sliding_expiration = self.sliding_ttl();
        options
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if let Some(namespace) = self.namespace() {
            if namespace.len() > MAX_NAMESPACE_LEN {
                return Err(Error::validation(format!(
                    "cache namespace exceeds {MAX_NAMESPACE_LEN} bytes"
                )));
            }
            if namespace.chars().any(char::is_whitespace) {
                return Err(Error::validation(format!(
                    "cache namespace must not contain whitespace: '{namespace}'"
                )));
            }
        }

        if self.cache_absolute_ttl == Some(0) {
            return Err(Error::validation("absolute TTL must be positive"));
        }
        if self.cache_sliding_ttl == Some(0) {
            return Err(Error::validation("sliding TTL must be positive"));
        }

        Ok(())
    }
}

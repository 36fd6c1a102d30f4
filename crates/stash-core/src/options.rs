//! Store-specific entry hints.

use std::time::Duration;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Expiration hints attached to a single store write.
///
/// The cache layer never inspects these; they are handed to the
/// [`ByteStore`](crate::ByteStore) as-is, and the store alone decides what they
/// mean. [`EntryOptions::default`] carries no special policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryOptions {
    /// Point in time after which the entry should expire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_expiration: Option<Timestamp>,

    /// Expire the entry this long after it was written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_expiration_relative_to_now: Option<Duration>,

    /// Expire the entry if it is not accessed for this long.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sliding_expiration: Option<Duration>,
}

impl EntryOptions {
    /// Creates options with no special policy.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an absolute expiration timestamp.
    #[must_use]
    pub fn with_absolute_expiration(mut self, at: Timestamp) -> Self {
        self.absolute_expiration = Some(at);
        self
    }

    /// Set an expiration relative to the moment of the write.
    #[must_use]
    pub fn with_expiration_relative_to_now(mut self, ttl: Duration) -> Self {
        self.absolute_expiration_relative_to_now = Some(ttl);
        self
    }

    /// Set a sliding expiration window.
    #[must_use]
    pub fn with_sliding_expiration(mut self, window: Duration) -> Self {
        self.sliding_expiration = Some(window);
        self
    }

    /// Returns `true` when no hint is set.
    pub fn is_empty(&self) -> bool {
        self.absolute_expiration.is_none()
            && self.absolute_expiration_relative_to_now.is_none()
            && self.sliding_expiration.is_none()
    }

    /// Resolves the absolute deadline for a write performed at `now`.
    ///
    /// When both absolute hints are set the earlier one wins. Sliding
    /// expiration is not folded in since it depends on later reads.
    pub fn absolute_deadline(&self, now: Timestamp) -> Option<Timestamp> {
        let relative = self
            .absolute_expiration_relative_to_now
            .and_then(|ttl| jiff::SignedDuration::try_from(ttl).ok())
            .and_then(|ttl| now.checked_add(ttl).ok());

        match (self.absolute_expiration, relative) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        let options = EntryOptions::default();
        assert!(options.is_empty());
        assert_eq!(options, EntryOptions::new());
        assert_eq!(options.absolute_deadline(Timestamp::UNIX_EPOCH), None);
    }

    #[test]
    fn test_builder() {
        let options = EntryOptions::new()
            .with_expiration_relative_to_now(Duration::from_secs(60))
            .with_sliding_expiration(Duration::from_secs(10));

        assert!(!options.is_empty());
        assert_eq!(
            options.absolute_expiration_relative_to_now,
            Some(Duration::from_secs(60))
        );
        assert_eq!(options.sliding_expiration, Some(Duration::from_secs(10)));
        assert_eq!(options.absolute_expiration, None);
    }

    #[test]
    fn test_absolute_deadline_prefers_earliest() {
        let now = Timestamp::UNIX_EPOCH;
        let at = Timestamp::from_second(30).unwrap();

        let relative_only =
            EntryOptions::new().with_expiration_relative_to_now(Duration::from_secs(60));
        assert_eq!(
            relative_only.absolute_deadline(now),
            Some(Timestamp::from_second(60).unwrap())
        );

        let both = relative_only.with_absolute_expiration(at);
        assert_eq!(both.absolute_deadline(now), Some(at));
    }

    #[test]
    fn test_serde_skips_unset_fields() {
        let json = serde_json::to_string(&EntryOptions::default()).unwrap();
        assert_eq!(json, "{}");

        let options: EntryOptions = serde_json::from_str("{}").unwrap();
        assert!(options.is_empty());
    }
}

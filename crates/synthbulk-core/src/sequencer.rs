//! Stale-result suppression
//!
//! Each request takes a token; only results for the latest token are kept.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic request token
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    /// Sequence number
    #[inline]
    #[must_use]
    pub fn sequence(self) -> u64 {
        self.0
    }
}

/// Issues tokens and decides whether a result is still wanted
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    /// Create sequencer
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request, superseding every earlier one
    pub fn issue(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether no later request has been issued
    #[inline]
    #[must_use]
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }

    /// Keep `value` only if `token` is still current
    #[must_use]
    pub fn accept<T>(&self, token: RequestToken, value: T) -> Option<T> {
        if self.is_current(token) {
            Some(value)
        } else {
            tracing::debug!(token = token.0, "discarding superseded result");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_token_supersedes() {
        let sequencer = RequestSequencer::new();
        let first = sequencer.issue();
        let second = sequencer.issue();

        assert!(first < second);
        assert_eq!(sequencer.accept(first, "old"), None);
        assert_eq!(sequencer.accept(second, "new"), Some("new"));
    }

    #[test]
    fn tokens_start_at_one() {
        let sequencer = RequestSequencer::new();
        assert_eq!(sequencer.issue().sequence(), 1);
    }
}

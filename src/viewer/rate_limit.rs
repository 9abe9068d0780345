//! Serializes prop changes through the animation pipeline.
//!
//! Only one transition runs at a time. Changes requested while one is in
//! flight overwrite each other so the pipeline always picks up the latest
//! value when the running transition completes; intermediate values are
//! dropped, never queued.

/// A change the pipeline should act on now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change<T> {
    pub prev: Option<T>,
    pub next: T,
}

#[derive(Debug)]
pub struct PropsChangeRateLimiter<T> {
    last_applied: Option<T>,
    pending: Option<T>,
    in_progress: bool,
}

impl<T> Default for PropsChangeRateLimiter<T> {
    fn default() -> Self {
        Self {
            last_applied: None,
            pending: None,
            in_progress: false,
        }
    }
}

impl<T: Clone + PartialEq> PropsChangeRateLimiter<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_progress(&self) -> bool {
        self.in_progress
    }

    /// The newest value seen, whether already applied or still parked.
    pub fn last_value(&self) -> Option<&T> {
        self.pending.as_ref().or(self.last_applied.as_ref())
    }

    /// Request a change. Returns the change to start immediately, or `None`
    /// when it was absorbed (no-op repeat, or parked behind a running
    /// transition).
    pub fn request(&mut self, value: T) -> Option<Change<T>> {
        if self.in_progress {
            self.pending = Some(value);
            return None;
        }
        if self.last_applied.as_ref() == Some(&value) {
            return None;
        }
        let change = Change {
            prev: self.last_applied.clone(),
            next: value.clone(),
        };
        self.last_applied = Some(value);
        self.in_progress = true;
        Some(change)
    }

    /// Mark the running transition finished. Returns the next change to
    /// start when a newer value arrived meanwhile.
    pub fn complete(&mut self) -> Option<Change<T>> {
        self.in_progress = false;
        let pending = self.pending.take()?;
        self.request(pending)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn first_request_starts_immediately() {
        let mut limiter = PropsChangeRateLimiter::new();
        let change = limiter.request(1).unwrap();
        assert_eq!(change, Change { prev: None, next: 1 });
        assert!(limiter.is_in_progress());
    }

    #[test]
    fn latest_pending_value_wins() {
        let mut limiter = PropsChangeRateLimiter::new();
        limiter.request(1).unwrap();
        assert_eq!(limiter.request(2), None);
        assert_eq!(limiter.request(3), None);
        let change = limiter.complete().unwrap();
        assert_eq!(change, Change { prev: Some(1), next: 3 });
        assert!(limiter.is_in_progress());
    }

    #[test]
    fn repeated_value_is_absorbed() {
        let mut limiter = PropsChangeRateLimiter::new();
        limiter.request(1).unwrap();
        assert!(limiter.complete().is_none());
        assert!(!limiter.is_in_progress());
        assert_eq!(limiter.request(1), None);
        assert!(!limiter.is_in_progress());
    }

    #[test]
    fn pending_equal_to_applied_value_is_dropped_on_complete() {
        let mut limiter = PropsChangeRateLimiter::new();
        limiter.request(1).unwrap();
        assert_eq!(limiter.request(1), None);
        assert!(limiter.complete().is_none());
        assert!(!limiter.is_in_progress());
    }
}

//! Admission decision for an incoming session.

use super::limiter::TokenBucket;

/// What to do with a session whose origin has been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Serve the normal greeting.
    Allow,
    /// Send the throttle notice and hold the session for the delay.
    Throttle,
}

/// Classifies a session by spending one permit from its origin's bucket.
///
/// Holds no state of its own; writing the response and sleeping are left
/// to the session handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdmissionPolicy;

impl AdmissionPolicy {
    pub fn decide(&self, bucket: &TokenBucket) -> Decision {
        if bucket.try_consume() {
            Decision::Allow
        } else {
            Decision::Throttle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_until_bucket_is_empty() {
        let bucket = TokenBucket::new(0.05, 2);
        let policy = AdmissionPolicy;
        assert_eq!(policy.decide(&bucket), Decision::Allow);
        assert_eq!(policy.decide(&bucket), Decision::Allow);
        assert_eq!(policy.decide(&bucket), Decision::Throttle);
    }
}

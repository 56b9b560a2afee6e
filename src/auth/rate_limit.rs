//! Rate limiting primitives for auth flows.
//!
//! The reference behavior allows unlimited retries on passwords and codes;
//! the seam exists so a deployment can plug in a real limiter without
//! touching the state machines. The default allows everything.

#[derive(Clone, Copy, Debug)]
pub enum RateLimitAction {
    Login,
    EnrollmentConfirm,
    MfaVerify,
    PasswordReset,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited,
}

pub trait RateLimiter: Send + Sync {
    fn check_ip(&self, ip: Option<&str>, action: RateLimitAction) -> RateLimitDecision;
    fn check_username(&self, username: &str, action: RateLimitAction) -> RateLimitDecision;
}

#[derive(Clone, Debug)]
pub struct NoopRateLimiter;

impl RateLimiter for NoopRateLimiter {
    fn check_ip(&self, _ip: Option<&str>, _action: RateLimitAction) -> RateLimitDecision {
        RateLimitDecision::Allowed
    }

    fn check_username(&self, _username: &str, _action: RateLimitAction) -> RateLimitDecision {
        RateLimitDecision::Allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_rate_limiter_allows() {
        let limiter = NoopRateLimiter;
        assert_eq!(
            limiter.check_ip(None, RateLimitAction::Login),
            RateLimitDecision::Allowed
        );
        assert_eq!(
            limiter.check_username("alice", RateLimitAction::MfaVerify),
            RateLimitDecision::Allowed
        );
    }
}

// 🔑 Login gate - a single shared password, compared as-is
//
// No hashing, no lockout, no attempt counting. A wrong password only shows
// an error for a few seconds.

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

/// Shared academy password used when none is configured.
pub const DEFAULT_PASSWORD: &str = "suhaspatilsir";

/// How long the "wrong password" message stays visible.
pub const LOGIN_ERROR_WINDOW_SECS: i64 = 3;

#[derive(Debug, Clone)]
pub struct LoginGate {
    secret: String,
    error_until: Option<DateTime<Utc>>,
}

impl LoginGate {
    pub fn new(secret: &str) -> Self {
        LoginGate {
            secret: secret.to_string(),
            error_until: None,
        }
    }

    /// Plain equality check. A failure opens the error window from `now`.
    pub fn attempt(&mut self, input: &str, now: DateTime<Utc>) -> bool {
        if input == self.secret {
            self.error_until = None;
            info!("Operator logged in");
            true
        } else {
            self.error_until = Some(now + Duration::seconds(LOGIN_ERROR_WINDOW_SECS));
            warn!("Rejected login attempt");
            false
        }
    }

    pub fn error_visible(&self, now: DateTime<Utc>) -> bool {
        self.error_until.map_or(false, |until| now < until)
    }

    pub fn logout(&mut self) {
        self.error_until = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_password_passes() {
        let mut gate = LoginGate::new("secret");
        let now = Utc::now();

        assert!(gate.attempt("secret", now));
        assert!(!gate.error_visible(now));
    }

    #[test]
    fn test_comparison_is_exact() {
        let mut gate = LoginGate::new("secret");
        let now = Utc::now();

        assert!(!gate.attempt("Secret", now));
        assert!(!gate.attempt("secret ", now));
        assert!(!gate.attempt("", now));
    }

    #[test]
    fn test_error_window_lasts_three_seconds() {
        let mut gate = LoginGate::new("secret");
        let now = Utc::now();

        assert!(!gate.attempt("wrong", now));

        assert!(gate.error_visible(now));
        assert!(gate.error_visible(now + Duration::milliseconds(2999)));
        assert!(!gate.error_visible(now + Duration::seconds(3)));
    }

    #[test]
    fn test_no_lockout_after_many_failures() {
        let mut gate = LoginGate::new("secret");
        let now = Utc::now();

        for _ in 0..50 {
            gate.attempt("wrong", now);
        }

        assert!(gate.attempt("secret", now));
        assert!(!gate.error_visible(now));
    }

    #[test]
    fn test_logout_clears_error() {
        let mut gate = LoginGate::new("secret");
        let now = Utc::now();
        gate.attempt("wrong", now);

        gate.logout();

        assert!(!gate.error_visible(now));
    }
}

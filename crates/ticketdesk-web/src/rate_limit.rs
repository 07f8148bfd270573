//! Fixed-window limiter for login attempts, keyed by student id.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use ticketdesk_core::config::LoginLimit;

/// Windows kept before expired ones are swept.
const SWEEP_THRESHOLD: usize = 1024;

struct Window {
    started: Instant,
    attempts: u32,
}

pub struct LoginLimiter {
    max_attempts: u32,
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
}

impl LoginLimiter {
    pub fn new(limit: &LoginLimit) -> Self {
        Self {
            max_attempts: limit.max_attempts,
            window: limit.window(),
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Record an attempt for `key`.
    ///
    /// Returns the attempts left in the current window, or how long to wait
    /// once the window is used up.
    pub fn check(&self, key: &str) -> Result<u32, Duration> {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> Result<u32, Duration> {
        let key = key.trim().to_lowercase();
        let mut windows = self.windows.lock();

        if windows.len() >= SWEEP_THRESHOLD {
            let window = self.window;
            windows.retain(|_, w| now.duration_since(w.started) < window);
        }

        let entry = windows.entry(key).or_insert(Window {
            started: now,
            attempts: 0,
        });
        let elapsed = now.duration_since(entry.started);
        if elapsed >= self.window {
            entry.started = now;
            entry.attempts = 0;
        }

        if entry.attempts >= self.max_attempts {
            return Err(self.window.saturating_sub(now.duration_since(entry.started)));
        }
        entry.attempts += 1;
        Ok(self.max_attempts - entry.attempts)
    }

    /// Forget a key, e.g. after a successful login.
    pub fn reset(&self, key: &str) {
        self.windows.lock().remove(&key.trim().to_lowercase());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_attempts: u32, window_secs: u64) -> LoginLimiter {
        LoginLimiter::new(&LoginLimit {
            max_attempts,
            window_secs,
        })
    }

    #[test]
    fn test_blocks_after_max_attempts() {
        let limiter = limiter(3, 60);
        let now = Instant::now();
        assert_eq!(limiter.check_at("123456", now), Ok(2));
        assert_eq!(limiter.check_at("123456", now), Ok(1));
        assert_eq!(limiter.check_at("123456", now), Ok(0));
        assert!(limiter.check_at("123456", now).is_err());
        // Other keys are unaffected.
        assert_eq!(limiter.check_at("654321", now), Ok(2));
    }

    #[test]
    fn test_window_expiry_resets() {
        let limiter = limiter(1, 60);
        let start = Instant::now();
        assert!(limiter.check_at("admin", start).is_ok());
        let wait = limiter.check_at("admin", start + Duration::from_secs(20)).unwrap_err();
        assert_eq!(wait, Duration::from_secs(40));
        assert!(limiter.check_at("ADMIN ", start + Duration::from_secs(61)).is_ok());
    }

    #[test]
    fn test_reset_clears_key() {
        let limiter = limiter(1, 60);
        assert!(limiter.check("123456").is_ok());
        assert!(limiter.check("123456").is_err());
        limiter.reset("123456");
        assert!(limiter.check("123456").is_ok());
    }
}

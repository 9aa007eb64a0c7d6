//! Circuit breaker implementation

use std::time::{Duration, Instant};
use tracing::{error, info};

/// Halts order dispatch after repeated failed live executions.
///
/// Only the execution cycle touches the breaker, so it is plain owned state.
pub struct CircuitBreaker {
    pub consecutive_errors: u32,
    pub is_open: bool,
    pub last_error_time: Option<Instant>,
    pub max_consecutive_errors: u32,
    pub cooldown_duration: Duration,
}

impl CircuitBreaker {
    pub fn new(max_consecutive_errors: u32, cooldown_secs: u64) -> Self {
        Self {
            consecutive_errors: 0,
            is_open: false,
            last_error_time: None,
            max_consecutive_errors: max_consecutive_errors.max(1),
            cooldown_duration: Duration::from_secs(cooldown_secs),
        }
    }

    pub fn record_success(&mut self) {
        self.consecutive_errors = 0;
        self.is_open = false;
    }

    /// Returns true when this error tripped the breaker.
    pub fn record_error(&mut self) -> bool {
        self.consecutive_errors += 1;
        self.last_error_time = Some(Instant::now());

        if !self.is_open && self.consecutive_errors >= self.max_consecutive_errors {
            self.is_open = true;
            error!("Circuit breaker OPEN after {} consecutive failed executions", self.consecutive_errors);
            return true;
        }
        false
    }

    pub fn can_proceed(&mut self) -> bool {
        if !self.is_open {
            return true;
        }

        if let Some(last_error) = self.last_error_time {
            if last_error.elapsed() > self.cooldown_duration {
                info!("Circuit breaker cooldown complete, resetting");
                self.is_open = false;
                self.consecutive_errors = 0;
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_after_threshold_and_resets_on_success() {
        let mut breaker = CircuitBreaker::new(2, 300);
        assert!(!breaker.record_error());
        assert!(breaker.can_proceed());
        assert!(breaker.record_error());
        assert!(!breaker.can_proceed());

        breaker.record_success();
        assert!(breaker.can_proceed());
        assert_eq!(breaker.consecutive_errors, 0);
    }

    #[test]
    fn closes_after_cooldown() {
        let mut breaker = CircuitBreaker::new(1, 0);
        assert!(breaker.record_error());
        std::thread::sleep(Duration::from_millis(5));
        assert!(breaker.can_proceed());
        assert!(!breaker.is_open);
    }
}

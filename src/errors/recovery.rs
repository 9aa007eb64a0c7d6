//! Error recovery strategies

use std::collections::HashMap;
use tracing::Level;
use super::QuoteError;

#[derive(Clone)]
pub enum RecoveryStrategy {
    Skip { log_level: Level },
    Disable,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryAction {
    /// Leave the venue out for this symbol in the current cycle only.
    Skip { log_level: Level },
    /// Leave the venue out for the remainder of the run.
    DisableVenue { reason: String },
}

/// Maps quote failures onto what the cycle should do about them and keeps
/// a running count per failure kind.
pub struct ErrorRecovery {
    pub error_counts: HashMap<String, u32>,
    pub recovery_strategies: HashMap<String, RecoveryStrategy>,
}

impl Default for ErrorRecovery {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorRecovery {
    pub fn new() -> Self {
        let mut strategies = HashMap::new();

        strategies.insert(
            "timeout".to_string(),
            RecoveryStrategy::Skip { log_level: Level::WARN },
        );
        strategies.insert(
            "rate_limited".to_string(),
            RecoveryStrategy::Skip { log_level: Level::WARN },
        );
        strategies.insert(
            "pair_not_found".to_string(),
            RecoveryStrategy::Skip { log_level: Level::DEBUG },
        );
        // A bad key will not fix itself; retrying would only hide it.
        strategies.insert("auth_failed".to_string(), RecoveryStrategy::Disable);

        Self {
            error_counts: HashMap::new(),
            recovery_strategies: strategies,
        }
    }

    pub fn handle_error(&mut self, error: &QuoteError) -> RecoveryAction {
        let error_type = Self::classify_error(error);
        *self.error_counts.entry(error_type.to_string()).or_insert(0) += 1;

        match self.recovery_strategies.get(error_type) {
            Some(RecoveryStrategy::Disable) => RecoveryAction::DisableVenue {
                reason: error.to_string(),
            },
            Some(RecoveryStrategy::Skip { log_level }) => RecoveryAction::Skip {
                log_level: *log_level,
            },
            None => RecoveryAction::Skip { log_level: Level::WARN },
        }
    }

    pub fn total_errors(&self) -> u32 {
        self.error_counts.values().sum()
    }

    fn classify_error(error: &QuoteError) -> &'static str {
        match error {
            QuoteError::Timeout => "timeout",
            QuoteError::PairNotFound => "pair_not_found",
            QuoteError::AuthFailed => "auth_failed",
            QuoteError::RateLimited => "rate_limited",
            QuoteError::Unknown(_) => "unknown",
        }
    }
}

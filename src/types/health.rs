//! Venue health types

use chrono::{DateTime, Utc};
use serde::Serialize;
use super::VenueId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "state", content = "reason")]
pub enum VenueState {
    Active,
    /// Excluded for the rest of the run.
    Disabled(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct VenueHealth {
    pub venue: VenueId,
    pub state: VenueState,
    pub consecutive_failures: u32,
    pub last_quote_at: Option<DateTime<Utc>>,
}

impl VenueHealth {
    pub fn new(venue: VenueId) -> Self {
        Self {
            venue,
            state: VenueState::Active,
            consecutive_failures: 0,
            last_quote_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == VenueState::Active
    }
}

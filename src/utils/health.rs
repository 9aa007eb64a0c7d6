//! Venue health tracking

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::error;
use crate::types::{VenueHealth, VenueId, VenueState};

/// Per-venue health owned by the execution cycle.
#[derive(Debug, Clone, Default)]
pub struct HealthTracker {
    venues: BTreeMap<VenueId, VenueHealth>,
}

impl HealthTracker {
    pub fn new<'a>(venues: impl IntoIterator<Item = &'a VenueId>) -> Self {
        Self {
            venues: venues
                .into_iter()
                .map(|v| (v.clone(), VenueHealth::new(v.clone())))
                .collect(),
        }
    }

    pub fn is_active(&self, venue: &VenueId) -> bool {
        self.venues.get(venue).is_some_and(VenueHealth::is_active)
    }

    pub fn record_success(&mut self, venue: &VenueId, at: DateTime<Utc>) {
        if let Some(health) = self.venues.get_mut(venue) {
            health.consecutive_failures = 0;
            health.last_quote_at = Some(at);
        }
    }

    pub fn record_failure(&mut self, venue: &VenueId) {
        if let Some(health) = self.venues.get_mut(venue) {
            health.consecutive_failures += 1;
        }
    }

    pub fn disable(&mut self, venue: &VenueId, reason: &str) {
        if let Some(health) = self.venues.get_mut(venue) {
            if health.is_active() {
                error!("⛔ Venue {} disabled for the rest of the run: {}", venue, reason);
                health.state = VenueState::Disabled(reason.to_string());
            }
        }
    }

    pub fn active_count(&self) -> usize {
        self.venues.values().filter(|h| h.is_active()).count()
    }

    pub fn snapshot(&self) -> Vec<VenueHealth> {
        self.venues.values().cloned().collect()
    }
}

//! The execution cycle: poll, detect, select, dispatch, report.

pub mod poller;

pub use poller::*;

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn, Level};
use crate::{
    arbitrage::{find_opportunities, rank_opportunities, DetectionParams},
    config::Config,
    errors::{CircuitBreaker, ErrorRecovery, QuoteError, RecoveryAction},
    execution::OrderDispatcher,
    reporting::{CycleReport, QuoteFailure, ReportSink},
    stats::{CycleDelta, Statistics},
    types::{ExecutionMode, ExecutionStatus, Opportunity, PriceQuote, VenueHealth, VenueId},
    utils::HealthTracker,
    venues::{VenueClient, VenueMap},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Polling,
    Detecting,
    Selecting,
    Dispatching,
    Reporting,
    ShuttingDown,
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Validated quotes per symbol, keyed by venue.
type QuoteBook = BTreeMap<String, BTreeMap<VenueId, PriceQuote>>;

/// What Polling hands to the later phases.
struct Polled {
    started_at: DateTime<Utc>,
    quotes: QuoteBook,
    failures: Vec<QuoteFailure>,
}

/// Single owner of everything that outlives a cycle.
///
/// Statistics, venue health, error counters and the dispatch breaker are
/// only written here, between phases, so no locking is needed.
pub struct ExecutionCycle {
    venues: VenueMap,
    symbols: Vec<String>,
    quote_currencies: Vec<String>,
    quote_timeout: Duration,
    check_interval: Duration,
    params: DetectionParams,
    dispatcher: OrderDispatcher,
    statistics: Statistics,
    health: HealthTracker,
    recovery: ErrorRecovery,
    breaker: CircuitBreaker,
    reporter: Box<dyn ReportSink>,
    state: CycleState,
    cycle: u64,
}

impl ExecutionCycle {
    pub fn new(config: &Config, venues: VenueMap, reporter: impl ReportSink + 'static) -> Self {
        Self {
            health: HealthTracker::new(venues.keys()),
            venues,
            symbols: config.symbols.clone(),
            quote_currencies: config.quote_currencies.clone(),
            quote_timeout: config.quote_timeout(),
            check_interval: config.check_interval(),
            params: DetectionParams::from_config(config),
            dispatcher: OrderDispatcher::new(config),
            statistics: Statistics::new(),
            recovery: ErrorRecovery::new(),
            breaker: CircuitBreaker::new(
                config.max_consecutive_errors,
                config.circuit_breaker_cooldown_secs,
            ),
            reporter: Box::new(reporter),
            state: CycleState::Idle,
            cycle: 0,
        }
    }

    /// Overrides the cadence from the config, which only has whole seconds.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn statistics(&self) -> Statistics {
        self.statistics.snapshot()
    }

    pub fn venue_health(&self) -> Vec<VenueHealth> {
        self.health.snapshot()
    }

    /// Runs one full cycle and returns what was reported.
    pub async fn run_once(&mut self) -> CycleReport {
        let polled = self.start_cycle().await;
        let opportunities = self.detect(&polled.quotes);
        let ranked = self.select(opportunities);
        self.dispatch_and_report(polled, ranked).await
    }

    /// Loops on the configured interval until `shutdown` becomes true, then
    /// reports final statistics once and returns them.
    ///
    /// A cycle that overruns the interval is followed immediately by the
    /// next one; cycles never overlap.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> Statistics {
        let mut interval = tokio::time::interval(self.check_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "🚀 Monitoring {} symbol(s) on {} venue(s) every {:?} ({})",
            self.symbols.len(),
            self.venues.len(),
            self.check_interval,
            self.dispatcher.mode
        );

        loop {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
                _ = interval.tick() => {}
            }

            if *shutdown.borrow() || self.execute(&shutdown).await.is_none() {
                break;
            }
        }

        self.shut_down()
    }

    fn shut_down(&mut self) -> Statistics {
        self.state = CycleState::ShuttingDown;
        info!("📛 Shutting down after {} cycle(s)", self.statistics.cycles_run);
        if self.recovery.total_errors() > 0 {
            info!(
                "   Quote errors: {} {:?}",
                self.recovery.total_errors(),
                self.recovery.error_counts
            );
        }
        if let Err(e) = self.reporter.finish(&self.statistics) {
            warn!("Failed to report final statistics: {}", e);
        }
        self.statistics.snapshot()
    }

    /// Returns `None` when shutdown was observed at a phase boundary before
    /// any order went out. Once Dispatching starts the cycle always reaches
    /// Reporting.
    async fn execute(&mut self, shutdown: &watch::Receiver<bool>) -> Option<CycleReport> {
        let polled = self.start_cycle().await;
        if *shutdown.borrow() {
            return None;
        }

        let opportunities = self.detect(&polled.quotes);
        if *shutdown.borrow() {
            return None;
        }

        let ranked = self.select(opportunities);
        if *shutdown.borrow() {
            return None;
        }

        Some(self.dispatch_and_report(polled, ranked).await)
    }

    async fn start_cycle(&mut self) -> Polled {
        self.cycle += 1;
        let started_at = Utc::now();
        debug!("Cycle {} started", self.cycle);

        self.state = CycleState::Polling;
        let (quotes, failures) = self.poll().await;
        Polled { started_at, quotes, failures }
    }

    fn detect(&mut self, quotes: &QuoteBook) -> Vec<Opportunity> {
        self.state = CycleState::Detecting;
        quotes
            .iter()
            .flat_map(|(symbol, symbol_quotes)| find_opportunities(symbol, symbol_quotes, &self.params))
            .collect()
    }

    fn select(&mut self, opportunities: Vec<Opportunity>) -> Vec<Opportunity> {
        self.state = CycleState::Selecting;
        rank_opportunities(opportunities)
    }

    async fn dispatch_and_report(&mut self, polled: Polled, ranked: Vec<Opportunity>) -> CycleReport {
        let Polled { started_at, quotes, failures } = polled;

        let mut dispatch = None;
        let mut dispatch_blocked = false;
        if let Some(best) = ranked.first() {
            if self.breaker.can_proceed() {
                self.state = CycleState::Dispatching;
                let result = self.dispatcher.dispatch(best, &self.venues).await;
                self.record_dispatch_outcome(result.mode, result.status);
                dispatch = Some(result);
            } else {
                dispatch_blocked = true;
            }
        }

        self.state = CycleState::Reporting;
        self.statistics.record(&CycleDelta {
            opportunities_found: ranked.len() as u64,
            quote_failures: failures.len() as u64,
            dispatch: dispatch.clone(),
        });

        let report = CycleReport {
            cycle: self.cycle,
            started_at,
            quotes: quotes.into_values().flat_map(BTreeMap::into_values).collect(),
            failures,
            opportunities: ranked,
            dispatch,
            dispatch_blocked,
            statistics: self.statistics.snapshot(),
            venue_health: self.health.snapshot(),
        };
        if let Err(e) = self.reporter.report(&report) {
            warn!("Failed to report cycle {}: {}", self.cycle, e);
        }

        self.state = CycleState::Idle;
        report
    }

    /// Polls every active venue and merges the per-request results into a
    /// quote book per symbol.
    async fn poll(&mut self) -> (QuoteBook, Vec<QuoteFailure>) {
        let active: Vec<Arc<dyn VenueClient>> = self
            .venues
            .iter()
            .filter(|(id, _)| self.health.is_active(id))
            .map(|(_, client)| client.clone())
            .collect();
        if self.health.active_count() < 2 {
            warn!(
                "Only {} active venue(s), no opportunities possible this cycle",
                self.health.active_count()
            );
        }

        let results = poll_quotes(&active, &self.symbols, &self.quote_currencies, self.quote_timeout).await;

        let mut quotes: QuoteBook = self
            .symbols
            .iter()
            .map(|s| (s.clone(), BTreeMap::new()))
            .collect();
        let mut failures = Vec::new();

        for PollResult { venue, symbol, result } in results {
            match result {
                Ok(quote) => {
                    self.health.record_success(&venue, quote.observed_at);
                    quotes.entry(symbol).or_default().insert(venue, quote);
                }
                Err(e) => {
                    self.handle_quote_error(&venue, &symbol, &e);
                    failures.push(QuoteFailure {
                        venue,
                        symbol,
                        reason: e.to_string(),
                    });
                }
            }
        }

        (quotes, failures)
    }

    fn handle_quote_error(&mut self, venue: &VenueId, symbol: &str, error: &QuoteError) {
        self.health.record_failure(venue);
        match self.recovery.handle_error(error) {
            RecoveryAction::Skip { log_level } if log_level == Level::DEBUG => {
                debug!("{} has no {} market: {}", venue, symbol, error);
            }
            RecoveryAction::Skip { .. } => {
                warn!("⚠️  Skipping {} for {} this cycle: {}", venue, symbol, error);
            }
            RecoveryAction::DisableVenue { reason } => {
                self.health.disable(venue, &reason);
            }
        }
    }

    fn record_dispatch_outcome(&mut self, mode: ExecutionMode, status: ExecutionStatus) {
        if mode != ExecutionMode::Live {
            return;
        }
        match status {
            ExecutionStatus::Completed => self.breaker.record_success(),
            ExecutionStatus::Partial | ExecutionStatus::Aborted => {
                if self.breaker.record_error() {
                    error!(
                        "Dispatch halted for {:?} after repeated failed executions",
                        self.breaker.cooldown_duration
                    );
                }
            }
        }
    }
}

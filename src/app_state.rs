// =============================================================================
// Central Application State — Signal Desk
// =============================================================================
//
// The single source of truth for the service. Holds the live record batch,
// the runtime config, the injected volume/position sources, and the refresh
// coordinator. AppState is shared across async tasks via `Arc<AppState>`.
//
// Thread safety:
//   - Atomic counters for lock-free version tracking and the refresh guard.
//   - parking_lot::RwLock for all mutable shared collections.
// =============================================================================

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rand::thread_rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::runtime_config::RuntimeConfig;
use crate::sampler::sample_indicators;
use crate::signals::{
    derive_record, IndicatorVolumeSource, PositionStore, RandomPositionStore,
    SampledVolumeSource, StaticPositionStore, VolumeSource,
};
use crate::sort::{SortKey, SortState};
use crate::stats::{
    compute_stats, DashboardStats, IndicatorSentimentSource, SampledSentimentSource,
    SentimentSource,
};
use crate::types::StockRecord;

/// Central application state shared across all async tasks via `Arc<AppState>`.
pub struct AppState {
    /// Monotonically increasing version counter. Incremented on every
    /// meaningful state mutation so pollers can detect fresh data.
    pub state_version: AtomicU64,

    // ── Configuration ───────────────────────────────────────────────────
    pub runtime_config: Arc<RwLock<RuntimeConfig>>,

    // ── Record batch ────────────────────────────────────────────────────
    /// The live immutable batch. A refresh replaces the whole vector;
    /// individual records are never mutated in place.
    pub records: RwLock<Vec<StockRecord>>,
    pub last_update: RwLock<DateTime<Utc>>,

    // ── Table view ──────────────────────────────────────────────────────
    /// Current sort selection, shared by clients that don't pass explicit
    /// sort params. Column re-selection toggles direction.
    pub sort_state: RwLock<SortState>,

    // ── Refresh coordination ────────────────────────────────────────────
    /// True while a refresh is in flight. At most one refresh runs at a
    /// time; concurrent requests are ignored.
    refresh_in_flight: AtomicBool,

    // ── Injected signal sources ─────────────────────────────────────────
    pub volume_source: Arc<dyn VolumeSource>,
    pub position_store: Arc<dyn PositionStore>,
    pub sentiment_source: Arc<dyn SentimentSource>,

    /// Instant when the service was started. Used for uptime reporting.
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Construct state with sources chosen from config: the indicator-backed
    /// volume source (or the legacy re-draw mock when `mock_volume_redraw`
    /// is set) and a static position store when `held_symbols` is non-empty,
    /// the probabilistic one otherwise.
    pub fn new(config: RuntimeConfig) -> Self {
        let volume_source: Arc<dyn VolumeSource> = if config.mock_volume_redraw {
            Arc::new(SampledVolumeSource)
        } else {
            Arc::new(IndicatorVolumeSource)
        };

        let position_store: Arc<dyn PositionStore> = if config.held_symbols.is_empty() {
            Arc::new(RandomPositionStore::new(config.long_probability))
        } else {
            Arc::new(StaticPositionStore::new(config.held_symbols.clone()))
        };

        let mut state = Self::with_sources(config, volume_source, position_store);
        if state.runtime_config.read().mock_sentiment_redraw {
            state.sentiment_source = Arc::new(SampledSentimentSource);
        }
        state
    }

    /// Construct state with explicit volume/position sources. Used by tests
    /// and by deployments wiring a real feed or portfolio store. Sentiment
    /// defaults to the batch-derived source.
    pub fn with_sources(
        config: RuntimeConfig,
        volume_source: Arc<dyn VolumeSource>,
        position_store: Arc<dyn PositionStore>,
    ) -> Self {
        Self {
            state_version: AtomicU64::new(1),
            runtime_config: Arc::new(RwLock::new(config)),
            records: RwLock::new(Vec::new()),
            last_update: RwLock::new(Utc::now()),
            sort_state: RwLock::new(SortState::default()),
            refresh_in_flight: AtomicBool::new(false),
            volume_source,
            position_store,
            sentiment_source: Arc::new(IndicatorSentimentSource),
            start_time: std::time::Instant::now(),
        }
    }

    // ── Version Management ──────────────────────────────────────────────

    /// Atomically increment the state version. Call this after every
    /// meaningful mutation.
    pub fn increment_version(&self) -> u64 {
        self.state_version.fetch_add(1, Ordering::SeqCst)
    }

    /// Read the current state version without modifying it.
    pub fn current_state_version(&self) -> u64 {
        self.state_version.load(Ordering::SeqCst)
    }

    // ── Generation ──────────────────────────────────────────────────────

    /// Synchronously regenerate the full record batch from the configured
    /// universe and swap it in. Returns the number of records produced.
    pub fn generate_now(&self) -> usize {
        let universe = self.runtime_config.read().universe.clone();
        let mut rng = thread_rng();

        let batch: Vec<StockRecord> = universe
            .iter()
            .map(|info| {
                let sample = sample_indicators(&mut rng, info);
                derive_record(
                    sample,
                    self.volume_source.as_ref(),
                    self.position_store.as_ref(),
                )
            })
            .collect();

        let count = batch.len();
        *self.records.write() = batch;
        *self.last_update.write() = Utc::now();
        self.increment_version();

        debug!(count, "record batch regenerated");
        count
    }

    // ── Lookup ──────────────────────────────────────────────────────────

    /// Fetch one record by ticker. An absent symbol is a normal negative
    /// result, not an error.
    pub fn get_record(&self, symbol: &str) -> Option<StockRecord> {
        self.records
            .read()
            .iter()
            .find(|r| r.symbol == symbol)
            .cloned()
    }

    // ── Sort Selection ──────────────────────────────────────────────────

    /// Apply a column selection to the shared sort state (toggle rule in
    /// [`SortState::select`]) and return the resulting selection.
    pub fn select_sort(&self, key: SortKey) -> SortState {
        let mut sort = self.sort_state.write();
        sort.select(key);
        let selected = *sort;
        drop(sort);
        self.increment_version();
        selected
    }

    // ── Refresh Coordinator ─────────────────────────────────────────────

    /// Whether a refresh is currently in flight.
    pub fn is_refreshing(&self) -> bool {
        self.refresh_in_flight.load(Ordering::SeqCst)
    }

    /// Try to claim the refresh guard. Synchronous, so a caller that wins
    /// the claim observes `is_refreshing() == true` before anything else
    /// runs; a caller that loses must not report a refresh as started.
    ///
    /// Every successful claim must be paired with [`Self::finish_refresh`].
    pub fn try_begin_refresh(&self) -> bool {
        let claimed = self
            .refresh_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if !claimed {
            debug!("refresh already in flight — request ignored");
        }
        claimed
    }

    /// Complete a refresh begun with [`Self::try_begin_refresh`]: wait the
    /// configured simulated provider latency, regenerate the batch and
    /// timestamp, then release the guard.
    pub async fn finish_refresh(&self) {
        let delay_ms = self.runtime_config.read().refresh_delay_ms;
        tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;

        let count = self.generate_now();
        self.refresh_in_flight.store(false, Ordering::SeqCst);

        info!(count, delay_ms, "refresh complete");
    }

    /// Run a full refresh: claim the guard, wait, regenerate, release.
    ///
    /// Returns `false` without doing anything if a refresh is already in
    /// flight — concurrent requests are ignored, not queued.
    pub async fn refresh(&self) -> bool {
        if !self.try_begin_refresh() {
            return false;
        }
        self.finish_refresh().await;
        true
    }

    // ── Snapshot Builder ────────────────────────────────────────────────

    /// Build a complete, serialisable snapshot of the service state.
    /// This is the payload for `GET /api/v1/state`.
    pub fn build_snapshot(&self) -> StateSnapshot {
        let records = self.records.read().clone();
        let last_update = *self.last_update.read();
        let stats = compute_stats(&records, last_update, self.sentiment_source.as_ref());
        let config = self.runtime_config.read();

        StateSnapshot {
            state_version: self.current_state_version(),
            server_time: Utc::now().timestamp_millis(),
            refreshing: self.is_refreshing(),
            uptime_secs: self.start_time.elapsed().as_secs(),
            sort: *self.sort_state.read(),
            stats,
            records,
            runtime_config: RuntimeConfigSummary {
                universe_size: config.universe.len(),
                refresh_delay_ms: config.refresh_delay_ms,
                long_probability: config.long_probability,
                auto_refresh_secs: config.auto_refresh_secs,
            },
        }
    }
}

// =============================================================================
// Serialisable snapshot types
// =============================================================================

/// Full service state snapshot sent to the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct StateSnapshot {
    pub state_version: u64,
    pub server_time: i64,
    pub refreshing: bool,
    pub uptime_secs: u64,
    pub sort: SortState,
    pub stats: DashboardStats,
    pub records: Vec<StockRecord>,
    pub runtime_config: RuntimeConfigSummary,
}

/// Summary of runtime config for the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct RuntimeConfigSummary {
    pub universe_size: usize,
    pub refresh_delay_ms: u64,
    pub long_probability: f64,
    pub auto_refresh_secs: u64,
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::SortDirection;
    use crate::types::{SignalStatus, SymbolInfo};

    fn small_config(delay_ms: u64) -> RuntimeConfig {
        RuntimeConfig {
            universe: vec![
                SymbolInfo::new("TSLA", "Tesla Inc"),
                SymbolInfo::new("AAPL", "Apple Inc"),
                SymbolInfo::new("NVDA", "NVIDIA Corporation"),
            ],
            refresh_delay_ms: delay_ms,
            ..RuntimeConfig::default()
        }
    }

    #[test]
    fn generate_produces_one_record_per_symbol() {
        let state = AppState::new(small_config(0));
        assert_eq!(state.generate_now(), 3);
        let records = state.records.read();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].symbol, "TSLA");
        assert_eq!(records[2].symbol, "NVDA");
    }

    #[test]
    fn generate_bumps_state_version() {
        let state = AppState::new(small_config(0));
        let before = state.current_state_version();
        state.generate_now();
        assert!(state.current_state_version() > before);
    }

    #[test]
    fn get_record_finds_known_and_rejects_unknown() {
        let state = AppState::new(small_config(0));
        state.generate_now();
        assert!(state.get_record("AAPL").is_some());
        assert!(state.get_record("BOGUS").is_none());
    }

    #[test]
    fn held_symbols_come_back_long_or_signalled() {
        // With every symbol held, a record with no entry/exit signal must be
        // Long, and position mirrors that.
        let config = small_config(0);
        let held: Vec<String> = config
            .universe
            .iter()
            .map(|info| info.symbol.clone())
            .collect();
        let state = AppState::with_sources(
            config,
            Arc::new(IndicatorVolumeSource),
            Arc::new(StaticPositionStore::new(held)),
        );
        state.generate_now();
        for record in state.records.read().iter() {
            match record.status {
                SignalStatus::Entry => assert!(record.entry_signal),
                SignalStatus::Exit => {
                    assert!(record.exit_signal);
                    assert!(!record.entry_signal);
                }
                SignalStatus::Long => assert_eq!(record.position, 1),
                SignalStatus::None => unreachable!("every symbol is held"),
            }
            if record.status != SignalStatus::Long {
                assert_eq!(record.position, 0);
            }
        }
    }

    #[tokio::test]
    async fn refresh_replaces_batch_and_advances_timestamp() {
        let state = AppState::new(small_config(10));
        state.generate_now();
        let before = *state.last_update.read();

        assert!(state.refresh().await);
        assert!(!state.is_refreshing());

        let after = *state.last_update.read();
        assert!(after > before, "timestamp must be strictly later");
        assert_eq!(state.records.read().len(), 3);
    }

    #[test]
    fn begin_refresh_claims_guard_before_returning() {
        // Two callers racing for the guard: the winner sees the loading
        // flag set by the time its claim returns, the loser's claim fails.
        let state = AppState::new(small_config(0));
        assert!(!state.is_refreshing());

        assert!(state.try_begin_refresh());
        assert!(state.is_refreshing(), "flag must be set immediately");
        assert!(!state.try_begin_refresh(), "second claim must lose");
        assert!(state.is_refreshing());
    }

    #[tokio::test]
    async fn concurrent_refresh_is_ignored() {
        // Deterministic ordering: claim the guard directly, then verify a
        // full refresh attempt arriving meanwhile is ignored.
        let state = AppState::new(small_config(0));

        assert!(state.try_begin_refresh());
        assert!(!state.refresh().await, "refresh during another must be ignored");
        assert!(state.is_refreshing(), "loser must not release the guard");

        state.finish_refresh().await;
        assert!(!state.is_refreshing());
        assert_eq!(state.records.read().len(), 3);
    }

    #[test]
    fn config_held_symbols_select_static_store() {
        let mut config = small_config(0);
        config.held_symbols = vec!["TSLA".to_string(), "AAPL".to_string(), "NVDA".to_string()];
        let state = AppState::new(config);
        state.generate_now();
        for record in state.records.read().iter() {
            if !record.entry_signal && !record.exit_signal {
                assert_eq!(record.status, SignalStatus::Long);
            }
        }
    }

    #[test]
    fn select_sort_toggles_through_shared_state() {
        let state = AppState::new(small_config(0));
        assert_eq!(state.sort_state.read().key, SortKey::Mom42);

        let selected = state.select_sort(SortKey::Close);
        assert_eq!(selected.key, SortKey::Close);
        assert_eq!(selected.direction, SortDirection::Desc);

        let toggled = state.select_sort(SortKey::Close);
        assert_eq!(toggled.direction, SortDirection::Asc);
    }

    #[test]
    fn snapshot_stats_agree_with_records() {
        let state = AppState::new(small_config(0));
        state.generate_now();
        let snapshot = state.build_snapshot();
        assert_eq!(snapshot.stats.total_symbols, snapshot.records.len());
        assert_eq!(snapshot.runtime_config.universe_size, 3);
        assert!(!snapshot.refreshing);

        // Default sentiment source derives counts from change direction.
        let bullish = snapshot
            .records
            .iter()
            .filter(|r| r.change_percent > 0.0)
            .count();
        let bearish = snapshot
            .records
            .iter()
            .filter(|r| r.change_percent < 0.0)
            .count();
        assert_eq!(snapshot.stats.bullish_sentiment, bullish);
        assert_eq!(snapshot.stats.bearish_sentiment, bearish);
    }
}

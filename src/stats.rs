// =============================================================================
// Dashboard Stats — aggregates over the live record batch
// =============================================================================
//
// Signal and position counts come straight from the batch so the stats row
// never contradicts the table. Sentiment counts come from an injected
// SentimentSource: in a real deployment that is a social/news feed, here the
// default derives them from daily change direction and the legacy random
// draw survives as a mock implementation.
// =============================================================================

use chrono::{DateTime, Utc};
use rand::prelude::*;
use serde::Serialize;

use crate::types::{SignalStatus, StockRecord};

/// Headline numbers for the dashboard stats row.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    #[serde(rename = "totalSymbols")]
    pub total_symbols: usize,
    #[serde(rename = "activePositions")]
    pub active_positions: usize,
    #[serde(rename = "entrySignals")]
    pub entry_signals: usize,
    #[serde(rename = "exitSignals")]
    pub exit_signals: usize,
    #[serde(rename = "bullishSentiment")]
    pub bullish_sentiment: usize,
    #[serde(rename = "bearishSentiment")]
    pub bearish_sentiment: usize,
    #[serde(rename = "lastUpdate")]
    pub last_update: String,
}

// =============================================================================
// Sentiment source seam
// =============================================================================

/// Source of the bullish/bearish symbol counts shown on the stats row.
pub trait SentimentSource: Send + Sync {
    /// `(bullish, bearish)` counts for the given batch.
    fn sentiment_counts(&self, records: &[StockRecord]) -> (usize, usize);
}

/// Default sentiment source: a symbol is bullish when its daily change is
/// positive, bearish when negative. Pure function of the batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndicatorSentimentSource;

impl SentimentSource for IndicatorSentimentSource {
    fn sentiment_counts(&self, records: &[StockRecord]) -> (usize, usize) {
        let bullish = records.iter().filter(|r| r.change_percent > 0.0).count();
        let bearish = records.iter().filter(|r| r.change_percent < 0.0).count();
        (bullish, bearish)
    }
}

/// Mock-parity sentiment source: independent draws in the legacy ranges
/// (bullish 12..20, bearish 3..10), clamped to the batch size.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampledSentimentSource;

impl SentimentSource for SampledSentimentSource {
    fn sentiment_counts(&self, records: &[StockRecord]) -> (usize, usize) {
        let mut rng = thread_rng();
        let bullish = rng.gen_range(12..20).min(records.len());
        let bearish = rng.gen_range(3..10).min(records.len());
        (bullish, bearish)
    }
}

// =============================================================================
// Aggregation
// =============================================================================

/// Aggregate the batch into [`DashboardStats`].
pub fn compute_stats(
    records: &[StockRecord],
    last_update: DateTime<Utc>,
    sentiment: &dyn SentimentSource,
) -> DashboardStats {
    let active_positions = records
        .iter()
        .filter(|r| r.status == SignalStatus::Long)
        .count();
    let entry_signals = records.iter().filter(|r| r.entry_signal).count();
    let exit_signals = records.iter().filter(|r| r.exit_signal).count();
    let (bullish_sentiment, bearish_sentiment) = sentiment.sentiment_counts(records);

    DashboardStats {
        total_symbols: records.len(),
        active_positions,
        entry_signals,
        exit_signals,
        bullish_sentiment,
        bearish_sentiment,
        last_update: last_update.to_rfc3339(),
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: SignalStatus, entry: bool, exit: bool) -> StockRecord {
        StockRecord {
            symbol: "X".to_string(),
            name: "X".to_string(),
            close: 100.0,
            change: 0.0,
            change_percent: 0.0,
            volume: 1_000_000,
            market_cap: 1_000_000_000,
            mom21: 0.0,
            mom42: 0.0,
            mom63: 0.0,
            rsi14: 50.0,
            atr14: 2.0,
            rvol10: 1.0,
            rvol20: 1.0,
            sma50: 100.0,
            ema21: 100.0,
            macd_hist: 0.0,
            vol21: 0.2,
            trend_ok: false,
            momentum_ok: false,
            rvol_ok: false,
            entry_signal: entry,
            exit_signal: exit,
            status,
            position: u8::from(status == SignalStatus::Long),
            last_updated: String::new(),
        }
    }

    #[test]
    fn counts_match_batch_contents() {
        let records = vec![
            record(SignalStatus::Entry, true, false),
            record(SignalStatus::Exit, false, true),
            record(SignalStatus::Long, false, false),
            record(SignalStatus::Long, false, false),
            record(SignalStatus::None, false, false),
        ];
        let stats = compute_stats(&records, Utc::now(), &IndicatorSentimentSource);
        assert_eq!(stats.total_symbols, 5);
        assert_eq!(stats.active_positions, 2);
        assert_eq!(stats.entry_signals, 1);
        assert_eq!(stats.exit_signals, 1);
    }

    #[test]
    fn empty_batch_yields_zeroes() {
        let stats = compute_stats(&[], Utc::now(), &IndicatorSentimentSource);
        assert_eq!(stats.total_symbols, 0);
        assert_eq!(stats.active_positions, 0);
        assert_eq!(stats.entry_signals, 0);
        assert_eq!(stats.exit_signals, 0);
        assert_eq!(stats.bullish_sentiment, 0);
        assert_eq!(stats.bearish_sentiment, 0);
    }

    #[test]
    fn entry_with_both_flags_counts_once_each() {
        // A record can carry both flags even though its status is entry.
        let records = vec![record(SignalStatus::Entry, true, true)];
        let stats = compute_stats(&records, Utc::now(), &IndicatorSentimentSource);
        assert_eq!(stats.entry_signals, 1);
        assert_eq!(stats.exit_signals, 1);
        assert_eq!(stats.active_positions, 0);
    }

    #[test]
    fn indicator_sentiment_follows_change_direction() {
        let mut up = record(SignalStatus::None, false, false);
        up.change_percent = 2.5;
        let mut down = record(SignalStatus::None, false, false);
        down.change_percent = -1.0;
        let flat = record(SignalStatus::None, false, false);

        let records = vec![up.clone(), up, down, flat];
        let stats = compute_stats(&records, Utc::now(), &IndicatorSentimentSource);
        assert_eq!(stats.bullish_sentiment, 2);
        assert_eq!(stats.bearish_sentiment, 1);
    }

    #[test]
    fn sampled_sentiment_clamped_to_batch_size() {
        let records = vec![
            record(SignalStatus::None, false, false),
            record(SignalStatus::None, false, false),
        ];
        let src = SampledSentimentSource;
        for _ in 0..50 {
            let (bullish, bearish) = src.sentiment_counts(&records);
            assert!(bullish <= records.len());
            assert!(bearish <= records.len());
        }
    }

    #[test]
    fn stats_serialise_with_dashboard_names() {
        let stats = compute_stats(&[], Utc::now(), &IndicatorSentimentSource);
        let json = serde_json::to_value(&stats).unwrap();
        assert!(json.get("bullishSentiment").is_some());
        assert!(json.get("bearishSentiment").is_some());
        assert!(json.get("totalSymbols").is_some());
        assert!(json.get("lastUpdate").is_some());
    }
}

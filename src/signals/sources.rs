// =============================================================================
// Signal Sources — injected seams for volume and position state
// =============================================================================
//
// The derivation rules need two facts that a real deployment would pull from
// external state: the symbol's current relative volume (a volume feed) and
// whether the symbol is currently held (a portfolio store). Both sit behind
// traits so that derivation stays a pure function of its inputs and the
// random stand-ins are confined to mock implementations.
// =============================================================================

use std::collections::HashSet;

use rand::prelude::*;

use crate::sampler::IndicatorSample;

/// Source of the current relative-volume reading used by the `rvol_ok` rule.
pub trait VolumeSource: Send + Sync {
    fn relative_volume(&self, sample: &IndicatorSample) -> f64;
}

/// Source of held-position state used by the `long` status rule.
pub trait PositionStore: Send + Sync {
    fn is_held(&self, symbol: &str) -> bool;
}

// =============================================================================
// Volume sources
// =============================================================================

/// Default volume source: reads the sample's own 10-period relative volume.
///
/// With this source, derivation is a pure function of the indicator sample.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndicatorVolumeSource;

impl VolumeSource for IndicatorVolumeSource {
    fn relative_volume(&self, sample: &IndicatorSample) -> f64 {
        sample.rvol10
    }
}

/// Mock-parity volume source: draws a fresh U(0.8, 2.5) reading, independent
/// of the sample's rvol fields, matching the reference generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampledVolumeSource;

impl VolumeSource for SampledVolumeSource {
    fn relative_volume(&self, _sample: &IndicatorSample) -> f64 {
        thread_rng().gen_range(0.8..2.5)
    }
}

// =============================================================================
// Position stores
// =============================================================================

/// Mock position store: each symbol is held with a fixed probability.
/// Stand-in for a real portfolio store.
#[derive(Debug, Clone, Copy)]
pub struct RandomPositionStore {
    pub probability: f64,
}

impl RandomPositionStore {
    pub fn new(probability: f64) -> Self {
        Self {
            probability: probability.clamp(0.0, 1.0),
        }
    }
}

impl PositionStore for RandomPositionStore {
    fn is_held(&self, _symbol: &str) -> bool {
        thread_rng().gen_bool(self.probability)
    }
}

/// Deterministic position store backed by an explicit held-symbol set.
#[derive(Debug, Clone, Default)]
pub struct StaticPositionStore {
    held: HashSet<String>,
}

impl StaticPositionStore {
    pub fn new(held: impl IntoIterator<Item = String>) -> Self {
        Self {
            held: held.into_iter().collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

impl PositionStore for StaticPositionStore {
    fn is_held(&self, symbol: &str) -> bool {
        self.held.contains(symbol)
    }
}

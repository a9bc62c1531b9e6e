// =============================================================================
// Signals Module
// =============================================================================
//
// Signal pipeline for the desk:
// - Threshold derivation of trend/momentum/volume flags and status
// - Injected volume and position sources (real-data seams with mock impls)

pub mod derive;
pub mod sources;

pub use derive::{derive_record, derive_flags, resolve_status, SignalFlags};
pub use sources::{
    IndicatorVolumeSource, PositionStore, RandomPositionStore, SampledVolumeSource,
    StaticPositionStore, VolumeSource,
};

//! Fixed pipeline constants
//!
//! The probability thresholds and priority tiers are contract values of the
//! rule layer; the defaults here reproduce them bit-for-bit. `ScanConfig`
//! exposes them as configuration, but a default-constructed config is the
//! contract behavior.

/// Probability above which a critical alert + High recommendation fires
pub const CRITICAL_THRESHOLD: f64 = 0.7;

/// Probability above which (up to the critical bound) a Medium
/// recommendation fires. Exactly 0.5 produces nothing.
pub const MEDIUM_THRESHOLD: f64 = 0.5;

/// Fixed seed for the train/test split and forest randomness
pub const DEFAULT_SEED: u64 = 42;

/// Held-out fraction reserved for evaluation
pub const TEST_FRACTION: f64 = 0.2;

/// Forest size
pub const N_TREES: usize = 100;

/// Maximum tree depth
pub const MAX_DEPTH: usize = 10;

/// Minimum samples required to keep splitting a node
pub const MIN_SAMPLES_SPLIT: usize = 2;

/// Bootstrap sample ratio per tree
pub const SAMPLE_RATIO: f64 = 0.8;

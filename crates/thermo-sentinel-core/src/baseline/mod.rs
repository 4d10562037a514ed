//! Baseline estimation over a bounded reading window.
//!
//! ## Architecture
//!
//! ```text
//!   Reading ──► BaselineWindow (last N, FIFO)
//!                    │
//!                    ▼
//!             BaselineEstimator ──► Baseline { mean, std_dev, upper, lower }
//!                    │
//!                    ├── FreezeOnFirstN: computed once from readings 1..=N
//!                    └── SlidingRecompute: recomputed on every full window
//! ```

pub mod estimator;
pub mod types;

pub use estimator::{population_stats, BaselineEstimator};
pub use types::{Baseline, BaselineConfig, BaselinePolicy, ControlBand};

/// Default band half-width in standard deviations.
pub const DEFAULT_SIGMA_MULTIPLIER: f64 = 3.0;

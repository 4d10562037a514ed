//! Baseline type definitions.
//!
//! Key types: `Baseline` (learned state), `ControlBand` (the normal-operating
//! envelope), `BaselinePolicy` (when the baseline is recomputed) and
//! `BaselineConfig`.

use serde::{Deserialize, Serialize};

// ── Control Band ────────────────────────────────────────────────────────

/// The `[lower, upper]` envelope drawn on the control chart.
///
/// Classification against it lives in [`crate::classifier::classify`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlBand {
    pub lower: f64,
    pub upper: f64,
}

// ── Baseline ────────────────────────────────────────────────────────────

/// Statistical summary used to classify readings.
///
/// `upper = mean + k·std_dev` and `lower = mean − k·std_dev` where `k` is
/// the configured sigma multiplier. Until `established` is set every field
/// except `sample_count` is zero and must not be used for classification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub mean: f64,
    /// Population standard deviation (divides by N).
    pub std_dev: f64,
    pub upper: f64,
    pub lower: f64,
    pub established: bool,
    /// Number of readings the current figures were computed from.
    pub sample_count: usize,
}

impl Baseline {
    /// An established baseline for the given statistics.
    pub fn from_stats(mean: f64, std_dev: f64, sigma_multiplier: f64, sample_count: usize) -> Self {
        let spread = sigma_multiplier * std_dev;
        Self {
            mean,
            std_dev,
            upper: mean + spread,
            lower: mean - spread,
            established: true,
            sample_count,
        }
    }

    /// The control band, or `None` while the baseline is not established.
    pub fn band(&self) -> Option<ControlBand> {
        self.established.then_some(ControlBand {
            lower: self.lower,
            upper: self.upper,
        })
    }
}

// ── Policy ──────────────────────────────────────────────────────────────

/// When the baseline is (re)computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselinePolicy {
    /// Compute once from the first N readings, then never again.
    #[default]
    #[serde(alias = "freeze")]
    FreezeOnFirstN,
    /// Recompute over the current window every time it is full.
    ///
    /// The reading being classified is part of the window, and a single
    /// value in a sample of N lies at most (N−1)/√N standard deviations from
    /// the sample mean. With N = 10 and k = 3 one isolated outlier therefore
    /// never leaves the band; only sustained shifts do.
    #[serde(alias = "sliding")]
    SlidingRecompute,
}

impl std::fmt::Display for BaselinePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FreezeOnFirstN => write!(f, "freeze-on-first-n"),
            Self::SlidingRecompute => write!(f, "sliding-recompute"),
        }
    }
}

/// Parses the names accepted in config files (`freeze`, `sliding`,
/// `freeze_on_first_n`, `sliding_recompute`).
impl std::str::FromStr for BaselinePolicy {
    type Err = serde::de::value::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use serde::de::IntoDeserializer;
        Self::deserialize(s.into_deserializer())
    }
}

// ── Configuration ───────────────────────────────────────────────────────

/// Configuration for the baseline estimator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaselineConfig {
    /// Readings per baseline computation. Default: 10.
    #[serde(default = "default_window_capacity")]
    pub window_capacity: usize,
    /// Band half-width in standard deviations. Default: 3.0.
    #[serde(default = "default_sigma_multiplier")]
    pub sigma_multiplier: f64,
    /// Recompute policy. Default: freeze.
    #[serde(default)]
    pub policy: BaselinePolicy,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            window_capacity: default_window_capacity(),
            sigma_multiplier: default_sigma_multiplier(),
            policy: BaselinePolicy::default(),
        }
    }
}

fn default_window_capacity() -> usize {
    crate::window::DEFAULT_WINDOW_CAPACITY
}

fn default_sigma_multiplier() -> f64 {
    super::DEFAULT_SIGMA_MULTIPLIER
}

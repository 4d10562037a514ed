//! Baseline estimator: turns the reading window into a control band.
//!
//! The estimator owns the window. Each observed reading is pushed first and
//! the baseline is then refreshed according to the configured
//! [`BaselinePolicy`], so the reading that fills or refreshes the window is
//! part of the sample it is classified against.

use tracing::debug;

use crate::reading::Reading;
use crate::window::BaselineWindow;

use super::types::{Baseline, BaselineConfig, BaselinePolicy};

/// Population mean and standard deviation (divides by N, not N−1).
///
/// Returns `None` for an empty sample.
pub fn population_stats(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some((mean, variance.sqrt()))
}

/// Owns the window and the current baseline.
pub struct BaselineEstimator {
    config: BaselineConfig,
    window: BaselineWindow,
    baseline: Baseline,
}

impl BaselineEstimator {
    pub fn new(config: BaselineConfig) -> Self {
        let window = BaselineWindow::new(config.window_capacity);
        Self {
            config,
            window,
            baseline: Baseline::default(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(BaselineConfig::default())
    }

    /// Push a reading into the window and refresh the baseline per policy.
    pub fn observe(&mut self, reading: Reading) -> &Baseline {
        self.window.push(reading);

        if !self.window.is_full() {
            return &self.baseline;
        }

        match self.config.policy {
            BaselinePolicy::FreezeOnFirstN => {
                if !self.baseline.established {
                    // No eviction has happened yet, so the window holds
                    // exactly the first N readings.
                    self.recompute();
                    debug!(
                        mean = self.baseline.mean,
                        std_dev = self.baseline.std_dev,
                        upper = self.baseline.upper,
                        lower = self.baseline.lower,
                        "baseline frozen"
                    );
                }
            }
            BaselinePolicy::SlidingRecompute => {
                let was_established = self.baseline.established;
                self.recompute();
                if !was_established {
                    debug!(
                        mean = self.baseline.mean,
                        std_dev = self.baseline.std_dev,
                        "baseline established"
                    );
                }
            }
        }

        &self.baseline
    }

    /// Current baseline; unestablished until the window first fills.
    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    /// The reading window.
    pub fn window(&self) -> &BaselineWindow {
        &self.window
    }

    /// The configured recompute policy.
    pub fn policy(&self) -> BaselinePolicy {
        self.config.policy
    }

    /// Forget every reading and the baseline; the next N readings establish
    /// a fresh one under the same policy.
    pub fn reset(&mut self) {
        self.window.clear();
        self.baseline = Baseline::default();
    }

    fn recompute(&mut self) {
        let values = self.window.values();
        if let Some((mean, std_dev)) = population_stats(&values) {
            self.baseline =
                Baseline::from_stats(mean, std_dev, self.config.sigma_multiplier, values.len());
        }
    }
}

impl Default for BaselineEstimator {
    fn default() -> Self {
        Self::with_defaults()
    }
}

//! Reading classification against the current control band.

use serde::{Deserialize, Serialize};

use crate::baseline::Baseline;
use crate::reading::Reading;

/// Classification outcome for one reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Baseline not yet established; not an error.
    Insufficient,
    Normal,
    AnomalyHigh,
    AnomalyLow,
}

impl Verdict {
    pub fn is_anomaly(&self) -> bool {
        matches!(self, Self::AnomalyHigh | Self::AnomalyLow)
    }

    /// The anomaly kind to persist, if this verdict is anomalous.
    pub fn anomaly_kind(&self) -> Option<AnomalyKind> {
        match self {
            Self::AnomalyHigh => Some(AnomalyKind::High),
            Self::AnomalyLow => Some(AnomalyKind::Low),
            Self::Insufficient | Self::Normal => None,
        }
    }

    /// Short human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Insufficient => "waiting for baseline",
            Self::Normal => "normal",
            Self::AnomalyHigh => "anomaly (high)",
            Self::AnomalyLow => "anomaly (low)",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Direction of an anomaly, serialized with the literals used in the anomaly file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnomalyKind {
    #[serde(rename = "Temperatura alta")]
    High,
    #[serde(rename = "Temperatura baja")]
    Low,
}

impl AnomalyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "Temperatura alta",
            Self::Low => "Temperatura baja",
        }
    }
}

impl std::fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a reading. Pure; bounds are exclusive, so a value equal to
/// `upper` or `lower` is `Normal`.
pub fn classify(reading: &Reading, baseline: &Baseline) -> Verdict {
    if !baseline.established {
        Verdict::Insufficient
    } else if reading.value > baseline.upper {
        Verdict::AnomalyHigh
    } else if reading.value < baseline.lower {
        Verdict::AnomalyLow
    } else {
        Verdict::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn reading(value: f64) -> Reading {
        let ts = NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        Reading::new(value, ts)
    }

    fn scenario_baseline() -> Baseline {
        Baseline::from_stats(20.8, 0.56f64.sqrt(), 3.0, 10)
    }

    #[test]
    fn unestablished_is_insufficient() {
        let b = Baseline::default();
        for v in [-100.0, 0.0, 20.0, 1e9] {
            assert_eq!(classify(&reading(v), &b), Verdict::Insufficient);
        }
    }

    #[test]
    fn scenario_verdicts() {
        let b = scenario_baseline();
        assert_eq!(classify(&reading(30.0), &b), Verdict::AnomalyHigh);
        assert_eq!(classify(&reading(20.5), &b), Verdict::Normal);
        assert_eq!(classify(&reading(10.0), &b), Verdict::AnomalyLow);
    }

    #[test]
    fn bounds_are_normal() {
        let b = scenario_baseline();
        assert_eq!(classify(&reading(b.upper), &b), Verdict::Normal);
        assert_eq!(classify(&reading(b.lower), &b), Verdict::Normal);
    }

    #[test]
    fn zero_spread_band() {
        let b = Baseline::from_stats(22.0, 0.0, 3.0, 10);
        assert_eq!(classify(&reading(22.0), &b), Verdict::Normal);
        assert_eq!(classify(&reading(22.1), &b), Verdict::AnomalyHigh);
        assert_eq!(classify(&reading(21.9), &b), Verdict::AnomalyLow);
    }

    #[test]
    fn verdict_helpers() {
        assert!(Verdict::AnomalyHigh.is_anomaly());
        assert!(!Verdict::Insufficient.is_anomaly());
        assert_eq!(Verdict::AnomalyLow.anomaly_kind(), Some(AnomalyKind::Low));
        assert_eq!(Verdict::Normal.anomaly_kind(), None);
        assert_eq!(Verdict::Insufficient.to_string(), "waiting for baseline");
    }

    #[test]
    fn anomaly_kind_literals() {
        assert_eq!(
            serde_json::to_string(&AnomalyKind::High).unwrap(),
            "\"Temperatura alta\""
        );
        assert_eq!(
            serde_json::to_string(&AnomalyKind::Low).unwrap(),
            "\"Temperatura baja\""
        );
        assert_eq!(AnomalyKind::Low.to_string(), "Temperatura baja");
    }

    proptest! {
        #[test]
        fn verdict_matches_strict_bounds(
            mean in -20.0f64..40.0,
            std_dev in 0.0f64..5.0,
            value in -60.0f64..80.0,
        ) {
            let b = Baseline::from_stats(mean, std_dev, 3.0, 10);
            let verdict = classify(&reading(value), &b);
            if value > b.upper {
                prop_assert_eq!(verdict, Verdict::AnomalyHigh);
            } else if value < b.lower {
                prop_assert_eq!(verdict, Verdict::AnomalyLow);
            } else {
                prop_assert_eq!(verdict, Verdict::Normal);
            }
        }
    }
}

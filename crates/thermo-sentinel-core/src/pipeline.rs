//! Per-reading pipeline: window → estimator → classifier → {store, feed}.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::baseline::{BaselineConfig, BaselineEstimator};
use crate::classifier::{classify, Verdict};
use crate::feed::{FeedPublisher, FeedSubscriber, FeedUpdate};
use crate::reading::Reading;
use crate::store::{AnomalyRecord, AnomalyStore};

/// Counters describing what the pipeline has done so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub processed: u64,
    pub anomalies: u64,
    /// Anomalies that could not be written to the store.
    pub persist_failures: u64,
}

/// The classification engine.
///
/// Owns the estimator (and through it the window and baseline), the anomaly
/// store and the feed publisher. `process` takes `&mut self`, so one reading
/// runs to completion before the next can start.
pub struct Pipeline {
    estimator: BaselineEstimator,
    store: Box<dyn AnomalyStore>,
    feed: FeedPublisher,
    stats: PipelineStats,
}

impl Pipeline {
    /// Build a pipeline and the first subscriber to its feed.
    pub fn new(config: BaselineConfig, store: Box<dyn AnomalyStore>) -> (Self, FeedSubscriber) {
        let (feed, subscriber) = FeedPublisher::channel();
        let estimator = BaselineEstimator::new(config);
        debug!(
            policy = %estimator.policy(),
            window = estimator.window().capacity(),
            "pipeline created"
        );
        let pipeline = Self {
            estimator,
            store,
            feed,
            stats: PipelineStats::default(),
        };
        (pipeline, subscriber)
    }

    /// Run one reading through the whole pipeline.
    ///
    /// Persistence failures are logged and counted; the update is published
    /// regardless.
    pub fn process(&mut self, reading: Reading) -> FeedUpdate {
        let baseline = *self.estimator.observe(reading);
        let verdict = classify(&reading, &baseline);
        self.stats.processed += 1;

        if let Some(kind) = verdict.anomaly_kind() {
            self.stats.anomalies += 1;
            warn!(
                value = reading.value,
                timestamp = %reading.timestamp(),
                kind = %kind,
                upper = baseline.upper,
                lower = baseline.lower,
                "anomaly detected"
            );
            let record = AnomalyRecord::new(&reading, kind);
            match self.store.record(&record) {
                Ok(()) => info!(timestamp = %reading.timestamp(), kind = %kind, "anomaly stored"),
                Err(e) => {
                    self.stats.persist_failures += 1;
                    warn!(error = %e, value = reading.value, "failed to store anomaly");
                }
            }
        }

        let window = self.estimator.window();
        let update = FeedUpdate {
            seq: self.stats.processed,
            value: reading.value,
            observed_at: reading.observed_at,
            verdict,
            band: if verdict == Verdict::Insufficient {
                None
            } else {
                baseline.band()
            },
            window_len: window.len(),
            window_capacity: window.capacity(),
        };
        self.feed.publish(update.clone());
        update
    }

    /// Counters so far.
    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// The estimator, for inspecting the window and baseline.
    pub fn estimator(&self) -> &BaselineEstimator {
        &self.estimator
    }

    /// Another reader of the presentation feed.
    pub fn subscribe(&self) -> FeedSubscriber {
        self.feed.subscribe()
    }

    /// The anomaly store.
    pub fn store(&self) -> &dyn AnomalyStore {
        self.store.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::BaselinePolicy;
    use crate::classifier::AnomalyKind;
    use crate::error::{StoreError, StoreResult};
    use crate::store::{InMemoryStore, JsonLinesStore};
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use std::sync::Arc;

    const SCENARIO: [f64; 10] = [20.0, 21.0, 20.0, 22.0, 21.0, 20.0, 21.0, 22.0, 20.0, 21.0];

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 5)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn reading(i: i64, value: f64) -> Reading {
        Reading::new(value, t0() + Duration::seconds(i))
    }

    fn pipeline(policy: BaselinePolicy) -> (Pipeline, Arc<InMemoryStore>, FeedSubscriber) {
        let store = Arc::new(InMemoryStore::new());
        let config = BaselineConfig {
            policy,
            ..BaselineConfig::default()
        };
        let (p, sub) = Pipeline::new(config, Box::new(store.clone()));
        (p, store, sub)
    }

    struct FailingStore;

    impl AnomalyStore for FailingStore {
        fn record(&self, _record: &AnomalyRecord) -> StoreResult<()> {
            Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )))
        }

        fn load(&self) -> StoreResult<Vec<AnomalyRecord>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn insufficient_until_window_full() {
        let (mut p, store, _sub) = pipeline(BaselinePolicy::SlidingRecompute);
        for (i, v) in SCENARIO[..9].iter().enumerate() {
            let u = p.process(reading(i as i64, *v));
            assert_eq!(u.verdict, Verdict::Insufficient);
            assert!(u.band.is_none());
            assert_eq!(u.window_len, i + 1);
        }
        let u = p.process(reading(9, SCENARIO[9]));
        assert_eq!(u.verdict, Verdict::Normal);
        assert!(u.band.is_some());
        assert!(store.is_empty());
    }

    #[test]
    fn scenario_freeze_policy() {
        let (mut p, store, sub) = pipeline(BaselinePolicy::FreezeOnFirstN);
        for (i, v) in SCENARIO.iter().enumerate() {
            p.process(reading(i as i64, *v));
        }

        let high = p.process(reading(10, 30.0));
        assert_eq!(high.verdict, Verdict::AnomalyHigh);
        let normal = p.process(reading(11, 20.5));
        assert_eq!(normal.verdict, Verdict::Normal);

        let band = normal.band.unwrap();
        assert!((band.upper - 23.045).abs() < 1e-3);
        assert!((band.lower - 18.555).abs() < 1e-3);

        let records = store.load().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, 30.0);
        assert_eq!(records[0].kind, AnomalyKind::High);
        assert_eq!(records[0].observed_at, t0() + Duration::seconds(10));

        assert_eq!(sub.latest().unwrap().seq, 12);
        assert_eq!(
            p.stats(),
            PipelineStats {
                processed: 12,
                anomalies: 1,
                persist_failures: 0
            }
        );
    }

    #[test]
    fn sliding_policy_classifies_against_refreshed_window() {
        let (mut p, store, _sub) = pipeline(BaselinePolicy::SlidingRecompute);
        for (i, v) in SCENARIO.iter().enumerate() {
            p.process(reading(i as i64, *v));
        }
        // 30.0 joins the window before classification: mean 21.8, σ ≈ 2.82,
        // upper ≈ 30.26, so the spike stays inside its own band.
        let u = p.process(reading(10, 30.0));
        assert_eq!(u.verdict, Verdict::Normal);
        let band = u.band.unwrap();
        assert!(band.upper > 30.0);
        assert!(store.is_empty());
    }

    #[test]
    fn sliding_band_follows_window_not_history() {
        let (mut p, _store, _sub) = pipeline(BaselinePolicy::SlidingRecompute);
        for (i, v) in SCENARIO.iter().enumerate() {
            p.process(reading(i as i64, *v));
        }
        for i in 10..20 {
            p.process(reading(i, 25.0));
        }
        let u = p.process(reading(20, 25.0));
        assert_eq!(u.verdict, Verdict::Normal);
        let band = u.band.unwrap();
        assert_eq!(band.lower, 25.0);
        assert_eq!(band.upper, 25.0);
    }

    #[test]
    fn persistence_failure_does_not_stop_pipeline() {
        let (mut p, _sub) = Pipeline::new(
            BaselineConfig {
                policy: BaselinePolicy::FreezeOnFirstN,
                ..BaselineConfig::default()
            },
            Box::new(FailingStore),
        );
        for (i, v) in SCENARIO.iter().enumerate() {
            p.process(reading(i as i64, *v));
        }
        let u = p.process(reading(10, 40.0));
        assert_eq!(u.verdict, Verdict::AnomalyHigh);
        let u = p.process(reading(11, 21.0));
        assert_eq!(u.verdict, Verdict::Normal);

        let stats = p.stats();
        assert_eq!(stats.processed, 12);
        assert_eq!(stats.anomalies, 1);
        assert_eq!(stats.persist_failures, 1);
    }

    #[test]
    fn persists_to_json_lines_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anomalias_detectadas.json");
        let (mut p, _sub) = Pipeline::new(
            BaselineConfig {
                policy: BaselinePolicy::FreezeOnFirstN,
                ..BaselineConfig::default()
            },
            Box::new(JsonLinesStore::new(&path)),
        );
        for (i, v) in SCENARIO.iter().enumerate() {
            p.process(reading(i as i64, *v));
        }
        p.process(reading(10, 30.0));
        p.process(reading(11, 10.0));

        let records = p.store().load().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, AnomalyKind::High);
        assert_eq!(records[1].kind, AnomalyKind::Low);

        let first_line = std::fs::read_to_string(&path)
            .unwrap()
            .lines()
            .next()
            .unwrap()
            .to_string();
        assert!(first_line.contains("\"timestamp\":\"2025-05-05 09:00:10\""));
        assert!(first_line.contains("\"tipo_anomalia\":\"Temperatura alta\""));
    }

    #[test]
    fn feed_reflects_every_reading_in_order() {
        let (mut p, _store, sub) = pipeline(BaselinePolicy::SlidingRecompute);
        let late = p.subscribe();
        for (i, v) in [20.0, 21.0, 22.0].iter().enumerate() {
            let u = p.process(reading(i as i64, *v));
            assert_eq!(u.seq, i as u64 + 1);
            assert_eq!(sub.latest().unwrap(), u);
            assert_eq!(late.latest().unwrap(), u);
        }
        assert_eq!(p.estimator().window().len(), 3);
    }
}

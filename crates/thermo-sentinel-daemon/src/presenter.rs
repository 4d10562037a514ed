//! Console presenter: consumes the feed and keeps the control-chart history.
//!
//! Runs on its own task and only ever reads [`FeedUpdate`]s.

use thermo_sentinel_core::{ChartHistory, FeedSubscriber, FeedUpdate, IDLE_STATUS_LABEL};
use tracing::{debug, info, warn};

/// Reader-side display state.
pub struct Presenter {
    chart: ChartHistory,
    temperature_label: String,
    status_label: String,
}

impl Presenter {
    pub fn new(chart_capacity: usize) -> Self {
        Self {
            chart: ChartHistory::new(chart_capacity),
            temperature_label: "Temperatura: --°C".to_string(),
            status_label: IDLE_STATUS_LABEL.to_string(),
        }
    }

    /// Apply one update. Returns `false` for a stale update.
    pub fn apply(&mut self, update: &FeedUpdate) -> bool {
        if !self.chart.apply(update) {
            return false;
        }
        self.temperature_label = update.temperature_label();
        self.status_label = update.status_label();

        if update.verdict.is_anomaly() {
            warn!(seq = update.seq, timestamp = %update.observed_at, "{}", self.status_label);
        }
        info!(
            seq = update.seq,
            verdict = %update.verdict,
            "{} | {}",
            self.temperature_label,
            self.status_label
        );
        if let Some(band) = self.chart.band() {
            debug!(
                points = self.chart.len(),
                ucl = band.upper,
                lcl = band.lower,
                "control chart updated"
            );
        }
        true
    }

    /// Consume the feed until the publisher goes away.
    pub async fn run(mut self, mut feed: FeedSubscriber) -> Self {
        info!("{} | {}", self.temperature_label, self.status_label);
        while let Some(update) = feed.next().await {
            self.apply(&update);
        }
        debug!("feed closed, presenter exiting");
        self
    }

    /// Last temperature label shown.
    pub fn temperature_label(&self) -> &str {
        &self.temperature_label
    }

    /// Last status label shown.
    pub fn status_label(&self) -> &str {
        &self.status_label
    }

    /// Control-chart history.
    pub fn chart(&self) -> &ChartHistory {
        &self.chart
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thermo_sentinel_core::{BaselineConfig, InMemoryStore, Pipeline, Reading};

    #[test]
    fn starts_idle() {
        let p = Presenter::new(10);
        assert_eq!(p.temperature_label(), "Temperatura: --°C");
        assert_eq!(p.status_label(), "Estado: Esperando datos...");
        assert!(p.chart().is_empty());
    }

    #[test]
    fn tracks_latest_update() {
        let (mut pipeline, _feed) =
            Pipeline::new(BaselineConfig::default(), Box::new(InMemoryStore::new()));
        let mut presenter = Presenter::new(10);

        let first = pipeline.process(Reading::now(20.0));
        assert!(presenter.apply(&first));
        assert_eq!(presenter.temperature_label(), "Temperatura: 20°C");
        assert!(presenter.status_label().contains("1/10"));

        assert!(!presenter.apply(&first));
        assert_eq!(presenter.chart().len(), 1);
    }

    #[tokio::test]
    async fn run_drains_feed() {
        let (mut pipeline, feed) =
            Pipeline::new(BaselineConfig::default(), Box::new(InMemoryStore::new()));
        let presenter = tokio::spawn(Presenter::new(10).run(feed));

        for v in [20.0, 21.0, 20.0, 22.0, 21.0, 20.0, 21.0, 22.0, 20.0, 21.0, 35.0] {
            pipeline.process(Reading::now(v));
        }
        drop(pipeline);

        let presenter = presenter.await.unwrap();
        assert!(presenter.status_label().contains("Temperatura alta"));
        assert!(presenter.chart().band().is_some());
        assert!(presenter.chart().len() <= 10);
    }
}

//! Background refresh task.
//!
//! Periodically forces an aggregation pass so readers rarely hit an expired
//! result cache. The first tick fires immediately and warms both caches.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::news::aggregator::{NewsAggregator, RefreshOutcome};

/// Periodic refresher for a [`NewsAggregator`].
pub struct NewsUpdater {
    aggregator: Arc<NewsAggregator>,
    refresh_interval: Duration,
}

impl NewsUpdater {
    /// Create an updater that refreshes every `interval_secs` seconds.
    pub fn new(aggregator: Arc<NewsAggregator>, interval_secs: u64) -> Self {
        Self {
            aggregator,
            refresh_interval: Duration::from_secs(interval_secs),
        }
    }

    /// Run the updater loop forever.
    pub async fn run(&self) {
        info!(
            "News updater started (interval: {} seconds)",
            self.refresh_interval.as_secs()
        );

        let mut timer = interval(self.refresh_interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            timer.tick().await;
            self.tick().await;
        }
    }

    async fn tick(&self) -> RefreshOutcome {
        debug!("Running scheduled refresh");
        let outcome = self.aggregator.refresh().await;
        debug!(outcome = outcome.label(), "Scheduled refresh finished");
        match &outcome {
            RefreshOutcome::Fresh(snapshot) => {
                info!("Scheduled refresh stored {} item(s)", snapshot.items().len());
            }
            RefreshOutcome::Stale(snapshot) => {
                warn!(
                    "Scheduled refresh failed; keeping result from {}",
                    snapshot.fetched_at().to_rfc3339()
                );
            }
            RefreshOutcome::Empty => {
                warn!("Scheduled refresh failed; no result available yet");
            }
        }
        outcome
    }
}

/// Spawn the updater on the Tokio runtime.
///
/// Returns `None` when `interval_secs` is zero (background refresh disabled).
pub fn start_news_updater(
    aggregator: Arc<NewsAggregator>,
    interval_secs: u64,
) -> Option<JoinHandle<()>> {
    if interval_secs == 0 {
        debug!("Background refresh disabled");
        return None;
    }
    let updater = NewsUpdater::new(aggregator, interval_secs);
    Some(tokio::spawn(async move {
        updater.run().await;
    }))
}

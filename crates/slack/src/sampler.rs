//! Deferred one-shot engagement sampling for just-sent messages.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use todak_core::EngagementRecord;
use todak_store::EngagementStore;

use crate::stats::StatsFetcher;
use crate::transport::ChatTransport;

/// Schedules a single measurement of a message's engagement after a fixed
/// dwell, detached from the send path. There is no durable queue: if the
/// process exits before the dwell elapses, the sample is lost.
#[derive(Clone)]
pub struct DelayedSampler {
    fetcher: StatsFetcher,
    store: Arc<EngagementStore>,
    dwell: Duration,
}

impl DelayedSampler {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        store: Arc<EngagementStore>,
        dwell: Duration,
    ) -> Self {
        Self { fetcher: StatsFetcher::new(transport), store, dwell }
    }

    /// Fire-and-forget: returns immediately, keeps no handle to the spawned
    /// task. A message that came back without a timestamp handle was never
    /// delivered, so nothing is scheduled for it.
    ///
    /// The record is stamped with the sampling moment, not the send moment.
    pub fn schedule(&self, channel: &str, ts: Option<String>, text: &str) {
        let Some(ts) = ts else {
            debug!(channel, "send returned no timestamp handle; skipping sample");
            return;
        };

        let fetcher = self.fetcher.clone();
        let store = Arc::clone(&self.store);
        let dwell = self.dwell;
        let channel = channel.to_owned();
        let text = text.to_owned();

        tokio::spawn(async move {
            tokio::time::sleep(dwell).await;

            let stats = fetcher.fetch(&channel, &ts).await;
            let record = EngagementRecord {
                sent_at: Utc::now(),
                text,
                reaction_count: stats.reaction_count,
                reply_count: stats.reply_count,
            };

            match store.append_engagement(&record).await {
                Ok(()) => info!(
                    ts,
                    reactions = record.reaction_count,
                    replies = record.reply_count,
                    score = record.score(),
                    "engagement sample recorded"
                ),
                Err(error) => {
                    warn!(ts, error = %error, "engagement sample could not be persisted");
                }
            }
        });
    }
}

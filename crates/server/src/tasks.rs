//! The two periodic units of work: posting a cheer message (with its
//! deferred engagement sample) and posting the engagement summary.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use todak_core::{
    copy::CampaignConfig,
    rank::{top_n, top_n_today, DEFAULT_TOP_N},
    report::summary_message,
    ApplicationError,
};
use todak_slack::{ChatTransport, DelayedSampler};
use todak_store::EngagementStore;

const BEST_MESSAGES_SNAPSHOT: &str = "best-messages";

/// Sends one encouragement message and schedules its engagement sample.
#[derive(Clone)]
pub struct CheerCycle {
    transport: Arc<dyn ChatTransport>,
    sampler: DelayedSampler,
    campaign: CampaignConfig,
    channel_id: String,
}

impl CheerCycle {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        sampler: DelayedSampler,
        campaign: CampaignConfig,
        channel_id: String,
    ) -> Self {
        Self { transport, sampler, campaign, channel_id }
    }

    pub async fn run(&self) -> Result<(), ApplicationError> {
        let text = self.campaign.pick_message(Utc::now(), &mut rand::thread_rng());

        let ts = self
            .transport
            .send_message(&self.channel_id, text)
            .await
            .map_err(|error| ApplicationError::Integration(error.to_string()))?;

        info!(channel = %self.channel_id, text, delivered = ts.is_some(), "cheer message sent");
        self.sampler.schedule(&self.channel_id, ts, text);
        Ok(())
    }
}

/// Ranks the engagement log, posts the report, and overwrites the
/// best-messages snapshot.
#[derive(Clone)]
pub struct SummaryCycle {
    transport: Arc<dyn ChatTransport>,
    store: Arc<EngagementStore>,
    channel_id: String,
}

impl SummaryCycle {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        store: Arc<EngagementStore>,
        channel_id: String,
    ) -> Self {
        Self { transport, store, channel_id }
    }

    pub async fn run(&self) -> Result<(), ApplicationError> {
        let records = self
            .store
            .load_engagements()
            .await
            .map_err(|error| ApplicationError::Persistence(error.to_string()))?;

        let all_time = top_n(&records, DEFAULT_TOP_N);
        if all_time.is_empty() {
            info!("no engagement records yet; skipping summary");
            return Ok(());
        }
        let today = top_n_today(&records, DEFAULT_TOP_N, Utc::now());

        let message = summary_message(&today, &all_time);
        self.transport
            .send_message(&self.channel_id, &message)
            .await
            .map_err(|error| ApplicationError::Integration(error.to_string()))?;

        self.store
            .save_snapshot(BEST_MESSAGES_SNAPSHOT, &all_time)
            .await
            .map_err(|error| ApplicationError::Persistence(error.to_string()))?;

        info!(
            channel = %self.channel_id,
            ranked_today = today.len(),
            ranked_all_time = all_time.len(),
            "summary sent and snapshot saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{NaiveDate, Utc};
    use tempfile::TempDir;
    use tokio::sync::Mutex;

    use todak_core::{ApplicationError, CampaignConfig, EngagementRecord, RankedEntry};
    use todak_slack::transport::{ChannelMessage, ChatTransport, ReactionTally, TransportError};
    use todak_slack::DelayedSampler;
    use todak_store::EngagementStore;

    use super::{CheerCycle, SummaryCycle};

    struct FakeTransport {
        fail_sends: bool,
        ts: Option<String>,
        sent: Mutex<Vec<String>>,
    }

    impl FakeTransport {
        fn delivering() -> Self {
            Self {
                fail_sends: false,
                ts: Some("1752148800.000100".to_owned()),
                sent: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self { fail_sends: true, ts: None, sent: Mutex::new(Vec::new()) }
        }

        async fn sent(&self) -> Vec<String> {
            self.sent.lock().await.clone()
        }
    }

    #[async_trait]
    impl ChatTransport for FakeTransport {
        async fn send_message(
            &self,
            _channel: &str,
            text: &str,
        ) -> Result<Option<String>, TransportError> {
            if self.fail_sends {
                return Err(TransportError::Request("connection reset".to_owned()));
            }
            self.sent.lock().await.push(text.to_owned());
            Ok(self.ts.clone())
        }

        async fn reactions(
            &self,
            _channel: &str,
            _ts: &str,
        ) -> Result<Vec<ReactionTally>, TransportError> {
            Ok(vec![ReactionTally { kind: "tada".to_owned(), count: 1 }])
        }

        async fn thread_replies(
            &self,
            _channel: &str,
            _ts: &str,
        ) -> Result<Vec<ChannelMessage>, TransportError> {
            Ok(vec![ChannelMessage { ts: "1".to_owned(), text: "root".to_owned() }])
        }

        async fn message_at(
            &self,
            _channel: &str,
            _ts: &str,
        ) -> Result<Option<ChannelMessage>, TransportError> {
            Ok(None)
        }
    }

    fn campaign() -> CampaignConfig {
        CampaignConfig::new(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap())
    }

    async fn store_in(dir: &TempDir) -> Arc<EngagementStore> {
        Arc::new(EngagementStore::open(dir.path()).await.expect("open"))
    }

    fn record(text: &str, reactions: u32, replies: u32) -> EngagementRecord {
        EngagementRecord {
            sent_at: Utc::now(),
            text: text.to_owned(),
            reaction_count: reactions,
            reply_count: replies,
        }
    }

    #[tokio::test]
    async fn cheer_cycle_sends_copy_and_records_a_sample() {
        let dir = TempDir::new().expect("tempdir");
        let store = store_in(&dir).await;
        let transport = Arc::new(FakeTransport::delivering());
        let sampler = DelayedSampler::new(
            Arc::clone(&transport) as _,
            Arc::clone(&store),
            Duration::from_millis(10),
        );

        let cycle =
            CheerCycle::new(Arc::clone(&transport) as _, sampler, campaign(), "C1".to_owned());
        cycle.run().await.expect("cheer cycle");

        assert_eq!(transport.sent().await.len(), 1);

        // The deferred sample lands after the dwell.
        let mut landed = false;
        for _ in 0..100 {
            if store.load_engagements().await.expect("load").len() == 1 {
                landed = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(landed, "engagement sample never landed");
        let records = store.load_engagements().await.expect("load");
        assert_eq!(records[0].reaction_count, 1);
        assert_eq!(records[0].reply_count, 0);
    }

    #[tokio::test]
    async fn cheer_cycle_send_failure_aborts_only_that_cycle() {
        let dir = TempDir::new().expect("tempdir");
        let store = store_in(&dir).await;
        let transport = Arc::new(FakeTransport::failing());
        let sampler = DelayedSampler::new(
            Arc::clone(&transport) as _,
            Arc::clone(&store),
            Duration::from_millis(10),
        );

        let cycle =
            CheerCycle::new(Arc::clone(&transport) as _, sampler, campaign(), "C1".to_owned());
        let result = cycle.run().await;

        assert!(matches!(result, Err(ApplicationError::Integration(_))));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(store.load_engagements().await.expect("load").is_empty());
    }

    #[tokio::test]
    async fn summary_cycle_posts_rankings_and_overwrites_the_snapshot() {
        let dir = TempDir::new().expect("tempdir");
        let store = store_in(&dir).await;
        for (text, reactions, replies) in
            [("five", 4, 1), ("three", 3, 0), ("five-too", 2, 3), ("one", 1, 0)]
        {
            store.append_engagement(&record(text, reactions, replies)).await.expect("seed");
        }

        let transport = Arc::new(FakeTransport::delivering());
        let cycle = SummaryCycle::new(Arc::clone(&transport) as _, store, "C1".to_owned());
        cycle.run().await.expect("summary cycle");

        let sent = transport.sent().await;
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("역대 반응 좋은 메시지 TOP 3"));
        assert!(sent[0].contains("\"five\""));

        let raw =
            std::fs::read_to_string(dir.path().join("best-messages.json")).expect("snapshot");
        let snapshot: Vec<RankedEntry> = serde_json::from_str(&raw).expect("parse");
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot[0].record.text, "five");
        assert_eq!(snapshot[1].record.text, "five-too");
    }

    #[tokio::test]
    async fn summary_cycle_with_an_empty_log_sends_nothing() {
        let dir = TempDir::new().expect("tempdir");
        let store = store_in(&dir).await;
        let transport = Arc::new(FakeTransport::delivering());

        let cycle = SummaryCycle::new(Arc::clone(&transport) as _, store, "C1".to_owned());
        cycle.run().await.expect("summary cycle");

        assert!(transport.sent().await.is_empty());
        assert!(!dir.path().join("best-messages.json").exists());
    }
}

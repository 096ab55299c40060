use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One-shot snapshot of a sent message's engagement, taken once after the
/// dwell duration and never updated again. Counts are therefore undercounts
/// of final engagement; that is accepted behavior.
///
/// Field names are camelCase on disk to match the existing log files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementRecord {
    /// Timestamp of the sampling moment, not the send moment.
    pub sent_at: DateTime<Utc>,
    pub text: String,
    pub reaction_count: u32,
    pub reply_count: u32,
}

impl EngagementRecord {
    pub fn score(&self) -> u32 {
        self.reaction_count + self.reply_count
    }
}

/// A single observed reaction occurrence. Independent of
/// [`EngagementRecord`]; both are append-only logs with no linkage beyond
/// the message timestamp.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionEvent {
    pub observed_at: DateTime<Utc>,
    pub message_text: String,
    pub user_id: String,
    pub reaction_kind: String,
    pub message_ts: String,
}

/// An engagement record plus its ranking score. Derived, persisted only in
/// the best-messages snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    #[serde(flatten)]
    pub record: EngagementRecord,
    pub score: u32,
}

impl From<EngagementRecord> for RankedEntry {
    fn from(record: EngagementRecord) -> Self {
        let score = record.score();
        Self { record, score }
    }
}

/// Best-effort engagement counts for one message at one point in time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MessageStats {
    pub reaction_count: u32,
    pub reply_count: u32,
}

//! Ranking over the engagement log: today's best and all-time best.

use chrono::{DateTime, Utc};

use crate::domain::{EngagementRecord, RankedEntry};

/// Number of entries a summary highlights unless asked otherwise.
pub const DEFAULT_TOP_N: usize = 3;

/// Scores every record and returns at most `n` entries sorted by descending
/// score. The sort is stable: equally-scored records keep their insertion
/// order.
pub fn top_n(records: &[EngagementRecord], n: usize) -> Vec<RankedEntry> {
    let mut entries: Vec<RankedEntry> = records.iter().cloned().map(RankedEntry::from).collect();
    entries.sort_by(|a, b| b.score.cmp(&a.score));
    entries.truncate(n);
    entries
}

/// Like [`top_n`], but restricted to records whose `sent_at` falls on the
/// same UTC calendar day as `now`. Zero matches yields an empty ranking.
pub fn top_n_today(records: &[EngagementRecord], n: usize, now: DateTime<Utc>) -> Vec<RankedEntry> {
    let today = now.date_naive();
    let todays: Vec<EngagementRecord> =
        records.iter().filter(|record| record.sent_at.date_naive() == today).cloned().collect();
    top_n(&todays, n)
}

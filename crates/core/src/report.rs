//! Plain-text rendering of engagement summaries. Presentation only; the
//! exact formatting is not a contract anyone parses.

use crate::domain::RankedEntry;

/// Numbered list of ranked entries with their reaction and reply counts.
pub fn format_ranking(entries: &[RankedEntry]) -> String {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            format!(
                "• {}. \"{}\"\n   🔁 {} reactions / 💬 {} replies",
                index + 1,
                entry.record.text,
                entry.record.reaction_count,
                entry.record.reply_count
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Full summary post: today's best (when any) followed by the all-time top.
pub fn summary_message(today: &[RankedEntry], all_time: &[RankedEntry]) -> String {
    let mut sections = Vec::new();

    if !today.is_empty() {
        sections.push(format!(
            "🌟 *오늘 반응 좋은 메시지 TOP {}*\n\n{}",
            today.len(),
            format_ranking(today)
        ));
    }

    sections.push(format!(
        "🏆 *역대 반응 좋은 메시지 TOP {}*\n\n{}",
        all_time.len(),
        format_ranking(all_time)
    ));

    sections.join("\n\n")
}

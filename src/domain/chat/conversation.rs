//! Conversation summaries and recency grouping for the history panel.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ConversationId, Timestamp};

/// Lightweight summary of a stored conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// Backend-assigned identifier.
    pub id: ConversationId,
    /// Short title, usually derived from the first turn.
    pub title: String,
    /// Optional one-line summary.
    #[serde(default)]
    pub summary: Option<String>,
    /// Number of messages stored for this conversation.
    pub message_count: u32,
    /// When the last message was exchanged.
    pub last_message_at: Timestamp,
}

/// Display-only recency bucket for the conversation history list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecencyBucket {
    Today,
    Yesterday,
    ThisWeek,
    Older,
}

impl RecencyBucket {
    /// All buckets in display order, most recent first.
    pub const ORDER: [RecencyBucket; 4] = [
        RecencyBucket::Today,
        RecencyBucket::Yesterday,
        RecencyBucket::ThisWeek,
        RecencyBucket::Older,
    ];

    fn for_timestamp(ts: &Timestamp, start_of_today: &Timestamp) -> Self {
        if !ts.is_before(start_of_today) {
            RecencyBucket::Today
        } else if !ts.is_before(&start_of_today.minus_days(1)) {
            RecencyBucket::Yesterday
        } else if !ts.is_before(&start_of_today.minus_days(6)) {
            RecencyBucket::ThisWeek
        } else {
            RecencyBucket::Older
        }
    }
}

/// Groups summaries into recency buckets for display.
///
/// Within each bucket the list is ordered by `last_message_at` descending.
/// Empty buckets are omitted. Grouping never reorders or mutates the
/// underlying conversations; it is purely presentational.
pub fn group_by_recency(
    mut summaries: Vec<ConversationSummary>,
    start_of_today: Timestamp,
) -> Vec<(RecencyBucket, Vec<ConversationSummary>)> {
    summaries.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));

    let mut grouped: Vec<(RecencyBucket, Vec<ConversationSummary>)> = Vec::new();
    for bucket in RecencyBucket::ORDER {
        let entries: Vec<_> = summaries
            .iter()
            .filter(|s| RecencyBucket::for_timestamp(&s.last_message_at, &start_of_today) == bucket)
            .cloned()
            .collect();
        if !entries.is_empty() {
            grouped.push((bucket, entries));
        }
    }
    grouped
}

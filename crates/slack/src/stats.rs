//! Best-effort engagement counts for one message at one point in time.

use std::sync::Arc;

use tracing::warn;

use todak_core::MessageStats;

use crate::transport::ChatTransport;

/// Queries reaction and reply counts for a message. Engagement stats are
/// advisory, so transport failures never propagate: each side that fails
/// is counted as zero.
#[derive(Clone)]
pub struct StatsFetcher {
    transport: Arc<dyn ChatTransport>,
}

impl StatsFetcher {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self { transport }
    }

    /// Runs the reaction and thread lookups concurrently and combines
    /// whatever completed. Both failing yields `{0, 0}`.
    pub async fn fetch(&self, channel: &str, ts: &str) -> MessageStats {
        let (reactions, replies) =
            tokio::join!(self.transport.reactions(channel, ts), self.transport.thread_replies(channel, ts));

        let reaction_count = match reactions {
            Ok(tallies) => tallies.iter().map(|tally| tally.count).sum(),
            Err(error) => {
                warn!(channel, ts, error = %error, "reaction lookup failed; counting zero");
                0
            }
        };

        // Thread length includes the root message.
        let reply_count = match replies {
            Ok(messages) => messages.len().saturating_sub(1) as u32,
            Err(error) => {
                warn!(channel, ts, error = %error, "thread lookup failed; counting zero");
                0
            }
        };

        MessageStats { reaction_count, reply_count }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use todak_core::MessageStats;

    use super::StatsFetcher;
    use crate::transport::{ChannelMessage, ChatTransport, ReactionTally, TransportError};

    struct ScriptedStats {
        reactions: Result<Vec<ReactionTally>, TransportError>,
        replies: Result<Vec<ChannelMessage>, TransportError>,
    }

    #[async_trait]
    impl ChatTransport for ScriptedStats {
        async fn send_message(
            &self,
            _channel: &str,
            _text: &str,
        ) -> Result<Option<String>, TransportError> {
            unimplemented!("not used by stats tests")
        }

        async fn reactions(
            &self,
            _channel: &str,
            _ts: &str,
        ) -> Result<Vec<ReactionTally>, TransportError> {
            self.reactions.clone()
        }

        async fn thread_replies(
            &self,
            _channel: &str,
            _ts: &str,
        ) -> Result<Vec<ChannelMessage>, TransportError> {
            self.replies.clone()
        }

        async fn message_at(
            &self,
            _channel: &str,
            _ts: &str,
        ) -> Result<Option<ChannelMessage>, TransportError> {
            unimplemented!("not used by stats tests")
        }
    }

    fn message(ts: &str) -> ChannelMessage {
        ChannelMessage { ts: ts.to_owned(), text: "m".to_owned() }
    }

    fn fetcher(script: ScriptedStats) -> StatsFetcher {
        StatsFetcher::new(Arc::new(script))
    }

    #[tokio::test]
    async fn sums_reaction_kinds_and_excludes_thread_root() {
        let stats = fetcher(ScriptedStats {
            reactions: Ok(vec![
                ReactionTally { kind: "tada".to_owned(), count: 2 },
                ReactionTally { kind: "heart".to_owned(), count: 3 },
            ]),
            replies: Ok(vec![message("1"), message("2"), message("3")]),
        })
        .fetch("C1", "1")
        .await;

        assert_eq!(stats, MessageStats { reaction_count: 5, reply_count: 2 });
    }

    #[tokio::test]
    async fn thread_with_only_the_root_counts_zero_replies() {
        let stats = fetcher(ScriptedStats {
            reactions: Ok(vec![]),
            replies: Ok(vec![message("1")]),
        })
        .fetch("C1", "1")
        .await;

        assert_eq!(stats, MessageStats { reaction_count: 0, reply_count: 0 });
    }

    #[tokio::test]
    async fn both_lookups_failing_degrades_to_zeros() {
        let stats = fetcher(ScriptedStats {
            reactions: Err(TransportError::Request("timeout".to_owned())),
            replies: Err(TransportError::Api("thread_not_found".to_owned())),
        })
        .fetch("C1", "1")
        .await;

        assert_eq!(stats, MessageStats::default());
    }

    #[tokio::test]
    async fn one_side_failing_keeps_the_other_sides_value() {
        let stats = fetcher(ScriptedStats {
            reactions: Err(TransportError::Request("timeout".to_owned())),
            replies: Ok(vec![message("1"), message("2")]),
        })
        .fetch("C1", "1")
        .await;
        assert_eq!(stats, MessageStats { reaction_count: 0, reply_count: 1 });

        let stats = fetcher(ScriptedStats {
            reactions: Ok(vec![ReactionTally { kind: "tada".to_owned(), count: 4 }]),
            replies: Err(TransportError::Api("thread_not_found".to_owned())),
        })
        .fetch("C1", "1")
        .await;
        assert_eq!(stats, MessageStats { reaction_count: 4, reply_count: 0 });
    }
}

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("chat transport request failed: {0}")]
    Request(String),
    #[error("chat api rejected the call: {0}")]
    Api(String),
}

/// One reaction kind and how many users added it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReactionTally {
    pub kind: String,
    pub count: u32,
}

/// A message as the platform reports it in history or thread lookups.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelMessage {
    pub ts: String,
    pub text: String,
}

/// The chat-platform seam. Everything above this trait is written against
/// it, so tests script it in memory and production wires the Web API
/// client in.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Posts a message and returns its platform timestamp handle. `None`
    /// means the platform accepted the call without handing one back; no
    /// engagement sample can be scheduled for such a message.
    async fn send_message(
        &self,
        channel: &str,
        text: &str,
    ) -> Result<Option<String>, TransportError>;

    /// Reaction tallies currently attached to a message.
    async fn reactions(&self, channel: &str, ts: &str)
        -> Result<Vec<ReactionTally>, TransportError>;

    /// All messages in a thread, root included.
    async fn thread_replies(
        &self,
        channel: &str,
        ts: &str,
    ) -> Result<Vec<ChannelMessage>, TransportError>;

    /// The single message at exactly `ts`, if it still exists.
    async fn message_at(
        &self,
        channel: &str,
        ts: &str,
    ) -> Result<Option<ChannelMessage>, TransportError>;
}

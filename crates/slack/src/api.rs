//! Slack Web API implementation of [`ChatTransport`].

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::transport::{ChannelMessage, ChatTransport, ReactionTally, TransportError};

const DEFAULT_BASE_URL: &str = "https://slack.com/api";

pub struct SlackApiClient {
    http: Client,
    bot_token: SecretString,
    base_url: String,
}

impl SlackApiClient {
    pub fn new(bot_token: SecretString) -> Self {
        Self { http: Client::new(), bot_token, base_url: DEFAULT_BASE_URL.to_owned() }
    }

    /// Points the client at a different API root. Used by tests that stand
    /// in for slack.com.
    pub fn with_base_url(bot_token: SecretString, base_url: impl Into<String>) -> Self {
        Self { http: Client::new(), bot_token, base_url: base_url.into() }
    }

    async fn get(
        &self,
        method: &str,
        query: &[(&str, &str)],
    ) -> Result<ApiEnvelope, TransportError> {
        let response = self
            .http
            .get(format!("{}/{method}", self.base_url))
            .bearer_auth(self.bot_token.expose_secret())
            .query(query)
            .send()
            .await
            .map_err(|error| TransportError::Request(error.to_string()))?;

        let envelope: ApiEnvelope =
            response.json().await.map_err(|error| TransportError::Request(error.to_string()))?;
        envelope.into_ok(method)
    }
}

#[async_trait]
impl ChatTransport for SlackApiClient {
    async fn send_message(
        &self,
        channel: &str,
        text: &str,
    ) -> Result<Option<String>, TransportError> {
        let response = self
            .http
            .post(format!("{}/chat.postMessage", self.base_url))
            .bearer_auth(self.bot_token.expose_secret())
            .json(&serde_json::json!({ "channel": channel, "text": text }))
            .send()
            .await
            .map_err(|error| TransportError::Request(error.to_string()))?;

        let envelope: ApiEnvelope =
            response.json().await.map_err(|error| TransportError::Request(error.to_string()))?;
        let envelope = envelope.into_ok("chat.postMessage")?;

        Ok(envelope.ts)
    }

    async fn reactions(
        &self,
        channel: &str,
        ts: &str,
    ) -> Result<Vec<ReactionTally>, TransportError> {
        let envelope =
            self.get("reactions.get", &[("channel", channel), ("timestamp", ts)]).await?;

        let tallies = envelope
            .message
            .and_then(|message| message.reactions)
            .unwrap_or_default()
            .into_iter()
            .map(|reaction| ReactionTally { kind: reaction.name, count: reaction.count })
            .collect();
        Ok(tallies)
    }

    async fn thread_replies(
        &self,
        channel: &str,
        ts: &str,
    ) -> Result<Vec<ChannelMessage>, TransportError> {
        let envelope =
            self.get("conversations.replies", &[("channel", channel), ("ts", ts)]).await?;

        Ok(envelope.messages.unwrap_or_default().into_iter().map(ChannelMessage::from).collect())
    }

    async fn message_at(
        &self,
        channel: &str,
        ts: &str,
    ) -> Result<Option<ChannelMessage>, TransportError> {
        let envelope = self
            .get(
                "conversations.history",
                &[("channel", channel), ("latest", ts), ("inclusive", "true"), ("limit", "1")],
            )
            .await?;

        Ok(envelope
            .messages
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(ChannelMessage::from))
    }
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    ok: bool,
    error: Option<String>,
    ts: Option<String>,
    message: Option<ApiMessage>,
    messages: Option<Vec<ApiMessage>>,
}

impl ApiEnvelope {
    fn into_ok(self, method: &str) -> Result<Self, TransportError> {
        if self.ok {
            Ok(self)
        } else {
            let reason = self.error.unwrap_or_else(|| "unknown_error".to_owned());
            Err(TransportError::Api(format!("{method}: {reason}")))
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    ts: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    reactions: Option<Vec<ApiReaction>>,
}

impl From<ApiMessage> for ChannelMessage {
    fn from(message: ApiMessage) -> Self {
        Self { ts: message.ts.unwrap_or_default(), text: message.text.unwrap_or_default() }
    }
}

#[derive(Debug, Deserialize)]
struct ApiReaction {
    name: String,
    count: u32,
}

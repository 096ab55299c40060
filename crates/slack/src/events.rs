//! Inbound Slack events: envelope types, the dispatcher, and the two
//! handlers this bot registers (reaction logging and the `/토닥` command).

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tracing::info;

use todak_core::{CampaignConfig, ReactionEvent};
use todak_store::EngagementStore;

use crate::transport::ChatTransport;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlackEnvelope {
    pub envelope_id: String,
    pub event: SlackEvent,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlackEvent {
    SlashCommand(SlashCommandPayload),
    ReactionAdded(ReactionAddedEvent),
    Unsupported { event_type: String },
}

impl SlackEvent {
    pub fn event_type(&self) -> SlackEventType {
        match self {
            Self::SlashCommand(_) => SlackEventType::SlashCommand,
            Self::ReactionAdded(_) => SlackEventType::ReactionAdded,
            Self::Unsupported { .. } => SlackEventType::Unsupported,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SlackEventType {
    SlashCommand,
    ReactionAdded,
    Unsupported,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlashCommandPayload {
    pub command: String,
    pub channel_id: String,
    pub user_id: String,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReactionAddedEvent {
    pub channel_id: String,
    pub message_ts: String,
    pub user_id: String,
    pub reaction: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventContext {
    pub correlation_id: String,
}

impl Default for EventContext {
    fn default() -> Self {
        Self { correlation_id: "unknown-correlation-id".to_owned() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandlerResult {
    /// Handler produced an outbound reply (already sent through the
    /// transport; kept here for logging and tests).
    Responded(String),
    Processed,
    Ignored,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventHandlerError {
    #[error("reaction log handler failure: {0}")]
    ReactionLog(String),
    #[error("command handler failure: {0}")]
    Command(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error(transparent)]
    Handler(#[from] EventHandlerError),
}

#[async_trait]
pub trait EventHandler: Send + Sync {
    fn event_type(&self) -> SlackEventType;
    async fn handle(
        &self,
        envelope: &SlackEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError>;
}

#[derive(Default)]
pub struct EventDispatcher {
    handlers: HashMap<SlackEventType, Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H>(&mut self, handler: H)
    where
        H: EventHandler + 'static,
    {
        self.handlers.insert(handler.event_type(), Arc::new(handler));
    }

    pub async fn dispatch(
        &self,
        envelope: &SlackEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, DispatchError> {
        let Some(handler) = self.handlers.get(&envelope.event.event_type()) else {
            return Ok(HandlerResult::Ignored);
        };

        handler.handle(envelope, ctx).await.map_err(DispatchError::from)
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

/// Logs every observed reaction as a [`ReactionEvent`], resolving the text
/// of the reacted-to message at event time. Independent of engagement
/// sampling; the two logs are never merged or ordered against each other.
pub struct ReactionLogHandler {
    transport: Arc<dyn ChatTransport>,
    store: Arc<EngagementStore>,
}

impl ReactionLogHandler {
    pub fn new(transport: Arc<dyn ChatTransport>, store: Arc<EngagementStore>) -> Self {
        Self { transport, store }
    }
}

#[async_trait]
impl EventHandler for ReactionLogHandler {
    fn event_type(&self) -> SlackEventType {
        SlackEventType::ReactionAdded
    }

    async fn handle(
        &self,
        envelope: &SlackEnvelope,
        _ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let SlackEvent::ReactionAdded(event) = &envelope.event else {
            return Ok(HandlerResult::Ignored);
        };

        let message = self
            .transport
            .message_at(&event.channel_id, &event.message_ts)
            .await
            .map_err(|error| EventHandlerError::ReactionLog(error.to_string()))?
            .ok_or_else(|| {
                EventHandlerError::ReactionLog(format!(
                    "no message found at ts {} in {}",
                    event.message_ts, event.channel_id
                ))
            })?;

        let reaction_event = ReactionEvent {
            observed_at: Utc::now(),
            message_text: message.text,
            user_id: event.user_id.clone(),
            reaction_kind: event.reaction.clone(),
            message_ts: event.message_ts.clone(),
        };

        self.store
            .append_reaction_event(&reaction_event)
            .await
            .map_err(|error| EventHandlerError::ReactionLog(error.to_string()))?;

        info!(
            reaction = %reaction_event.reaction_kind,
            user = %reaction_event.user_id,
            ts = %reaction_event.message_ts,
            "reaction observed and logged"
        );
        Ok(HandlerResult::Processed)
    }
}

/// Replies to `/토닥` with a greeting and the encouragement for the current
/// camp week. The envelope is acknowledged by the socket loop before this
/// runs, so a failure here only affects the reply, never the ack.
pub struct CheerCommandHandler {
    transport: Arc<dyn ChatTransport>,
    campaign: CampaignConfig,
}

impl CheerCommandHandler {
    pub fn new(transport: Arc<dyn ChatTransport>, campaign: CampaignConfig) -> Self {
        Self { transport, campaign }
    }
}

#[async_trait]
impl EventHandler for CheerCommandHandler {
    fn event_type(&self) -> SlackEventType {
        SlackEventType::SlashCommand
    }

    async fn handle(
        &self,
        envelope: &SlackEnvelope,
        _ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let SlackEvent::SlashCommand(payload) = &envelope.event else {
            return Ok(HandlerResult::Ignored);
        };

        if payload.command != "/토닥" {
            return Ok(HandlerResult::Ignored);
        }

        let reply = format!(
            "안녕하세요 <@{}>님! 🧸\n{}",
            payload.user_id,
            self.campaign.encouragement(Utc::now())
        );

        self.transport
            .send_message(&payload.channel_id, &reply)
            .await
            .map_err(|error| EventHandlerError::Command(error.to_string()))?;

        Ok(HandlerResult::Responded(reply))
    }
}

//! Slack integration for todak.
//!
//! - **Transport** (`transport`) - the chat-platform seam the rest of the
//!   workspace is written and tested against
//! - **Web API client** (`api`) - reqwest implementation of the transport
//! - **Stats** (`stats`) - best-effort reaction/reply counts for a message
//! - **Sampler** (`sampler`) - deferred one-shot engagement sampling
//! - **Events** (`events`) - reaction logging and the `/토닥` command
//! - **Socket Mode** (`socket`) - envelope loop with reconnection logic
//!
//! Set `TODAK_SLACK_APP_TOKEN` (xapp-...) and `TODAK_SLACK_BOT_TOKEN`
//! (xoxb-...) and subscribe the app to `reaction_added` plus the `/토닥`
//! slash command.

pub mod api;
pub mod events;
pub mod sampler;
pub mod socket;
pub mod stats;
pub mod transport;

pub use sampler::DelayedSampler;
pub use stats::StatsFetcher;
pub use transport::{ChannelMessage, ChatTransport, ReactionTally, TransportError};

//! Core domain for todak: engagement records, ranking, campaign copy,
//! and application configuration. No I/O lives here.

pub mod config;
pub mod copy;
pub mod domain;
pub mod errors;
pub mod rank;
pub mod report;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions};
pub use copy::{CampPhase, CampaignConfig, TimeOfDay};
pub use domain::{EngagementRecord, MessageStats, RankedEntry, ReactionEvent};
pub use errors::ApplicationError;
pub use rank::{top_n, top_n_today, DEFAULT_TOP_N};

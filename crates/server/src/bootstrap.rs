use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use todak_core::config::{AppConfig, ConfigError, LoadOptions};
use todak_core::copy::CampaignConfig;
use todak_slack::api::SlackApiClient;
use todak_slack::events::{CheerCommandHandler, EventDispatcher, ReactionLogHandler};
use todak_slack::socket::{ReconnectPolicy, SocketModeRunner};
use todak_slack::{ChatTransport, DelayedSampler};
use todak_store::{EngagementStore, StoreError};

use crate::schedule::DailySchedule;
use crate::tasks::{CheerCycle, SummaryCycle};

pub struct Application {
    pub config: AppConfig,
    pub store: Arc<EngagementStore>,
    pub cheer_cycle: CheerCycle,
    pub summary_cycle: SummaryCycle,
    pub cheer_schedule: Option<DailySchedule>,
    pub summary_schedule: Option<DailySchedule>,
    pub slack_runner: SocketModeRunner,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("store initialization failed: {0}")]
    Store(#[from] StoreError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!("starting application bootstrap");

    let store = Arc::new(EngagementStore::open(config.store.data_dir.clone()).await?);
    info!(data_dir = %config.store.data_dir.display(), "engagement store opened");

    let transport: Arc<dyn ChatTransport> =
        Arc::new(SlackApiClient::new(config.slack.bot_token.clone()));
    let campaign = CampaignConfig::new(config.campaign.start_date);
    let sampler = DelayedSampler::new(
        Arc::clone(&transport),
        Arc::clone(&store),
        Duration::from_secs(config.sampler.dwell_secs),
    );

    let cheer_cycle = CheerCycle::new(
        Arc::clone(&transport),
        sampler,
        campaign,
        config.slack.channel_id.clone(),
    );
    let summary_cycle = SummaryCycle::new(
        Arc::clone(&transport),
        Arc::clone(&store),
        config.slack.channel_id.clone(),
    );

    let mut dispatcher = EventDispatcher::new();
    dispatcher.register(ReactionLogHandler::new(Arc::clone(&transport), Arc::clone(&store)));
    dispatcher.register(CheerCommandHandler::new(Arc::clone(&transport), campaign));

    // Socket Mode stays on the noop transport until a WebSocket transport
    // is wired in; scheduled sends and summaries run either way.
    let slack_runner =
        SocketModeRunner::with_noop_transport(dispatcher, ReconnectPolicy::default());

    let cheer_schedule = DailySchedule::new(config.schedule.cheer_hours.clone());
    let summary_schedule = DailySchedule::new(config.schedule.summary_hours.clone());

    Ok(Application {
        config,
        store,
        cheer_cycle,
        summary_cycle,
        cheer_schedule,
        summary_schedule,
        slack_runner,
    })
}

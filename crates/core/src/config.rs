use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub slack: SlackConfig,
    pub campaign: CampaignSettings,
    pub sampler: SamplerConfig,
    pub store: StoreConfig,
    pub schedule: ScheduleConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct SlackConfig {
    pub app_token: SecretString,
    pub bot_token: SecretString,
    /// Channel the bot posts cheer messages and summaries to.
    pub channel_id: String,
}

#[derive(Clone, Debug)]
pub struct CampaignSettings {
    pub start_date: NaiveDate,
}

#[derive(Clone, Debug)]
pub struct SamplerConfig {
    /// Delay between sending a message and sampling its engagement.
    pub dwell_secs: u64,
}

#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
}

#[derive(Clone, Debug)]
pub struct ScheduleConfig {
    /// UTC hours at which a cheer message is posted.
    pub cheer_hours: Vec<u32>,
    /// UTC hours at which the engagement summary is posted.
    pub summary_hours: Vec<u32>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub slack_app_token: Option<String>,
    pub slack_bot_token: Option<String>,
    pub channel_id: Option<String>,
    pub campaign_start_date: Option<NaiveDate>,
    pub dwell_secs: Option<u64>,
    pub data_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            slack: SlackConfig {
                app_token: String::new().into(),
                bot_token: String::new().into(),
                channel_id: String::new(),
            },
            campaign: CampaignSettings {
                start_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap_or_default(),
            },
            sampler: SamplerConfig { dwell_secs: 10 },
            store: StoreConfig { data_dir: PathBuf::from(".") },
            schedule: ScheduleConfig {
                cheer_hours: vec![12, 13, 18, 22],
                summary_hours: vec![21],
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch)?;
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("todak.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) -> Result<(), ConfigError> {
        if let Some(slack) = patch.slack {
            if let Some(app_token) = slack.app_token {
                self.slack.app_token = app_token.into();
            }
            if let Some(bot_token) = slack.bot_token {
                self.slack.bot_token = bot_token.into();
            }
            if let Some(channel_id) = slack.channel_id {
                self.slack.channel_id = channel_id;
            }
        }

        if let Some(campaign) = patch.campaign {
            if let Some(start_date) = campaign.start_date {
                self.campaign.start_date = parse_date("campaign.start_date", &start_date)?;
            }
        }

        if let Some(sampler) = patch.sampler {
            if let Some(dwell_secs) = sampler.dwell_secs {
                self.sampler.dwell_secs = dwell_secs;
            }
        }

        if let Some(store) = patch.store {
            if let Some(data_dir) = store.data_dir {
                self.store.data_dir = PathBuf::from(data_dir);
            }
        }

        if let Some(schedule) = patch.schedule {
            if let Some(cheer_hours) = schedule.cheer_hours {
                self.schedule.cheer_hours = cheer_hours;
            }
            if let Some(summary_hours) = schedule.summary_hours {
                self.schedule.summary_hours = summary_hours;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("TODAK_SLACK_APP_TOKEN") {
            self.slack.app_token = value.into();
        }
        if let Some(value) = read_env("TODAK_SLACK_BOT_TOKEN") {
            self.slack.bot_token = value.into();
        }
        if let Some(value) = read_env("TODAK_SLACK_CHANNEL_ID") {
            self.slack.channel_id = value;
        }

        if let Some(value) = read_env("TODAK_CAMPAIGN_START_DATE") {
            self.campaign.start_date = parse_date("TODAK_CAMPAIGN_START_DATE", &value)?;
        }

        if let Some(value) = read_env("TODAK_SAMPLER_DWELL_SECS") {
            self.sampler.dwell_secs = parse_u64("TODAK_SAMPLER_DWELL_SECS", &value)?;
        }

        if let Some(value) = read_env("TODAK_STORE_DATA_DIR") {
            self.store.data_dir = PathBuf::from(value);
        }

        if let Some(value) = read_env("TODAK_SCHEDULE_CHEER_HOURS") {
            self.schedule.cheer_hours = parse_hours("TODAK_SCHEDULE_CHEER_HOURS", &value)?;
        }
        if let Some(value) = read_env("TODAK_SCHEDULE_SUMMARY_HOURS") {
            self.schedule.summary_hours = parse_hours("TODAK_SCHEDULE_SUMMARY_HOURS", &value)?;
        }

        if let Some(value) = read_env("TODAK_LOGGING_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = read_env("TODAK_LOGGING_FORMAT") {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(app_token) = overrides.slack_app_token {
            self.slack.app_token = app_token.into();
        }
        if let Some(bot_token) = overrides.slack_bot_token {
            self.slack.bot_token = bot_token.into();
        }
        if let Some(channel_id) = overrides.channel_id {
            self.slack.channel_id = channel_id;
        }
        if let Some(start_date) = overrides.campaign_start_date {
            self.campaign.start_date = start_date;
        }
        if let Some(dwell_secs) = overrides.dwell_secs {
            self.sampler.dwell_secs = dwell_secs;
        }
        if let Some(data_dir) = overrides.data_dir {
            self.store.data_dir = data_dir;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_slack(&self.slack)?;
        validate_sampler(&self.sampler)?;
        validate_schedule(&self.schedule)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("todak.toml"), PathBuf::from("config/todak.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_slack(slack: &SlackConfig) -> Result<(), ConfigError> {
    let app_token = slack.app_token.expose_secret();
    if app_token.is_empty() {
        return Err(ConfigError::Validation(
            "slack.app_token is required. Get it from https://api.slack.com/apps > Your App > Basic Information > App-Level Tokens".to_string()
        ));
    }
    if !app_token.starts_with("xapp-") {
        let hint = if app_token.starts_with("xoxb-") {
            " (hint: you may have used the bot token instead of the app token)"
        } else {
            ""
        };
        return Err(ConfigError::Validation(format!(
            "slack.app_token must start with `xapp-`{hint}. Get it from https://api.slack.com/apps"
        )));
    }

    let bot_token = slack.bot_token.expose_secret();
    if bot_token.is_empty() {
        return Err(ConfigError::Validation(
            "slack.bot_token is required. Get it from https://api.slack.com/apps > Your App > OAuth & Permissions > Bot User OAuth Token".to_string()
        ));
    }
    if !bot_token.starts_with("xoxb-") {
        let hint = if bot_token.starts_with("xapp-") {
            " (hint: you may have used the app token instead of the bot token)"
        } else {
            ""
        };
        return Err(ConfigError::Validation(format!(
            "slack.bot_token must start with `xoxb-`{hint}. Get it from https://api.slack.com/apps"
        )));
    }

    if slack.channel_id.trim().is_empty() {
        return Err(ConfigError::Validation(
            "slack.channel_id is required (the channel the bot posts into)".to_string(),
        ));
    }

    Ok(())
}

fn validate_sampler(sampler: &SamplerConfig) -> Result<(), ConfigError> {
    if sampler.dwell_secs == 0 || sampler.dwell_secs > 3600 {
        return Err(ConfigError::Validation(
            "sampler.dwell_secs must be in range 1..=3600".to_string(),
        ));
    }
    Ok(())
}

fn validate_schedule(schedule: &ScheduleConfig) -> Result<(), ConfigError> {
    if schedule.cheer_hours.is_empty() {
        return Err(ConfigError::Validation(
            "schedule.cheer_hours must list at least one hour".to_string(),
        ));
    }

    let out_of_range = schedule
        .cheer_hours
        .iter()
        .chain(schedule.summary_hours.iter())
        .find(|hour| **hour > 23);
    if let Some(hour) = out_of_range {
        return Err(ConfigError::Validation(format!(
            "schedule hours must be in range 0..=23, got {hour}"
        )));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_hours(key: &str, value: &str) -> Result<Vec<u32>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
                key: key.to_string(),
                value: value.to_string(),
            })
        })
        .collect()
}

fn parse_date(key: &str, value: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        ConfigError::Validation(format!("{key} must be a `YYYY-MM-DD` date, got `{value}`"))
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    slack: Option<SlackPatch>,
    campaign: Option<CampaignPatch>,
    sampler: Option<SamplerPatch>,
    store: Option<StorePatch>,
    schedule: Option<SchedulePatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct SlackPatch {
    app_token: Option<String>,
    bot_token: Option<String>,
    channel_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CampaignPatch {
    start_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SamplerPatch {
    dwell_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct StorePatch {
    data_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SchedulePatch {
    cheer_hours: Option<Vec<u32>>,
    summary_hours: Option<Vec<u32>>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

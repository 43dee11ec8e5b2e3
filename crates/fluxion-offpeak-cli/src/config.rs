// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use anyhow::{Context, Result, bail};
use chrono::NaiveTime;
use chrono_tz::Tz;
use fluxion_offpeak::OffPeakSchedule;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

const TIME_FORMAT: &str = "%H:%M";

/// Off-peak planner configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Octopus account credentials and identifiers
    #[serde(default)]
    pub account: AccountConfig,

    /// Shape of the nightly off-peak window
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// System configuration
    #[serde(default)]
    pub system: SystemConfig,

    /// File the configuration was read from, if any
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Kraken API key (`sk_live_...`)
    pub api_key: Option<String>,

    /// Account number (`A-XXXXXXXX`)
    pub account_number: Option<String>,

    /// Smart device to plan for (see the `devices` command)
    pub device_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Local start of the off-peak window (HH:MM)
    #[serde(default = "default_window_start")]
    pub window_start: String,

    /// Local end of the off-peak window on the following day (HH:MM)
    #[serde(default = "default_window_end")]
    pub window_end: String,

    /// Hour from which the window of the current evening applies
    #[serde(default = "default_rollover_hour")]
    pub rollover_hour: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            window_start: default_window_start(),
            window_end: default_window_end(),
            rollover_hour: default_rollover_hour(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// IANA zone all windows are reported in
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Kraken GraphQL endpoint (optional, defaults to the public API)
    #[serde(default)]
    pub api_url: Option<String>,

    /// Log level used when RUST_LOG is not set (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            api_url: None,
            log_level: default_log_level(),
        }
    }
}

fn default_window_start() -> String {
    "23:30".to_string()
}

fn default_window_end() -> String {
    "05:30".to_string()
}

fn default_rollover_hour() -> u32 {
    fluxion_offpeak::fixed_window::DEFAULT_ROLLOVER_HOUR
}

fn default_timezone() -> String {
    "Europe/London".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from `path`, or `config.toml` in the working
    /// directory, or defaults; then apply environment overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        let config = config.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Apply `OCTOPUS_*` and `OFFPEAK_*` environment variables
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(api_key) = lookup("OCTOPUS_API_KEY") {
            self.account.api_key = Some(api_key);
        }
        if let Some(account_number) = lookup("OCTOPUS_ACCOUNT_NUMBER") {
            self.account.account_number = Some(account_number);
        }
        if let Some(device_id) = lookup("OCTOPUS_DEVICE_ID") {
            self.account.device_id = Some(device_id);
        }
        if let Some(timezone) = lookup("OFFPEAK_TIMEZONE") {
            self.system.timezone = timezone;
        }
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.timezone()?;
        self.schedule()?;

        if let Some(url) = &self.system.api_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            bail!("system.api_url must be an http(s) URL, got '{url}'");
        }

        if self.account.api_key.as_deref().is_some_and(str::is_empty) {
            warn!("account.api_key is set but empty");
        }

        Ok(())
    }

    /// Reference timezone
    pub fn timezone(&self) -> Result<Tz> {
        self.system
            .timezone
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("Invalid system.timezone '{}': {e}", self.system.timezone))
    }

    /// Off-peak schedule
    pub fn schedule(&self) -> Result<OffPeakSchedule> {
        let schedule = OffPeakSchedule::new(
            parse_time("schedule.window_start", &self.schedule.window_start)?,
            parse_time("schedule.window_end", &self.schedule.window_end)?,
            self.schedule.rollover_hour,
        )
        .context("Invalid [schedule] section")?;
        Ok(schedule)
    }

    pub fn api_key(&self) -> Result<&str> {
        required(
            self.account.api_key.as_deref(),
            "API key not configured: set account.api_key or OCTOPUS_API_KEY",
        )
    }

    pub fn account_number(&self) -> Result<&str> {
        required(
            self.account.account_number.as_deref(),
            "Account number not configured: set account.account_number or OCTOPUS_ACCOUNT_NUMBER",
        )
    }

    pub fn device_id(&self) -> Result<&str> {
        required(
            self.account.device_id.as_deref(),
            "Device id not configured: set account.device_id, OCTOPUS_DEVICE_ID or --device-id",
        )
    }
}

fn parse_time(field: &str, value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT)
        .with_context(|| format!("Invalid {field} '{value}', expected HH:MM"))
}

fn required<'a>(value: Option<&'a str>, message: &'static str) -> Result<&'a str> {
    value
        .filter(|value| !value.is_empty())
        .ok_or_else(|| anyhow::anyhow!(message))
}

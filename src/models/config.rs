//! Configuration model loaded from external sources.

use std::collections::HashSet;

use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use ::config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
/// Server configuration shared across handlers and background jobs.
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    /// Fixed number of HTTP worker threads.
    pub workers: usize,
    pub database_url: String,
    pub templates_dir: String,
    pub assets_dir: String,
    /// Mount point of the built single-page dashboard.
    pub dashboard_path: String,
    pub dashboard_dir: String,
    pub secret: String,
    pub admin_email: String,
    pub admin_password: String,
    pub default_lang: String,
    /// Fixed UTC offset such as `+07:00`.
    pub timezone: String,
    pub brand_name: String,
    #[serde(default)]
    pub stripe_secret_key: String,
    #[serde(default)]
    pub stripe_publishable_key: String,
    pub stripe_api_url: String,
    /// `smtp`, `resend` or empty to pick whichever transport is configured.
    #[serde(default)]
    pub email_provider: String,
    #[serde(default)]
    pub smtp_server: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub smtp_user: String,
    #[serde(default)]
    pub smtp_password: String,
    #[serde(default)]
    pub resend_api_key: String,
    pub resend_api_url: String,
    pub email_from: String,
    #[serde(default)]
    pub alert_to: String,
    pub group_catalog_path: String,
    pub properties_csv_path: String,
    /// Comma separated unit ids hidden from public listings.
    #[serde(default)]
    pub ignore_public_unit_ids: String,
    /// Seconds between background feed syncs; `0` disables the job.
    pub sync_interval_secs: u64,
    pub feed_timeout_secs: u64,
    #[serde(default)]
    pub cookie_secure: bool,
}

fn default_smtp_port() -> u16 {
    587
}

impl ServerConfig {
    /// Recipient of the admin test e-mail: the alert address, else the SMTP login.
    pub fn test_email_recipient(&self) -> Option<&str> {
        [self.alert_to.trim(), self.smtp_user.trim()]
            .into_iter()
            .find(|s| !s.is_empty())
    }

    /// Offset used for local "today" and timestamps. Falls back to UTC.
    pub fn utc_offset(&self) -> FixedOffset {
        self.timezone.trim().parse::<FixedOffset>().unwrap_or_else(|_| {
            log::warn!("Unrecognized timezone {:?}, using UTC", self.timezone);
            Utc.fix()
        })
    }

    /// Current calendar date in the configured timezone.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.utc_offset()).date_naive()
    }

    /// Unit ids to hide on public pages. Any malformed entry disables the list.
    pub fn ignored_public_units(&self) -> HashSet<i32> {
        self.ignore_public_unit_ids
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse::<i32>)
            .collect::<Result<HashSet<_>, _>>()
            .unwrap_or_default()
    }

    /// Payments run against the provider's sandbox.
    pub fn payments_test_mode(&self) -> bool {
        self.stripe_publishable_key.starts_with("pk_test_")
    }
}

/// Layer `config/default.yaml`, the optional `config/<APP_ENV>.yaml` profile
/// and `APP_*` environment variables.
pub fn load_server_config() -> Result<ServerConfig, ConfigError> {
    // Select config profile (defaults to `local`).
    let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "local".into());

    Config::builder()
        .add_source(File::with_name("config/default"))
        .add_source(File::with_name(&format!("config/{app_env}")).required(false))
        .add_source(Environment::with_prefix("APP"))
        .build()?
        .try_deserialize::<ServerConfig>()
}

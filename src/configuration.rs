use std::time::Duration;

use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

const DEFAULT_STORAGE_TIMEOUT_SECONDS: u64 = 30;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub webhooks: WebhookSettings,
    pub schedules: ScheduleSettings,
    #[serde(default)]
    pub storage: StorageSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    /// Public address of this deployment, used to build callback urls.
    pub base_url: String,
    pub name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub database_name: String,
    pub require_ssl: bool,
}

impl DatabaseSettings {
    pub fn without_db(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };
        PgConnectOptions::new()
            .host(&self.host)
            .username(&self.username)
            .password(&self.password)
            .port(self.port)
            .ssl_mode(ssl_mode)
    }

    pub fn with_db(&self) -> PgConnectOptions {
        self.without_db().database(&self.database_name)
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct WebhookSettings {
    /// Lead discovery endpoint. Searches stay `pending` while this is unset.
    pub lead_search_url: Option<String>,
    pub intel_url: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_seconds: u64,
}

impl WebhookSettings {
    pub fn lead_search_url(&self) -> Option<&str> {
        self.lead_search_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct ScheduleSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub poll_interval_seconds: u64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct StorageSettings {
    pub app_key: Option<String>,
    pub app_secret: Option<String>,
    pub refresh_token: Option<String>,
    #[serde(
        default = "default_storage_timeout_seconds",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub timeout_seconds: u64,
}

fn default_storage_timeout_seconds() -> u64 {
    DEFAULT_STORAGE_TIMEOUT_SECONDS
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            app_key: None,
            app_secret: None,
            refresh_token: None,
            timeout_seconds: DEFAULT_STORAGE_TIMEOUT_SECONDS,
        }
    }
}

impl StorageSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path =
        std::env::current_dir().map_err(|e| config::ConfigError::Foreign(Box::new(e)))?;
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(
            configuration_directory.join("base.yaml"),
        ))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

use std::path::PathBuf;
use std::time::Duration;

use crate::generation::groq::{DEFAULT_API_URL, DEFAULT_MODEL};
use crate::preview::bootstrap::{DEFAULT_MOUNT_DELAY, MAX_MOUNT_DELAY};

const DATA_DIR_NAME: &str = ".uiforge";

/// Server configuration loaded from environment variables.
pub struct Config {
    pub port: u16,
    pub sentry_dsn: Option<String>,
    pub environment: String,
    pub groq_api_key: Option<String>,
    pub generation_api_url: String,
    pub generation_model: String,
    pub data_dir: PathBuf,
    mount_delay_ms: u64,
}

/// Unparsed values, one per environment variable.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawValues<'a> {
    pub port: Option<&'a str>,
    pub sentry_dsn: Option<&'a str>,
    pub environment: Option<&'a str>,
    pub groq_api_key: Option<&'a str>,
    pub generation_api_url: Option<&'a str>,
    pub generation_model: Option<&'a str>,
    pub data_dir: Option<&'a str>,
    pub mount_delay_ms: Option<&'a str>,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT").ok();
        let sentry_dsn = std::env::var("SENTRY_DSN").ok();
        let environment = std::env::var("ENVIRONMENT").ok();
        let groq_api_key = std::env::var("GROQ_API_KEY").ok();
        let generation_api_url = std::env::var("GENERATION_API_URL").ok();
        let generation_model = std::env::var("GENERATION_MODEL").ok();
        let data_dir = std::env::var("UIFORGE_DATA_DIR").ok();
        let mount_delay_ms = std::env::var("MOUNT_DELAY_MS").ok();

        Self::from_raw_values(RawValues {
            port: port.as_deref(),
            sentry_dsn: sentry_dsn.as_deref(),
            environment: environment.as_deref(),
            groq_api_key: groq_api_key.as_deref(),
            generation_api_url: generation_api_url.as_deref(),
            generation_model: generation_model.as_deref(),
            data_dir: data_dir.as_deref(),
            mount_delay_ms: mount_delay_ms.as_deref(),
        })
    }

    /// Build a Config from raw string values (as they would come from env vars).
    /// Used directly in tests to avoid mutating process-global environment.
    pub fn from_raw_values(raw: RawValues<'_>) -> Self {
        let port = raw.port.and_then(|v| v.parse().ok()).unwrap_or(8081);

        let sentry_dsn = non_empty(raw.sentry_dsn);
        let groq_api_key = non_empty(raw.groq_api_key);

        let environment = non_empty(raw.environment).unwrap_or_else(|| "local".to_string());
        let generation_api_url =
            non_empty(raw.generation_api_url).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let generation_model =
            non_empty(raw.generation_model).unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let data_dir = non_empty(raw.data_dir)
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let mount_delay_ms = raw
            .mount_delay_ms
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_MOUNT_DELAY.as_millis() as u64);

        Config {
            port,
            sentry_dsn,
            environment,
            groq_api_key,
            generation_api_url,
            generation_model,
            data_dir,
            mount_delay_ms,
        }
    }

    /// Bootstrap mount delay, never longer than [`MAX_MOUNT_DELAY`].
    pub fn mount_delay(&self) -> Duration {
        Duration::from_millis(self.mount_delay_ms).min(MAX_MOUNT_DELAY)
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.is_empty()).map(String::from)
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR_NAME)
}

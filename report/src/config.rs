use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_RACE_API_URL: &str = "https://f1api.dev/api/";
pub const DEFAULT_PUBLISH_URL: &str = "https://filebin.net/s5al02jenmz68f5l/next_race_results.csv";

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("publisher.max_attempts must be at least 1")]
    NoAttempts,

    #[error("{0} must be greater than 0")]
    ZeroTimeout(&'static str),

    #[error("Unsupported URL scheme for {0}: {1}")]
    UnsupportedScheme(&'static str, String),
}

/// Report service configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Listener for the landing page and report endpoint
    #[serde(default)]
    pub listener: Listener,
    /// Listener for health and readiness probes
    #[serde(default = "Listener::admin_default")]
    pub admin_listener: Listener,
    #[serde(default)]
    pub race_api: RaceApiConfig,
    #[serde(default)]
    pub publisher: PublisherConfig,
    /// What to do when a roster driver has no championship standing
    #[serde(default)]
    pub missing_points: MissingPointsPolicy,
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.admin_listener.validate()?;
        self.race_api.validate()?;
        self.publisher.validate()?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listener: Listener::default(),
            admin_listener: Listener::admin_default(),
            race_api: RaceApiConfig::default(),
            publisher: PublisherConfig::default(),
            missing_points: MissingPointsPolicy::default(),
        }
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    pub host: String,
    pub port: u16,
}

impl Listener {
    pub fn admin_default() -> Self {
        Listener {
            host: "127.0.0.1".into(),
            port: 3001,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: "127.0.0.1".into(),
            port: 3000,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RaceApiConfig {
    /// Base of every race API selector, e.g. `https://f1api.dev/api/`
    #[serde(default = "default_race_api_url")]
    pub base_url: Url,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl RaceApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 {
            return Err(ValidationError::ZeroTimeout("race_api.timeout_secs"));
        }
        validate_scheme("race_api.base_url", &self.base_url)
    }
}

impl Default for RaceApiConfig {
    fn default() -> Self {
        RaceApiConfig {
            base_url: default_race_api_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct PublisherConfig {
    /// Destination the CSV is POSTed to
    #[serde(default = "default_publish_url")]
    pub url: Url,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay after the first failed attempt; doubles after each further failure
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl PublisherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.max_attempts == 0 {
            return Err(ValidationError::NoAttempts);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::ZeroTimeout("publisher.timeout_secs"));
        }
        validate_scheme("publisher.url", &self.url)
    }
}

impl Default for PublisherConfig {
    fn default() -> Self {
        PublisherConfig {
            url: default_publish_url(),
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MissingPointsPolicy {
    /// Abort the report
    #[default]
    Fail,
    /// Report the driver with 0 points
    Zero,
}

fn validate_scheme(field: &'static str, url: &Url) -> Result<(), ValidationError> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ValidationError::UnsupportedScheme(field, other.to_string())),
    }
}

fn default_race_api_url() -> Url {
    Url::parse(DEFAULT_RACE_API_URL).expect("default race API URL is valid")
}

fn default_publish_url() -> Url {
    Url::parse(DEFAULT_PUBLISH_URL).expect("default publish URL is valid")
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    1000
}

//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;

use chrono_tz::Tz;
use gcal::OauthConfig;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Public base URL of this service, embedded in tool webhook URLs.
    pub public_base_url: String,
    /// Google OAuth app credentials.
    pub oauth: OauthConfig,
    /// IANA time zone used for event times and day boundaries.
    pub event_time_zone: Tz,
    /// Retell API base URL.
    pub retell_api_base: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `BIND_ADDR` | Server bind address | `127.0.0.1:8790` |
    /// | `DATABASE_URL` | SQLite database URL | `sqlite:centralita.db?mode=rwc` |
    /// | `PUBLIC_BASE_URL` | Public base URL for webhook tool URLs | (required) |
    /// | `GOOGLE_CLIENT_ID` | Google OAuth client id | (required) |
    /// | `GOOGLE_CLIENT_SECRET` | Google OAuth client secret | (required) |
    /// | `GOOGLE_REDIRECT_URI` | OAuth callback URL | (required) |
    /// | `EVENT_TIME_ZONE` | IANA time zone for events | `America/Mexico_City` |
    /// | `RETELL_API_BASE` | Retell API base URL | production |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8790".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:centralita.db?mode=rwc".to_string());

        let public_base_url = env::var("PUBLIC_BASE_URL")
            .map_err(|_| ConfigError::MissingVar("PUBLIC_BASE_URL"))?
            .trim_end_matches('/')
            .to_string();

        let oauth = OauthConfig::from_env().map_err(|_| ConfigError::MissingGoogleCredentials)?;

        let event_time_zone = env::var("EVENT_TIME_ZONE")
            .unwrap_or_else(|_| "America/Mexico_City".to_string())
            .parse::<Tz>()
            .map_err(|_| ConfigError::InvalidTimeZone)?;

        let retell_api_base =
            env::var("RETELL_API_BASE").unwrap_or_else(|_| retell::DEFAULT_API_BASE.to_string());

        Ok(Self {
            addr,
            database_url,
            public_base_url,
            oauth,
            event_time_zone,
            retell_api_base,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid BIND_ADDR format")]
    InvalidAddr,

    #[error("EVENT_TIME_ZONE is not a known IANA time zone")]
    InvalidTimeZone,

    #[error("{0} environment variable is required")]
    MissingVar(&'static str),

    #[error("GOOGLE_CLIENT_ID, GOOGLE_CLIENT_SECRET and GOOGLE_REDIRECT_URI are required")]
    MissingGoogleCredentials,
}

//! Environment configuration

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::services::drill::DEFAULT_IDLE_TTL;
use crate::services::genai::GenAiConfig;

const DEFAULT_DATABASE_URL: &str = "sqlite://linguaflow.db?mode=rwc";

/// Server configuration read from the environment
#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub database_url: String,
    /// How long an untouched drill session is kept in memory
    pub session_idle_ttl: Duration,
    pub genai: GenAiConfig,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3000);

        let host = std::env::var("HOST")
            .ok()
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let database_url =
            env_string("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let session_idle_ttl = env_string("SESSION_IDLE_MINUTES")
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|minutes| *minutes > 0)
            .map(|minutes| Duration::from_secs(minutes * 60))
            .unwrap_or(DEFAULT_IDLE_TTL);

        Self {
            host,
            port,
            log_level,
            database_url,
            session_idle_ttl,
            genai: GenAiConfig::from_env(),
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Read a variable, treating blank values as unset.
pub(crate) fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::geo::EtaModel;
use crate::search::{PriceMatch, SearchSettings};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub stores_path: PathBuf,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub store_query_timeout_ms: u64,
    pub eta_speed_km_per_min: f64,
    pub eta_fixed_wait_minutes: u32,
    pub price_match: PriceMatch,
    pub rate_limit_per_minute: usize,
}

impl AppConfig {
    #[must_use]
    pub fn search_settings(&self) -> SearchSettings {
        SearchSettings {
            eta: EtaModel {
                speed_km_per_minute: self.eta_speed_km_per_min,
                fixed_wait_minutes: self.eta_fixed_wait_minutes,
            },
            price_match: self.price_match,
            store_query_timeout: Duration::from_millis(self.store_query_timeout_ms),
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("stores_path", &self.stores_path)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("store_query_timeout_ms", &self.store_query_timeout_ms)
            .field("eta_speed_km_per_min", &self.eta_speed_km_per_min)
            .field("eta_fixed_wait_minutes", &self.eta_fixed_wait_minutes)
            .field("price_match", &self.price_match)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .finish()
    }
}

use serde::Deserialize;

use crate::services::RecommendationSettings;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// PostgreSQL connection URL; without one the in-memory store is used
    #[serde(default)]
    pub database_url: Option<String>,

    /// Size of the PostgreSQL connection pool
    #[serde(default = "default_database_max_connections")]
    pub database_max_connections: u32,

    /// Redis connection URL; without one nothing is cached
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of recommendations returned when the caller passes no limit
    #[serde(default = "default_recommendation_limit")]
    pub recommendation_limit: usize,

    /// Seconds a cached recommendation or popularity list stays valid
    #[serde(default = "default_recommendation_cache_ttl")]
    pub recommendation_cache_ttl: u64,

    /// Users `1..=n` known to the in-memory directory
    #[serde(default)]
    pub seed_users: i64,

    /// Films `1..=n` known to the in-memory catalog
    #[serde(default)]
    pub seed_films: i64,
}

fn default_database_max_connections() -> u32 {
    5
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_recommendation_limit() -> usize {
    10
}

fn default_recommendation_cache_ttl() -> u64 {
    60
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn recommendation_settings(&self) -> RecommendationSettings {
        RecommendationSettings {
            default_limit: self.recommendation_limit,
            cache_ttl: self.recommendation_cache_ttl,
        }
    }
}

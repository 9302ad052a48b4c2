use crate::constants::*;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub ors_api_key: String,
    pub ors_base_url: Option<String>,
    pub directions_cache_ttl: u64,
    pub directions_cache_max_entries: u64,
    pub refinement: RefinementConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RefinementConfig {
    /// Hard ceiling on refinement rounds; exceeding it ends the session
    /// with a convergence timeout
    pub max_rounds: u32,

    /// Detours enclosing less than this fraction of the path are pruned
    pub tail_fraction_threshold: f64,
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_REFINEMENT_ROUNDS,
            tail_fraction_threshold: DEFAULT_TAIL_FRACTION_THRESHOLD,
        }
    }
}

impl RefinementConfig {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let config = Self {
            max_rounds: env::var("REFINE_MAX_ROUNDS")
                .unwrap_or_else(|_| defaults.max_rounds.to_string())
                .parse()
                .map_err(|_| "Invalid REFINE_MAX_ROUNDS")?,

            tail_fraction_threshold: env::var("REFINE_TAIL_FRACTION")
                .unwrap_or_else(|_| defaults.tail_fraction_threshold.to_string())
                .parse()
                .map_err(|_| "Invalid REFINE_TAIL_FRACTION")?,
        };

        if config.max_rounds == 0 {
            return Err("REFINE_MAX_ROUNDS must be at least 1".to_string());
        }
        if !(config.tail_fraction_threshold > 0.0 && config.tail_fraction_threshold <= 1.0) {
            return Err("REFINE_TAIL_FRACTION must be in (0, 1]".to_string());
        }

        Ok(config)
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenv::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| "Invalid PORT")?,
            ors_api_key: env::var("ORS_API_KEY").map_err(|_| "ORS_API_KEY must be set")?,
            ors_base_url: env::var("ORS_BASE_URL").ok(),
            directions_cache_ttl: env::var("DIRECTIONS_CACHE_TTL")
                .unwrap_or_else(|_| DEFAULT_DIRECTIONS_CACHE_TTL_SECONDS.to_string())
                .parse()
                .map_err(|_| "Invalid DIRECTIONS_CACHE_TTL")?,
            directions_cache_max_entries: env::var("DIRECTIONS_CACHE_MAX_ENTRIES")
                .unwrap_or_else(|_| DEFAULT_DIRECTIONS_CACHE_MAX_ENTRIES.to_string())
                .parse()
                .map_err(|_| "Invalid DIRECTIONS_CACHE_MAX_ENTRIES")?,
            refinement: RefinementConfig::from_env()?,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

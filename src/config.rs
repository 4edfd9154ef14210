use crate::domain::Decimal;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    /// Absolute price tolerance for plan-vs-execution verdicts.
    pub review_tolerance: Decimal,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let review_tolerance = match env_map.get("REVIEW_TOLERANCE") {
            Some(raw) => Decimal::from_str_canonical(raw).map_err(|_| {
                ConfigError::InvalidValue(
                    "REVIEW_TOLERANCE".to_string(),
                    "must be a decimal number".to_string(),
                )
            })?,
            None => Decimal::cent(),
        };
        if review_tolerance.is_negative() {
            return Err(ConfigError::InvalidValue(
                "REVIEW_TOLERANCE".to_string(),
                "must not be negative".to_string(),
            ));
        }

        Ok(Config {
            port,
            database_path,
            review_tolerance,
        })
    }
}

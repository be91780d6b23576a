//! Configuration module

use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL (history store)
    pub database_url: String,

    /// Server port
    pub port: u16,

    /// Fitted classifier artifact path
    pub model_path: String,

    /// Fitted scaler artifact path
    pub scaler_path: String,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://patients.db".to_string()),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),

            model_path: env::var("MODEL_PATH")
                .unwrap_or_else(|_| "models/classifier.json".to_string()),

            scaler_path: env::var("SCALER_PATH")
                .unwrap_or_else(|_| "models/scaler.json".to_string()),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

use crate::error::{CardflowError, Result};
use std::collections::HashMap;

/// Object storage connection settings
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Base endpoint of the bucket REST API
    pub endpoint: String,
    /// Bucket holding card assets
    pub bucket: String,
    /// Bearer token for uploads
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct CardflowConfig {
    pub database_url: String,
    pub storage: StorageConfig,
    /// Domain for emails derived from employee codes
    pub email_domain: String,
    /// Fixed raster scale for dispatched card faces
    pub render_scale: u32,
    pub custom_settings: HashMap<String, String>,
}

impl Default for CardflowConfig {
    fn default() -> Self {
        Self {
            database_url: "postgresql://localhost/cardflow_development".to_string(),
            storage: StorageConfig {
                endpoint: "http://localhost:54321/storage/v1".to_string(),
                bucket: "cards".to_string(),
                api_key: String::new(),
            },
            email_domain: "example.com".to_string(),
            render_scale: 3,
            custom_settings: HashMap::new(),
        }
    }
}

impl CardflowConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(db_url) = std::env::var("DATABASE_URL") {
            config.database_url = db_url;
        }

        if let Ok(endpoint) = std::env::var("CARDFLOW_STORAGE_ENDPOINT") {
            config.storage.endpoint = endpoint;
        }

        if let Ok(bucket) = std::env::var("CARDFLOW_STORAGE_BUCKET") {
            config.storage.bucket = bucket;
        }

        if let Ok(api_key) = std::env::var("CARDFLOW_STORAGE_API_KEY") {
            config.storage.api_key = api_key;
        }

        if let Ok(domain) = std::env::var("CARDFLOW_EMAIL_DOMAIN") {
            config.email_domain = domain;
        }

        if let Ok(scale) = std::env::var("CARDFLOW_RENDER_SCALE") {
            config.render_scale = scale.parse().map_err(|e| {
                CardflowError::ConfigurationError(format!("Invalid render_scale: {e}"))
            })?;
        }

        Ok(config)
    }

    /// Derive an email address for an employee code that arrived without one
    pub fn derived_email(&self, employee_code: &str) -> String {
        format!("{}@{}", employee_code.to_lowercase(), self.email_domain)
    }
}

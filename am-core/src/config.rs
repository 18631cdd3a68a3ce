//! Client configuration.
//!
//! Credentials and transport settings shared by the API clients. A
//! configuration is usually built directly from credentials; [`ApiConfig::load_from_file`]
//! and [`ApiConfig::from_env`] cover TOML files and environment variables.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AmError, AmResult};

/// Environment variable holding the numeric application id.
pub const ENV_APP_ID: &str = "APPMETRICA_APP_ID";

/// Environment variable holding the OAuth access token.
pub const ENV_ACCESS_TOKEN: &str = "APPMETRICA_ACCESS_TOKEN";

/// Client configuration for the AppMetrica APIs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Numeric application id from the AppMetrica console.
    pub app_id: i64,

    /// OAuth access token sent in the `Authorization` header.
    pub access_token: String,

    /// Per-request timeout in seconds. When absent, each client applies
    /// its own default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Custom HTTP headers attached to every request. A header set here
    /// overrides the built-in default of the same name.
    #[serde(default)]
    pub custom_headers: HashMap<String, String>,
}

impl ApiConfig {
    /// Create a configuration from credentials.
    pub fn new(app_id: i64, access_token: impl Into<String>) -> Self {
        Self {
            app_id,
            access_token: access_token.into(),
            timeout_secs: None,
            custom_headers: HashMap::new(),
        }
    }

    /// Build a configuration from the `APPMETRICA_APP_ID` and
    /// `APPMETRICA_ACCESS_TOKEN` environment variables.
    pub fn from_env() -> AmResult<Self> {
        let app_id = std::env::var(ENV_APP_ID)
            .map_err(|_| AmError::Config(format!("{ENV_APP_ID} is not set")))?;
        let app_id: i64 = app_id
            .parse()
            .map_err(|_| AmError::Config(format!("{ENV_APP_ID} is not a number: {app_id}")))?;
        let access_token = std::env::var(ENV_ACCESS_TOKEN)
            .map_err(|_| AmError::Config(format!("{ENV_ACCESS_TOKEN} is not set")))?;
        Ok(Self::new(app_id, access_token))
    }

    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> AmResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AmError::Config(format!("failed to read {}: {e}", path.display())))?;
        let config: ApiConfig = toml::from_str(&contents)?;
        Ok(config)
    }
}

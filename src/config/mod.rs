//! Configuration loading and management
//!
//! Configuration is YAML. Every section has defaults, so an empty document
//! (or no file at all) yields a runnable development setup.
//!
//! ```yaml
//! server:
//!   bind: "127.0.0.1:8081"
//! pagination:
//!   default_limit: 10
//!   max_limit: 100
//!   consistent_snapshot: true
//! session:
//!   cookie_name: blogful_session
//!   ttl_secs: 86400
//!   secure_cookie: false
//! users:
//!   - name: Alice
//!     email: alice@example.com
//!     password: test
//! ```

use crate::core::error::ConfigError;
use crate::core::query::{DEFAULT_LIMIT, MAX_LIMIT, Paginator};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Environment variable naming the YAML config file
pub const CONFIG_PATH_ENV: &str = "BLOGFUL_CONFIG";

/// Environment variable overriding `server.bind`
pub const BIND_ENV: &str = "BLOGFUL_BIND";

/// Longest accepted session lifetime: ten years
pub const MAX_SESSION_TTL_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8081".to_string(),
        }
    }
}

/// Listing page-size bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationSettings {
    pub default_limit: usize,
    pub max_limit: usize,

    /// Read count and page under one repository snapshot
    pub consistent_snapshot: bool,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
            consistent_snapshot: true,
        }
    }
}

impl PaginationSettings {
    pub fn paginator(&self) -> Paginator {
        Paginator::new(self.default_limit, self.max_limit)
    }
}

/// Session cookie settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub cookie_name: String,
    pub ttl_secs: i64,

    /// Add the `Secure` attribute to cookies (HTTPS deployments)
    pub secure_cookie: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            cookie_name: "blogful_session".to_string(),
            ttl_secs: 24 * 60 * 60,
            secure_cookie: false,
        }
    }
}

impl SessionSettings {
    /// Session lifetime, bounded to what [`BlogConfig::validate`] accepts
    pub fn ttl(&self) -> Duration {
        Duration::seconds(self.ttl_secs.clamp(0, MAX_SESSION_TTL_SECS))
    }
}

/// A user registered at startup
///
/// Give either a plaintext `password` (hashed on load) or a ready
/// `password_hash` in PHC format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
}

/// Complete service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogConfig {
    pub server: ServerSettings,
    pub pagination: PaginationSettings,
    pub session: SessionSettings,
    pub users: Vec<SeedUser>,
}

impl BlogConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `BLOGFUL_CONFIG` if set, otherwise defaults, then apply
    /// `BLOGFUL_BIND`
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_yaml_file(path)?,
            Err(_) => Self::default(),
        };
        if let Ok(bind) = std::env::var(BIND_ENV) {
            config.server.bind = bind;
        }
        Ok(config)
    }

    /// Check bounds and uniqueness constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pagination = &self.pagination;
        if !(1..=MAX_LIMIT).contains(&pagination.max_limit) {
            return Err(ConfigError::Invalid {
                field: "pagination.max_limit".to_string(),
                message: format!("must be between 1 and {}", MAX_LIMIT),
            });
        }
        if !(1..=pagination.max_limit).contains(&pagination.default_limit) {
            return Err(ConfigError::Invalid {
                field: "pagination.default_limit".to_string(),
                message: format!("must be between 1 and {}", pagination.max_limit),
            });
        }
        if !(1..=MAX_SESSION_TTL_SECS).contains(&self.session.ttl_secs) {
            return Err(ConfigError::Invalid {
                field: "session.ttl_secs".to_string(),
                message: format!("must be between 1 and {}", MAX_SESSION_TTL_SECS),
            });
        }
        if self.session.cookie_name.is_empty() {
            return Err(ConfigError::Invalid {
                field: "session.cookie_name".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for user in &self.users {
            if !seen.insert(user.email.as_str()) {
                return Err(ConfigError::Invalid {
                    field: "users".to_string(),
                    message: format!("duplicate email '{}'", user.email),
                });
            }
        }
        Ok(())
    }
}

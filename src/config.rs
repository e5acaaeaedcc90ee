//! Configuration Management
//!
//! Resolves which account, acting user and remote function the connector
//! talks to. Precedence: CLI flag > environment > config file > default.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

pub const DEFAULT_ACCOUNT: &str = "lifeomiclife";
pub const DEFAULT_USER: &str = "app-store-tf";
pub const DEFAULT_FUNCTION: &str = "app-store-service";
pub const DEFAULT_QUALIFIER: &str = "deployed";
pub const DEFAULT_PRODUCT: &str = "LX";

/// How requests reach the app-store service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Invoke the service's Lambda function
    #[default]
    Lambda,
    /// POST to a GraphQL endpoint
    Http,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Connector configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Account sent in `LifeOmic-Account`
    pub account: String,
    /// Acting user sent in `LifeOmic-User`
    pub user: String,
    /// Remote function name (or ARN)
    pub function_name: String,
    /// Function alias or version
    pub function_qualifier: Option<String>,
    /// Product discriminator attached to new listings
    pub product: String,
    /// AWS shared-config profile
    pub profile: Option<String>,
    /// AWS region
    pub region: Option<String>,
    pub transport: TransportKind,
    /// GraphQL endpoint, required by the http transport
    pub graphql_endpoint: Option<Url>,
    /// Lambda API endpoint override (local emulators, VPC endpoints)
    pub lambda_endpoint: Option<Url>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            account: DEFAULT_ACCOUNT.to_string(),
            user: DEFAULT_USER.to_string(),
            function_name: DEFAULT_FUNCTION.to_string(),
            function_qualifier: Some(DEFAULT_QUALIFIER.to_string()),
            product: DEFAULT_PRODUCT.to_string(),
            profile: None,
            region: None,
            transport: TransportKind::Lambda,
            graphql_endpoint: None,
            lambda_endpoint: None,
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("appstore-provider").join("config.json"))
    }

    /// Load configuration from the default location, then apply the environment.
    /// A missing or broken default file yields defaults.
    pub fn load() -> Self {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path).unwrap_or_else(|e| {
                tracing::warn!("Ignoring {}", e);
                Self::default()
            }),
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `APPSTORE_*` overrides from the given variable lookup
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(account) = var("APPSTORE_ACCOUNT") {
            self.account = account;
        }
        if let Some(user) = var("APPSTORE_USER") {
            self.user = user;
        }
        if let Some(function) = var("APPSTORE_FUNCTION") {
            self.function_name = function;
        }
        if let Some(qualifier) = var("APPSTORE_QUALIFIER") {
            self.function_qualifier = Some(qualifier);
        }
        if let Some(product) = var("APPSTORE_PRODUCT") {
            self.product = product;
        }
        if let Some(profile) = var("APPSTORE_PROFILE") {
            self.profile = Some(profile);
        }
        let url_var = |key: &str| -> Option<Url> {
            match Url::parse(&var(key)?) {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::warn!("Ignoring invalid {}: {}", key, e);
                    None
                }
            }
        };
        if let Some(url) = url_var("APPSTORE_GRAPHQL_ENDPOINT") {
            self.graphql_endpoint = Some(url);
        }
        if let Some(url) = url_var("APPSTORE_LAMBDA_ENDPOINT") {
            self.lambda_endpoint = Some(url);
        }
    }
}

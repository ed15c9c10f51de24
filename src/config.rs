//! Configuration System
//!
//! Layered configuration for the query service: built-in defaults, the
//! global XDG file, workspace files, `PLAYLOG__*` environment variables and
//! finally an explicit file named on the command line.

use crate::access::{Grant, Identity, TokenAuthenticator};
use crate::error::ApiError;
use crate::logging::LoggingConfig;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

mod merge {
    pub mod merge_policy;
}

mod sources {
    pub mod global_file;
    pub mod workspace_file;
}

pub use sources::global_file::global_config_path;

/// Game served when none is configured.
pub const DEFAULT_GAME: &str = "default";

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaylogConfig {
    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which game this service instance answers for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_game")]
    pub game: String,
}

fn default_game() -> String {
    DEFAULT_GAME.to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            game: default_game(),
        }
    }
}

/// Record store location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
}

/// `$XDG_DATA_HOME/playlog/store`, or `.playlog/store` when no home
/// directory can be determined.
fn default_store_path() -> PathBuf {
    directories::ProjectDirs::from("", "", "playlog")
        .map(|dirs| dirs.data_dir().join("store"))
        .unwrap_or_else(|| PathBuf::from(".playlog").join("store"))
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
        }
    }
}

/// Access tokens accepted by this instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub tokens: Vec<TokenConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenConfig {
    pub token: String,
    pub user_id: String,
    #[serde(default)]
    pub grants: Vec<Grant>,
}

impl AuthConfig {
    /// Build the authenticator for the configured tokens.
    pub fn authenticator(&self) -> TokenAuthenticator {
        let mut authenticator = TokenAuthenticator::new();
        for entry in &self.tokens {
            authenticator.insert(
                entry.token.clone(),
                Identity::new(entry.user_id.clone(), entry.grants.clone()),
            );
        }
        authenticator
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Service(String),
    Storage(String),
    Token(String, String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Service(msg) => write!(f, "Service: {}", msg),
            ValidationError::Storage(msg) => write!(f, "Storage: {}", msg),
            ValidationError::Token(user, msg) => write!(f, "Token for '{}': {}", user, msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl PlaylogConfig {
    /// Validate the entire configuration, collecting every problem.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.service.game.trim().is_empty() {
            errors.push(ValidationError::Service("game cannot be empty".to_string()));
        }

        if self.storage.store_path.as_os_str().is_empty() {
            errors.push(ValidationError::Storage(
                "store path cannot be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for entry in &self.auth.tokens {
            if entry.token.trim().is_empty() {
                errors.push(ValidationError::Token(
                    entry.user_id.clone(),
                    "token cannot be empty".to_string(),
                ));
            } else if !seen.insert(entry.token.as_str()) {
                errors.push(ValidationError::Token(
                    entry.user_id.clone(),
                    "token is configured more than once".to_string(),
                ));
            }
            if entry.user_id.trim().is_empty() {
                errors.push(ValidationError::Token(
                    entry.user_id.clone(),
                    "user_id cannot be empty".to_string(),
                ));
            }
            for grant in &entry.grants {
                if grant.game.trim().is_empty() {
                    errors.push(ValidationError::Token(
                        entry.user_id.clone(),
                        "grant has an empty game".to_string(),
                    ));
                }
            }
        }

        if let Err(e) = crate::logging::validate(&self.logging) {
            errors.push(ValidationError::Logging(e.to_string()));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and fold all problems into one `ConfigError`.
    pub fn validated(self) -> Result<Self, ApiError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;
        Ok(self)
    }
}

/// Loads [`PlaylogConfig`] from its layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace, without an explicit file.
    pub fn load(workspace_root: &Path) -> Result<PlaylogConfig, ApiError> {
        Self::load_with_override(workspace_root, None)
    }

    /// Load configuration for a workspace. `explicit`, when given, must exist
    /// and takes precedence over every other source.
    pub fn load_with_override(
        workspace_root: &Path,
        explicit: Option<&Path>,
    ) -> Result<PlaylogConfig, ApiError> {
        let builder = merge::merge_policy::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = sources::workspace_file::add_to_builder(builder, workspace_root)?;
        let mut builder = builder.add_source(
            Environment::with_prefix("PLAYLOG")
                .prefix_separator("__")
                .separator("__"),
        );
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ApiError::ConfigError(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(File::from(path).required(true));
        }

        let config: PlaylogConfig = builder.build()?.try_deserialize()?;
        debug!(
            game = %config.service.game,
            store = %config.storage.store_path.display(),
            tokens = config.auth.tokens.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Load configuration from a single file on top of the defaults.
    pub fn load_from_file(path: &Path) -> Result<PlaylogConfig, ApiError> {
        let config = Config::builder()
            .add_source(File::from(path).required(true))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}

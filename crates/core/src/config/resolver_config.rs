use std::collections::HashMap;
use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, ConfigSource, ConfigValidator, RangeValidator};

/// Environment variable overriding [`ResolverConfig::max_depth`]
pub const MAX_DEPTH_ENV: &str = "INJECTOR_MAX_DEPTH";
/// Environment variable overriding [`ResolverConfig::validate_on_build`]
pub const VALIDATE_ON_BUILD_ENV: &str = "INJECTOR_VALIDATE_ON_BUILD";

pub const DEFAULT_MAX_DEPTH: usize = 64;
const MAX_DEPTH_LIMIT: usize = 4096;

const MAX_DEPTH_FIELD: &str = "max_depth";
const VALIDATE_ON_BUILD_FIELD: &str = "validate_on_build";

/// Configuration loading shared by resolver settings
pub trait ConfigLoader: Sized {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self, ConfigError>;

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError>;

    /// Get configuration source information for debugging
    fn config_sources(&self) -> HashMap<String, ConfigSource>;
}

/// Resolver settings
///
/// Equality compares the settings only, not where they came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Deepest constructor nesting a single resolve may reach
    pub max_depth: usize,
    /// Log unresolvable constructor parameters when the resolver is built
    pub validate_on_build: bool,
    #[serde(skip)]
    sources: HashMap<String, ConfigSource>,
}

/// Fields present in a settings document
#[derive(Debug, Default, Deserialize)]
struct SettingsOverlay {
    max_depth: Option<usize>,
    validate_on_build: Option<bool>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            validate_on_build: false,
            sources: HashMap::new(),
        }
    }
}

impl PartialEq for ResolverConfig {
    fn eq(&self, other: &Self) -> bool {
        self.max_depth == other.max_depth && self.validate_on_build == other.validate_on_build
    }
}

impl Eq for ResolverConfig {}

impl ResolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self.record(MAX_DEPTH_FIELD, ConfigSource::Programmatic);
        self
    }

    pub fn with_validate_on_build(mut self, validate_on_build: bool) -> Self {
        self.validate_on_build = validate_on_build;
        self.record(VALIDATE_ON_BUILD_FIELD, ConfigSource::Programmatic);
        self
    }

    /// Parse and validate YAML settings
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Self::from_overlay(serde_yaml::from_str(yaml)?, ConfigSource::Programmatic)
    }

    /// Parse and validate JSON settings
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Self::from_overlay(serde_json::from_str(json)?, ConfigSource::Programmatic)
    }

    /// Load settings from a `.yaml`, `.yml` or `.json` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let overlay = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&contents)?,
            Some("json") => serde_json::from_str(&contents)?,
            _ => {
                return Err(ConfigError::UnsupportedFormat {
                    path: path.display().to_string(),
                })
            }
        };
        let config = Self::from_overlay(overlay, ConfigSource::File(path.to_path_buf()))?;
        tracing::debug!(path = %path.display(), "Loaded resolver configuration");
        Ok(config)
    }

    fn from_overlay(overlay: SettingsOverlay, source: ConfigSource) -> Result<Self, ConfigError> {
        let mut config = Self::new();
        if let Some(max_depth) = overlay.max_depth {
            config.max_depth = max_depth;
            config.record(MAX_DEPTH_FIELD, source.clone());
        }
        if let Some(validate_on_build) = overlay.validate_on_build {
            config.validate_on_build = validate_on_build;
            config.record(VALIDATE_ON_BUILD_FIELD, source);
        }
        config.validate()?;
        Ok(config)
    }

    fn record(&mut self, field: &str, source: ConfigSource) {
        self.sources.insert(field.to_string(), source);
    }
}

impl ConfigLoader for ResolverConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new();

        if let Ok(depth) = env::var(MAX_DEPTH_ENV) {
            config.max_depth = depth.parse().map_err(|_| {
                ConfigError::invalid_value(MAX_DEPTH_FIELD, depth.as_str(), "positive integer")
            })?;
            config.record(MAX_DEPTH_FIELD, ConfigSource::EnvVar(MAX_DEPTH_ENV.to_string()));
        }

        if let Ok(flag) = env::var(VALIDATE_ON_BUILD_ENV) {
            config.validate_on_build = match flag.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::invalid_value(
                        VALIDATE_ON_BUILD_FIELD,
                        flag,
                        "true or false",
                    ))
                }
            };
            config.record(
                VALIDATE_ON_BUILD_FIELD,
                ConfigSource::EnvVar(VALIDATE_ON_BUILD_ENV.to_string()),
            );
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        RangeValidator {
            field: MAX_DEPTH_FIELD,
            min: 1,
            max: MAX_DEPTH_LIMIT,
        }
        .validate(&self.max_depth)
    }

    fn config_sources(&self) -> HashMap<String, ConfigSource> {
        let mut sources = self.sources.clone();
        sources
            .entry(MAX_DEPTH_FIELD.to_string())
            .or_insert_with(|| ConfigSource::Default(DEFAULT_MAX_DEPTH.to_string()));
        sources
            .entry(VALIDATE_ON_BUILD_FIELD.to_string())
            .or_insert_with(|| ConfigSource::Default("false".to_string()));
        sources
    }
}

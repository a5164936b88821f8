use std::fmt;
use std::path::PathBuf;

/// Where a resolver setting was last set from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Built-in default, rendered as the value
    Default(String),
    /// Named environment variable
    EnvVar(String),
    /// YAML or JSON settings file
    File(PathBuf),
    /// Builder method or in-memory settings string
    Programmatic,
}

impl ConfigSource {
    pub fn is_default(&self) -> bool {
        matches!(self, ConfigSource::Default(_))
    }

    pub fn is_env_var(&self) -> bool {
        matches!(self, ConfigSource::EnvVar(_))
    }

    pub fn is_file(&self) -> bool {
        matches!(self, ConfigSource::File(_))
    }

    pub fn is_programmatic(&self) -> bool {
        matches!(self, ConfigSource::Programmatic)
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Default(value) => write!(f, "default ({})", value),
            ConfigSource::EnvVar(variable) => write!(f, "environment variable {}", variable),
            ConfigSource::File(path) => write!(f, "file {}", path.display()),
            ConfigSource::Programmatic => f.write_str("set in code"),
        }
    }
}

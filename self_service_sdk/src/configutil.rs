//! Layered configuration: defaults, then environment variables or a file.
//!
//! The result is a plain [`config::Config`], so values are read with
//! `get_string`, `get_int` and friends, or deserialized with `try_deserialize`.

use config::{Config as ConfigLib, ConfigBuilder, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Errors raised while assembling a configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// A default value has an empty key
    #[error("empty config key provided in default values")]
    EmptyDefaultKey,

    /// An environment binding has an empty variable name
    #[error("empty environment variable provided")]
    EmptyEnvVariable,

    /// Empty configuration file name
    #[error("file name must be provided")]
    FileNameNotProvided,

    /// Empty configuration file type
    #[error("file type must be provided")]
    FileTypeNotProvided,

    /// File type other than JSON, TOML or YAML
    #[error("unsupported configuration file type: {0}")]
    UnsupportedFileType(String),

    /// The file could not be read or parsed
    #[error(transparent)]
    Load(#[from] config::ConfigError),
}

/// A value used when nothing else sets the key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultValue {
    /// Configuration key. Dots address nested tables.
    pub config_key: String,
    /// Default value
    pub config_value: String,
}

impl DefaultValue {
    /// Creates a new default value.
    pub fn new(config_key: impl Into<String>, config_value: impl Into<String>) -> Self {
        Self {
            config_key: config_key.into(),
            config_value: config_value.into(),
        }
    }
}

/// Binds an environment variable to a configuration key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVariable {
    /// Name of the environment variable
    pub env_var: String,
    /// Key the value is stored under. When empty the lower-cased variable name
    /// is used.
    pub config_key: String,
}

impl EnvVariable {
    /// Creates a new binding.
    pub fn new(env_var: impl Into<String>, config_key: impl Into<String>) -> Self {
        Self {
            env_var: env_var.into(),
            config_key: config_key.into(),
        }
    }

    fn key(&self) -> String {
        if self.config_key.is_empty() {
            self.env_var.to_lowercase()
        } else {
            self.config_key.clone()
        }
    }
}

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigType {
    /// JSON
    Json,
    /// TOML
    Toml,
    /// YAML
    Yaml,
}

impl FromStr for ConfigType {
    type Err = ConfigError;

    fn from_str(config_type: &str) -> Result<Self, Self::Err> {
        match config_type.to_uppercase().as_str() {
            "" => Err(ConfigError::FileTypeNotProvided),
            "JSON" => Ok(ConfigType::Json),
            "TOML" => Ok(ConfigType::Toml),
            "YAML" | "YML" => Ok(ConfigType::Yaml),
            _ => Err(ConfigError::UnsupportedFileType(config_type.to_string())),
        }
    }
}

impl fmt::Display for ConfigType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConfigType::Json => "JSON",
            ConfigType::Toml => "TOML",
            ConfigType::Yaml => "YAML",
        })
    }
}

impl From<ConfigType> for FileFormat {
    fn from(config_type: ConfigType) -> Self {
        match config_type {
            ConfigType::Json => FileFormat::Json,
            ConfigType::Toml => FileFormat::Toml,
            ConfigType::Yaml => FileFormat::Yaml,
        }
    }
}

/// Location and format of a configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    name: String,
    path: PathBuf,
    config_type: ConfigType,
}

impl ConfigFile {
    /// Describes a configuration file.
    ///
    /// `name` may omit the extension. `config_type` is matched ignoring case.
    ///
    /// ```
    /// use self_service_sdk::configutil::{ConfigFile, ConfigType};
    ///
    /// let file = ConfigFile::new("service", "yaml", "/etc/service").unwrap();
    /// assert_eq!(file.config_type(), ConfigType::Yaml);
    /// assert!(ConfigFile::new("service", "ini", "/etc/service").is_err());
    /// ```
    pub fn new(
        name: impl Into<String>,
        config_type: &str,
        path: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ConfigError::FileNameNotProvided);
        }

        Ok(Self {
            name,
            path: path.into(),
            config_type: config_type.parse()?,
        })
    }

    /// File name, possibly without extension.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory holding the file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// File format.
    pub fn config_type(&self) -> ConfigType {
        self.config_type
    }
}

/// A configuration holding only the defaults.
pub fn new_config(defaults: &[DefaultValue]) -> Result<ConfigLib, ConfigError> {
    Ok(load_defaults(defaults)?.build()?)
}

/// A configuration holding the defaults, overridden by every bound
/// environment variable that is set.
pub fn new_config_from_env(
    defaults: &[DefaultValue],
    env_vars: &[EnvVariable],
) -> Result<ConfigLib, ConfigError> {
    let mut config = load_defaults(defaults)?;

    for binding in env_vars {
        if binding.env_var.is_empty() {
            return Err(ConfigError::EmptyEnvVariable);
        }
        if let Ok(value) = std::env::var(&binding.env_var) {
            config = config.set_override(binding.key(), value)?;
        }
    }

    Ok(config.build()?)
}

/// A configuration holding the defaults, overridden by the file's contents.
/// The file must exist.
pub fn new_config_from_file(
    defaults: &[DefaultValue],
    config_file: &ConfigFile,
) -> Result<ConfigLib, ConfigError> {
    let path = config_file.path.join(&config_file.name);
    let file_name = path.to_string_lossy();

    Ok(load_defaults(defaults)?
        .add_source(File::new(&file_name, FileFormat::from(config_file.config_type)))
        .build()?)
}

fn load_defaults(
    defaults: &[DefaultValue],
) -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError> {
    let mut config = ConfigLib::builder();
    for default in defaults {
        if default.config_key.is_empty() {
            return Err(ConfigError::EmptyDefaultKey);
        }
        config = config.set_default(default.config_key.as_str(), default.config_value.as_str())?;
    }
    Ok(config)
}

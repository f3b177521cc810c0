//! Configuration error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unable to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Unable to render config as TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("No home directory available to place bomflow's config")]
    NoHomeDir,

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

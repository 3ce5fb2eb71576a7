//! Runtime configuration for the binary.
//!
//! An optional JSON file names where the data file lives. Its path
//! comes from the `EQCHECK_CONFIG` environment variable, falling back
//! to `eqcheck.json` in the working directory; a missing file just
//! means defaults.

use log::debug;
use serde::Deserialize;
use std::{
    env,
    error::Error,
    fmt::{self, Display, Formatter},
    fs, io,
    path::PathBuf,
};

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "EQCHECK_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "eqcheck.json";
const DEFAULT_DATA_FILE: &str = "equations.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the equation store keeps its records.
    pub data_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
        }
    }
}

impl Config {
    /// Load the configuration the binary should run with.
    pub fn load() -> Result<Config, ConfigError> {
        let path = env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        Config::from_file(path)
    }

    fn from_file(path: PathBuf) -> Result<Config, ConfigError> {
        match fs::read_to_string(&path) {
            Ok(contents) => {
                let config = serde_json::from_str(&contents)?;
                debug!("loaded configuration {:?} from {:?}", config, path);
                Ok(config)
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no config file at {:?}, using defaults", path);
                Ok(Config::default())
            },
            Err(e) => Err(ConfigError::Io(e)),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Format(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(inner) => {
                write!(f, "unable to read the config file: {}", inner)
            },
            ConfigError::Format(inner) => {
                write!(f, "the config file is not valid: {}", inner)
            },
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Io(inner) => Some(inner),
            ConfigError::Format(inner) => Some(inner),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self { ConfigError::Format(e) }
}

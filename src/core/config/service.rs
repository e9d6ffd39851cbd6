use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::settings::{AppConfig, Credentials, Settings};
use super::validation::validate_settings;
use crate::core::errors::ConfigError;

pub const ENV_GROQ_API_KEY: &str = "GROQ_API_KEY";
pub const ENV_ASTRA_DB_TOKEN: &str = "ASTRA_DB_APPLICATION_TOKEN";
pub const ENV_ASTRA_DB_KEYSPACE: &str = "ASTRA_DB_KEYSPACE";
pub const ENV_ASTRA_DB_ENDPOINT: &str = "ASTRA_DB_API_ENDPOINT";
pub const ENV_HF_TOKEN: &str = "HF_TOKEN";
pub const ENV_HF_TOKEN_LEGACY: &str = "HUGGINGFACEHUB_API_TOKEN";

const ENV_CONFIG_PATH: &str = "REVIEW_RAG_CONFIG_PATH";
const ENV_HOST: &str = "HOST";
const ENV_PORT: &str = "PORT";
const DEFAULT_CONFIG_FILE: &str = "config.yml";

/// Resolves [`AppConfig`] from `.env`, the process environment and the YAML settings file.
pub struct ConfigService;

impl ConfigService {
    /// Loads configuration for the running process.
    ///
    /// Reads `.env` when present, then the settings file named by
    /// `REVIEW_RAG_CONFIG_PATH` (default `config.yml`; a missing default file is fine).
    pub fn load() -> Result<AppConfig, ConfigError> {
        dotenvy::dotenv().ok();

        let explicit_path = env::var(ENV_CONFIG_PATH).ok().map(PathBuf::from);
        let settings = match &explicit_path {
            Some(path) => load_settings_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    load_settings_file(default_path)?
                } else {
                    Settings::default()
                }
            }
        };

        Self::resolve(settings, |key| env::var(key).ok())
    }

    /// Applies environment overrides and credentials to `settings`, then validates.
    pub fn resolve<F>(mut settings: Settings, lookup: F) -> Result<AppConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = Credentials {
            groq_api_key: required(&lookup, ENV_GROQ_API_KEY)?,
            astra_db_token: required(&lookup, ENV_ASTRA_DB_TOKEN)?,
            astra_db_keyspace: required(&lookup, ENV_ASTRA_DB_KEYSPACE)?,
            astra_db_endpoint: required(&lookup, ENV_ASTRA_DB_ENDPOINT)?,
            hf_token: required(&lookup, ENV_HF_TOKEN)
                .or_else(|_| required(&lookup, ENV_HF_TOKEN_LEGACY))
                .map_err(|_| ConfigError::MissingEnv(ENV_HF_TOKEN))?,
        };

        if let Some(host) = non_blank(&lookup, ENV_HOST) {
            settings.server.host = host;
        }
        if let Some(port) = non_blank(&lookup, ENV_PORT) {
            settings.server.port = port.parse::<u16>().map_err(|e| ConfigError::Invalid {
                key: "PORT",
                reason: e.to_string(),
            })?;
        }

        validate_settings(&settings)?;

        Ok(AppConfig {
            credentials,
            settings,
        })
    }
}

pub fn load_settings_file(path: &Path) -> Result<Settings, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if contents.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_yaml::from_str::<Settings>(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    non_blank(lookup, key).ok_or(ConfigError::MissingEnv(key))
}

fn non_blank<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

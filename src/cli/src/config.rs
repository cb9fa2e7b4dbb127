use crate::constants::{DEFAULT_CONFIG_FILE, DEFAULT_LOG_LEVEL, ENV_PREFIX};
use anyhow::{Context, Result};
use config::{Config as RConfig, Environment, File, FileFormat, Map};
use pstree_extracts::stabilize::{DEFAULT_RETRIES, DEFAULT_RETRY_DELAY_MS};
use pstree_extracts::{RetryPolicy, RowFilter};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    pub retries: u32,
    pub retry_delay_ms: u64,
    pub log_level: String,
    #[serde(default)]
    pub log_file: Option<String>,
    pub exclude: Vec<RowFilter>,

    pub config_sources: Vec<String>,
}

impl Config {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.retries,
            delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Layers defaults, `pstree.toml` in the working directory (or the file
    /// passed with `--config`, which must exist) and `PSTREE_*` variables.
    pub fn load_config(path: Option<&str>) -> Result<Config> {
        Self::load_config_from(path, Path::new(DEFAULT_CONFIG_FILE), None)
    }

    /// `default_file` is only read when no `path` is given. `env` replaces the
    /// process environment when set.
    pub fn load_config_from(
        path: Option<&str>,
        default_file: &Path,
        env: Option<Map<String, String>>,
    ) -> Result<Config> {
        let mut builder = RConfig::builder()
            .set_default("retries", DEFAULT_RETRIES as u64)?
            .set_default("retry_delay_ms", DEFAULT_RETRY_DELAY_MS)?
            .set_default("log_level", DEFAULT_LOG_LEVEL)?
            .set_default::<&str, Vec<&str>>("exclude", vec![])?;

        let mut sources = Vec::new();
        match path {
            Some(path) => {
                builder = builder.add_source(File::new(path, FileFormat::Toml).required(true));
                sources.push(path.to_string());
            }
            None if default_file.exists() => {
                let default_file = default_file.to_string_lossy().to_string();
                builder = builder.add_source(File::new(&default_file, FileFormat::Toml));
                sources.push(default_file);
            }
            None => {}
        }

        builder = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(env),
            )
            .set_override("config_sources", sources)?;

        let config: Config = builder
            .build()?
            .try_deserialize()
            .context("failed to parse config file")?;

        tracing::debug!("Loaded config from {:?}", config.config_sources);
        Ok(config)
    }
}

use super::app_dir;
use ::config::{Config, Environment, File};
use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Tunables layered from defaults, `settings.toml` and `SCHEMATA_*`
/// environment variables, later sources winning.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    /// Schema namespace the catalog reads tables from
    pub namespace: String,
    pub log_level: String,
    pub log_file: PathBuf,
    /// Zero disables the limit
    pub query_timeout_secs: u64,
}

impl Settings {
    pub fn load() -> Result<Settings> {
        Self::load_from(&app_dir().join("settings.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Settings> {
        let default_log = app_dir().join("schemata.log");
        let settings = Config::builder()
            .set_default("namespace", "public")?
            .set_default("log_level", "info")?
            .set_default("log_file", default_log.to_string_lossy().to_string())?
            .set_default("query_timeout_secs", 30)?
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("SCHEMATA").try_parsing(true))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        (self.query_timeout_secs > 0).then(|| Duration::from_secs(self.query_timeout_secs))
    }
}

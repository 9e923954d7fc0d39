use crate::error::{Error, Result};
use log::debug;
use serde::Deserialize;
use std::{fs, path::PathBuf};

const APP_PREFIX: &str = "tasklist";
const DATABASE: &str = "tasklist.db";
const CONFIG: &str = "config.toml";

/// Settings read from `config.toml` in the XDG config directory. Every key is
/// optional.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    /// Overrides the database location under the XDG state directory.
    pub(crate) database: Option<PathBuf>,
    /// Prefix each pane row with the task's `#id`.
    pub(crate) show_ids: bool,
}

impl Config {
    /// Loads the config file if one exists, otherwise the defaults.
    pub(crate) fn load() -> Result<Config> {
        let dirs = xdg::BaseDirectories::with_prefix(APP_PREFIX)?;
        match dirs.find_config_file(CONFIG) {
            Some(path) => {
                debug!("Reading config from {path:?}");
                let text = fs::read_to_string(&path)?;
                Self::parse(&text).map_err(|source| Error::ConfigParse { path, source })
            }
            None => {
                debug!("No config file found, using defaults.");
                Ok(Config::default())
            }
        }
    }

    fn parse(text: &str) -> std::result::Result<Config, toml::de::Error> {
        toml::from_str(text)
    }

    pub(crate) fn database_file(&self) -> Result<PathBuf> {
        match &self.database {
            Some(path) => Ok(path.clone()),
            None => get_database_file(),
        }
    }
}

pub(super) fn get_database_file() -> Result<PathBuf> {
    let dirs = xdg::BaseDirectories::with_prefix(APP_PREFIX)?;
    Ok(dirs.place_state_file(DATABASE)?)
}

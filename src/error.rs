use std::{io::Error as IOError, path::PathBuf};

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] IOError),
    #[error("invalid configuration file {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("could not locate XDG base directories: {0}")]
    Xdg(#[from] xdg::BaseDirectoriesError),
    #[error("there was a database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("database schema version {found} is newer than this build supports ({supported})")]
    SchemaTooNew { found: u32, supported: u32 },
}

pub(crate) type Result<T> = std::result::Result<T, Error>;

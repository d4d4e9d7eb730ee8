//! Error types for the entire application.
//!
//! Each concern gets its own `thiserror` enum; `Error` wraps them so the
//! tracker and `main` can propagate everything with `?`.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top level error, one variant per failure class
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    RangeParse(#[from] RangeParseError),

    #[error("requested {requested} runs but only {available} snapshots are stored")]
    InsufficientHistory { requested: usize, available: usize },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error(transparent)]
    Connector(#[from] ConnectorError),

    #[error(transparent)]
    Alert(#[from] AlertError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine the configuration directory")]
    NoConfigDir,

    #[error("could not determine the data directory")]
    NoDataDir,

    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: [{section}] {key} must not be empty")]
    EmptyKey {
        section: &'static str,
        key: &'static str,
    },
}

/// Errors that can occur while parsing a run or date range
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RangeParseError {
    #[error("cant parse range '{0}': expected N or N-M")]
    RunShape(String),

    #[error("cant parse range '{input}': '{token}' is not a run number")]
    RunToken { input: String, token: String },

    #[error("cant parse range '{0}': expected '<date> - <date>'")]
    DateShape(String),

    #[error("cant parse date '{0}'")]
    Date(String),
}

/// Errors that can occur while reading a tracked database server
#[derive(Error, Debug)]
pub enum ConnectorError {
    #[error("failed to start the database runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("{server}: cannot connect to {host}: {source}")]
    Connect {
        server: &'static str,
        host: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("{server}: query failed: {source}")]
    Query {
        server: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

/// Errors that can occur while sending an alert
#[derive(Error, Debug)]
pub enum AlertError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Rejected {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

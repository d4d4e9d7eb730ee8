//! Configuration file loading.
//!
//! The config is TOML, read from `--config` or from
//! `~/.config/dbtracker/config.toml` (platform equivalent):
//!
//! ```toml
//! [storage]
//! path = "/var/lib/dbtracker/dbtracker.db"   # optional
//!
//! [mysql]
//! host = "localhost"
//! user = "tracker"
//! password = "secret"
//!
//! [postgresql]
//! host = "localhost"
//! user = "tracker"
//! password = "secret"
//! port = 5432                                 # optional
//!
//! [report]
//! width = 120                                 # optional, defaults to the terminal
//! group_by = "database"                       # or "table"
//!
//! [alert]
//! from = "noreply@example.com"
//! to = "dba@example.com"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::store::GroupBy;

const APP_NAME: &str = "dbtracker";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    pub mysql: ServerConfig,
    pub postgresql: ServerConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub alert: AlertConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    pub path: Option<PathBuf>,
}

/// Connection settings for one database server
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub user: String,
    #[serde(default)]
    pub password: String,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportConfig {
    pub width: Option<usize>,
    #[serde(default)]
    pub group_by: GroupBy,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub sendmail: PathBuf,
}

impl Default for AlertConfig {
    fn default() -> Self {
        AlertConfig {
            from: "noreply@localhost".to_string(),
            to: "root@localhost".to_string(),
            subject: "dbtracker: Database exceeded threshold".to_string(),
            sendmail: PathBuf::from("sendmail"),
        }
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", APP_NAME)
}

impl Config {
    /// `~/.config/dbtracker/config.toml` or platform equivalent
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        project_dirs()
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };

        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;

        log::debug!("loaded config from {}", path.display());
        Self::parse(&path, &contents)
    }

    pub fn parse(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents).map_err(|source| ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (section, server) in [("mysql", &self.mysql), ("postgresql", &self.postgresql)] {
            if server.host.trim().is_empty() {
                return Err(ConfigError::EmptyKey { section, key: "host" });
            }
            if server.user.trim().is_empty() {
                return Err(ConfigError::EmptyKey { section, key: "user" });
            }
        }
        Ok(())
    }

    /// Snapshot database location (~/.local/share/dbtracker/dbtracker.db or platform equivalent)
    pub fn storage_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.storage.path {
            return Ok(path.clone());
        }

        project_dirs()
            .map(|dirs| dirs.data_dir().join(format!("{APP_NAME}.db")))
            .ok_or(ConfigError::NoDataDir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
        [storage]
        path = "/tmp/tracker.db"

        [mysql]
        host = "mysql.internal"
        user = "tracker"
        password = "hunter2"

        [postgresql]
        host = "pg.internal"
        user = "tracker"
        port = 6432

        [report]
        width = 100
        group_by = "table"

        [alert]
        to = "dba@example.com"
    "#;

    fn parse(contents: &str) -> Result<Config, ConfigError> {
        Config::parse(Path::new("config.toml"), contents)
    }

    #[test]
    fn full_config() {
        let config = parse(FULL).unwrap();
        assert_eq!(config.mysql.host, "mysql.internal");
        assert_eq!(config.mysql.port, None);
        assert_eq!(config.postgresql.port, Some(6432));
        assert_eq!(config.postgresql.password, "");
        assert_eq!(config.report.width, Some(100));
        assert_eq!(config.report.group_by, GroupBy::Table);
        assert_eq!(config.storage_path().unwrap(), PathBuf::from("/tmp/tracker.db"));
    }

    #[test]
    fn alert_defaults_fill_missing_keys() {
        let config = parse(FULL).unwrap();
        assert_eq!(config.alert.to, "dba@example.com");
        assert_eq!(config.alert.from, "noreply@localhost");
        assert_eq!(config.alert.subject, "dbtracker: Database exceeded threshold");
    }

    #[test]
    fn missing_section_names_it() {
        let err = parse("[mysql]\nhost = \"h\"\nuser = \"u\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert!(err.to_string().contains("postgresql"), "{err}");
    }

    #[test]
    fn missing_key_names_it() {
        let err = parse("[mysql]\nhost = \"h\"\n[postgresql]\nhost = \"h\"\nuser = \"u\"\n").unwrap_err();
        assert!(err.to_string().contains("user"), "{err}");
    }

    #[test]
    fn empty_host_is_rejected() {
        let err = parse("[mysql]\nhost = \" \"\nuser = \"u\"\n[postgresql]\nhost = \"h\"\nuser = \"u\"\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyKey { section: "mysql", key: "host" }));
    }

    #[test]
    fn unknown_grouping_is_rejected() {
        let contents = FULL.replace("group_by = \"table\"", "group_by = \"schema\"");
        assert!(matches!(parse(&contents), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = Config::load(Some(Path::new("/nonexistent/dbtracker.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}

use serde::Serialize;

/// One of the two tracked database servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Provider {
    /// MySQL
    Primary,
    /// PostgreSQL
    Secondary,
}

impl Provider {
    /// Value stored in the `db_provider` column
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Primary => "mysql",
            Provider::Secondary => "pg",
        }
    }

    /// Human readable name used in report headers
    pub fn label(&self) -> &'static str {
        match self {
            Provider::Primary => "MySQL",
            Provider::Secondary => "PostgreSQL",
        }
    }

    /// Order reports are printed in: secondary first
    pub fn report_order() -> [Provider; 2] {
        [Provider::Secondary, Provider::Primary]
    }
}

//! Snapshot storage.
//!
//! Every `save` writes one row per measured table into a `stats` table,
//! all sharing the same timestamp. A snapshot is the set of rows for one
//! timestamp and provider.
//!
//! Supports:
//! - Listing the most recent snapshot timestamps
//! - Loading the rows of a snapshot for one provider
//! - Folding rows into per-database or per-table totals

pub mod counts;
pub mod sqlite;

use chrono::{DateTime, Local};
use serde::Deserialize;

use crate::error::Result;
use crate::provider::Provider;

pub use counts::Counts;
pub use sqlite::SqliteStore;

/// Row count of one table, as reported by a connector or read back from storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCount {
    pub provider: Provider,
    pub database: String,
    pub schema: String,
    pub table: String,
    pub rows: i64,
}

impl TableCount {
    fn label(&self, group_by: GroupBy) -> String {
        match group_by {
            GroupBy::Database => self.database.clone(),
            GroupBy::Table if self.schema.is_empty() => format!("{}.{}", self.database, self.table),
            GroupBy::Table => format!("{}.{}.{}", self.database, self.schema, self.table),
        }
    }
}

/// How table rows are folded into chart labels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    Database,
    Table,
}

pub trait SnapshotRepository {
    /// Store all rows under `timestamp`, returning how many were written.
    fn save(&mut self, tables: &[TableCount], timestamp: DateTime<Local>) -> Result<usize>;

    /// Up to `limit` distinct snapshot timestamps, newest first.
    fn history(&self, limit: usize) -> Result<Vec<DateTime<Local>>>;

    /// Rows recorded at exactly `timestamp` for `provider`, smallest first.
    fn snapshot(&self, timestamp: DateTime<Local>, provider: Provider) -> Result<Vec<TableCount>>;
}

/// Fold table rows into totals keyed by `group_by`.
///
/// Tables reporting zero rows are left out, so empty databases never show
/// up in charts.
pub fn row_count(tables: &[TableCount], group_by: GroupBy) -> Counts {
    let mut counts = Counts::new();
    for table in tables.iter().filter(|t| t.rows != 0) {
        counts.add(&table.label(group_by), table.rows);
    }
    counts
}

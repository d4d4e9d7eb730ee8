use chrono::{DateTime, Local};
use rusqlite::{params, Connection};
use std::path::Path;

use crate::error::Result;
use crate::provider::Provider;
use super::{SnapshotRepository, TableCount};

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS stats (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            datetime INTEGER NOT NULL,
            db_provider TEXT NOT NULL,
            db_name TEXT NOT NULL,
            schema_name TEXT NOT NULL,
            table_name TEXT NOT NULL,
            row_count INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_stats_datetime_provider ON stats(datetime, db_provider)",
        [],
    )?;

    Ok(())
}

/// Timestamps are stored as microseconds since the epoch so a value read
/// back from `history` matches its rows exactly.
fn to_micros(timestamp: DateTime<Local>) -> i64 {
    timestamp.timestamp_micros()
}

fn from_micros(micros: i64) -> rusqlite::Result<DateTime<Local>> {
    DateTime::from_timestamp_micros(micros)
        .map(|dt| dt.with_timezone(&Local))
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(0, micros))
}

/// Database handle. Open once per command, reuse across all operations.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        log::debug!("opened snapshot store at {}", path.display());
        Ok(SqliteStore { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(SqliteStore { conn })
    }
}

impl SnapshotRepository for SqliteStore {
    fn save(&mut self, tables: &[TableCount], timestamp: DateTime<Local>) -> Result<usize> {
        let datetime = to_micros(timestamp);
        let tx = self.conn.transaction()?;

        let mut stmt = tx.prepare_cached(
            "INSERT INTO stats (datetime, db_provider, db_name, schema_name, table_name, row_count)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
        )?;

        for table in tables {
            stmt.execute(params![
                datetime,
                table.provider.as_str(),
                table.database,
                table.schema,
                table.table,
                table.rows
            ])?;
        }

        drop(stmt);
        tx.commit()?;

        Ok(tables.len())
    }

    fn history(&self, limit: usize) -> Result<Vec<DateTime<Local>>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT datetime
             FROM stats
             ORDER BY datetime DESC
             LIMIT ?1"
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let timestamps = stmt.query_map(params![limit], |row| from_micros(row.get(0)?))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(timestamps)
    }

    fn snapshot(&self, timestamp: DateTime<Local>, provider: Provider) -> Result<Vec<TableCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT db_name, schema_name, table_name, row_count
             FROM stats
             WHERE datetime = ?1 AND db_provider = ?2
             ORDER BY row_count, id"
        )?;

        let tables = stmt.query_map(params![to_micros(timestamp), provider.as_str()], |row| {
            Ok(TableCount {
                provider,
                database: row.get(0)?,
                schema: row.get(1)?,
                table: row.get(2)?,
                rows: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

        Ok(tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn table(provider: Provider, database: &str, rows: i64) -> TableCount {
        TableCount {
            provider,
            database: database.to_string(),
            schema: String::new(),
            table: "t".to_string(),
            rows,
        }
    }

    fn base() -> DateTime<Local> {
        Local.with_ymd_and_hms(2015, 4, 22, 17, 0, 50).unwrap()
    }

    #[test]
    fn history_is_newest_first_and_limited() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        for day in 0..5 {
            store
                .save(&[table(Provider::Primary, "shop", day)], base() + Duration::days(day))
                .unwrap();
        }

        let history = store.history(3).unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0], base() + Duration::days(4));
        assert_eq!(history[2], base() + Duration::days(2));
    }

    #[test]
    fn history_collapses_rows_sharing_a_timestamp() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let rows = [table(Provider::Primary, "shop", 1), table(Provider::Secondary, "blog", 2)];
        store.save(&rows, base()).unwrap();

        assert_eq!(store.history(10).unwrap(), vec![base()]);
    }

    #[test]
    fn snapshot_filters_by_provider_and_orders_by_rows() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let rows = [
            table(Provider::Secondary, "big", 900),
            table(Provider::Primary, "shop", 10),
            table(Provider::Secondary, "small", 3),
        ];
        store.save(&rows, base()).unwrap();

        let pg = store.snapshot(base(), Provider::Secondary).unwrap();
        let names: Vec<_> = pg.iter().map(|t| t.database.as_str()).collect();
        assert_eq!(names, vec!["small", "big"]);
        assert!(pg.iter().all(|t| t.provider == Provider::Secondary));
    }

    #[test]
    fn sub_second_timestamps_match_exactly() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let at = base() + Duration::microseconds(166_095);
        store.save(&[table(Provider::Primary, "shop", 4)], at).unwrap();

        let stored = store.history(1).unwrap()[0];
        assert_eq!(stored, at);
        assert_eq!(store.snapshot(stored, Provider::Primary).unwrap().len(), 1);
    }

    #[test]
    fn unknown_timestamp_is_an_empty_snapshot() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.snapshot(base(), Provider::Primary).unwrap().is_empty());
    }
}

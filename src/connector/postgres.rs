//! PostgreSQL connector.
//!
//! Enumerates non-template databases, then reads live tuple estimates from
//! `pg_stat_user_tables` in each one. Databases that refuse the connection
//! are skipped with an info log.

use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{ConnectOptions, Connection};

use crate::config::ServerConfig;
use crate::error::{ConnectorError, Result};
use crate::provider::Provider;
use crate::store::TableCount;
use super::{block_on, query_error, Connector};

const SERVER: &str = "PostgreSQL";

/// Maintenance database used to enumerate the others
const ADMIN_DATABASE: &str = "postgres";

const LIST_DATABASES: &str = "SELECT datname::text FROM pg_database WHERE datistemplate = false";

const TABLE_STATS: &str = "SELECT schemaname::text, relname::text, n_live_tup \
     FROM pg_stat_user_tables ORDER BY n_live_tup DESC";

pub struct PostgresConnector {
    server: ServerConfig,
}

impl PostgresConnector {
    pub fn new(server: ServerConfig) -> Self {
        PostgresConnector { server }
    }

    fn options(&self, database: &str) -> PgConnectOptions {
        let mut options = PgConnectOptions::new()
            .host(&self.server.host)
            .username(&self.server.user)
            .database(database);
        if !self.server.password.is_empty() {
            options = options.password(&self.server.password);
        }
        if let Some(port) = self.server.port {
            options = options.port(port);
        }
        options
    }

    async fn connect(&self, database: &str) -> Result<PgConnection, ConnectorError> {
        self.options(database)
            .connect()
            .await
            .map_err(|source| ConnectorError::Connect {
                server: SERVER,
                host: format!("{}/{database}", self.server.host),
                source,
            })
    }

    async fn databases(&self) -> Result<Vec<String>, ConnectorError> {
        let mut conn = self.connect(ADMIN_DATABASE).await?;
        let names: Vec<String> = sqlx::query_scalar(LIST_DATABASES)
            .fetch_all(&mut conn)
            .await
            .map_err(query_error(SERVER))?;
        close(conn).await;
        Ok(names)
    }

    async fn table_stats(&self, database: &str) -> Result<Vec<TableCount>, ConnectorError> {
        let mut conn = self.connect(database).await?;
        let stats: Vec<(String, String, i64)> = sqlx::query_as(TABLE_STATS)
            .fetch_all(&mut conn)
            .await
            .map_err(query_error(SERVER))?;
        close(conn).await;
        Ok(table_counts(database, stats))
    }

    async fn fetch_tables(&self) -> Result<Vec<TableCount>, ConnectorError> {
        let mut tables = Vec::new();

        for database in self.databases().await? {
            match self.table_stats(&database).await {
                Ok(stats) => tables.extend(stats),
                Err(e) => log::info!("Postgres Skipping: {database}: {e}"),
            }
        }

        log::info!("PostgreSQL: read stats for {} tables", tables.len());
        Ok(tables)
    }
}

impl Connector for PostgresConnector {
    fn provider(&self) -> Provider {
        Provider::Secondary
    }

    fn list_tables(&self) -> Result<Vec<TableCount>> {
        Ok(block_on(self.fetch_tables())??)
    }
}

async fn close(conn: PgConnection) {
    if let Err(e) = conn.close().await {
        log::debug!("PostgreSQL: closing connection failed: {e}");
    }
}

fn table_counts(database: &str, stats: Vec<(String, String, i64)>) -> Vec<TableCount> {
    stats
        .into_iter()
        .map(|(schema, table, rows)| TableCount {
            provider: Provider::Secondary,
            database: database.to_string(),
            schema,
            table,
            rows,
        })
        .collect()
}

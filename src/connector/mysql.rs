//! MySQL connector.
//!
//! Lists base tables from `information_schema.tables` over one connection,
//! then counts every table with `SELECT COUNT(*)` on the same connection.
//! Tables whose count fails are reported with zero rows.

use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{ConnectOptions, Connection};

use crate::config::ServerConfig;
use crate::error::{ConnectorError, Result};
use crate::provider::Provider;
use crate::store::TableCount;
use super::{block_on, query_error, Connector};

const SERVER: &str = "MySQL";

// information_schema names can come back as binary strings; CHAR decodes as text
const LIST_TABLES: &str = "SELECT CAST(TABLE_SCHEMA AS CHAR), CAST(TABLE_NAME AS CHAR) \
     FROM information_schema.tables WHERE TABLE_TYPE != 'VIEW'";

pub struct MysqlConnector {
    server: ServerConfig,
}

impl MysqlConnector {
    pub fn new(server: ServerConfig) -> Self {
        MysqlConnector { server }
    }

    fn options(&self) -> MySqlConnectOptions {
        let mut options = MySqlConnectOptions::new()
            .host(&self.server.host)
            .username(&self.server.user);
        if !self.server.password.is_empty() {
            options = options.password(&self.server.password);
        }
        if let Some(port) = self.server.port {
            options = options.port(port);
        }
        options
    }

    async fn connect(&self) -> Result<MySqlConnection, ConnectorError> {
        self.options()
            .connect()
            .await
            .map_err(|source| ConnectorError::Connect {
                server: SERVER,
                host: self.server.host.clone(),
                source,
            })
    }

    async fn fetch_tables(&self) -> Result<Vec<TableCount>, ConnectorError> {
        let mut conn = self.connect().await?;

        let listing: Vec<(String, String)> = sqlx::query_as(LIST_TABLES)
            .fetch_all(&mut conn)
            .await
            .map_err(query_error(SERVER))?;
        log::info!("mySQL: counting {} tables", listing.len());

        let mut tables = Vec::with_capacity(listing.len());
        for (database, table) in listing {
            let sql = count_statement(&database, &table);
            let rows = match sqlx::query_scalar::<_, i64>(&sql).fetch_one(&mut conn).await {
                Ok(rows) => rows,
                Err(e) => {
                    log::info!("mySQL Skipping: {database}.{table}: {e}");
                    0
                }
            };

            tables.push(TableCount {
                provider: Provider::Primary,
                database,
                schema: String::new(),
                table,
                rows,
            });
        }

        if let Err(e) = conn.close().await {
            log::debug!("mySQL: closing connection failed: {e}");
        }
        Ok(tables)
    }
}

impl Connector for MysqlConnector {
    fn provider(&self) -> Provider {
        Provider::Primary
    }

    fn list_tables(&self) -> Result<Vec<TableCount>> {
        Ok(block_on(self.fetch_tables())??)
    }
}

fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

fn count_statement(database: &str, table: &str) -> String {
    format!(
        "SELECT COUNT(*) FROM {}.{}",
        quote_identifier(database),
        quote_identifier(table)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn server(port: Option<u16>) -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            user: "tracker".to_string(),
            password: String::new(),
            port,
        }
    }

    #[test]
    fn statement_quotes_backticks() {
        assert_eq!(
            count_statement("sh`op", "o'rders"),
            "SELECT COUNT(*) FROM `sh``op`.`o'rders`"
        );
    }

    #[test]
    fn names_with_tabs_and_backslashes_are_kept_verbatim() {
        assert_eq!(
            count_statement("shop", "a\tb\\c\nd"),
            "SELECT COUNT(*) FROM `shop`.`a\tb\\c\nd`"
        );
    }

    #[test]
    fn unreachable_server_is_a_connect_error() {
        let err = MysqlConnector::new(server(Some(1))).list_tables().unwrap_err();
        assert!(matches!(
            err,
            Error::Connector(ConnectorError::Connect { server: "MySQL", .. })
        ));
    }
}

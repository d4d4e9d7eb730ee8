//! Live row counts from the tracked database servers.
//!
//! Both connectors talk to their server through `sqlx`. The commands are
//! synchronous, so each `list_tables` call drives its queries to completion
//! on a current-thread tokio runtime.
//!
//! Handles gracefully:
//! - Tables that cannot be counted (reported with zero rows)
//! - PostgreSQL databases that refuse connections (skipped)

pub mod mysql;
pub mod postgres;

use std::future::Future;

use crate::error::{ConnectorError, Result};
use crate::provider::Provider;
use crate::store::TableCount;

pub use mysql::MysqlConnector;
pub use postgres::PostgresConnector;

pub trait Connector {
    fn provider(&self) -> Provider;

    /// Every user table on the server with its current row count.
    fn list_tables(&self) -> Result<Vec<TableCount>>;
}

/// Run `future` to completion on a fresh current-thread runtime.
fn block_on<F: Future>(future: F) -> Result<F::Output, ConnectorError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(ConnectorError::Runtime)?;
    Ok(runtime.block_on(future))
}

fn query_error(server: &'static str) -> impl Fn(sqlx::Error) -> ConnectorError {
    move |source| ConnectorError::Query { server, source }
}

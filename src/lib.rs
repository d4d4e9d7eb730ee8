//! dbtracker: row count snapshots and growth charts for MySQL and PostgreSQL.

pub mod alert;
pub mod cli;
pub mod config;
pub mod connector;
pub mod error;
pub mod growth;
pub mod provider;
pub mod report;
pub mod store;
pub mod tracker;

pub use error::{Error, Result};

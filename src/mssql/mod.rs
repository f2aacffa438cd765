//! SQL Server driver built on tiberius.
//!
//! - `config`: the [`MssqlConnector`] and its options
//! - `client`: raw client creation
//! - `render`: turns a command into a T-SQL batch with positional binds
//! - `query`: parameter binding and result-set decoding
//! - `session`: the [`Session`](crate::driver::Session) implementation

pub mod client;
pub mod config;
pub mod query;
pub mod render;
pub mod session;

pub use client::{MssqlClient, create_mssql_client};
pub use config::MssqlConnector;
pub use render::{RenderedBatch, render};
pub use session::MssqlSession;

//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and traits
//! to make it easier to get started with the library.

pub use crate::driver::{Command, Connector, DriverOutput, ExecMode, Session};
pub use crate::error::QueryBuilderError;
pub use crate::parameter::{
    DbType, ParamBuilder, ParamValue, Parameter, ParameterDirection, Parameters, SqlTyped,
    TableValue,
};
pub use crate::query::{CommandKind, Query, QueryBuilder};
pub use crate::results::{CustomDbRow, FromRow, ResultSet, deserialize_row};
pub use crate::table::{Table, TableBuilder, TableRecord};
pub use crate::types::{FromRowValue, RowValues, ValueKind};

#[cfg(feature = "mssql")]
pub use crate::mssql::{MssqlClient, MssqlConnector, create_mssql_client};

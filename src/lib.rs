//! Fluent command builder for SQL Server.
//!
//! Build a [`Query`] with [`QueryBuilder`]: connection string, SQL text or stored procedure
//! name, parameters (including output, return-value and table-valued ones), a timeout and an
//! optional transaction. Then run it with one of the execution methods. Each execution opens
//! its own connection and closes it before returning.
//!
//! ```rust,no_run
//! use mssql_query_builder::prelude::*;
//!
//! # async fn run() -> Result<(), QueryBuilderError> {
//! let mut query = QueryBuilder::new()
//!     .with_sql_connection("Server=tcp:localhost,1433;Database=app;User Id=sa;Password=secret")
//!     .with_command_type_as_stored_procedure()
//!     .with_name("dbo.count_orders")
//!     .with_parameter("@CustomerId", 42)
//!     .with_output_parameter("@Total", 0_i32)
//!     .build();
//!
//! query.execute_non_query().await?;
//! let total: Option<i32> = query.get_parameter_by_name("@Total")?;
//! # let _ = total;
//! # Ok(())
//! # }
//! ```
//!
//! Table-valued parameters are built from any type implementing [`TableRecord`], usually
//! through the [`table_record!`] macro, or from a flat list with
//! [`QueryBuilder::add_list_parameter`].

pub mod driver;
pub mod error;
pub mod helpers;
pub mod parameter;
pub mod prelude;
pub mod query;
pub mod results;
pub mod table;
pub mod types;

#[cfg(feature = "mssql")]
pub mod mssql;

pub use error::QueryBuilderError;
pub use parameter::{DbType, ParamBuilder, ParamValue, Parameter, ParameterDirection, Parameters, SqlTyped};
pub use query::{CommandKind, Query, QueryBuilder};
pub use results::{CustomDbRow, FromRow, ResultSet};
pub use table::{Table, TableBuilder, TableRecord};
pub use types::{FromRowValue, RowValues, ValueKind};

use std::sync::Arc;

use super::{CommandKind, Query};
use crate::driver::Connector;
use crate::parameter::{DbType, ParamBuilder, Parameter, ParameterDirection, SqlTyped};
use crate::table::Table;
use crate::types::RowValues;

/// Fluent builder for a [`Query`].
///
/// Every `with_*` call consumes the builder and returns it, so a half-built query cannot be
/// shared between two call sites. Repeated calls that target the same field keep the last
/// value. Nothing is validated here; [`build`](QueryBuilder::build) always succeeds.
///
/// ```rust
/// use mssql_query_builder::prelude::*;
///
/// let query = QueryBuilder::new()
///     .with_sql_connection("Server=tcp:localhost,1433;Database=app;User Id=sa;Password=secret")
///     .with_command_type_as_stored_procedure()
///     .with_name("dbo.get_orders")
///     .with_parameter("@CustomerId", 42)
///     .with_optional_parameter("@Status", None::<String>)
///     .add_list_parameter("@Ids", "dbo.id_list", "Id", [1, 2, 4], ParameterDirection::Input)
///     .with_timeout(30)
///     .build();
///
/// assert_eq!(query.command_kind(), CommandKind::StoredProcedure);
/// assert_eq!(query.parameters().map(|p| p.len()), Some(2));
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_sql_connection(mut self, connection: impl Into<String>) -> Self {
        self.query.set_sql_connection(connection);
        self
    }

    /// Set the SQL text, or the procedure name for stored procedures.
    #[must_use]
    pub fn with_sql_command(mut self, text: impl Into<String>) -> Self {
        self.query.set_command_text(text);
        self
    }

    /// Alias of [`with_sql_command`](QueryBuilder::with_sql_command).
    #[must_use]
    pub fn with_name(self, name: impl Into<String>) -> Self {
        self.with_sql_command(name)
    }

    #[must_use]
    pub fn with_command_type(mut self, kind: CommandKind) -> Self {
        self.query.set_command_kind(kind);
        self
    }

    #[must_use]
    pub fn with_command_type_as_stored_procedure(self) -> Self {
        self.with_command_type(CommandKind::StoredProcedure)
    }

    #[must_use]
    pub fn with_command_type_as_simple_query(self) -> Self {
        self.with_command_type(CommandKind::Text)
    }

    /// Scalar and table-valued function calls are written as plain SQL text.
    #[must_use]
    pub fn with_command_type_as_function(self) -> Self {
        self.with_command_type(CommandKind::Text)
    }

    #[must_use]
    pub fn with_timeout(mut self, seconds: u32) -> Self {
        self.query.set_timeout(seconds);
        self
    }

    #[must_use]
    pub fn with_transaction_execution(mut self) -> Self {
        self.query.set_transaction(true);
        self
    }

    /// Use a custom driver instead of the built-in SQL Server connector.
    #[must_use]
    pub fn with_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.query.set_connector(connector);
        self
    }

    /// Add an input parameter with no declared type.
    #[must_use]
    pub fn with_parameter(mut self, name: &str, value: impl Into<RowValues>) -> Self {
        self.query.add_parameter(name, value, None, None);
        self
    }

    /// Add a parameter with an optional declared type and direction.
    #[must_use]
    pub fn with_parameter_options(
        mut self,
        name: &str,
        value: impl Into<RowValues>,
        db_type: Option<DbType>,
        direction: Option<ParameterDirection>,
    ) -> Self {
        self.query.add_parameter(name, value, db_type, direction);
        self
    }

    /// Add a prebuilt parameter descriptor.
    #[must_use]
    pub fn with_param(mut self, parameter: Parameter) -> Self {
        self.query.add(parameter);
        self
    }

    /// Configure a parameter inline through a [`ParamBuilder`].
    #[must_use]
    pub fn with_parameter_builder<F>(mut self, configure: F) -> Self
    where
        F: FnOnce(ParamBuilder) -> ParamBuilder,
    {
        self.query.add(configure(ParamBuilder::new()).build());
        self
    }

    /// Add an output parameter whose declared type follows from `T`.
    #[must_use]
    pub fn with_output_parameter<T: SqlTyped>(mut self, name: &str, value: T) -> Self {
        self.query.add_parameter(
            name,
            value,
            Some(T::DB_TYPE),
            Some(ParameterDirection::Output),
        );
        self
    }

    /// Add the parameter only when `condition` holds.
    #[must_use]
    pub fn with_optional_parameter_if(
        self,
        condition: bool,
        name: &str,
        value: impl Into<RowValues>,
    ) -> Self {
        self.with_optional_parameter_if_options(condition, name, value, None, None)
    }

    /// [`with_optional_parameter_if`](QueryBuilder::with_optional_parameter_if) with a
    /// declared type and direction.
    #[must_use]
    pub fn with_optional_parameter_if_options(
        mut self,
        condition: bool,
        name: &str,
        value: impl Into<RowValues>,
        db_type: Option<DbType>,
        direction: Option<ParameterDirection>,
    ) -> Self {
        if condition {
            self.query.add_parameter(name, value, db_type, direction);
        }
        self
    }

    /// Add the parameter only when `value` is `Some`.
    #[must_use]
    pub fn with_optional_parameter<V: Into<RowValues>>(self, name: &str, value: Option<V>) -> Self {
        self.with_optional_parameter_options(name, value, None, None)
    }

    /// [`with_optional_parameter`](QueryBuilder::with_optional_parameter) with a declared
    /// type and direction.
    #[must_use]
    pub fn with_optional_parameter_options<V: Into<RowValues>>(
        mut self,
        name: &str,
        value: Option<V>,
        db_type: Option<DbType>,
        direction: Option<ParameterDirection>,
    ) -> Self {
        if let Some(value) = value {
            self.query.add_parameter(name, value, db_type, direction);
        }
        self
    }

    /// Add a single-column table-valued parameter built from `values`.
    #[must_use]
    pub fn add_list_parameter<V, I>(
        mut self,
        name: &str,
        type_name: &str,
        column_name: &str,
        values: I,
        direction: ParameterDirection,
    ) -> Self
    where
        V: Into<RowValues>,
        I: IntoIterator<Item = V>,
    {
        self.query
            .add_list_parameter(name, type_name, column_name, values, direction);
        self
    }

    #[must_use]
    pub fn with_table_parameter(
        mut self,
        name: &str,
        type_name: &str,
        table: Table,
        direction: Option<ParameterDirection>,
    ) -> Self {
        self.query
            .add_table_parameter(name, type_name, table, direction);
        self
    }

    #[must_use]
    pub fn build(self) -> Query {
        self.query
    }
}

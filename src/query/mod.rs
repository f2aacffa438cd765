//! A runnable command and its fluent builder.

mod builder;
mod execute;

pub use builder::QueryBuilder;

use std::fmt;
use std::sync::Arc;

use crate::driver::{Command, Connector};
use crate::error::QueryBuilderError;
use crate::parameter::{DbType, Parameter, ParameterDirection, Parameters, TableValue};
use crate::table::Table;
use crate::types::{FromRowValue, RowValues};

/// Whether the command text is raw SQL or the name of a stored procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CommandKind {
    #[default]
    Text,
    StoredProcedure,
}

/// A command ready to run: connection string, command text, kind, timeout, transaction
/// flag and parameters.
///
/// Usually assembled with [`QueryBuilder`]. Nothing is validated until an execution method
/// runs, and every execution opens its own connection, so a `Query` can be executed any
/// number of times. Execution takes `&mut self` because output parameter values are written
/// back into the parameter collection.
#[derive(Clone, Default)]
pub struct Query {
    connection: Option<String>,
    command_text: Option<String>,
    command_kind: CommandKind,
    timeout: Option<u32>,
    use_transaction: bool,
    parameters: Option<Parameters>,
    connector: Option<Arc<dyn Connector>>,
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The connection string usually carries a password
        f.debug_struct("Query")
            .field("connection", &self.connection.as_ref().map(|_| "<redacted>"))
            .field("command_text", &self.command_text)
            .field("command_kind", &self.command_kind)
            .field("timeout", &self.timeout)
            .field("use_transaction", &self.use_transaction)
            .field("parameters", &self.parameters)
            .field("connector", &self.connector)
            .finish()
    }
}

impl Query {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_sql_connection(&mut self, connection: impl Into<String>) {
        self.connection = Some(connection.into());
    }

    #[must_use]
    pub fn sql_connection(&self) -> Option<&str> {
        self.connection.as_deref()
    }

    /// Set the SQL text, or the procedure name for [`CommandKind::StoredProcedure`].
    pub fn set_command_text(&mut self, text: impl Into<String>) {
        self.command_text = Some(text.into());
    }

    #[must_use]
    pub fn command_text(&self) -> Option<&str> {
        self.command_text.as_deref()
    }

    pub fn set_command_kind(&mut self, kind: CommandKind) {
        self.command_kind = kind;
    }

    #[must_use]
    pub fn command_kind(&self) -> CommandKind {
        self.command_kind
    }

    pub fn set_timeout(&mut self, seconds: u32) {
        self.timeout = Some(seconds);
    }

    /// Timeout in seconds, if one was set.
    #[must_use]
    pub fn timeout(&self) -> Option<u32> {
        self.timeout
    }

    pub fn set_transaction(&mut self, use_transaction: bool) {
        self.use_transaction = use_transaction;
    }

    #[must_use]
    pub fn uses_transaction(&self) -> bool {
        self.use_transaction
    }

    /// Replace the driver used to open connections.
    pub fn set_connector(&mut self, connector: Arc<dyn Connector>) {
        self.connector = Some(connector);
    }

    /// The parameter collection; `None` until the first parameter is added.
    #[must_use]
    pub fn parameters(&self) -> Option<&Parameters> {
        self.parameters.as_ref()
    }

    /// Insert a parameter, replacing any earlier parameter with the same name.
    pub fn add(&mut self, parameter: Parameter) {
        self.parameters
            .get_or_insert_with(Parameters::new)
            .add(parameter);
    }

    pub fn add_parameter(
        &mut self,
        name: &str,
        value: impl Into<RowValues>,
        db_type: Option<DbType>,
        direction: Option<ParameterDirection>,
    ) {
        self.add(Parameter::new(name, value.into(), direction, db_type));
    }

    /// Attach `table` as a table-valued parameter of the user-defined type `type_name`.
    pub fn add_table_parameter(
        &mut self,
        name: &str,
        type_name: &str,
        table: Table,
        direction: Option<ParameterDirection>,
    ) {
        self.add(Parameter::new(
            name,
            TableValue::new(type_name, table),
            direction,
            None,
        ));
    }

    /// Attach a flat list as a single-column table-valued parameter, one row per value.
    pub fn add_list_parameter<V, I>(
        &mut self,
        name: &str,
        type_name: &str,
        column_name: &str,
        values: I,
        direction: ParameterDirection,
    ) where
        V: Into<RowValues>,
        I: IntoIterator<Item = V>,
    {
        let table = Table::from_values(column_name, values);
        self.add_table_parameter(name, type_name, table, Some(direction));
    }

    /// Current value of a parameter converted into `T`.
    ///
    /// Returns `Ok(None)` if no parameters were added or `name` is unknown. After execution,
    /// output parameters hold the values the server returned.
    ///
    /// # Errors
    ///
    /// Returns `QueryBuilderError::DecodeError` if the value cannot be converted into `T`.
    pub fn get_parameter_by_name<T: FromRowValue>(
        &self,
        name: &str,
    ) -> Result<Option<T>, QueryBuilderError> {
        match &self.parameters {
            Some(parameters) => parameters.value_as(name),
            None => Ok(None),
        }
    }

    /// Fails with a configuration error when no connection string is set.
    ///
    /// # Errors
    ///
    /// Returns `QueryBuilderError::ConfigError`.
    pub fn connection_required(&self) -> Result<&str, QueryBuilderError> {
        self.connection
            .as_deref()
            .ok_or_else(QueryBuilderError::connection_required)
    }

    pub(crate) fn command(&self) -> Command<'_> {
        Command {
            text: self.command_text.as_deref().unwrap_or_default(),
            kind: self.command_kind,
            parameters: self
                .parameters
                .as_ref()
                .map(Parameters::as_slice)
                .unwrap_or_default(),
        }
    }

    fn connector(&self) -> Result<Arc<dyn Connector>, QueryBuilderError> {
        if let Some(connector) = &self.connector {
            return Ok(connector.clone());
        }
        default_connector()
    }
}

#[cfg(feature = "mssql")]
fn default_connector() -> Result<Arc<dyn Connector>, QueryBuilderError> {
    Ok(Arc::new(crate::mssql::MssqlConnector::default()))
}

#[cfg(not(feature = "mssql"))]
fn default_connector() -> Result<Arc<dyn Connector>, QueryBuilderError> {
    Err(QueryBuilderError::ConfigError(
        "no connector configured and the `mssql` feature is disabled".to_string(),
    ))
}

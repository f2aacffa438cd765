//! The seam between a [`Query`](crate::query::Query) and the database driver.
//!
//! A [`Connector`] opens one [`Session`] per execution call. The session receives the
//! command as assembled by the builder and is responsible for turning it into whatever the
//! driver speaks, including table-valued parameters.

use std::fmt;

use async_trait::async_trait;

use crate::error::QueryBuilderError;
use crate::parameter::Parameter;
use crate::query::CommandKind;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Borrowed view of a command handed to the driver.
#[derive(Debug, Clone, Copy)]
pub struct Command<'a> {
    pub text: &'a str,
    pub kind: CommandKind,
    pub parameters: &'a [Parameter],
}

impl Command<'_> {
    /// Parameters whose value the server writes back.
    pub fn output_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters
            .iter()
            .filter(|p| p.effective_direction().reads_back())
    }
}

/// What the caller wants back from the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    /// Read every result set.
    Rows,
    /// Only the affected-row count matters.
    NonQuery,
}

/// Everything a session returns for one command.
#[derive(Debug, Default)]
pub struct DriverOutput {
    /// Result sets in the order the server produced them.
    pub result_sets: Vec<ResultSet>,
    pub rows_affected: u64,
    /// Values of output, input-output and return-value parameters, by parameter name.
    pub output_values: Vec<(String, RowValues)>,
}

impl DriverOutput {
    #[must_use]
    pub fn affected(rows_affected: u64) -> Self {
        Self {
            rows_affected,
            ..Self::default()
        }
    }
}

/// One open connection. Dropping it releases the connection.
#[async_trait]
pub trait Session: Send {
    /// # Errors
    /// Returns an error if the transaction cannot be started.
    async fn begin(&mut self) -> Result<(), QueryBuilderError>;

    /// # Errors
    /// Returns an error if the commit fails.
    async fn commit(&mut self) -> Result<(), QueryBuilderError>;

    /// # Errors
    /// Returns an error if the rollback fails.
    async fn rollback(&mut self) -> Result<(), QueryBuilderError>;

    /// Run the command.
    ///
    /// # Errors
    /// Returns an error if rendering, execution or result decoding fails.
    async fn execute(
        &mut self,
        command: &Command<'_>,
        mode: ExecMode,
    ) -> Result<DriverOutput, QueryBuilderError>;
}

/// Opens sessions from a connection string.
#[async_trait]
pub trait Connector: Send + Sync + fmt::Debug {
    /// # Errors
    /// Returns `QueryBuilderError::ConnectionError` if the connection cannot be established.
    async fn connect(&self, target: &str) -> Result<Box<dyn Session>, QueryBuilderError>;
}

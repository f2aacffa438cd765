use std::time::Duration;

use super::Query;
use crate::driver::{DriverOutput, ExecMode};
use crate::error::QueryBuilderError;
use crate::parameter::Parameters;
use crate::results::{FromRow, ResultSet};
use crate::types::RowValues;

impl Query {
    /// Rows of the first result set mapped into `T`.
    ///
    /// Use `CustomDbRow` for untyped rows, or [`execute_result_set`](Query::execute_result_set)
    /// to keep the column names.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if no connection string is set, otherwise any connection,
    /// execution or decoding error.
    pub async fn execute_rows<T: FromRow>(&mut self) -> Result<Vec<T>, QueryBuilderError> {
        let output = self.run(ExecMode::Rows).await?;
        match output.result_sets.first() {
            Some(set) => set.map_rows(),
            None => Ok(Vec::new()),
        }
    }

    /// The first result set, untyped. Empty when the command produced no result set.
    ///
    /// # Errors
    ///
    /// Same as [`execute_rows`](Query::execute_rows).
    pub async fn execute_result_set(&mut self) -> Result<ResultSet, QueryBuilderError> {
        let output = self.run(ExecMode::Rows).await?;
        Ok(output.result_sets.into_iter().next().unwrap_or_default())
    }

    /// The first row of the first result set, or `None` when there are no rows.
    ///
    /// # Errors
    ///
    /// Same as [`execute_rows`](Query::execute_rows).
    pub async fn execute_single_row<T: FromRow>(&mut self) -> Result<Option<T>, QueryBuilderError> {
        let output = self.run(ExecMode::Rows).await?;
        output
            .result_sets
            .first()
            .and_then(|set| set.results.first())
            .map(T::from_row)
            .transpose()
    }

    /// Every result set, in order, each mapped into `T`.
    ///
    /// Empty result sets keep their slot, so index `i` always belongs to the `i`-th
    /// row-returning statement.
    ///
    /// # Errors
    ///
    /// Same as [`execute_rows`](Query::execute_rows); failures are never turned into an
    /// empty result.
    pub async fn execute_multiple_result_sets<T: FromRow>(
        &mut self,
    ) -> Result<Vec<Vec<T>>, QueryBuilderError> {
        let output = self.run(ExecMode::Rows).await?;
        output.result_sets.iter().map(ResultSet::map_rows).collect()
    }

    /// Run the command and return the number of affected rows.
    ///
    /// Without output parameters this is the sum over every statement of the command. With
    /// output, input-output or return-value parameters it is `@@ROWCOUNT` after the command,
    /// so only the last statement counts.
    ///
    /// # Errors
    ///
    /// Same as [`execute_rows`](Query::execute_rows).
    pub async fn execute_non_query(&mut self) -> Result<u64, QueryBuilderError> {
        let output = self.run(ExecMode::NonQuery).await?;
        Ok(output.rows_affected)
    }

    /// Blocking form of [`execute_non_query`](Query::execute_non_query).
    ///
    /// Drives the command on a private current-thread runtime. Inside an async context use
    /// the async form instead.
    ///
    /// # Errors
    ///
    /// Returns `ExecutionError` when called from within a tokio runtime or if the private
    /// runtime cannot be created, otherwise the same errors as the async form.
    pub fn execute_non_query_blocking(&mut self) -> Result<u64, QueryBuilderError> {
        self.connection_required()?;
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(QueryBuilderError::ExecutionError(
                "execute_non_query_blocking called from within an async runtime".to_string(),
            ));
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                QueryBuilderError::ExecutionError(format!("failed to start runtime: {e}"))
            })?;
        runtime.block_on(self.execute_non_query())
    }

    /// Run the command and discard its result.
    ///
    /// # Errors
    ///
    /// Same as [`execute_rows`](Query::execute_rows).
    pub async fn execute_fire_and_forget(&mut self) -> Result<(), QueryBuilderError> {
        self.run(ExecMode::NonQuery).await.map(|_| ())
    }

    /// One full cycle: connect, optionally begin, execute, optionally commit.
    ///
    /// The session is dropped, and the connection closed, on every return path.
    async fn run(&mut self, mode: ExecMode) -> Result<DriverOutput, QueryBuilderError> {
        let target = self.connection_required()?.to_owned();
        let connector = self.connector()?;
        let limit = self.timeout.map(|secs| Duration::from_secs(u64::from(secs)));
        let use_transaction = self.use_transaction;

        tracing::debug!(
            kind = ?self.command_kind,
            parameters = self.parameters.as_ref().map_or(0, Parameters::len),
            transaction = use_transaction,
            timeout = ?limit,
            ?mode,
            "executing command"
        );

        let mut session = connector.connect(&target).await?;
        if use_transaction {
            session.begin().await?;
        }

        let command = self.command();
        let outcome = match limit {
            Some(limit) => {
                match tokio::time::timeout(limit, session.execute(&command, mode)).await {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        // The connection is mid-response; the server rolls back when it closes
                        tracing::warn!(?limit, "command timed out, dropping connection");
                        return Err(QueryBuilderError::Timeout(limit));
                    }
                }
            }
            None => session.execute(&command, mode).await,
        };

        let output = match outcome {
            Ok(output) => output,
            Err(e) => {
                if use_transaction && let Err(rollback_err) = session.rollback().await {
                    tracing::warn!(error = %rollback_err, "rollback after failed command failed");
                }
                return Err(e);
            }
        };

        if use_transaction {
            session.commit().await?;
        }
        drop(session);

        tracing::debug!(
            rows_affected = output.rows_affected,
            result_sets = output.result_sets.len(),
            "command finished"
        );

        self.apply_output_values(&output.output_values);
        Ok(output)
    }

    fn apply_output_values(&mut self, values: &[(String, RowValues)]) {
        let Some(parameters) = self.parameters.as_mut() else {
            return;
        };
        for (name, value) in values {
            if !parameters.set_value(name, value.clone()) {
                tracing::warn!(parameter = %name, "driver returned a value for an unknown parameter");
            }
        }
    }
}

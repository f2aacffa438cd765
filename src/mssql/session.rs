use async_trait::async_trait;
use tiberius::Query;

use super::client::MssqlClient;
use super::query::{bind_query_params, collect_result_sets};
use super::render::{RenderedBatch, render};
use crate::driver::{Command, DriverOutput, ExecMode, Session};
use crate::error::QueryBuilderError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// One SQL Server connection, alive for a single execution.
pub struct MssqlSession {
    client: MssqlClient,
}

impl MssqlSession {
    #[must_use]
    pub fn new(client: MssqlClient) -> Self {
        Self { client }
    }

    async fn simple(&mut self, sql: &str, what: &str) -> Result<(), QueryBuilderError> {
        Query::new(sql).execute(&mut self.client).await.map_err(|e| {
            QueryBuilderError::ExecutionError(format!("MSSQL {what} error: {e}"))
        })?;
        Ok(())
    }
}

#[async_trait]
impl Session for MssqlSession {
    async fn begin(&mut self) -> Result<(), QueryBuilderError> {
        self.simple("BEGIN TRANSACTION", "begin transaction").await
    }

    async fn commit(&mut self) -> Result<(), QueryBuilderError> {
        self.simple("COMMIT TRANSACTION", "commit").await
    }

    async fn rollback(&mut self) -> Result<(), QueryBuilderError> {
        // A severe error may already have ended the transaction server-side
        self.simple("IF @@TRANCOUNT > 0 ROLLBACK TRANSACTION", "rollback")
            .await
    }

    async fn execute(
        &mut self,
        command: &Command<'_>,
        mode: ExecMode,
    ) -> Result<DriverOutput, QueryBuilderError> {
        let batch = render(command, mode)?;
        tracing::trace!(sql = %batch.sql, binds = batch.binds.len(), "rendered batch");
        let query = bind_query_params(&batch.sql, &batch.binds);

        if mode == ExecMode::NonQuery && !batch.has_trailing_set() {
            let exec_result = query.execute(&mut self.client).await.map_err(|e| {
                QueryBuilderError::ExecutionError(format!("SQL Server execute error: {e}"))
            })?;
            let rows_affected: u64 = exec_result.rows_affected().iter().sum();
            return Ok(DriverOutput::affected(rows_affected));
        }

        let stream = query.query(&mut self.client).await.map_err(|e| {
            QueryBuilderError::ExecutionError(format!("SQL Server query error: {e}"))
        })?;
        let result_sets = collect_result_sets(stream).await?;
        split_outputs(&batch, result_sets)
    }
}

/// Separate the batch's trailing output set from the caller's result sets.
fn split_outputs(
    batch: &RenderedBatch,
    mut result_sets: Vec<ResultSet>,
) -> Result<DriverOutput, QueryBuilderError> {
    let mut output = DriverOutput::default();

    if batch.has_trailing_set() {
        let trailing = result_sets.pop().ok_or_else(|| {
            QueryBuilderError::ExecutionError(
                "output parameter values missing from the response".to_string(),
            )
        })?;
        let row = trailing.results.into_iter().next().ok_or_else(|| {
            QueryBuilderError::ExecutionError("output parameter row is empty".to_string())
        })?;
        let mut values = row.rows.into_iter();
        for name in &batch.outputs {
            let value = values.next().unwrap_or(RowValues::Null);
            output.output_values.push((name.clone(), value));
        }
        if batch.captures_row_count {
            let count = values.next().and_then(|v| v.as_int().copied()).unwrap_or(0);
            output.rows_affected = u64::try_from(count).unwrap_or(0);
        }
    }

    if !batch.captures_row_count {
        output.rows_affected = result_sets.iter().map(|set| set.len() as u64).sum();
    }
    output.result_sets = result_sets;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(columns: &[&str], rows: Vec<Vec<RowValues>>) -> ResultSet {
        let mut set = ResultSet::with_columns(columns.iter().map(|c| (*c).to_string()).collect());
        for row in rows {
            set.add_row_values(row).unwrap();
        }
        set
    }

    #[test]
    fn trailing_set_becomes_output_values() {
        let batch = RenderedBatch {
            outputs: vec!["Total".into(), "Status".into()],
            captures_row_count: true,
            ..RenderedBatch::default()
        };
        let sets = vec![set(
            &["Total", "Status", "__qb_rowcount"],
            vec![vec![RowValues::Int(12), RowValues::Int(0), RowValues::Int(3)]],
        )];

        let output = split_outputs(&batch, sets).unwrap();
        assert!(output.result_sets.is_empty());
        assert_eq!(output.rows_affected, 3);
        assert_eq!(
            output.output_values,
            vec![
                ("Total".to_string(), RowValues::Int(12)),
                ("Status".to_string(), RowValues::Int(0)),
            ]
        );
    }

    #[test]
    fn caller_sets_are_kept_in_order() {
        let batch = RenderedBatch::default();
        let sets = vec![
            set(&["a"], vec![vec![RowValues::Int(1)]]),
            set(&["b"], vec![]),
        ];
        let output = split_outputs(&batch, sets).unwrap();
        assert_eq!(output.result_sets.len(), 2);
        assert!(output.result_sets[1].is_empty());
        assert_eq!(output.rows_affected, 1);
    }

    #[test]
    fn missing_trailing_set_is_an_error() {
        let batch = RenderedBatch {
            outputs: vec!["Out".into()],
            ..RenderedBatch::default()
        };
        assert!(split_outputs(&batch, Vec::new()).is_err());
    }
}

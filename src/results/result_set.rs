use std::collections::HashMap;
use std::sync::Arc;

use super::from_row::FromRow;
use super::row::{CustomDbRow, column_index};
use crate::error::QueryBuilderError;
use crate::types::RowValues;

/// A result set from a database query
///
/// This struct represents one tabular result of a command, containing the rows and the
/// column metadata. A command that returns several result sets yields one `ResultSet` each.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// The rows returned by the query
    pub results: Vec<CustomDbRow>,
    /// The number of rows affected (for DML statements) or read
    pub rows_affected: usize,
    /// Column names shared by all rows (to avoid duplicating in each row)
    column_names: Option<Arc<Vec<String>>>,
    column_index_cache: Option<Arc<HashMap<String, usize>>>,
}

impl ResultSet {
    /// Create a new result set with a known capacity
    #[must_use]
    pub fn with_capacity(capacity: usize) -> ResultSet {
        ResultSet {
            results: Vec::with_capacity(capacity),
            rows_affected: 0,
            column_names: None,
            column_index_cache: None,
        }
    }

    /// Create an empty result set with the given columns.
    #[must_use]
    pub fn with_columns(column_names: Vec<String>) -> ResultSet {
        let mut set = ResultSet::default();
        set.set_column_names(Arc::new(column_names));
        set
    }

    /// Set the column names for this result set (to be shared by all rows)
    pub fn set_column_names(&mut self, column_names: Arc<Vec<String>>) {
        self.column_index_cache = Some(column_index(&column_names));
        self.column_names = Some(column_names);
    }

    /// Get the column names for this result set
    #[must_use]
    pub fn get_column_names(&self) -> Option<&Arc<Vec<String>>> {
        self.column_names.as_ref()
    }

    /// Add a row to the result set
    ///
    /// # Errors
    ///
    /// Returns `QueryBuilderError::ExecutionError` if no column names were set, or
    /// `TableShape` if the value count differs from the column count.
    pub fn add_row_values(&mut self, row_values: Vec<RowValues>) -> Result<(), QueryBuilderError> {
        let (Some(column_names), Some(cache)) = (&self.column_names, &self.column_index_cache)
        else {
            return Err(QueryBuilderError::ExecutionError(
                "No column names available".to_string(),
            ));
        };
        if row_values.len() != column_names.len() {
            return Err(QueryBuilderError::TableShape {
                expected: column_names.len(),
                found: row_values.len(),
            });
        }

        self.results.push(CustomDbRow {
            column_names: column_names.clone(),
            rows: row_values,
            column_index_cache: cache.clone(),
        });
        self.rows_affected += 1;
        Ok(())
    }

    /// Add a row to the result set
    pub fn add_row(&mut self, row: CustomDbRow) {
        // If column names haven't been set yet, use the ones from this row
        if self.column_names.is_none() {
            self.column_index_cache = Some(row.column_index_cache.clone());
            self.column_names = Some(row.column_names.clone());
        }

        self.results.push(row);
        self.rows_affected += 1;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Map every row into `T`.
    ///
    /// # Errors
    ///
    /// Returns the first row mapping error.
    pub fn map_rows<T: FromRow>(&self) -> Result<Vec<T>, QueryBuilderError> {
        self.results.iter().map(T::from_row).collect()
    }
}

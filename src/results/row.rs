use std::collections::HashMap;
use std::sync::Arc;

use crate::error::QueryBuilderError;
use crate::types::{FromRowValue, RowValues};

/// A row from a database query result
///
/// This struct represents a single row from a database query result,
/// with access to both the column names and the values.
#[derive(Debug, Clone)]
pub struct CustomDbRow {
    /// The column names for this row (shared across all rows in a result set)
    pub column_names: Arc<Vec<String>>,
    /// The values for this row
    pub rows: Vec<RowValues>,
    // Shared with every row of the same result set
    #[doc(hidden)]
    pub(crate) column_index_cache: Arc<HashMap<String, usize>>,
}

pub(crate) fn column_index(column_names: &[String]) -> Arc<HashMap<String, usize>> {
    Arc::new(
        column_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect(),
    )
}

impl CustomDbRow {
    /// Create a new database row
    ///
    /// # Arguments
    ///
    /// * `column_names` - The column names
    /// * `rows` - The values for this row
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, rows: Vec<RowValues>) -> Self {
        let cache = column_index(&column_names);
        Self {
            column_names,
            rows,
            column_index_cache: cache,
        }
    }

    /// Get the index of a column by name
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        if let Some(&idx) = self.column_index_cache.get(column_name) {
            return Some(idx);
        }

        // SQL Server column names compare case-insensitively under the default collation
        self.column_names
            .iter()
            .position(|col| col.eq_ignore_ascii_case(column_name))
    }

    /// Get a value from the row by column name
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&RowValues> {
        self.get_column_index(column_name)
            .and_then(|idx| self.rows.get(idx))
    }

    /// Get a value from the row by column index
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.rows.get(index)
    }

    /// Get a value by column name converted into `T`.
    ///
    /// # Errors
    ///
    /// Returns `QueryBuilderError::DecodeError` if the column is missing or the value
    /// cannot be converted.
    pub fn get_as<T: FromRowValue>(&self, column_name: &str) -> Result<T, QueryBuilderError> {
        let value = self.get(column_name).ok_or_else(|| {
            QueryBuilderError::DecodeError(format!("column '{column_name}' not found"))
        })?;
        T::from_row_value(value).map_err(|e| {
            QueryBuilderError::DecodeError(format!("column '{column_name}': {e}"))
        })
    }

    /// Number of values in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

//! In-memory tabular data for table-valued parameters.
//!
//! A [`Table`] is an ordered list of column names plus rows whose width always equals
//! the column count. Records become rows through [`TableRecord`], usually implemented
//! with [`table_record!`](crate::table_record).

mod builder;

pub use builder::TableBuilder;

use crate::error::QueryBuilderError;
use crate::types::RowValues;

/// Ordered columns and positional rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<RowValues>>,
}

impl Table {
    #[must_use]
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row.
    ///
    /// # Errors
    ///
    /// Returns `QueryBuilderError::TableShape` if the row width differs from the column count.
    pub fn push_row(&mut self, row: Vec<RowValues>) -> Result<(), QueryBuilderError> {
        if row.len() != self.columns.len() {
            return Err(QueryBuilderError::TableShape {
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Single-column table with one row per value.
    #[must_use]
    pub fn from_values<V, I>(column: impl Into<String>, values: I) -> Self
    where
        V: Into<RowValues>,
        I: IntoIterator<Item = V>,
    {
        Self {
            columns: vec![column.into()],
            rows: values.into_iter().map(|v| vec![v.into()]).collect(),
        }
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<RowValues>] {
        &self.rows
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A record type with a fixed column layout.
///
/// `columns()` and `values()` must agree in length and order.
pub trait TableRecord {
    fn columns() -> &'static [&'static str];

    fn values(&self) -> Vec<RowValues>;
}

/// Implement [`TableRecord`] for a struct by listing its fields in column order.
///
/// A field becomes a column named after the field unless a `=> "Name"` rename follows it.
/// Field types must be `Clone + Into<RowValues>`.
///
/// ```rust
/// use mssql_query_builder::{table_record, table::TableRecord};
///
/// struct Line {
///     sku: String,
///     qty: i32,
/// }
///
/// table_record!(Line { sku => "Sku", qty => "Quantity" });
///
/// assert_eq!(Line::columns(), &["Sku", "Quantity"]);
/// ```
#[macro_export]
macro_rules! table_record {
    (@column $field:ident $column:literal) => {
        $column
    };
    (@column $field:ident) => {
        stringify!($field)
    };
    ($ty:ty { $($field:ident $(=> $column:literal)?),+ $(,)? }) => {
        impl $crate::table::TableRecord for $ty {
            fn columns() -> &'static [&'static str] {
                &[$($crate::table_record!(@column $field $($column)?)),+]
            }

            fn values(&self) -> Vec<$crate::types::RowValues> {
                vec![$($crate::types::RowValues::from(self.$field.clone())),+]
            }
        }
    };
}

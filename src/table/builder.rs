use super::{Table, TableRecord};
use crate::error::QueryBuilderError;

/// Fluent builder for a [`Table`].
///
/// Shape problems are remembered and reported by [`build`](TableBuilder::build), so the
/// chain itself never fails halfway.
#[derive(Debug, Default)]
pub struct TableBuilder {
    table: Table,
    error: Option<QueryBuilderError>,
}

impl TableBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one column declaration.
    #[must_use]
    pub fn with_column(mut self, name: impl Into<String>) -> Self {
        self.table.columns.push(name.into());
        self
    }

    /// Append the columns of `T` in declaration order. The records are only used to name `T`.
    #[must_use]
    pub fn with_columns_from_data<T: TableRecord>(mut self, _records: &[T]) -> Self {
        self.table
            .columns
            .extend(T::columns().iter().map(|c| (*c).to_string()));
        self
    }

    /// Append one row per record, positionally against the declared columns.
    ///
    /// The declared column count must equal `T`'s width; otherwise no rows are added and
    /// `build` returns `TableShape`.
    #[must_use]
    pub fn with_data<T: TableRecord>(mut self, records: &[T]) -> Self {
        if self.error.is_some() {
            return self;
        }
        let width = T::columns().len();
        if width != self.table.column_count() {
            self.error = Some(QueryBuilderError::TableShape {
                expected: self.table.column_count(),
                found: width,
            });
            return self;
        }
        for record in records {
            if let Err(e) = self.table.push_row(record.values()) {
                self.error = Some(e);
                break;
            }
        }
        self
    }

    /// Columns and rows from the same records.
    #[must_use]
    pub fn from_list<T: TableRecord>(self, records: &[T]) -> Self {
        self.with_columns_from_data(records).with_data(records)
    }

    /// # Errors
    ///
    /// Returns the first shape error recorded by the chain.
    pub fn build(self) -> Result<Table, QueryBuilderError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.table),
        }
    }
}

//! Helper utilities for testing and development.

use crate::results::CustomDbRow;
use crate::types::RowValues;
use std::sync::Arc;

/// Create a test row with the given column names and values.
///
/// This is a utility function to help with testing row mapping without a
/// database round trip.
#[must_use]
pub fn create_test_row(column_names: Vec<String>, values: Vec<RowValues>) -> CustomDbRow {
    CustomDbRow::new(Arc::new(column_names), values)
}

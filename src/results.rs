//! Result rows, result sets, and row mapping.

mod from_row;
mod result_set;
mod row;

pub use from_row::{FromRow, deserialize_row};
pub use result_set::ResultSet;
pub use row::CustomDbRow;

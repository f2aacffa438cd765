use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};

use super::row::CustomDbRow;
use crate::error::QueryBuilderError;
use crate::types::{FromRowValue, RowValues};

/// Map one result row into a Rust value.
///
/// Implemented for [`CustomDbRow`] (the untyped row), for scalars and `Option` of scalars
/// (read from the first column), and for tuples (read positionally). Structs map by column
/// name through serde with [`impl_from_row_deserialize!`](crate::impl_from_row_deserialize).
pub trait FromRow: Sized {
    /// # Errors
    ///
    /// Returns `QueryBuilderError::DecodeError` if the row cannot be converted.
    fn from_row(row: &CustomDbRow) -> Result<Self, QueryBuilderError>;
}

impl FromRow for CustomDbRow {
    fn from_row(row: &CustomDbRow) -> Result<Self, QueryBuilderError> {
        Ok(row.clone())
    }
}

fn column_value(row: &CustomDbRow, idx: usize) -> Result<&RowValues, QueryBuilderError> {
    row.get_by_index(idx).ok_or_else(|| {
        QueryBuilderError::DecodeError(format!(
            "row has {} column(s), column {idx} requested",
            row.len()
        ))
    })
}

macro_rules! impl_from_row_scalar {
    ($($t:ty),+ $(,)?) => {
        $(
            impl FromRow for $t {
                fn from_row(row: &CustomDbRow) -> Result<Self, QueryBuilderError> {
                    <$t>::from_row_value(column_value(row, 0)?)
                }
            }

            impl FromRow for Option<$t> {
                fn from_row(row: &CustomDbRow) -> Result<Self, QueryBuilderError> {
                    <Option<$t>>::from_row_value(column_value(row, 0)?)
                }
            }
        )+
    };
}

impl_from_row_scalar!(
    i8, i16, i32, i64, u8, u16, u32, u64, usize, f32, f64, bool, String, NaiveDateTime,
    Vec<u8>, JsonValue, RowValues,
);

macro_rules! impl_from_row_tuple {
    ($(($($name:ident : $idx:tt),+)),+ $(,)?) => {
        $(
            impl<$($name: FromRowValue),+> FromRow for ($($name,)+) {
                fn from_row(row: &CustomDbRow) -> Result<Self, QueryBuilderError> {
                    Ok(($($name::from_row_value(column_value(row, $idx)?)?,)+))
                }
            }
        )+
    };
}

impl_from_row_tuple!(
    (A: 0, B: 1),
    (A: 0, B: 1, C: 2),
    (A: 0, B: 1, C: 2, D: 3),
    (A: 0, B: 1, C: 2, D: 3, E: 4),
);

/// Deserialize a row into `T` by column name.
///
/// Column names become object keys; values go through [`RowValues::to_json`].
///
/// # Errors
///
/// Returns `QueryBuilderError::DecodeError` if serde rejects the row.
pub fn deserialize_row<T: DeserializeOwned>(row: &CustomDbRow) -> Result<T, QueryBuilderError> {
    let object: Map<String, JsonValue> = row
        .column_names
        .iter()
        .zip(&row.rows)
        .map(|(name, value)| (name.clone(), value.to_json()))
        .collect();
    serde_json::from_value(JsonValue::Object(object))
        .map_err(|e| QueryBuilderError::DecodeError(format!("row deserialization failed: {e}")))
}

/// Implement [`FromRow`] for `serde::Deserialize` types, mapping columns to fields by name.
///
/// ```rust
/// use mssql_query_builder::impl_from_row_deserialize;
///
/// #[derive(serde::Deserialize)]
/// struct Customer {
///     id: i64,
///     name: String,
/// }
///
/// impl_from_row_deserialize!(Customer);
/// ```
#[macro_export]
macro_rules! impl_from_row_deserialize {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::results::FromRow for $ty {
                fn from_row(
                    row: &$crate::results::CustomDbRow,
                ) -> Result<Self, $crate::error::QueryBuilderError> {
                    $crate::results::deserialize_row(row)
                }
            }
        )+
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::create_test_row;

    #[derive(Debug, serde::Deserialize, PartialEq)]
    struct Forecast {
        #[serde(rename = "TemperatureC")]
        temperature_c: i32,
        #[serde(rename = "Summary")]
        summary: Option<String>,
    }

    impl_from_row_deserialize!(Forecast);

    fn forecast_row(summary: RowValues) -> CustomDbRow {
        create_test_row(
            vec!["TemperatureC".into(), "Summary".into()],
            vec![RowValues::Int(21), summary],
        )
    }

    #[test]
    fn scalar_reads_first_column() {
        let row = forecast_row(RowValues::Text("Mild".into()));
        assert_eq!(i32::from_row(&row).unwrap(), 21);
        assert!(String::from_row(&row).is_err());
    }

    #[test]
    fn tuple_reads_positionally() {
        let row = forecast_row(RowValues::Null);
        let (temp, summary) = <(i64, Option<String>)>::from_row(&row).unwrap();
        assert_eq!(temp, 21);
        assert_eq!(summary, None);
        assert!(<(i64, String, bool)>::from_row(&row).is_err());
    }

    #[test]
    fn struct_maps_by_column_name() {
        let row = forecast_row(RowValues::Text("Warm".into()));
        assert_eq!(
            Forecast::from_row(&row).unwrap(),
            Forecast {
                temperature_c: 21,
                summary: Some("Warm".into()),
            }
        );
    }
}

use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

use crate::error::QueryBuilderError;

/// Values that can be bound as parameters, stored in table-valued parameter cells, or read
/// back from a result row.
///
/// Most Rust scalars convert with `Into`:
/// ```rust
/// use mssql_query_builder::prelude::*;
///
/// let params: Vec<RowValues> = vec![1.into(), "alice".into(), true.into(), None::<i32>.into()];
/// assert!(params[3].is_null());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

/// The shape of a [`RowValues`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Int,
    Float,
    Text,
    Bool,
    Timestamp,
    Null,
    Json,
    Blob,
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            RowValues::Int(_) => ValueKind::Int,
            RowValues::Float(_) => ValueKind::Float,
            RowValues::Text(_) => ValueKind::Text,
            RowValues::Bool(_) => ValueKind::Bool,
            RowValues::Timestamp(_) => ValueKind::Timestamp,
            RowValues::Null => ValueKind::Null,
            RowValues::JSON(_) => ValueKind::Json,
            RowValues::Blob(_) => ValueKind::Blob,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let RowValues::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let RowValues::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            // SQL Server renders datetime2 as "YYYY-MM-DD HH:MM:SS.fffffff"
            for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
                if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
                    return Some(dt);
                }
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            RowValues::Float(value) => Some(*value),
            #[allow(clippy::cast_precision_loss)]
            RowValues::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// Convert into a JSON value; used for by-name row deserialization.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            RowValues::Int(i) => JsonValue::from(*i),
            RowValues::Float(f) => serde_json::Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
            RowValues::Text(s) => JsonValue::String(s.clone()),
            RowValues::Bool(b) => JsonValue::Bool(*b),
            RowValues::Timestamp(dt) => {
                JsonValue::String(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
            }
            RowValues::Null => JsonValue::Null,
            RowValues::JSON(v) => v.clone(),
            RowValues::Blob(bytes) => JsonValue::from(bytes.clone()),
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),+) => {
        $(
            impl From<$t> for RowValues {
                fn from(value: $t) -> Self {
                    RowValues::Int(i64::from(value))
                }
            }
        )+
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for RowValues {
    fn from(value: f32) -> Self {
        RowValues::Float(f64::from(value))
    }
}

impl From<f64> for RowValues {
    fn from(value: f64) -> Self {
        RowValues::Float(value)
    }
}

impl From<bool> for RowValues {
    fn from(value: bool) -> Self {
        RowValues::Bool(value)
    }
}

impl From<&str> for RowValues {
    fn from(value: &str) -> Self {
        RowValues::Text(value.to_string())
    }
}

impl From<String> for RowValues {
    fn from(value: String) -> Self {
        RowValues::Text(value)
    }
}

impl From<NaiveDateTime> for RowValues {
    fn from(value: NaiveDateTime) -> Self {
        RowValues::Timestamp(value)
    }
}

impl From<Vec<u8>> for RowValues {
    fn from(value: Vec<u8>) -> Self {
        RowValues::Blob(value)
    }
}

impl From<JsonValue> for RowValues {
    fn from(value: JsonValue) -> Self {
        RowValues::JSON(value)
    }
}

impl<T> From<Option<T>> for RowValues
where
    T: Into<RowValues>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(RowValues::Null, Into::into)
    }
}

/// Convert a single [`RowValues`] into a Rust type.
///
/// NULL only converts into `Option<T>` (as `None`) or [`RowValues`] itself.
pub trait FromRowValue: Sized {
    /// # Errors
    ///
    /// Returns `QueryBuilderError::DecodeError` when the value has an incompatible kind or
    /// does not fit the target type.
    fn from_row_value(value: &RowValues) -> Result<Self, QueryBuilderError>;
}

fn mismatch<T>(value: &RowValues, target: &str) -> Result<T, QueryBuilderError> {
    Err(QueryBuilderError::DecodeError(format!(
        "cannot convert {:?} value into {target}",
        value.kind()
    )))
}

impl FromRowValue for RowValues {
    fn from_row_value(value: &RowValues) -> Result<Self, QueryBuilderError> {
        Ok(value.clone())
    }
}

impl FromRowValue for i64 {
    fn from_row_value(value: &RowValues) -> Result<Self, QueryBuilderError> {
        match value {
            RowValues::Int(i) => Ok(*i),
            RowValues::Bool(b) => Ok(i64::from(*b)),
            other => mismatch(other, "i64"),
        }
    }
}

macro_rules! impl_from_row_value_narrow_int {
    ($($t:ty),+) => {
        $(
            impl FromRowValue for $t {
                fn from_row_value(value: &RowValues) -> Result<Self, QueryBuilderError> {
                    let wide = i64::from_row_value(value)?;
                    <$t>::try_from(wide).map_err(|e| {
                        QueryBuilderError::DecodeError(format!(
                            "value {wide} does not fit {}: {e}",
                            stringify!($t)
                        ))
                    })
                }
            }
        )+
    };
}

impl_from_row_value_narrow_int!(i8, i16, i32, u8, u16, u32, u64, usize);

impl FromRowValue for f64 {
    fn from_row_value(value: &RowValues) -> Result<Self, QueryBuilderError> {
        value.as_float().map_or_else(|| mismatch(value, "f64"), Ok)
    }
}

impl FromRowValue for f32 {
    #[allow(clippy::cast_possible_truncation)]
    fn from_row_value(value: &RowValues) -> Result<Self, QueryBuilderError> {
        f64::from_row_value(value).map(|f| f as f32)
    }
}

impl FromRowValue for bool {
    fn from_row_value(value: &RowValues) -> Result<Self, QueryBuilderError> {
        value.as_bool().copied().map_or_else(|| mismatch(value, "bool"), Ok)
    }
}

impl FromRowValue for String {
    fn from_row_value(value: &RowValues) -> Result<Self, QueryBuilderError> {
        match value {
            RowValues::Text(s) => Ok(s.clone()),
            RowValues::JSON(v) => Ok(v.to_string()),
            other => mismatch(other, "String"),
        }
    }
}

impl FromRowValue for NaiveDateTime {
    fn from_row_value(value: &RowValues) -> Result<Self, QueryBuilderError> {
        value
            .as_timestamp()
            .map_or_else(|| mismatch(value, "NaiveDateTime"), Ok)
    }
}

impl FromRowValue for Vec<u8> {
    fn from_row_value(value: &RowValues) -> Result<Self, QueryBuilderError> {
        value
            .as_blob()
            .map(<[u8]>::to_vec)
            .map_or_else(|| mismatch(value, "Vec<u8>"), Ok)
    }
}

impl FromRowValue for JsonValue {
    fn from_row_value(value: &RowValues) -> Result<Self, QueryBuilderError> {
        match value {
            RowValues::JSON(v) => Ok(v.clone()),
            RowValues::Text(s) => serde_json::from_str(s)
                .map_err(|e| QueryBuilderError::DecodeError(format!("invalid JSON text: {e}"))),
            other => Ok(other.to_json()),
        }
    }
}

impl<T> FromRowValue for Option<T>
where
    T: FromRowValue,
{
    fn from_row_value(value: &RowValues) -> Result<Self, QueryBuilderError> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_row_value(value).map(Some)
        }
    }
}

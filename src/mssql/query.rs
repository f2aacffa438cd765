use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use futures_util::TryStreamExt;
use tiberius::{ColumnData, FromSql, Query, QueryItem, QueryStream};

use crate::error::QueryBuilderError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Bind parameters directly to the query for SQL Server
/// Return a query builder with parameters already bound
pub fn bind_query_params<'a>(query: &'a str, params: &[RowValues]) -> Query<'a> {
    let mut query_builder = Query::new(query);

    for param in params {
        match param {
            RowValues::Int(i) => query_builder.bind(*i),
            RowValues::Float(f) => query_builder.bind(*f),
            RowValues::Text(s) => query_builder.bind(s.clone()),
            RowValues::Bool(b) => query_builder.bind(*b),
            RowValues::Timestamp(dt) => query_builder.bind(*dt),
            RowValues::Null => query_builder.bind(Option::<String>::None),
            RowValues::JSON(jsval) => query_builder.bind(jsval.to_string()),
            RowValues::Blob(bytes) => query_builder.bind(bytes.clone()),
        }
    }

    query_builder
}

/// Drain `stream` into one [`ResultSet`] per row-returning statement.
///
/// A statement that returns no rows still produces a set with its column names.
///
/// # Errors
/// Returns `QueryBuilderError::ExecutionError` if the server reports an error mid-stream,
/// or `DecodeError` if a column value cannot be read.
pub async fn collect_result_sets(
    mut stream: QueryStream<'_>,
) -> Result<Vec<ResultSet>, QueryBuilderError> {
    let mut sets: Vec<ResultSet> = Vec::new();

    while let Some(item) = stream.try_next().await.map_err(|e| {
        QueryBuilderError::ExecutionError(format!("SQL Server row fetch error: {e}"))
    })? {
        match item {
            QueryItem::Metadata(meta) => {
                let names = meta
                    .columns()
                    .iter()
                    .map(|col| col.name().to_string())
                    .collect();
                sets.push(ResultSet::with_columns(names));
            }
            QueryItem::Row(row) => {
                let set = sets.last_mut().ok_or_else(|| {
                    QueryBuilderError::ExecutionError(
                        "row received before column metadata".to_string(),
                    )
                })?;
                let values = row
                    .into_iter()
                    .map(extract_value)
                    .collect::<Result<Vec<_>, _>>()?;
                set.add_row_values(values)?;
            }
        }
    }

    Ok(sets)
}

fn decode_error(e: tiberius::error::Error) -> QueryBuilderError {
    QueryBuilderError::DecodeError(format!("SQL Server value decode error: {e}"))
}

fn numeric_to_f64(value: tiberius::numeric::Numeric) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let unscaled = value.value() as f64;
    unscaled / 10f64.powi(i32::from(value.scale()))
}

/// Convert one column value into [`RowValues`].
fn extract_value(data: ColumnData<'static>) -> Result<RowValues, QueryBuilderError> {
    let value = match data {
        ColumnData::U8(v) => v.map(|v| RowValues::Int(i64::from(v))),
        ColumnData::I16(v) => v.map(|v| RowValues::Int(i64::from(v))),
        ColumnData::I32(v) => v.map(|v| RowValues::Int(i64::from(v))),
        ColumnData::I64(v) => v.map(RowValues::Int),
        ColumnData::F32(v) => v.map(|v| RowValues::Float(f64::from(v))),
        ColumnData::F64(v) => v.map(RowValues::Float),
        ColumnData::Bit(v) => v.map(RowValues::Bool),
        ColumnData::String(v) => v.map(|s| RowValues::Text(s.into_owned())),
        ColumnData::Guid(v) => v.map(|g| RowValues::Text(g.to_string())),
        ColumnData::Binary(v) => v.map(|b| RowValues::Blob(b.into_owned())),
        ColumnData::Numeric(v) => v.map(|n| RowValues::Float(numeric_to_f64(n))),
        ColumnData::Xml(v) => v.map(|x| RowValues::Text(x.into_owned().into_string())),
        ColumnData::DateTime(_) | ColumnData::SmallDateTime(_) | ColumnData::DateTime2(_) => {
            NaiveDateTime::from_sql(&data)
                .map_err(decode_error)?
                .map(RowValues::Timestamp)
        }
        ColumnData::Date(_) => NaiveDate::from_sql(&data)
            .map_err(decode_error)?
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(RowValues::Timestamp),
        ColumnData::Time(_) => NaiveTime::from_sql(&data)
            .map_err(decode_error)?
            .map(|t| RowValues::Text(t.format("%H:%M:%S%.f").to_string())),
        ColumnData::DateTimeOffset(_) => DateTime::<FixedOffset>::from_sql(&data)
            .map_err(decode_error)?
            .map(|dt| RowValues::Text(dt.to_rfc3339())),
    };
    Ok(value.unwrap_or(RowValues::Null))
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::*;

    #[test]
    fn integers_widen_to_int() {
        assert_eq!(extract_value(ColumnData::U8(Some(7))).unwrap(), RowValues::Int(7));
        assert_eq!(extract_value(ColumnData::I16(Some(-3))).unwrap(), RowValues::Int(-3));
        assert_eq!(extract_value(ColumnData::I32(None)).unwrap(), RowValues::Null);
    }

    #[test]
    fn strings_and_bits() {
        assert_eq!(
            extract_value(ColumnData::String(Some(Cow::Borrowed("abc")))).unwrap(),
            RowValues::Text("abc".to_string())
        );
        assert_eq!(extract_value(ColumnData::Bit(Some(true))).unwrap(), RowValues::Bool(true));
    }

    #[test]
    fn numeric_applies_scale() {
        let value = tiberius::numeric::Numeric::new_with_scale(12345, 2);
        assert_eq!(
            extract_value(ColumnData::Numeric(Some(value))).unwrap(),
            RowValues::Float(123.45)
        );
    }
}

use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

use crate::types::{RowValues, ValueKind};

/// Declared database type of a parameter.
///
/// Each variant maps to one SQL Server type used when the parameter is declared in the
/// rendered batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DbType {
    AnsiString,
    Binary,
    Boolean,
    Byte,
    Date,
    DateTime,
    DateTime2,
    DateTimeOffset,
    Decimal,
    Double,
    Guid,
    Int16,
    Int32,
    Int64,
    Single,
    String,
    Time,
    Xml,
}

impl DbType {
    /// The SQL Server type name used in `DECLARE` statements.
    #[must_use]
    pub fn sql_type_name(self) -> &'static str {
        match self {
            DbType::AnsiString => "varchar(max)",
            DbType::Binary => "varbinary(max)",
            DbType::Boolean => "bit",
            DbType::Byte => "tinyint",
            DbType::Date => "date",
            DbType::DateTime => "datetime",
            DbType::DateTime2 => "datetime2",
            DbType::DateTimeOffset => "datetimeoffset",
            DbType::Decimal => "decimal(38, 10)",
            DbType::Double => "float",
            DbType::Guid => "uniqueidentifier",
            DbType::Int16 => "smallint",
            DbType::Int32 => "int",
            DbType::Int64 => "bigint",
            DbType::Single => "real",
            DbType::String => "nvarchar(max)",
            DbType::Time => "time",
            DbType::Xml => "xml",
        }
    }

    /// Lookup table from value kind to declared type. NULL has no type of its own.
    #[must_use]
    pub fn for_kind(kind: ValueKind) -> Option<DbType> {
        match kind {
            ValueKind::Int => Some(DbType::Int64),
            ValueKind::Float => Some(DbType::Double),
            ValueKind::Text | ValueKind::Json => Some(DbType::String),
            ValueKind::Bool => Some(DbType::Boolean),
            ValueKind::Timestamp => Some(DbType::DateTime2),
            ValueKind::Blob => Some(DbType::Binary),
            ValueKind::Null => None,
        }
    }

    #[must_use]
    pub fn for_value(value: &RowValues) -> Option<DbType> {
        DbType::for_kind(value.kind())
    }
}

/// Rust value types with a fixed declared database type.
///
/// Used by output parameters so the declared type is chosen when the builder call is
/// written, not guessed from a runtime value.
pub trait SqlTyped: Into<RowValues> {
    const DB_TYPE: DbType;
}

macro_rules! impl_sql_typed {
    ($($t:ty => $db:expr),+ $(,)?) => {
        $(
            impl SqlTyped for $t {
                const DB_TYPE: DbType = $db;
            }
        )+
    };
}

impl_sql_typed!(
    u8 => DbType::Byte,
    i8 => DbType::Int16,
    i16 => DbType::Int16,
    u16 => DbType::Int32,
    i32 => DbType::Int32,
    u32 => DbType::Int64,
    i64 => DbType::Int64,
    f32 => DbType::Single,
    f64 => DbType::Double,
    bool => DbType::Boolean,
    String => DbType::String,
    &str => DbType::String,
    NaiveDateTime => DbType::DateTime2,
    Vec<u8> => DbType::Binary,
    JsonValue => DbType::String,
);

impl<T: SqlTyped> SqlTyped for Option<T> {
    const DB_TYPE: DbType = T::DB_TYPE;
}

//! Parameter descriptors, their fluent builder, and the ordered parameter collection.

mod db_type;

pub use db_type::{DbType, SqlTyped};

use crate::error::QueryBuilderError;
use crate::table::Table;
use crate::types::{FromRowValue, RowValues};

/// Direction of a parameter relative to the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParameterDirection {
    #[default]
    Input,
    Output,
    InputOutput,
    ReturnValue,
}

impl ParameterDirection {
    /// Whether the parameter's value is sent to the server.
    #[must_use]
    pub fn sends_value(self) -> bool {
        matches!(self, ParameterDirection::Input | ParameterDirection::InputOutput)
    }

    /// Whether the server writes the parameter back.
    #[must_use]
    pub fn reads_back(self) -> bool {
        !matches!(self, ParameterDirection::Input)
    }
}

/// A table-valued parameter: rows plus the user-defined table type they are declared as.
#[derive(Debug, Clone, PartialEq)]
pub struct TableValue {
    type_name: String,
    table: Table,
}

impl TableValue {
    #[must_use]
    pub fn new(type_name: impl Into<String>, table: Table) -> Self {
        Self {
            type_name: type_name.into(),
            table,
        }
    }

    /// The user-defined table type, e.g. `dbo.id_list`.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub fn table(&self) -> &Table {
        &self.table
    }
}

/// Value carried by a [`Parameter`].
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Scalar(RowValues),
    Table(TableValue),
}

impl ParamValue {
    #[must_use]
    pub fn as_scalar(&self) -> Option<&RowValues> {
        match self {
            ParamValue::Scalar(value) => Some(value),
            ParamValue::Table(_) => None,
        }
    }

    #[must_use]
    pub fn as_table(&self) -> Option<&TableValue> {
        match self {
            ParamValue::Table(value) => Some(value),
            ParamValue::Scalar(_) => None,
        }
    }
}

impl Default for ParamValue {
    fn default() -> Self {
        ParamValue::Scalar(RowValues::Null)
    }
}

impl<T: Into<RowValues>> From<T> for ParamValue {
    fn from(value: T) -> Self {
        ParamValue::Scalar(value.into())
    }
}

impl From<TableValue> for ParamValue {
    fn from(value: TableValue) -> Self {
        ParamValue::Table(value)
    }
}

/// Strip the prefix characters callers commonly write in front of a parameter name.
///
/// `"@Id"`, `":Id"` and `"Id"` all name the same parameter.
#[must_use]
pub fn clean_name(name: &str) -> &str {
    name.strip_prefix(['@', ':', '?']).unwrap_or(name)
}

/// A named parameter: value, direction and optional declared type.
///
/// Built with [`ParamBuilder`] or [`Parameter::new`]; immutable once built. The stored
/// name never carries the leading `@`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Parameter {
    name: String,
    value: ParamValue,
    direction: Option<ParameterDirection>,
    db_type: Option<DbType>,
}

impl Parameter {
    #[must_use]
    pub fn new(
        name: impl AsRef<str>,
        value: impl Into<ParamValue>,
        direction: Option<ParameterDirection>,
        db_type: Option<DbType>,
    ) -> Self {
        Self {
            name: clean_name(name.as_ref()).to_string(),
            value: value.into(),
            direction,
            db_type,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn value(&self) -> &ParamValue {
        &self.value
    }

    #[must_use]
    pub fn direction(&self) -> Option<ParameterDirection> {
        self.direction
    }

    /// Direction with the `Input` default applied.
    #[must_use]
    pub fn effective_direction(&self) -> ParameterDirection {
        self.direction.unwrap_or_default()
    }

    #[must_use]
    pub fn db_type(&self) -> Option<DbType> {
        self.db_type
    }
}

/// Fluent builder for a [`Parameter`]. No validation happens here; a bad name surfaces
/// when the command is executed.
///
/// ```rust
/// use mssql_query_builder::prelude::*;
///
/// let param = ParamBuilder::new().name("@Name").value(2).build();
/// assert_eq!(param.name(), "Name");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ParamBuilder {
    parameter: Parameter,
}

impl ParamBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn name(mut self, name: impl AsRef<str>) -> Self {
        self.parameter.name = clean_name(name.as_ref()).to_string();
        self
    }

    #[must_use]
    pub fn value(mut self, value: impl Into<RowValues>) -> Self {
        self.parameter.value = ParamValue::Scalar(value.into());
        self
    }

    /// Use a table as the parameter value.
    #[must_use]
    pub fn table_value(mut self, type_name: impl Into<String>, table: Table) -> Self {
        self.parameter.value = ParamValue::Table(TableValue::new(type_name, table));
        self
    }

    #[must_use]
    pub fn direction(mut self, direction: ParameterDirection) -> Self {
        self.parameter.direction = Some(direction);
        self
    }

    #[must_use]
    pub fn db_type(mut self, db_type: DbType) -> Self {
        self.parameter.db_type = Some(db_type);
        self
    }

    #[must_use]
    pub fn build(self) -> Parameter {
        self.parameter
    }
}

/// Ordered parameter collection keyed by name.
///
/// Adding a name that already exists replaces the earlier parameter in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    entries: Vec<Parameter>,
}

impl Parameters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, parameter: Parameter) {
        match self.position(parameter.name()) {
            Some(idx) => self.entries[idx] = parameter,
            None => self.entries.push(parameter),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        let name = clean_name(name);
        self.entries.iter().position(|p| p.name == name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.position(name).map(|idx| &self.entries[idx])
    }

    /// Current scalar value of `name` converted into `T`.
    ///
    /// # Errors
    ///
    /// Returns `QueryBuilderError::DecodeError` if the parameter is table-valued or its
    /// value cannot be converted.
    pub fn value_as<T: FromRowValue>(&self, name: &str) -> Result<Option<T>, QueryBuilderError> {
        let Some(parameter) = self.get(name) else {
            return Ok(None);
        };
        let value = parameter.value.as_scalar().ok_or_else(|| {
            QueryBuilderError::DecodeError(format!(
                "parameter '{}' is table-valued",
                parameter.name
            ))
        })?;
        T::from_row_value(value).map(Some)
    }

    /// Overwrite the value of an existing parameter, keeping its direction and type.
    pub(crate) fn set_value(&mut self, name: &str, value: RowValues) -> bool {
        match self.position(name) {
            Some(idx) => {
                self.entries[idx].value = ParamValue::Scalar(value);
                true
            }
            None => false,
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(Parameter::name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.entries.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Parameter] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Parameters {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

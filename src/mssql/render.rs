//! Renders a [`Command`] into one T-SQL batch plus positional binds.
//!
//! tiberius sends binds as `@P1..@Pn` through `sp_executesql` and has no table-valued
//! parameter support, so named parameters become local variables declared at the top of
//! the batch and table-valued parameters become table variables of the user-defined type,
//! filled with `INSERT ... VALUES` before the command runs. Output values come back in a
//! trailing result set.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use crate::driver::{Command, ExecMode};
use crate::error::QueryBuilderError;
use crate::parameter::{DbType, ParamValue, Parameter, ParameterDirection, TableValue};
use crate::query::CommandKind;
use crate::types::RowValues;

/// SQL Server accepts at most 2100 parameters per request, and `sp_executesql` takes two
/// of them for `@stmt` and `@params`.
pub const MAX_BIND_PARAMETERS: usize = 2098;
/// SQL Server accepts at most 1000 rows in one `VALUES` list.
pub const MAX_ROWS_PER_INSERT: usize = 1000;

const ROW_COUNT_VARIABLE: &str = "__qb_rowcount";
const RESERVED_PREFIX: &str = "__qb_";
const UNTYPED_NULL_SQL_TYPE: &str = "nvarchar(4000)";

static PARAMETER_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_#][A-Za-z0-9_@$#]{0,126}$").expect("parameter name pattern is valid")
});

static DRIVER_BIND_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[Pp][0-9]+$").expect("bind name pattern is valid"));

// One to four dot-separated parts, each bare or [bracketed]
static OBJECT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:\[(?:[^\]]|\]\])+\]|[A-Za-z_#@][A-Za-z0-9_@$#]*)(?:\.(?:\[(?:[^\]]|\]\])+\]|[A-Za-z_#@][A-Za-z0-9_@$#]*)){0,3}$",
    )
    .expect("object name pattern is valid")
});

/// A batch ready to hand to tiberius.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedBatch {
    pub sql: String,
    pub binds: Vec<RowValues>,
    /// Parameters read back from the trailing result set, in column order.
    pub outputs: Vec<String>,
    /// The trailing result set ends with `@@ROWCOUNT` of the command.
    pub captures_row_count: bool,
}

impl RenderedBatch {
    /// Whether the last result set of the response belongs to the batch, not the caller.
    #[must_use]
    pub fn has_trailing_set(&self) -> bool {
        !self.outputs.is_empty()
    }

    fn bind(&mut self, value: &RowValues) -> Result<String, QueryBuilderError> {
        if value.is_null() {
            return Ok("NULL".to_string());
        }
        if self.binds.len() == MAX_BIND_PARAMETERS {
            return Err(QueryBuilderError::ParameterError(format!(
                "command needs more than {MAX_BIND_PARAMETERS} bound values"
            )));
        }
        self.binds.push(value.clone());
        Ok(format!("@P{}", self.binds.len()))
    }
}

/// Bracket-quote an identifier.
#[must_use]
pub fn quote_ident(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

fn validate_parameter_name(name: &str) -> Result<(), QueryBuilderError> {
    if name.is_empty() {
        return Err(QueryBuilderError::ParameterError(
            "parameter name must not be empty".to_string(),
        ));
    }
    if !PARAMETER_NAME.is_match(name) {
        return Err(QueryBuilderError::ParameterError(format!(
            "'{name}' is not a valid parameter name"
        )));
    }
    if DRIVER_BIND_NAME.is_match(name) || name.starts_with(RESERVED_PREFIX) {
        return Err(QueryBuilderError::ParameterError(format!(
            "parameter name '{name}' is reserved"
        )));
    }
    Ok(())
}

fn validate_object_name(name: &str, what: &str) -> Result<(), QueryBuilderError> {
    if OBJECT_NAME.is_match(name) {
        Ok(())
    } else {
        Err(QueryBuilderError::ParameterError(format!(
            "'{name}' is not a valid {what} name"
        )))
    }
}

fn scalar_sql_type(parameter: &Parameter, value: &RowValues) -> &'static str {
    match parameter.db_type().or_else(|| DbType::for_value(value)) {
        Some(db_type) => db_type.sql_type_name(),
        None => UNTYPED_NULL_SQL_TYPE,
    }
}

/// Render `command` for `mode`.
///
/// # Errors
///
/// Returns `ConfigError` if the command text is empty, `ParameterError` for invalid names,
/// type names, directions or too many binds, and `TableShape` for ragged tables.
pub fn render(command: &Command<'_>, mode: ExecMode) -> Result<RenderedBatch, QueryBuilderError> {
    let text = command.text.trim();
    if text.is_empty() {
        return Err(QueryBuilderError::ConfigError(
            "the SQL command is not defined".to_string(),
        ));
    }
    if command.kind == CommandKind::StoredProcedure {
        validate_object_name(text, "stored procedure")?;
    }

    let mut batch = RenderedBatch::default();
    if command.parameters.is_empty() {
        batch.sql = match command.kind {
            CommandKind::Text => text.to_string(),
            CommandKind::StoredProcedure => format!("EXEC {text};"),
        };
        return Ok(batch);
    }

    for parameter in command.parameters {
        validate_parameter_name(parameter.name())?;
    }

    let outputs: Vec<&str> = command.output_parameters().map(Parameter::name).collect();
    batch.captures_row_count = mode == ExecMode::NonQuery && !outputs.is_empty();

    let mut sql = String::from("SET NOCOUNT ON;\n");
    if batch.captures_row_count {
        let _ = writeln!(sql, "DECLARE @{ROW_COUNT_VARIABLE} int;");
    }
    for parameter in command.parameters {
        match parameter.value() {
            ParamValue::Scalar(value) => {
                declare_scalar(&mut sql, &mut batch, parameter, value)?;
            }
            ParamValue::Table(table) => declare_table(&mut sql, &mut batch, parameter, table)?,
        }
    }
    sql.push_str("SET NOCOUNT OFF;\n");

    match command.kind {
        CommandKind::Text => {
            sql.push_str(text);
            // A trailing `-- comment` would swallow a terminator on the same line
            if !text.ends_with(';') {
                sql.push_str("\n;");
            }
            sql.push('\n');
        }
        CommandKind::StoredProcedure => render_exec(&mut sql, text, command.parameters)?,
    }

    if !outputs.is_empty() {
        if batch.captures_row_count {
            let _ = writeln!(sql, "SET @{ROW_COUNT_VARIABLE} = @@ROWCOUNT;");
        }
        let mut columns: Vec<String> = outputs
            .iter()
            .map(|name| format!("@{name} AS {}", quote_ident(name)))
            .collect();
        if batch.captures_row_count {
            columns.push(format!(
                "@{ROW_COUNT_VARIABLE} AS {}",
                quote_ident(ROW_COUNT_VARIABLE)
            ));
        }
        let _ = writeln!(sql, "SELECT {};", columns.join(", "));
        batch.outputs = outputs.into_iter().map(str::to_string).collect();
    }

    batch.sql = sql;
    Ok(batch)
}

fn declare_scalar(
    sql: &mut String,
    batch: &mut RenderedBatch,
    parameter: &Parameter,
    value: &RowValues,
) -> Result<(), QueryBuilderError> {
    let name = parameter.name();
    let sql_type = scalar_sql_type(parameter, value);
    if parameter.effective_direction().sends_value() {
        let placeholder = batch.bind(value)?;
        let _ = writeln!(sql, "DECLARE @{name} {sql_type} = {placeholder};");
    } else {
        let _ = writeln!(sql, "DECLARE @{name} {sql_type};");
    }
    Ok(())
}

fn declare_table(
    sql: &mut String,
    batch: &mut RenderedBatch,
    parameter: &Parameter,
    value: &TableValue,
) -> Result<(), QueryBuilderError> {
    let name = parameter.name();
    if parameter.effective_direction() != ParameterDirection::Input {
        return Err(QueryBuilderError::ParameterError(format!(
            "table-valued parameter '{name}' can only be an input"
        )));
    }
    validate_object_name(value.type_name(), "table type")?;
    let table = value.table();
    if table.column_count() == 0 {
        return Err(QueryBuilderError::ParameterError(format!(
            "table-valued parameter '{name}' has no columns"
        )));
    }

    let _ = writeln!(sql, "DECLARE @{name} {};", value.type_name());
    let columns = table
        .columns()
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");

    for chunk in table.rows().chunks(MAX_ROWS_PER_INSERT) {
        let mut tuples = Vec::with_capacity(chunk.len());
        for row in chunk {
            if row.len() != table.column_count() {
                return Err(QueryBuilderError::TableShape {
                    expected: table.column_count(),
                    found: row.len(),
                });
            }
            let cells = row
                .iter()
                .map(|cell| batch.bind(cell))
                .collect::<Result<Vec<_>, _>>()?;
            tuples.push(format!("({})", cells.join(", ")));
        }
        let _ = writeln!(
            sql,
            "INSERT INTO @{name} ({columns}) VALUES {};",
            tuples.join(", ")
        );
    }
    Ok(())
}

fn render_exec(
    sql: &mut String,
    procedure: &str,
    parameters: &[Parameter],
) -> Result<(), QueryBuilderError> {
    let mut return_value = None;
    let mut arguments = Vec::with_capacity(parameters.len());
    for parameter in parameters {
        let name = parameter.name();
        match parameter.effective_direction() {
            ParameterDirection::ReturnValue => {
                if return_value.replace(name).is_some() {
                    return Err(QueryBuilderError::ParameterError(
                        "a stored procedure has only one return value".to_string(),
                    ));
                }
            }
            ParameterDirection::Input => arguments.push(format!("@{name} = @{name}")),
            ParameterDirection::Output | ParameterDirection::InputOutput => {
                arguments.push(format!("@{name} = @{name} OUTPUT"));
            }
        }
    }

    sql.push_str("EXEC ");
    if let Some(name) = return_value {
        let _ = write!(sql, "@{name} = ");
    }
    sql.push_str(procedure);
    if !arguments.is_empty() {
        sql.push(' ');
        sql.push_str(&arguments.join(", "));
    }
    sql.push_str(";\n");
    Ok(())
}

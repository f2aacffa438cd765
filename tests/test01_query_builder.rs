use mssql_query_builder::prelude::*;

#[test]
fn builder_sets_every_field() {
    let query = QueryBuilder::new()
        .with_sql_connection("Server=tcp:localhost,1433;User Id=sa;Password=pw")
        .with_sql_command("SELECT 1")
        .with_timeout(15)
        .with_transaction_execution()
        .build();

    assert_eq!(
        query.sql_connection(),
        Some("Server=tcp:localhost,1433;User Id=sa;Password=pw")
    );
    assert_eq!(query.command_text(), Some("SELECT 1"));
    assert_eq!(query.command_kind(), CommandKind::Text);
    assert_eq!(query.timeout(), Some(15));
    assert!(query.uses_transaction());
    assert!(query.parameters().is_none());
}

#[test]
fn last_call_wins() {
    let query = QueryBuilder::new()
        .with_sql_connection("first")
        .with_sql_connection("second")
        .with_name("dbo.a")
        .with_sql_command("dbo.b")
        .with_command_type_as_stored_procedure()
        .with_command_type_as_function()
        .with_timeout(5)
        .with_timeout(60)
        .build();

    assert_eq!(query.sql_connection(), Some("second"));
    assert_eq!(query.command_text(), Some("dbo.b"));
    assert_eq!(query.command_kind(), CommandKind::Text);
    assert_eq!(query.timeout(), Some(60));
}

#[test]
fn parameters_keep_insertion_order_and_replace_by_name() -> Result<(), QueryBuilderError> {
    let query = QueryBuilder::new()
        .with_parameter("@A", 1)
        .with_parameter("B", "two")
        .with_parameter("@A", 3)
        .build();

    let params = query.parameters().expect("parameters were added");
    assert_eq!(params.names().collect::<Vec<_>>(), vec!["A", "B"]);
    assert_eq!(query.get_parameter_by_name::<i32>("A")?, Some(3));
    assert_eq!(
        query.get_parameter_by_name::<String>("@B")?,
        Some("two".to_string())
    );
    assert_eq!(query.get_parameter_by_name::<i32>("@Missing")?, None);
    Ok(())
}

#[test]
fn optional_parameters() {
    let query = QueryBuilder::new()
        .with_optional_parameter_if(false, "@Skipped", 1)
        .with_optional_parameter_if(true, "@Kept", 2)
        .with_optional_parameter("@None", None::<i32>)
        .with_optional_parameter("@Some", Some("x"))
        .build();

    let names: Vec<&str> = query.parameters().unwrap().names().collect();
    assert_eq!(names, vec!["Kept", "Some"]);
}

#[test]
fn no_parameters_means_no_collection() {
    let query = QueryBuilder::new()
        .with_optional_parameter_if(false, "@Skipped", 1)
        .build();
    assert!(query.parameters().is_none());
}

#[test]
fn typed_and_directed_parameters() {
    let query = QueryBuilder::new()
        .with_parameter_options(
            "@Code",
            "abc",
            Some(DbType::AnsiString),
            Some(ParameterDirection::InputOutput),
        )
        .with_output_parameter("@Total", 0_i32)
        .with_parameter_builder(|p| {
            p.name("@Status")
                .direction(ParameterDirection::ReturnValue)
                .db_type(DbType::Int32)
        })
        .build();

    let params = query.parameters().unwrap();
    let code = params.get("Code").unwrap();
    assert_eq!(code.db_type(), Some(DbType::AnsiString));
    assert_eq!(code.direction(), Some(ParameterDirection::InputOutput));

    let total = params.get("@Total").unwrap();
    assert_eq!(total.db_type(), Some(DbType::Int32));
    assert_eq!(total.direction(), Some(ParameterDirection::Output));

    let status = params.get("Status").unwrap();
    assert_eq!(status.value(), &ParamValue::Scalar(RowValues::Null));
    assert_eq!(status.effective_direction(), ParameterDirection::ReturnValue);
}

#[test]
fn list_parameter_builds_single_column_table() {
    let query = QueryBuilder::new()
        .add_list_parameter("@Ids", "dbo.id_list", "Id", [1, 2, 4], ParameterDirection::Input)
        .build();

    let param = query.parameters().unwrap().get("Ids").unwrap();
    let table = param.value().as_table().unwrap();
    assert_eq!(table.type_name(), "dbo.id_list");
    assert_eq!(table.table().columns(), ["Id".to_string()]);
    assert_eq!(
        table.table().rows(),
        [
            vec![RowValues::Int(1)],
            vec![RowValues::Int(2)],
            vec![RowValues::Int(4)]
        ]
    );
}

#[test]
fn reading_a_table_parameter_as_scalar_fails() {
    let query = QueryBuilder::new()
        .add_list_parameter("@Ids", "dbo.id_list", "Id", [1], ParameterDirection::Input)
        .build();
    let err = query.get_parameter_by_name::<i64>("Ids").unwrap_err();
    assert!(matches!(err, QueryBuilderError::DecodeError(_)));
}

#[test]
fn debug_output_hides_connection_string() {
    let query = QueryBuilder::new()
        .with_sql_connection("Server=x;Password=hunter2")
        .build();
    let rendered = format!("{query:?}");
    assert!(!rendered.contains("hunter2"));
    assert!(rendered.contains("<redacted>"));
}

#[test]
fn missing_connection_is_a_config_error() {
    let query = QueryBuilder::new().with_sql_command("SELECT 1").build();
    let err = query.connection_required().unwrap_err();
    assert!(err.is_config_error());
    assert_eq!(
        err.to_string(),
        "Configuration error: the SQL connection string is not defined"
    );
}

#[test]
fn optional_parameters_carry_type_and_direction() {
    let query = QueryBuilder::new()
        .with_optional_parameter_if_options(
            true,
            "@Total",
            0,
            Some(DbType::Int32),
            Some(ParameterDirection::Output),
        )
        .with_optional_parameter_if_options(
            false,
            "@Skipped",
            1,
            Some(DbType::Int32),
            Some(ParameterDirection::InputOutput),
        )
        .with_optional_parameter_options(
            "@Code",
            Some("abc"),
            Some(DbType::AnsiString),
            Some(ParameterDirection::InputOutput),
        )
        .with_optional_parameter_options(
            "@Missing",
            None::<String>,
            Some(DbType::String),
            None,
        )
        .build();

    let params = query.parameters().unwrap();
    assert_eq!(params.names().collect::<Vec<_>>(), vec!["Total", "Code"]);

    let total = params.get("Total").unwrap();
    assert_eq!(total.db_type(), Some(DbType::Int32));
    assert_eq!(total.direction(), Some(ParameterDirection::Output));

    let code = params.get("@Code").unwrap();
    assert_eq!(code.db_type(), Some(DbType::AnsiString));
    assert_eq!(code.direction(), Some(ParameterDirection::InputOutput));
    assert_eq!(code.value().as_scalar(), Some(&RowValues::Text("abc".into())));
}

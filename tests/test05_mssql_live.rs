#![cfg(feature = "mssql")]

//! Runs against a real SQL Server when `MSSQL_CONNECTION_STRING` is set, e.g.
//! `Server=tcp:localhost,1433;Database=testing;User Id=sa;Password=...;TrustServerCertificate=true`.

use std::sync::Arc;

use mssql_query_builder::prelude::*;
use mssql_query_builder::table_record;

fn connection_string() -> Option<String> {
    std::env::var("MSSQL_CONNECTION_STRING").ok()
}

fn builder(conn: &str) -> QueryBuilder {
    QueryBuilder::new()
        .with_sql_connection(conn)
        .with_connector(Arc::new(MssqlConnector::new().with_trust_cert(true)))
}

async fn run_batch(conn: &str, sql: &str) -> Result<(), QueryBuilderError> {
    builder(conn)
        .with_sql_command(sql)
        .build()
        .execute_fire_and_forget()
        .await
}

#[derive(Clone)]
struct Line {
    sku: String,
    qty: i32,
}

table_record!(Line { sku => "Sku", qty => "Quantity" });

#[tokio::test]
async fn text_query_with_parameters() -> Result<(), QueryBuilderError> {
    let Some(conn) = connection_string() else {
        return Ok(());
    };

    let mut query = builder(&conn)
        .with_sql_command("SELECT @A + 1 AS next, @Name AS name, @Nothing AS nothing")
        .with_parameter("@A", 41)
        .with_parameter("@Name", "héllo")
        .with_parameter("@Nothing", RowValues::Null)
        .build();

    let row = query
        .execute_single_row::<CustomDbRow>()
        .await?
        .expect("one row");
    assert_eq!(row.get_as::<i64>("next")?, 42);
    assert_eq!(row.get_as::<String>("name")?, "héllo");
    assert_eq!(row.get("nothing"), Some(&RowValues::Null));
    Ok(())
}

#[tokio::test]
async fn multiple_result_sets_in_order() -> Result<(), QueryBuilderError> {
    let Some(conn) = connection_string() else {
        return Ok(());
    };

    let mut query = builder(&conn)
        .with_sql_command("SELECT 1 AS v; SELECT 2 AS v WHERE 1 = 0; SELECT 3 AS v UNION ALL SELECT 4")
        .build();

    let sets: Vec<Vec<i32>> = query.execute_multiple_result_sets().await?;
    assert_eq!(sets, vec![vec![1], vec![], vec![3, 4]]);
    Ok(())
}

#[tokio::test]
async fn stored_procedure_with_table_and_outputs() -> Result<(), QueryBuilderError> {
    let Some(conn) = connection_string() else {
        return Ok(());
    };

    run_batch(
        &conn,
        "IF TYPE_ID('dbo.qb_order_line') IS NULL \
         CREATE TYPE dbo.qb_order_line AS TABLE (Sku nvarchar(20) NOT NULL, Quantity int NOT NULL)",
    )
    .await?;
    run_batch(
        &conn,
        "CREATE OR ALTER PROCEDURE dbo.qb_sum_lines \
             @Lines dbo.qb_order_line READONLY, \
             @Total int OUTPUT \
         AS BEGIN \
             SET NOCOUNT ON; \
             SELECT @Total = COALESCE(SUM(Quantity), 0) FROM @Lines; \
             SELECT Sku, Quantity FROM @Lines ORDER BY Sku; \
             RETURN 7; \
         END",
    )
    .await?;

    let lines = vec![
        Line {
            sku: "B".into(),
            qty: 3,
        },
        Line {
            sku: "A".into(),
            qty: 2,
        },
    ];
    let table = TableBuilder::new().from_list(&lines).build()?;

    let mut query = builder(&conn)
        .with_command_type_as_stored_procedure()
        .with_name("dbo.qb_sum_lines")
        .with_table_parameter("@Lines", "dbo.qb_order_line", table, None)
        .with_output_parameter("@Total", 0_i32)
        .with_parameter_builder(|p| {
            p.name("@Status")
                .direction(ParameterDirection::ReturnValue)
                .db_type(DbType::Int32)
        })
        .build();

    let rows: Vec<(String, i32)> = query.execute_rows().await?;
    assert_eq!(rows, vec![("A".to_string(), 2), ("B".to_string(), 3)]);
    assert_eq!(query.get_parameter_by_name::<i32>("@Total")?, Some(5));
    assert_eq!(query.get_parameter_by_name::<i32>("@Status")?, Some(7));

    let mut partial = builder(&conn)
        .with_sql_command("SELECT COUNT(*) FROM @Lines")
        .add_list_parameter("@Lines", "dbo.qb_order_line", "Sku", ["x"], ParameterDirection::Input)
        .build();
    // The type has two NOT NULL columns, so a one-column list cannot fill it
    assert!(partial.execute_rows::<i32>().await.is_err());
    Ok(())
}

#[tokio::test]
async fn non_query_in_transaction() -> Result<(), QueryBuilderError> {
    let Some(conn) = connection_string() else {
        return Ok(());
    };

    run_batch(
        &conn,
        "IF OBJECT_ID('dbo.qb_events') IS NULL \
         CREATE TABLE dbo.qb_events (id int IDENTITY PRIMARY KEY, kind nvarchar(50) NOT NULL)",
    )
    .await?;

    let mut insert = builder(&conn)
        .with_sql_command("INSERT INTO dbo.qb_events (kind) VALUES (@Kind), (@Kind)")
        .with_parameter("@Kind", "live-test")
        .with_transaction_execution()
        .with_timeout(30)
        .build();
    assert_eq!(insert.execute_non_query().await?, 2);

    let mut failing = builder(&conn)
        .with_sql_command("INSERT INTO dbo.qb_events (kind) VALUES (@Kind); THROW 50000, 'forced failure', 1;")
        .with_parameter("@Kind", "rolled-back")
        .with_transaction_execution()
        .build();
    assert!(failing.execute_non_query().await.is_err());

    let mut count = builder(&conn)
        .with_sql_command("SELECT COUNT(*) FROM dbo.qb_events WHERE kind = @Kind")
        .with_parameter("@Kind", "rolled-back")
        .build();
    assert_eq!(count.execute_single_row::<i32>().await?, Some(0));
    Ok(())
}

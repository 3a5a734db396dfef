//! End-to-end tests: SQL text through the executor, catalog and heap.

use std::sync::Arc;

use heapdb::datum::{ColumnAttribute, DataType, Value};
use heapdb::executor::{ExecError, QueryResult, SqlExec};
use heapdb::heap::{HeapTable, RelationError};
use heapdb::row;
use heapdb::sql::Parser;
use heapdb::storage::{Environment, FileEnvironment, MemoryEnvironment, StorageError};
use tempfile::tempdir;

fn run<E: Environment>(exec: &mut SqlExec<E>, sql: &str) -> Result<QueryResult, ExecError> {
    let statement = Parser::new(sql)
        .parse()
        .unwrap()
        .expect("statement expected");
    exec.execute(&statement)
}

fn column_values(result: &QueryResult, column: &str) -> Vec<Value> {
    result
        .rows
        .iter()
        .flatten()
        .map(|row| row[column].clone())
        .collect()
}

#[test]
fn test_create_and_drop_maintain_catalog_rows() {
    let dir = tempdir().unwrap();
    let env = Arc::new(FileEnvironment::open(dir.path()).unwrap());
    let mut exec = SqlExec::new(Arc::clone(&env));

    run(&mut exec, "CREATE TABLE foo (id INT, name TEXT, note TEXT)").unwrap();
    assert!(dir.path().join("foo.db").exists());

    let tables = run(&mut exec, "SELECT * FROM _tables WHERE table_name = 'foo'").unwrap();
    assert_eq!(tables.row_count(), 1);
    let columns = run(
        &mut exec,
        "SELECT column_name, data_type FROM _columns WHERE table_name = 'foo'",
    )
    .unwrap();
    assert_eq!(
        column_values(&columns, "column_name"),
        vec![Value::from("id"), Value::from("name"), Value::from("note")]
    );
    assert_eq!(
        column_values(&columns, "data_type"),
        vec![Value::from("INT"), Value::from("TEXT"), Value::from("TEXT")]
    );

    run(&mut exec, "DROP TABLE foo").unwrap();
    assert!(!dir.path().join("foo.db").exists());
    assert_eq!(
        run(&mut exec, "SELECT * FROM _tables WHERE table_name = 'foo'")
            .unwrap()
            .row_count(),
        0
    );
    assert_eq!(
        run(&mut exec, "SELECT * FROM _columns WHERE table_name = 'foo'")
            .unwrap()
            .row_count(),
        0
    );
    assert!(matches!(
        run(&mut exec, "SELECT * FROM foo"),
        Err(ExecError::Relation(RelationError::TableNotFound { .. }))
    ));
    assert!(matches!(
        run(&mut exec, "DROP TABLE foo"),
        Err(ExecError::Relation(RelationError::TableNotFound { .. }))
    ));
}

#[test]
fn test_show_tables_hides_catalog() {
    let mut exec = SqlExec::new(Arc::new(MemoryEnvironment::new()));
    run(&mut exec, "CREATE TABLE foo (a INT)").unwrap();
    run(&mut exec, "CREATE TABLE bar (b TEXT)").unwrap();

    let result = run(&mut exec, "SHOW TABLES").unwrap();
    assert_eq!(
        column_values(&result, "table_name"),
        vec![Value::from("foo"), Value::from("bar")]
    );
    assert_eq!(
        result.to_string(),
        "table_name \n+----------+\n\"foo\" \n\"bar\" \nsuccessfully returned 2 rows"
    );

    let all = run(&mut exec, "SELECT table_name FROM _tables").unwrap();
    assert_eq!(all.row_count(), 4);
}

#[test]
fn test_duplicate_create_leaves_catalog_unchanged() {
    let mut exec = SqlExec::new(Arc::new(MemoryEnvironment::new()));
    run(&mut exec, "CREATE TABLE foo (a INT)").unwrap();

    assert!(matches!(
        run(&mut exec, "CREATE TABLE foo (b TEXT)"),
        Err(ExecError::Relation(RelationError::TableAlreadyExists { .. }))
    ));
    assert!(run(&mut exec, "CREATE TABLE bar (a INT, a TEXT)").is_err());

    assert_eq!(run(&mut exec, "SHOW TABLES").unwrap().row_count(), 1);
    let columns = run(&mut exec, "SHOW COLUMNS FROM foo").unwrap();
    assert_eq!(column_values(&columns, "column_name"), vec![Value::from("a")]);
    assert_eq!(run(&mut exec, "SHOW COLUMNS FROM bar").unwrap().row_count(), 0);
}

#[test]
fn test_create_refuses_unregistered_store() {
    let dir = tempdir().unwrap();
    let env = Arc::new(FileEnvironment::open(dir.path()).unwrap());

    let mut stray = HeapTable::new(
        Arc::clone(&env),
        "foo",
        vec!["n".to_string()],
        vec![ColumnAttribute::new(DataType::Int)],
    );
    stray.create().unwrap();
    stray.insert(&row! { "n" => 7 }).unwrap();
    stray.close().unwrap();

    let mut exec = SqlExec::new(Arc::clone(&env));
    assert!(matches!(
        run(&mut exec, "CREATE TABLE foo (x TEXT)"),
        Err(ExecError::Relation(RelationError::Storage(StorageError::AlreadyExists { .. })))
    ));
    assert_eq!(run(&mut exec, "SHOW TABLES").unwrap().row_count(), 0);
    assert_eq!(run(&mut exec, "SHOW COLUMNS FROM foo").unwrap().row_count(), 0);
    assert!(matches!(
        run(&mut exec, "SELECT * FROM foo"),
        Err(ExecError::Relation(RelationError::TableNotFound { .. }))
    ));

    stray.open().unwrap();
    assert_eq!(stray.file().block_ids().len(), 1);
    assert_eq!(stray.select().unwrap().len(), 1);
}

#[test]
fn test_table_names_cannot_escape_data_directory() {
    let root = tempdir().unwrap();
    let env = Arc::new(FileEnvironment::open(root.path().join("data")).unwrap());
    let mut exec = SqlExec::new(Arc::clone(&env));

    for sql in [
        r#"CREATE TABLE "../escaped" (a INT)"#,
        r#"CREATE TABLE "sub/dir" (a INT)"#,
        r#"CREATE TABLE "" (a INT)"#,
    ] {
        assert!(matches!(
            run(&mut exec, sql),
            Err(ExecError::Relation(RelationError::Storage(StorageError::InvalidName { .. })))
        ));
    }
    assert!(!root.path().join("escaped.db").exists());
    assert_eq!(run(&mut exec, "SHOW TABLES").unwrap().row_count(), 0);

    run(&mut exec, r#"CREATE TABLE "odd name" (a INT)"#).unwrap();
    assert!(root.path().join("data").join("odd name.db").exists());
}

#[test]
fn test_catalog_and_rows_survive_restart() {
    let dir = tempdir().unwrap();
    {
        let env = Arc::new(FileEnvironment::open(dir.path()).unwrap());
        let mut exec = SqlExec::new(Arc::clone(&env));
        let script = "CREATE TABLE foo (a INT, b TEXT);
                      INSERT INTO foo VALUES (1, 'one');
                      INSERT INTO foo VALUES (2, 'two');";
        for statement in Parser::new(script).parse_all().unwrap() {
            exec.execute(&statement).unwrap();
        }
        exec.close().unwrap();
        env.close();
    }

    let env = Arc::new(FileEnvironment::open(dir.path()).unwrap());
    let mut exec = SqlExec::new(Arc::clone(&env));

    let tables = run(&mut exec, "SELECT * FROM _tables").unwrap();
    assert_eq!(
        column_values(&tables, "table_name"),
        vec![Value::from("_tables"), Value::from("_columns"), Value::from("foo")]
    );

    let rows = run(&mut exec, "SELECT b FROM foo WHERE a = 2").unwrap();
    assert_eq!(column_values(&rows, "b"), vec![Value::from("two")]);
    assert_eq!(run(&mut exec, "SELECT * FROM foo").unwrap().row_count(), 2);
}

#[test]
fn test_drop_catalog_table_rejected() {
    let mut exec = SqlExec::new(Arc::new(MemoryEnvironment::new()));
    for name in ["_tables", "_columns"] {
        let err = run(&mut exec, &format!("DROP TABLE {}", name)).unwrap_err();
        assert!(matches!(
            err,
            ExecError::Relation(RelationError::SchemaTable { .. })
        ));
    }
    assert_eq!(
        run(&mut exec, "SHOW COLUMNS FROM _tables").unwrap().row_count(),
        1
    );
}

#[test]
fn test_many_tables_and_rows() {
    let mut exec = SqlExec::new(Arc::new(MemoryEnvironment::new()));
    for t in 0..20 {
        run(&mut exec, &format!("CREATE TABLE t{} (n INT, s TEXT)", t)).unwrap();
        for n in 0..25 {
            run(
                &mut exec,
                &format!("INSERT INTO t{} VALUES ({}, 'row {} of table {}')", t, n, n, t),
            )
            .unwrap();
        }
    }
    assert_eq!(run(&mut exec, "SHOW TABLES").unwrap().row_count(), 20);
    for t in (0..20).step_by(2) {
        run(&mut exec, &format!("DROP TABLE t{}", t)).unwrap();
    }
    assert_eq!(run(&mut exec, "SHOW TABLES").unwrap().row_count(), 10);

    let result = run(&mut exec, "SELECT s FROM t7 WHERE n = 24").unwrap();
    assert_eq!(column_values(&result, "s"), vec![Value::from("row 24 of table 7")]);
    let result = run(&mut exec, "DELETE FROM t7 WHERE n = 3").unwrap();
    assert_eq!(result.message, "successfully deleted 1 rows from t7");
    assert_eq!(run(&mut exec, "SELECT * FROM t7").unwrap().row_count(), 24);
}

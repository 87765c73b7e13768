use employee_dir_core::db::migrations::latest_version;
use employee_dir_core::db::{open_db, open_db_in_memory, DbError};
use employee_dir_core::{
    EmployeeRepository, NewEmployee, RepoError, SqliteEmployeeRepository, StorageConfig,
};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_creates_employees_table() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "employees");
    let foreign_keys: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(foreign_keys, 1);
}

#[test]
fn reopening_file_keeps_existing_rows() {
    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig::new(dir.path().join("employees.db"));

    let conn_first = config.open().unwrap();
    SqliteEmployeeRepository::try_new(&conn_first)
        .unwrap()
        .create_employee(&NewEmployee::new("Ada", "Lovelace"))
        .unwrap();
    drop(conn_first);

    let conn_second = config.open().unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let employees = SqliteEmployeeRepository::try_new(&conn_second)
        .unwrap()
        .list_employees()
        .unwrap();
    assert_eq!(employees.len(), 1);
    assert_eq!(employees[0].last_name, "Lovelace");
}

#[test]
fn unversioned_file_with_existing_table_is_adopted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE employees (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT UNIQUE,
            phone TEXT,
            department TEXT,
            title TEXT,
            hire_date TEXT
        );
        INSERT INTO employees (first_name, last_name) VALUES ('Grace', 'Hopper');",
    )
    .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();
    assert_eq!(repo.get_employee(1).unwrap().unwrap().first_name, "Grace");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn opening_unreachable_path_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("nested").join("employees.db");

    assert!(matches!(open_db(&path), Err(DbError::Sqlite(_))));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteEmployeeRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_employees_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteEmployeeRepository::try_new(&conn),
        Err(RepoError::MissingRequiredTable("employees"))
    ));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}

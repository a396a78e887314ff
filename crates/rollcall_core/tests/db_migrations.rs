use rollcall_core::db::migrations::latest_version;
use rollcall_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "classes");
    assert_table_exists(&conn, "attendance");
    assert_index_exists(&conn, "uq_attendance_session_student");
}

#[test]
fn reopening_file_database_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rollcall.db");

    let first = open_db(&path).unwrap();
    assert_eq!(schema_version(&first), latest_version());
    drop(first);

    let second = open_db(&path).unwrap();
    assert_eq!(schema_version(&second), latest_version());
    assert_table_exists(&second, "attendance");
}

#[test]
fn newer_schema_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
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
fn attendance_rejects_second_row_for_same_student_and_session() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO classes (id, name, access_code, date) VALUES ('c1', 'Math', 'ABC123', 0);",
        [],
    )
    .unwrap();

    let insert = "INSERT INTO attendance (
            id, session_id, student_key, student_name, student_email, teacher_name,
            class_name, access_code, session_date, recorded_at
        ) VALUES (?1, 'c1', 'ana@school.test', 'Ana', 'ana@school.test', 'Soto', 'Math', 'ABC123', 0, 0);";
    conn.execute(insert, ["r1"]).unwrap();

    let err = conn.execute(insert, ["r2"]).unwrap_err();
    assert!(DbError::Sqlite(err).is_unique_violation());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, name: &str) {
    assert!(sqlite_object_exists(conn, "table", name), "table {name} does not exist");
}

fn assert_index_exists(conn: &Connection, name: &str) {
    assert!(sqlite_object_exists(conn, "index", name), "index {name} does not exist");
}

fn sqlite_object_exists(conn: &Connection, kind: &str, name: &str) -> bool {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    exists == 1
}

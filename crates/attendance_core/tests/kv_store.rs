use attendance_core::db::{open_db, open_db_in_memory};
use attendance_core::{KvRepository, SqliteKvRepository};

#[test]
fn sqlite_set_overwrites_and_remove_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKvRepository::try_new(&conn).unwrap();

    assert!(repo.get("currentUser").unwrap().is_none());
    repo.set("currentUser", "{\"id\":\"a1\"}").unwrap();
    repo.set("currentUser", "{\"id\":\"f1\"}").unwrap();
    assert_eq!(
        repo.get("currentUser").unwrap().as_deref(),
        Some("{\"id\":\"f1\"}")
    );

    repo.remove("currentUser").unwrap();
    repo.remove("currentUser").unwrap();
    assert!(repo.get("currentUser").unwrap().is_none());
}

#[test]
fn sqlite_set_many_writes_every_entry() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKvRepository::try_new(&conn).unwrap();

    repo.set_many(&[
        ("semesters", "[]".to_string()),
        ("attendance", "[]".to_string()),
    ])
    .unwrap();

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM kv_entries;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 2);
}

#[test]
fn sqlite_set_many_rolls_back_on_failure() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKvRepository::try_new(&conn).unwrap();
    repo.set("semesters", "old").unwrap();

    conn.execute_batch(
        "CREATE TRIGGER reject_attendance BEFORE INSERT ON kv_entries
         WHEN NEW.key = 'attendance'
         BEGIN SELECT RAISE(ABORT, 'quota exceeded'); END;",
    )
    .unwrap();

    let result = repo.set_many(&[
        ("semesters", "new".to_string()),
        ("attendance", "[]".to_string()),
    ]);
    assert!(result.is_err());
    assert_eq!(repo.get("semesters").unwrap().as_deref(), Some("old"));
    assert!(repo.get("attendance").unwrap().is_none());
}

#[test]
fn sqlite_entries_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("attendance.db");

    {
        let conn = open_db(&path).unwrap();
        let repo = SqliteKvRepository::try_new(&conn).unwrap();
        repo.set("semesters", "[]").unwrap();
    }

    let conn = open_db(&path).unwrap();
    let repo = SqliteKvRepository::try_new(&conn).unwrap();
    assert_eq!(repo.get("semesters").unwrap().as_deref(), Some("[]"));
}

use attendance_core::db::open_db_in_memory;
use attendance_core::{
    IdentityError, IdentityEvent, IdentityStore, KvRepository, MemoryKvRepository,
    PersistenceMode, RepoError, RepoResult, Role, SqliteKvRepository,
};
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn authenticate_returns_sanitized_user_and_persists_session() {
    let kv = MemoryKvRepository::new();
    let mut store = IdentityStore::open(&kv);

    let user = store
        .authenticate("faculty1@college.edu", "faculty123")
        .unwrap();
    assert_eq!(user.id, "f1");
    assert_eq!(user.name, "Dr. Sarah Johnson");
    assert_eq!(user.role, Role::Faculty);
    assert_eq!(store.current_user(), Some(&user));

    let persisted = kv.get("currentUser").unwrap().unwrap();
    assert!(!persisted.contains("password"));
    assert!(!persisted.contains("faculty123"));
}

#[test]
fn unknown_email_and_wrong_password_fail_identically() {
    let kv = MemoryKvRepository::new();
    let mut store = IdentityStore::open(&kv);

    let unknown = store.authenticate("nobody@college.edu", "faculty123");
    let wrong = store.authenticate("faculty1@college.edu", "nope");
    let wrong_case = store.authenticate("FACULTY1@college.edu", "faculty123");

    for result in [unknown, wrong, wrong_case] {
        assert!(matches!(result, Err(IdentityError::InvalidCredentials)));
    }
    assert!(store.current_user().is_none());
    assert!(kv.get("currentUser").unwrap().is_none());
}

#[test]
fn failed_login_keeps_existing_session() {
    let kv = MemoryKvRepository::new();
    let mut store = IdentityStore::open(&kv);
    store.authenticate("admin@college.edu", "admin123").unwrap();

    assert!(store.authenticate("admin@college.edu", "wrong").is_err());
    assert_eq!(store.current_user().unwrap().id, "a1");
}

#[test]
fn session_is_restored_on_reopen_and_cleared_by_end_session() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKvRepository::try_new(&conn).unwrap();

    {
        let mut store = IdentityStore::open(&repo);
        store.authenticate("admin@college.edu", "admin123").unwrap();
    }

    let mut restored = IdentityStore::open(&repo);
    assert_eq!(restored.current_user().unwrap().role, Role::Admin);

    restored.end_session().unwrap();
    assert!(!restored.is_authenticated());

    let reopened = IdentityStore::open(&repo);
    assert!(reopened.current_user().is_none());
}

#[test]
fn unreadable_session_is_dropped_at_startup() {
    let kv = MemoryKvRepository::new();
    kv.set("currentUser", "{broken").unwrap();

    let store = IdentityStore::open(&kv);
    assert!(store.current_user().is_none());
    assert_eq!(store.persistence_mode(), PersistenceMode::Durable);
}

#[test]
fn listeners_see_session_changes() {
    let kv = MemoryKvRepository::new();
    let mut store = IdentityStore::open(&kv);
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    store.subscribe(move |event| sink.borrow_mut().push(event.clone()));

    let user = store
        .authenticate("faculty3@college.edu", "faculty123")
        .unwrap();
    store.end_session().unwrap();
    store.end_session().unwrap();

    assert_eq!(
        *events.borrow(),
        vec![IdentityEvent::SessionStarted(user), IdentityEvent::SessionEnded]
    );
}

struct ReadOnlyKv;

impl KvRepository for ReadOnlyKv {
    fn get(&self, _key: &str) -> RepoResult<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> RepoResult<()> {
        Err(RepoError::Unavailable("read-only".to_string()))
    }

    fn remove(&self, _key: &str) -> RepoResult<()> {
        Err(RepoError::Unavailable("read-only".to_string()))
    }
}

#[test]
fn storage_failure_keeps_session_in_memory() {
    let mut store = IdentityStore::open(ReadOnlyKv);

    let err = store
        .authenticate("faculty2@college.edu", "faculty123")
        .unwrap_err();
    assert!(matches!(err, IdentityError::Storage(_)));
    assert_eq!(store.current_user().unwrap().id, "f2");
    assert_eq!(store.persistence_mode(), PersistenceMode::MemoryOnly);

    store.end_session().unwrap();
    assert!(store.current_user().is_none());
}

#[test]
fn listeners_see_switch_to_memory_only() {
    let mut store = IdentityStore::open(ReadOnlyKv);
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    store.subscribe(move |event| sink.borrow_mut().push(event.clone()));

    let _ = store.authenticate("faculty2@college.edu", "faculty123");
    store.end_session().unwrap();

    let user = events.borrow()[0].clone();
    assert!(matches!(user, IdentityEvent::SessionStarted(_)));
    assert_eq!(
        events.borrow()[1..],
        [
            IdentityEvent::PersistenceChanged(PersistenceMode::MemoryOnly),
            IdentityEvent::SessionEnded,
        ]
    );
}

use lifeboard_core::auth::{ensure_user, user_id_for_email, SessionStore};
use lifeboard_core::open_db_in_memory;
use uuid::Uuid;

#[test]
fn ensure_user_is_idempotent_and_normalizes_email() {
    let conn = open_db_in_memory().unwrap();
    let id = Uuid::new_v4();
    ensure_user(&conn, id, " Ada@Example.COM ").unwrap();
    ensure_user(&conn, id, "ada@example.com").unwrap();

    assert_eq!(user_id_for_email(&conn, "ADA@example.com").unwrap(), Some(id));
    assert_eq!(user_id_for_email(&conn, "nobody@example.com").unwrap(), None);
}

#[test]
fn sessions_resolve_until_expiry() {
    let conn = open_db_in_memory().unwrap();
    let user_id = Uuid::new_v4();
    ensure_user(&conn, user_id, "a@example.com").unwrap();
    let store = SessionStore::new(&conn);

    let session = store.create_session(user_id, 1_000, 10_000).unwrap();
    assert_eq!(session.expires_at, 11_000);

    let resolved = store.resolve(&session.token, 10_999).unwrap().unwrap();
    assert_eq!(resolved.user_id, user_id);
    assert!(store.resolve(&session.token, 11_000).unwrap().is_none());
    assert!(store.resolve("", 10_000).unwrap().is_none());
}

#[test]
fn revoke_and_purge_remove_sessions() {
    let conn = open_db_in_memory().unwrap();
    let user_id = Uuid::new_v4();
    ensure_user(&conn, user_id, "a@example.com").unwrap();
    let store = SessionStore::new(&conn);

    let short = store.create_session(user_id, 10, 0).unwrap();
    let long = store.create_session(user_id, 10_000, 0).unwrap();
    assert_ne!(short.token, long.token);

    assert_eq!(store.purge_expired(100).unwrap(), 1);
    assert!(store.revoke(&long.token).unwrap());
    assert!(!store.revoke(&long.token).unwrap());
    assert!(store.resolve(&long.token, 1).unwrap().is_none());
}

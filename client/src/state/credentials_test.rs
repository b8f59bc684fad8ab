use super::*;

// =============================================================
// MemoryCredentialStore
// =============================================================

#[test]
fn memory_store_starts_empty() {
    assert!(MemoryCredentialStore::new().read().unwrap().is_none());
}

#[test]
fn memory_store_write_then_read() {
    let store = MemoryCredentialStore::new();
    store.write(&Token::new("abc")).unwrap();
    assert_eq!(store.read().unwrap(), Some(Token::new("abc")));
}

#[test]
fn memory_store_clear_empties_slot() {
    let store = MemoryCredentialStore::with_token(Token::new("abc"));
    store.clear().unwrap();
    assert!(store.peek().is_none());
}

// =============================================================
// FileCredentialStore
// =============================================================

#[test]
fn file_store_missing_file_reads_absent() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCredentialStore::in_dir(dir.path());
    assert!(store.read().unwrap().is_none());
}

#[test]
fn file_store_write_creates_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCredentialStore::new(dir.path().join("nested").join("token"));
    store.write(&Token::new("tok-9")).unwrap();
    assert_eq!(store.read().unwrap(), Some(Token::new("tok-9")));
}

#[test]
fn file_store_ignores_surrounding_whitespace() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCredentialStore::in_dir(dir.path());
    std::fs::write(store.path(), "  tok-2\n").unwrap();
    assert_eq!(store.read().unwrap(), Some(Token::new("tok-2")));
}

#[test]
fn file_store_blank_file_reads_absent() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCredentialStore::in_dir(dir.path());
    std::fs::write(store.path(), "\n").unwrap();
    assert!(store.read().unwrap().is_none());
}

#[test]
fn file_store_clear_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCredentialStore::in_dir(dir.path());
    store.write(&Token::new("x")).unwrap();
    store.clear().unwrap();
    store.clear().unwrap();
    assert!(!store.path().exists());
}

#[test]
fn file_store_unreadable_path_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where the file should be.
    let store = FileCredentialStore::new(dir.path());
    assert!(matches!(store.read(), Err(StoreError::Unavailable(_))));
}

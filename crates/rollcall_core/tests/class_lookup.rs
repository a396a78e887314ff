use async_trait::async_trait;
use rollcall_core::db::open_db_in_memory;
use rollcall_core::{
    ClassLookup, ClassSession, ClassStore, LookupError, SqliteStore, StoreError, StoreResult,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts queries and optionally fails them.
struct CountingStore {
    inner: SqliteStore,
    queries: AtomicUsize,
    fail: bool,
}

impl CountingStore {
    fn new(fail: bool) -> Self {
        Self {
            inner: SqliteStore::new(open_db_in_memory().unwrap()),
            queries: AtomicUsize::new(0),
            fail,
        }
    }

    fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClassStore for CountingStore {
    async fn find_by_access_code(&self, code: &str) -> StoreResult<Vec<ClassSession>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(StoreError::Unavailable("offline".to_string()));
        }
        self.inner.find_by_access_code(code).await
    }
}

#[tokio::test]
async fn blank_codes_never_reach_the_store() {
    let store = Arc::new(CountingStore::new(false));
    let lookup = ClassLookup::new(store.clone());

    for code in ["", "   ", "\t\n"] {
        let err = lookup.find_session_by_code(code).await.unwrap_err();
        assert!(matches!(err, LookupError::EmptyCode));
    }
    assert_eq!(store.queries(), 0);
}

#[tokio::test]
async fn finds_session_by_exact_code() {
    let store = Arc::new(CountingStore::new(false));
    let session = ClassSession::new("Algebra", "ABC123", 1_000).with_teacher("Prof. Soto");
    store.inner.insert_session(&session).unwrap();
    let lookup = ClassLookup::new(store.clone());

    let found = lookup.find_session_by_code("ABC123").await.unwrap();
    assert_eq!(found, Some(session));
    assert_eq!(store.queries(), 1);
}

#[tokio::test]
async fn codes_are_case_sensitive_but_trimmed() {
    let store = Arc::new(CountingStore::new(false));
    let session = ClassSession::new("Algebra", "ABC123", 1_000);
    store.inner.insert_session(&session).unwrap();
    let lookup = ClassLookup::new(store.clone());

    assert!(lookup.find_session_by_code("abc123").await.unwrap().is_none());
    assert_eq!(
        lookup.find_session_by_code("  ABC123 ").await.unwrap().map(|s| s.id),
        Some(session.id)
    );
}

#[tokio::test]
async fn duplicate_codes_resolve_to_first_in_store_order() {
    let store = Arc::new(CountingStore::new(false));
    let first = ClassSession::new("Morning", "DUP1", 1_000);
    let second = ClassSession::new("Evening", "DUP1", 2_000);
    store.inner.insert_session(&first).unwrap();
    store.inner.insert_session(&second).unwrap();
    let lookup = ClassLookup::new(store.clone());

    let found = lookup.find_session_by_code("DUP1").await.unwrap().unwrap();
    assert_eq!(found.id, first.id);
}

#[tokio::test]
async fn store_fault_is_lookup_failed_not_none() {
    let store = Arc::new(CountingStore::new(true));
    let lookup = ClassLookup::new(store.clone());

    let err = lookup.find_session_by_code("ABC123").await.unwrap_err();
    assert!(matches!(
        err,
        LookupError::LookupFailed(StoreError::Unavailable(_))
    ));
}

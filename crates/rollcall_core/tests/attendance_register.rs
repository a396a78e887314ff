use async_trait::async_trait;
use rollcall_core::db::open_db_in_memory;
use rollcall_core::{
    AttendanceRecord, AttendanceRecorder, AttendanceStore, ClassSession, ClassStore, Outcome,
    RecordId, RegisterError, SessionId, SqliteStore, StoreError, StoreResult, User,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

const FIXED_NOW: i64 = 1_726_000_000_000;

fn fixed_clock() -> i64 {
    FIXED_NOW
}

#[derive(Default)]
struct FaultPlan {
    fail_class_query: bool,
    fail_precheck: bool,
    fail_write: bool,
    hide_existing_once: AtomicBool,
}

/// SQLite store wrapper that counts round trips and can inject faults.
struct CountingStore {
    inner: SqliteStore,
    plan: FaultPlan,
    class_queries: AtomicUsize,
    writes: AtomicUsize,
}

impl CountingStore {
    fn new(plan: FaultPlan) -> Arc<Self> {
        Arc::new(Self {
            inner: SqliteStore::new(open_db_in_memory().unwrap()),
            plan,
            class_queries: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        })
    }

    fn healthy() -> Arc<Self> {
        Self::new(FaultPlan::default())
    }

    fn seed(&self, session: &ClassSession) {
        self.inner.insert_session(session).unwrap();
    }

    fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClassStore for CountingStore {
    async fn find_by_access_code(&self, code: &str) -> StoreResult<Vec<ClassSession>> {
        self.class_queries.fetch_add(1, Ordering::SeqCst);
        if self.plan.fail_class_query {
            return Err(StoreError::Unavailable("classes offline".to_string()));
        }
        self.inner.find_by_access_code(code).await
    }
}

#[async_trait]
impl AttendanceStore for CountingStore {
    async fn find_attendance(
        &self,
        session_id: SessionId,
        student_key: &str,
    ) -> StoreResult<Option<AttendanceRecord>> {
        if self.plan.fail_precheck {
            return Err(StoreError::Unavailable("attendance offline".to_string()));
        }
        if self.plan.hide_existing_once.swap(false, Ordering::SeqCst) {
            return Ok(None);
        }
        self.inner.find_attendance(session_id, student_key).await
    }

    async fn add_attendance(&self, record: &AttendanceRecord) -> StoreResult<RecordId> {
        if self.plan.fail_write {
            return Err(StoreError::Unavailable("write rejected".to_string()));
        }
        let id = self.inner.add_attendance(record).await?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(id)
    }
}

fn recorder(store: &Arc<CountingStore>) -> AttendanceRecorder<Arc<CountingStore>, Arc<CountingStore>> {
    AttendanceRecorder::with_clock(store.clone(), store.clone(), fixed_clock)
}

fn student() -> User {
    User::new("uid-ana")
        .with_display_name("Ana Rojas")
        .with_email("ana@school.test")
}

#[tokio::test]
async fn matching_code_writes_exactly_one_record_for_that_session() {
    let store = CountingStore::healthy();
    let session = ClassSession::new("Algebra", "ABC123", 1_700_000_000_000).with_teacher("Soto");
    store.seed(&session);

    let outcome = recorder(&store).register("ABC123", &student()).await.unwrap();

    let Outcome::Registered(record) = outcome else {
        panic!("expected Registered, got {outcome:?}");
    };
    assert_eq!(record.session_id, session.id);
    assert_eq!(record.student_name, "Ana Rojas");
    assert_eq!(record.student_email, "ana@school.test");
    assert_eq!(record.teacher_name, "Soto");
    assert_eq!(record.class_name, "Algebra");
    assert_eq!(record.access_code, "ABC123");
    assert_eq!(record.session_date, 1_700_000_000_000);
    assert_eq!(record.recorded_at, FIXED_NOW);

    assert_eq!(store.writes(), 1);
    let persisted = store.inner.attendance_for_session(session.id).unwrap();
    assert_eq!(persisted, vec![record]);
}

#[tokio::test]
async fn unknown_code_is_invalid_and_writes_nothing() {
    let store = CountingStore::healthy();
    store.seed(&ClassSession::new("Algebra", "ABC123", 0));

    let outcome = recorder(&store).register("ZZZZZZ", &student()).await.unwrap();

    assert_eq!(outcome, Outcome::InvalidCode);
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn blank_code_fails_fast_without_store_access() {
    let store = CountingStore::healthy();

    let err = recorder(&store).register("   ", &student()).await.unwrap_err();

    assert!(matches!(err, RegisterError::EmptyCode));
    assert_eq!(store.class_queries.load(Ordering::SeqCst), 0);
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn second_registration_returns_existing_record_without_writing() {
    let store = CountingStore::healthy();
    let session = ClassSession::new("Algebra", "ABC123", 0);
    store.seed(&session);
    let recorder = recorder(&store);

    let first = recorder.register("ABC123", &student()).await.unwrap();
    let second = recorder.register("ABC123", &student()).await.unwrap();

    let Outcome::Registered(original) = first else {
        panic!("first registration should write");
    };
    assert_eq!(second, Outcome::AlreadyRegistered(original));
    assert_eq!(store.writes(), 1);
    assert_eq!(store.inner.attendance_for_session(session.id).unwrap().len(), 1);
}

#[tokio::test]
async fn lost_race_on_unique_constraint_reports_already_registered() {
    let store = CountingStore::healthy();
    let session = ClassSession::new("Algebra", "ABC123", 0);
    store.seed(&session);
    let recorder = recorder(&store);
    recorder.register("ABC123", &student()).await.unwrap();

    // Pre-check misses the existing row, so only the index can catch it.
    store.plan.hide_existing_once.store(true, Ordering::SeqCst);
    let outcome = recorder.register("ABC123", &student()).await.unwrap();

    assert!(matches!(outcome, Outcome::AlreadyRegistered(_)));
    assert_eq!(store.writes(), 1);
}

#[tokio::test]
async fn same_student_may_attend_different_sessions() {
    let store = CountingStore::healthy();
    store.seed(&ClassSession::new("Algebra", "ALG1", 0));
    store.seed(&ClassSession::new("Biology", "BIO1", 0));
    let recorder = recorder(&store);

    assert!(matches!(
        recorder.register("ALG1", &student()).await.unwrap(),
        Outcome::Registered(_)
    ));
    assert!(matches!(
        recorder.register("BIO1", &student()).await.unwrap(),
        Outcome::Registered(_)
    ));
    assert_eq!(store.writes(), 2);
}

#[tokio::test]
async fn missing_identity_fields_use_placeholders() {
    let store = CountingStore::healthy();
    store.seed(&ClassSession::new("Algebra", "ABC123", 0));

    let outcome = recorder(&store)
        .register("ABC123", &User::new("uid-anon"))
        .await
        .unwrap();

    let Outcome::Registered(record) = outcome else {
        panic!("expected Registered");
    };
    assert_eq!(record.student_name, "Name not available");
    assert_eq!(record.student_email, "Email not available");
    assert_eq!(record.teacher_name, "Not available");
}

#[tokio::test]
async fn class_query_fault_is_lookup_failed() {
    let store = CountingStore::new(FaultPlan {
        fail_class_query: true,
        ..FaultPlan::default()
    });

    let err = recorder(&store).register("ABC123", &student()).await.unwrap_err();
    assert!(matches!(err, RegisterError::LookupFailed(_)));
}

#[tokio::test]
async fn precheck_fault_is_lookup_failed_and_writes_nothing() {
    let store = CountingStore::new(FaultPlan {
        fail_precheck: true,
        ..FaultPlan::default()
    });
    store.seed(&ClassSession::new("Algebra", "ABC123", 0));

    let err = recorder(&store).register("ABC123", &student()).await.unwrap_err();
    assert!(matches!(err, RegisterError::LookupFailed(_)));
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn insert_fault_is_write_failed() {
    let store = CountingStore::new(FaultPlan {
        fail_write: true,
        ..FaultPlan::default()
    });
    store.seed(&ClassSession::new("Algebra", "ABC123", 0));

    let err = recorder(&store).register("ABC123", &student()).await.unwrap_err();
    assert!(matches!(err, RegisterError::WriteFailed(_)));
}

#[tokio::test]
async fn students_without_email_register_independently() {
    let store = CountingStore::healthy();
    let session = ClassSession::new("Algebra", "ABC123", 0);
    store.seed(&session);
    let recorder = recorder(&store);

    let first = recorder
        .register("ABC123", &User::new("uid-ana").with_display_name("Ana"))
        .await
        .unwrap();
    let second = recorder
        .register("ABC123", &User::new("uid-ben").with_display_name("Ben"))
        .await
        .unwrap();

    let Outcome::Registered(second) = second else {
        panic!("expected Registered for the second student, got {second:?}");
    };
    assert!(matches!(first, Outcome::Registered(_)));
    assert_eq!(second.student_key, "uid:uid-ben");
    assert_eq!(second.student_name, "Ben");
    assert_eq!(store.writes(), 2);
    assert_eq!(store.inner.attendance_for_session(session.id).unwrap().len(), 2);
}

#[tokio::test]
async fn registration_is_keyed_on_email_when_present() {
    let store = CountingStore::healthy();
    store.seed(&ClassSession::new("Algebra", "ABC123", 0));
    let recorder = recorder(&store);

    recorder.register("ABC123", &student()).await.unwrap();
    let again = recorder
        .register(
            "ABC123",
            &User::new("uid-ana-tablet").with_email("ana@school.test"),
        )
        .await
        .unwrap();

    let Outcome::AlreadyRegistered(existing) = again else {
        panic!("expected AlreadyRegistered, got {again:?}");
    };
    assert_eq!(existing.student_name, "Ana Rojas");
    assert_eq!(store.writes(), 1);
}

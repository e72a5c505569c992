use async_trait::async_trait;
use futures::StreamExt;
use process_store::{
    EntityFacade, EntityStore, FrameworkError, KeyedStore, ProcessState, StoreClient, StoreEntity,
    Transition,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::timeout;

// --- Test Entity ---

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
struct Document {
    id: String,
    body: String,
}

#[derive(Clone, Debug)]
enum DocumentEvent {
    Load(String),
    LoadSuccess(Document),
    LoadFail(String, String),
    Reset(String),
    Remove(String),
}

/// Fake backend: counts loads and holds each response until a permit is released.
struct Backend {
    loads: AtomicUsize,
    gate: Semaphore,
    fail: bool,
}

impl Backend {
    fn new(fail: bool) -> Self {
        Self {
            loads: AtomicUsize::new(0),
            gate: Semaphore::new(0),
            fail,
        }
    }
}

#[async_trait]
impl StoreEntity for Document {
    type Event = DocumentEvent;
    type Context = Arc<Backend>;

    fn reduce(store: &mut KeyedStore<Self>, event: &DocumentEvent) {
        match event {
            DocumentEvent::Load(id) => store.apply(id, Transition::Start),
            DocumentEvent::LoadSuccess(doc) => store.apply(&doc.id, Transition::Success(doc.clone())),
            DocumentEvent::LoadFail(id, reason) => store.apply(id, Transition::Fail(reason.clone())),
            DocumentEvent::Reset(id) => store.apply(id, Transition::Reset),
            DocumentEvent::Remove(id) => {
                store.remove(id);
            }
        }
    }

    async fn effect(event: DocumentEvent, backend: &Arc<Backend>) -> Vec<DocumentEvent> {
        let DocumentEvent::Load(id) = event else {
            return Vec::new();
        };
        backend.loads.fetch_add(1, Ordering::SeqCst);
        let Ok(permit) = backend.gate.acquire().await else {
            return Vec::new();
        };
        permit.forget();
        if backend.fail {
            vec![DocumentEvent::LoadFail(id, "backend unavailable".into())]
        } else {
            vec![DocumentEvent::LoadSuccess(Document {
                body: format!("body of {id}"),
                id,
            })]
        }
    }

    fn is_created(&self) -> bool {
        !self.body.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("document store: {0}")]
struct DocumentError(#[from] FrameworkError);

struct DocumentService {
    store: StoreClient<Document>,
}

impl EntityFacade<Document> for DocumentService {
    type Error = DocumentError;

    fn store(&self) -> &StoreClient<Document> {
        &self.store
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        DocumentError(e)
    }
}

fn start(backend: Arc<Backend>) -> (DocumentService, tokio::task::JoinHandle<()>) {
    let (store, client) = EntityStore::<Document>::new(16);
    let handle = tokio::spawn(store.run(backend));
    (DocumentService { store: client }, handle)
}

const QUIET: Duration = Duration::from_millis(50);

// --- Tests ---

#[tokio::test]
async fn test_absent_key_reads_zeroed_state() {
    let (service, _handle) = start(Arc::new(Backend::new(false)));

    let mut states = service.observe_process_state("doc-1").await.unwrap();
    assert_eq!(states.next().await, Some(ProcessState::default()));
}

#[tokio::test]
async fn test_load_lifecycle_through_effect() {
    let backend = Arc::new(Backend::new(false));
    let (service, _handle) = start(backend.clone());

    let mut docs = service.observe_entity("doc-1").await.unwrap();
    service.store.dispatch(DocumentEvent::Load("doc-1".into())).await.unwrap();

    let state = service.store.current("doc-1").await.unwrap();
    assert!(state.loading);
    assert_eq!(state.processes_count, 1);

    backend.gate.add_permits(1);
    let doc = timeout(Duration::from_secs(1), docs.next()).await.unwrap().unwrap();
    assert_eq!(doc.body, "body of doc-1");

    let state = service.store.current("doc-1").await.unwrap();
    assert!(state.success);
    assert!(!state.loading);
    assert_eq!(backend.loads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_is_stable_follows_processes_count() {
    let (service, _handle) = start(Arc::new(Backend::new(false)));
    let mut stable = service.is_stable("doc-1").await.unwrap();
    assert_eq!(stable.next().await, Some(true));

    service.store.dispatch(DocumentEvent::Load("doc-1".into())).await.unwrap();
    assert_eq!(stable.next().await, Some(false));

    service
        .store
        .dispatch(DocumentEvent::LoadSuccess(Document {
            id: "doc-1".into(),
            body: "manual".into(),
        }))
        .await
        .unwrap();
    assert_eq!(stable.next().await, Some(true));
}

#[tokio::test]
async fn test_failure_is_recorded_not_returned() {
    let backend = Arc::new(Backend::new(true));
    let (service, _handle) = start(backend.clone());

    service.store.dispatch(DocumentEvent::Load("doc-1".into())).await.unwrap();
    backend.gate.add_permits(1);

    let mut states = service.observe_process_state("doc-1").await.unwrap();
    let failed = timeout(Duration::from_secs(1), async {
        while let Some(state) = states.next().await {
            if state.error {
                return state;
            }
        }
        unreachable!("state stream is infinite")
    })
    .await
    .unwrap();
    assert!(!failed.loading);
    assert_eq!(failed.value, None);

    service.store.dispatch(DocumentEvent::Reset("doc-1".into())).await.unwrap();
    assert_eq!(service.store.current("doc-1").await.unwrap(), ProcessState::default());
}

#[tokio::test]
async fn test_dispatch_if_lets_only_first_caller_through() {
    let backend = Arc::new(Backend::new(false));
    let (service, _handle) = start(backend.clone());
    let guard = |state: &ProcessState<Document>| state.value.is_none() && !state.loading && !state.error;

    let mut attempts = Vec::new();
    for _ in 0..8 {
        let store = service.store.clone();
        attempts.push(tokio::spawn(async move {
            store
                .dispatch_if("doc-1", guard, DocumentEvent::Load("doc-1".into()))
                .await
                .unwrap()
        }));
    }
    let mut passed = 0;
    for attempt in attempts {
        if attempt.await.unwrap() {
            passed += 1;
        }
    }

    assert_eq!(passed, 1);
    assert_eq!(service.store.current("doc-1").await.unwrap().processes_count, 1);
}

#[tokio::test]
async fn test_keys_do_not_interfere() {
    let (service, _handle) = start(Arc::new(Backend::new(false)));
    let mut other = service.observe_process_state("doc-2").await.unwrap();
    assert_eq!(other.next().await, Some(ProcessState::default()));

    service.store.dispatch(DocumentEvent::Load("doc-1".into())).await.unwrap();

    assert!(timeout(QUIET, other.next()).await.is_err());
    assert_eq!(service.store.current("doc-2").await.unwrap(), ProcessState::default());
}

#[tokio::test]
async fn test_remove_publishes_default() {
    let (service, _handle) = start(Arc::new(Backend::new(false)));
    service
        .store
        .dispatch(DocumentEvent::LoadSuccess(Document {
            id: "doc-1".into(),
            body: "x".into(),
        }))
        .await
        .unwrap();
    let mut states = service.observe_process_state("doc-1").await.unwrap();
    assert!(states.next().await.unwrap().success);

    service.store.dispatch(DocumentEvent::Remove("doc-1".into())).await.unwrap();
    assert_eq!(states.next().await, Some(ProcessState::default()));
}

#[tokio::test]
async fn test_snapshot_serializes_as_plain_map() {
    let (service, _handle) = start(Arc::new(Backend::new(false)));
    service
        .store
        .dispatch(DocumentEvent::LoadSuccess(Document {
            id: "doc-1".into(),
            body: "x".into(),
        }))
        .await
        .unwrap();

    let snapshot = service.store.snapshot().await.unwrap();
    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "doc-1": {
                "loading": false,
                "success": true,
                "error": false,
                "processesCount": 0,
                "value": { "id": "doc-1", "body": "x" }
            }
        })
    );
}

#[tokio::test]
async fn test_store_shuts_down_when_clients_dropped() {
    let (service, handle) = start(Arc::new(Backend::new(false)));
    drop(service);
    timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();
}

//! # Mock Store & Testing Guide
//!
//! Facades are thin: most of what they do is decide *which* event to dispatch and *which* key to
//! select. [`create_mock_store`] hands out a real [`StoreClient`] whose requests land on a
//! receiver owned by the test, so those decisions can be asserted without running a store.
//!
//! ## When to use the Mock vs. a Real Store
//!
//! | Feature | Mock store | Real `EntityStore` |
//! |---------|------------|--------------------|
//! | **Determinism** | Requests are inspected one by one | Subject to scheduler |
//! | **State** | None, the test answers each request | Real reducers and effects |
//! | **Use Case** | "Which event did the facade dispatch?" | Lifecycle and coordination flows |
//!
//! ## Example
//!
//! ```rust
//! use process_store::mock::{create_mock_store, expect_dispatch};
//! use process_store::{KeyedStore, StoreEntity, Transition};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Note(String);
//!
//! #[derive(Clone, Debug, PartialEq)]
//! enum NoteEvent { Load(String) }
//!
//! #[async_trait]
//! impl StoreEntity for Note {
//!     type Event = NoteEvent;
//!     type Context = ();
//!     fn reduce(store: &mut KeyedStore<Self>, event: &NoteEvent) {
//!         match event { NoteEvent::Load(key) => store.apply(key, Transition::Start) }
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (client, mut requests) = create_mock_store::<Note>(10);
//!     let task = tokio::spawn(async move { client.dispatch(NoteEvent::Load("n1".into())).await });
//!
//!     let (event, ack) = expect_dispatch(&mut requests).await.expect("Expected Dispatch");
//!     assert_eq!(event, NoteEvent::Load("n1".into()));
//!     ack.send(Ok(())).unwrap();
//!
//!     assert!(task.await.unwrap().is_ok());
//! }
//! ```
//!
//! For flows that need real state, spawn an [`EntityStore`](crate::EntityStore) with a fake
//! backend in its context instead.

use crate::entity::StoreEntity;
use crate::error::FrameworkError;
use crate::message::{Response, StoreRequest};
use crate::process_state::ProcessState;
use crate::StoreClient;
use tokio::sync::{mpsc, oneshot, watch};

/// Creates a store client and the receiver its requests arrive on.
pub fn create_mock_store<T: StoreEntity>(
    buffer_size: usize,
) -> (StoreClient<T>, mpsc::Receiver<StoreRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (StoreClient::new(sender), receiver)
}

/// Helper to verify that the next request is a plain Dispatch.
pub async fn expect_dispatch<T: StoreEntity>(
    receiver: &mut mpsc::Receiver<StoreRequest<T>>,
) -> Option<(T::Event, oneshot::Sender<Result<(), FrameworkError>>)> {
    match receiver.recv().await {
        Some(StoreRequest::Dispatch { event, respond_to }) => Some((event, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next request is a guarded dispatch.
///
/// The guard is evaluated against `state` so the test decides what the store "currently holds".
/// Returns the key, the event and whether the guard passed; the caller is answered accordingly.
pub async fn expect_dispatch_if<T: StoreEntity>(
    receiver: &mut mpsc::Receiver<StoreRequest<T>>,
    state: &ProcessState<T>,
) -> Option<(String, T::Event, bool)> {
    match receiver.recv().await {
        Some(StoreRequest::DispatchIf {
            key,
            guard,
            event,
            respond_to,
        }) => {
            let passed = guard(state);
            let _ = respond_to.send(Ok(passed));
            Some((key, event, passed))
        }
        _ => None,
    }
}

/// Helper to verify that the next request is a Select; answers it with a channel seeded with
/// `state` and returns the key plus the sender so the test can publish further states.
pub async fn expect_select<T: StoreEntity>(
    receiver: &mut mpsc::Receiver<StoreRequest<T>>,
    state: ProcessState<T>,
) -> Option<(String, watch::Sender<ProcessState<T>>)> {
    match receiver.recv().await {
        Some(StoreRequest::Select { key, respond_to }) => {
            let (sender, observer) = watch::channel(state);
            answer(respond_to, observer);
            Some((key, sender))
        }
        _ => None,
    }
}

fn answer<R>(respond_to: Response<R>, value: R) {
    let _ = respond_to.send(Ok(value));
}

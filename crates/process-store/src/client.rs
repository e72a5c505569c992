//! # Generic Client
//!
//! This module defines the generic client for talking to an [`EntityStore`](crate::EntityStore).

use crate::entity::StoreEntity;
use crate::error::FrameworkError;
use crate::message::StoreRequest;
use crate::process_state::ProcessState;
use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot, watch};

/// ## StoreClient
///
/// The `StoreClient<T>` is the dispatch/observation handle of an `EntityStore<T>`. It forwards
/// requests over a Tokio mpsc channel and receives results via oneshot channels. It holds only
/// a sender, so cloning is cheap and clones can be shared across tasks and facades.
///
/// * `dispatch` returns once the event has been reduced and published.
/// * `select` returns a `watch::Receiver` that always holds the latest state of one key.
#[derive(Clone)]
pub struct StoreClient<T: StoreEntity> {
    sender: mpsc::Sender<StoreRequest<T>>,
}

impl<T: StoreEntity> StoreClient<T> {
    pub fn new(sender: mpsc::Sender<StoreRequest<T>>) -> Self {
        Self { sender }
    }

    pub async fn dispatch(&self, event: T::Event) -> Result<(), FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Dispatch { event, respond_to })
            .await
            .map_err(|_| FrameworkError::StoreClosed)?;
        response.await.map_err(|_| FrameworkError::StoreDropped)?
    }

    /// Dispatches `event` only if `guard` holds for the current state of `key`.
    ///
    /// The check and the reduction happen in one step of the store task, so two callers racing
    /// on the same key cannot both pass a guard that the first dispatch invalidates.
    pub async fn dispatch_if(
        &self,
        key: impl Into<String>,
        guard: impl FnOnce(&ProcessState<T>) -> bool + Send + 'static,
        event: T::Event,
    ) -> Result<bool, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::DispatchIf {
                key: key.into(),
                guard: Box::new(guard),
                event,
                respond_to,
            })
            .await
            .map_err(|_| FrameworkError::StoreClosed)?;
        response.await.map_err(|_| FrameworkError::StoreDropped)?
    }

    pub async fn select(
        &self,
        key: impl Into<String>,
    ) -> Result<watch::Receiver<ProcessState<T>>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Select {
                key: key.into(),
                respond_to,
            })
            .await
            .map_err(|_| FrameworkError::StoreClosed)?;
        response.await.map_err(|_| FrameworkError::StoreDropped)?
    }

    /// The state of `key` right now.
    pub async fn current(&self, key: impl Into<String>) -> Result<ProcessState<T>, FrameworkError> {
        let receiver = self.select(key).await?;
        let state = receiver.borrow().clone();
        Ok(state)
    }

    pub async fn snapshot(&self) -> Result<HashMap<String, ProcessState<T>>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Snapshot { respond_to })
            .await
            .map_err(|_| FrameworkError::StoreClosed)?;
        response.await.map_err(|_| FrameworkError::StoreDropped)?
    }
}

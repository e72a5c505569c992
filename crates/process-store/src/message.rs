//! # Generic Messages
//!
//! This module defines the request type exchanged between a [`StoreClient`](crate::StoreClient)
//! and the [`EntityStore`](crate::EntityStore) task.

use crate::entity::StoreEntity;
use crate::error::FrameworkError;
use crate::process_state::ProcessState;
use std::collections::HashMap;
use tokio::sync::{oneshot, watch};

/// Type alias for the one-shot response channel used by the store.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Predicate evaluated against the authoritative state of one key.
pub type Guard<T> = Box<dyn FnOnce(&ProcessState<T>) -> bool + Send>;

/// Request sent to the store task.
///
/// The store processes these strictly one at a time, which is what makes every reduction and
/// every guard check atomic with respect to all other callers.
///
/// - **Dispatch**: reduce an event, publish touched keys, then run its effect.
/// - **DispatchIf**: evaluate `guard` on the current state of `key`; dispatch only if it holds.
///   The response tells the caller whether the event went through.
/// - **Select**: subscribe to the memoized watch channel for one key.
/// - **Snapshot**: copy the whole key → state map.
pub enum StoreRequest<T: StoreEntity> {
    Dispatch {
        event: T::Event,
        respond_to: Response<()>,
    },
    DispatchIf {
        key: String,
        guard: Guard<T>,
        event: T::Event,
        respond_to: Response<bool>,
    },
    Select {
        key: String,
        respond_to: Response<watch::Receiver<ProcessState<T>>>,
    },
    Snapshot {
        respond_to: Response<HashMap<String, ProcessState<T>>>,
    },
}

impl<T: StoreEntity> std::fmt::Debug for StoreRequest<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreRequest::Dispatch { event, .. } => {
                f.debug_struct("Dispatch").field("event", event).finish()
            }
            StoreRequest::DispatchIf { key, event, .. } => f
                .debug_struct("DispatchIf")
                .field("key", key)
                .field("event", event)
                .finish(),
            StoreRequest::Select { key, .. } => f.debug_struct("Select").field("key", key).finish(),
            StoreRequest::Snapshot { .. } => f.write_str("Snapshot"),
        }
    }
}

//! # StoreEntity Trait
//!
//! The `StoreEntity` trait is the contract a domain type (a cart, a configuration, a UI state)
//! implements to be held in an [`EntityStore`](crate::EntityStore). It names the event type the
//! store dispatches, the context injected into effects, the pure reducer and the effect handler.
//!
//! # Architecture Note
//! The store is written once and reused for every entity. What differs between domains is
//! captured by associated types:
//!
//! - `Event` is a closed tagged union (an `enum`) of intents (`LoadCart`, `CreateConfiguration`)
//!   and completions (`LoadCartSuccess`, `CreateConfigurationFail`). Reducers match on it
//!   exhaustively, so a new event cannot be silently ignored.
//! - `Context` is the set of external collaborators effects need, usually a backend adapter.
//!   It is injected when the store is started via [`EntityStore::run`](crate::EntityStore::run),
//!   not when it is constructed.
//!
//! # Reduce vs. Effect
//! `reduce` runs inside the store task, synchronously, and is the only place state changes.
//! `effect` runs afterwards in its own task. It may call the backend and returns completion
//! events, which are dispatched back into the same store.

use crate::keyed::KeyedStore;
use async_trait::async_trait;
use std::fmt::Debug;

#[async_trait]
pub trait StoreEntity: Clone + Debug + PartialEq + Send + Sync + 'static {
    /// Intents and completions handled by this store.
    type Event: Clone + Debug + Send + Sync + 'static;

    /// Dependencies injected into [`StoreEntity::effect`]. Use `()` if none are needed.
    type Context: Send + Sync + 'static;

    /// Applies `event` to the store. Must be pure: no I/O, no awaiting.
    fn reduce(store: &mut KeyedStore<Self>, event: &Self::Event);

    /// Runs the side effect for `event` and returns follow-up events.
    ///
    /// The default implementation has no effects.
    async fn effect(_event: Self::Event, _ctx: &Self::Context) -> Vec<Self::Event> {
        Vec::new()
    }

    /// Whether a cached value counts as usable. Observation streams skip values that are not.
    fn is_created(&self) -> bool {
        true
    }
}

//! # Entity Store Task
//!
//! This module defines the `EntityStore`, the single task that owns a [`KeyedStore`] and is the
//! only place it is ever mutated. It is the "Server" side of the dispatch/observation channel:
//! clients send [`StoreRequest`]s and the store processes them sequentially.

use crate::client::StoreClient;
use crate::entity::StoreEntity;
use crate::keyed::KeyedStore;
use crate::message::StoreRequest;
use crate::process_state::ProcessState;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info};

/// The store task for one entity type.
///
/// # Architecture Note
/// The struct owns the state (`store`), the receiving end of the request channel and one
/// `watch` sender per observed key. Because a single task processes requests one at a time, the
/// reducer path is serialized without any `Mutex` around the map: transitions for the same key
/// are applied in dispatch order, and a guard evaluated by `DispatchIf` cannot race with
/// another dispatch.
///
/// ## Operations
///
/// * **Dispatch**:
///     1. Runs `T::reduce` on the event.
///     2. Publishes the new state of every touched key to its watch channel.
///     3. Acknowledges the caller.
///     4. Spawns `T::effect` for the event; follow-up events come back through a weak sender.
///
/// * **DispatchIf**: evaluates the guard against the current state of the key and performs a
///   Dispatch only when it holds.
///
/// * **Select**: returns a receiver of the memoized watch channel for the key, creating the
///   channel with the current state on first use.
///
/// * **Snapshot**: returns a clone of the whole map.
///
/// # Usage Pattern
///
/// ```rust
/// use process_store::{EntityStore, KeyedStore, StoreEntity, Transition};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Note(String);
///
/// #[derive(Clone, Debug)]
/// enum NoteEvent { Load(String), Loaded(String, Note) }
///
/// #[async_trait]
/// impl StoreEntity for Note {
///     type Event = NoteEvent;
///     type Context = ();
///
///     fn reduce(store: &mut KeyedStore<Self>, event: &NoteEvent) {
///         match event {
///             NoteEvent::Load(key) => store.apply(key, Transition::Start),
///             NoteEvent::Loaded(key, note) => store.apply(key, Transition::Success(note.clone())),
///         }
///     }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (store, client) = EntityStore::<Note>::new(10);
///     tokio::spawn(store.run(()));
///
///     client.dispatch(NoteEvent::Load("n1".into())).await.unwrap();
///     assert!(client.current("n1").await.unwrap().loading);
/// }
/// ```
pub struct EntityStore<T: StoreEntity> {
    receiver: mpsc::Receiver<StoreRequest<T>>,
    feedback: mpsc::WeakSender<StoreRequest<T>>,
    store: KeyedStore<T>,
    selectors: HashMap<String, watch::Sender<ProcessState<T>>>,
}

impl<T: StoreEntity> EntityStore<T> {
    /// Creates a new `EntityStore` and its associated `StoreClient`.
    ///
    /// # Arguments
    ///
    /// * `buffer_size` - The capacity of the request channel. If the channel is full,
    ///   calls to the client wait until there is space.
    pub fn new(buffer_size: usize) -> (Self, StoreClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let store = Self {
            receiver,
            feedback: sender.downgrade(),
            store: KeyedStore::new(),
            selectors: HashMap::new(),
        };
        (store, StoreClient::new(sender))
    }

    /// Runs the store's event loop until every client has been dropped.
    ///
    /// # Context Injection
    /// `context` is shared with every effect. It is supplied here rather than in `new()` so
    /// that stores can depend on clients of other stores created alongside them.
    pub async fn run(mut self, context: T::Context) {
        // Extract just the type name (e.g., "Cart" instead of "storefront_state::model::cart::Cart")
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        let context = Arc::new(context);
        info!(entity_type, "Store started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Dispatch { event, respond_to } => {
                    self.reduce(entity_type, &event);
                    let _ = respond_to.send(Ok(()));
                    self.spawn_effect(event, &context);
                }
                StoreRequest::DispatchIf {
                    key,
                    guard,
                    event,
                    respond_to,
                } => {
                    let passed = match self.store.entry(&key) {
                        Some(state) => guard(state),
                        None => guard(&ProcessState::default()),
                    };
                    if passed {
                        self.reduce(entity_type, &event);
                        let _ = respond_to.send(Ok(true));
                        self.spawn_effect(event, &context);
                    } else {
                        debug!(entity_type, key = %key, "Guard rejected dispatch");
                        let _ = respond_to.send(Ok(false));
                    }
                }
                StoreRequest::Select { key, respond_to } => {
                    debug!(entity_type, key = %key, "Select");
                    let _ = respond_to.send(Ok(self.select(key)));
                }
                StoreRequest::Snapshot { respond_to } => {
                    let _ = respond_to.send(Ok(self.store.snapshot()));
                }
            }
        }

        info!(entity_type, size = self.store.len(), "Shutdown");
    }

    /// Subscribes to the memoized channel of `key`.
    ///
    /// Channels nobody observes any more are dropped first, so keys selected once and never
    /// written again do not accumulate.
    fn select(&mut self, key: String) -> watch::Receiver<ProcessState<T>> {
        self.selectors.retain(|_, sender| sender.receiver_count() > 0);
        let store = &self.store;
        self.selectors
            .entry(key)
            .or_insert_with_key(|key| watch::channel(store.get(key)).0)
            .subscribe()
    }

    fn reduce(&mut self, entity_type: &str, event: &T::Event) {
        debug!(entity_type, ?event, "Dispatch");
        T::reduce(&mut self.store, event);

        for key in self.store.take_touched() {
            let Some(sender) = self.selectors.get(&key) else {
                continue;
            };
            if sender.receiver_count() == 0 {
                // Nobody observes this key any more; the next select rebuilds the channel.
                self.selectors.remove(&key);
                continue;
            }
            sender.send_replace(self.store.get(&key));
        }
    }

    fn spawn_effect(&self, event: T::Event, context: &Arc<T::Context>) {
        let context = Arc::clone(context);
        let feedback = self.feedback.clone();
        tokio::spawn(async move {
            for follow_up in T::effect(event, &context).await {
                let Some(sender) = feedback.upgrade() else {
                    debug!("Store gone, dropping follow-up event");
                    break;
                };
                let (respond_to, _ack) = oneshot::channel();
                let request = StoreRequest::Dispatch {
                    event: follow_up,
                    respond_to,
                };
                if sender.send(request).await.is_err() {
                    break;
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Transition;
    use async_trait::async_trait;

    #[derive(Clone, Debug, PartialEq)]
    struct Counter(u32);

    #[derive(Clone, Debug)]
    enum CounterEvent {
        Set(String, u32),
    }

    #[async_trait]
    impl StoreEntity for Counter {
        type Event = CounterEvent;
        type Context = ();

        fn reduce(store: &mut KeyedStore<Self>, event: &CounterEvent) {
            match event {
                CounterEvent::Set(key, n) => store.apply(key, Transition::Success(Counter(*n))),
            }
        }
    }

    #[test]
    fn test_select_memoizes_live_channels() {
        let (mut store, _client) = EntityStore::<Counter>::new(4);
        let first = store.select("a".into());
        let second = store.select("a".into());
        assert_eq!(store.selectors.len(), 1);

        store.reduce("Counter", &CounterEvent::Set("a".into(), 3));
        assert_eq!(first.borrow().value, Some(Counter(3)));
        assert_eq!(second.borrow().value, Some(Counter(3)));
    }

    #[test]
    fn test_select_drops_unobserved_channels() {
        let (mut store, _client) = EntityStore::<Counter>::new(4);
        for key in ["a", "b", "c"] {
            drop(store.select(key.into()));
        }
        let _live = store.select("d".into());

        assert_eq!(store.selectors.len(), 1);
        assert!(store.selectors.contains_key("d"));
    }
}

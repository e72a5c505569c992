//! # Observation Streams
//!
//! Small stream stages used to build facade read operations on top of a key's watch channel.
//! Each stage does one thing: turn a receiver into a stream, keep usable values, drop repeats,
//! or wait for the first match. Side effects never live here; they belong to the facade stage
//! that calls [`StoreClient::dispatch_if`](crate::StoreClient::dispatch_if).

use crate::entity::StoreEntity;
use crate::process_state::ProcessState;
use futures::future;
use futures::stream::{Stream, StreamExt};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// Stream of every published state of one key, starting with the current one.
pub fn states<T: StoreEntity>(
    receiver: watch::Receiver<ProcessState<T>>,
) -> impl Stream<Item = ProcessState<T>> + Send + 'static {
    WatchStream::new(receiver)
}

/// Keeps only states carrying a value that [`StoreEntity::is_created`] accepts.
pub fn created_values<T, S>(states: S) -> impl Stream<Item = T>
where
    T: StoreEntity,
    S: Stream<Item = ProcessState<T>>,
{
    states.filter_map(|state| future::ready(state.value.filter(|value| value.is_created())))
}

/// Suppresses consecutive duplicates.
pub fn distinct_until_changed<S>(stream: S) -> impl Stream<Item = S::Item>
where
    S: Stream,
    S::Item: PartialEq + Clone,
{
    let mut last: Option<S::Item> = None;
    stream.filter_map(move |item| {
        let changed = last.as_ref() != Some(&item);
        if changed {
            last = Some(item.clone());
        }
        future::ready(changed.then_some(item))
    })
}

/// One-shot wait: resolves with the first item matching `predicate`, then stops listening.
///
/// Returns `None` if the stream ends first.
pub async fn first_matching<S, F>(stream: S, mut predicate: F) -> Option<S::Item>
where
    S: Stream,
    F: FnMut(&S::Item) -> bool,
{
    let matching = stream.filter(move |item| future::ready(predicate(item)));
    let mut matching = std::pin::pin!(matching);
    matching.next().await
}

//! # EntityFacade Trait
//!
//! Provides the read operations every domain facade shares, built on top of a generic
//! [`StoreClient`]. A facade implements `store()` and `map_error()` and gets
//! `observe_entity`, `observe_process_state` and `is_stable` for free.

use crate::select;
use crate::{FrameworkError, ProcessState, StoreClient, StoreEntity};
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};

/// Trait for domain facades to inherit the standard keyed read operations.
///
/// All returned streams are infinite and restartable: each call subscribes afresh and first
/// yields the current state of the key.
///
/// # Example
///
/// ```rust
/// use process_store::{EntityFacade, FrameworkError, KeyedStore, StoreClient, StoreEntity};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Wishlist { items: Vec<String> }
///
/// #[derive(Clone, Debug)]
/// enum WishlistEvent {}
///
/// #[async_trait]
/// impl StoreEntity for Wishlist {
///     type Event = WishlistEvent;
///     type Context = ();
///     fn reduce(_: &mut KeyedStore<Self>, event: &WishlistEvent) { match *event {} }
/// }
///
/// #[derive(Debug, thiserror::Error)]
/// #[error("wishlist: {0}")]
/// struct WishlistError(#[from] FrameworkError);
///
/// struct WishlistService {
///     store: StoreClient<Wishlist>,
/// }
///
/// impl EntityFacade<Wishlist> for WishlistService {
///     type Error = WishlistError;
///
///     fn store(&self) -> &StoreClient<Wishlist> {
///         &self.store
///     }
///
///     fn map_error(e: FrameworkError) -> Self::Error {
///         WishlistError(e)
///     }
/// }
///
/// // observe_entity(), observe_process_state() and is_stable() are now available.
/// ```
#[async_trait]
pub trait EntityFacade<T: StoreEntity>: Send + Sync {
    /// The facade-specific error type.
    type Error: Send;

    /// Access the underlying store client.
    fn store(&self) -> &StoreClient<T>;

    /// Map framework errors to the facade's error type.
    fn map_error(e: FrameworkError) -> Self::Error;

    /// Raw passthrough of the process state stored under `key`.
    #[tracing::instrument(skip(self))]
    async fn observe_process_state(
        &self,
        key: &str,
    ) -> Result<BoxStream<'static, ProcessState<T>>, Self::Error> {
        let receiver = self.store().select(key).await.map_err(Self::map_error)?;
        Ok(select::states(receiver).boxed())
    }

    /// Values stored under `key`, skipping absent and not-yet-created entities.
    #[tracing::instrument(skip(self))]
    async fn observe_entity(&self, key: &str) -> Result<BoxStream<'static, T>, Self::Error> {
        let receiver = self.store().select(key).await.map_err(Self::map_error)?;
        Ok(select::created_values(select::states(receiver)).boxed())
    }

    /// `true` while nothing is in flight for `key`.
    #[tracing::instrument(skip(self))]
    async fn is_stable(&self, key: &str) -> Result<BoxStream<'static, bool>, Self::Error> {
        let receiver = self.store().select(key).await.map_err(Self::map_error)?;
        let stable = select::states(receiver).map(|state| state.is_stable());
        Ok(select::distinct_until_changed(stable).boxed())
    }
}

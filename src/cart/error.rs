//! Error types for the cart facades.

use process_store::FrameworkError;
use thiserror::Error;

/// Errors returned by [`CartService`](crate::facade::CartService) and
/// [`ActiveCartService`](crate::facade::ActiveCartService).
///
/// Backend failures are not in here: they are recorded on the cart's process state.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    /// No cart has been activated for this session.
    #[error("No active cart")]
    NoActiveCart,

    /// The active cart could not be loaded.
    #[error("Cart could not be loaded: {0}")]
    LoadFailed(String),

    /// An error occurred while communicating with the store.
    #[error("Store communication error: {0}")]
    Store(#[from] FrameworkError),
}

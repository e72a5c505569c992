//! Error types for the configurator facade.

use crate::cart::CartError;
use crate::identity::OwnerError;
use process_store::FrameworkError;
use thiserror::Error;

/// Errors returned by [`ConfiguratorService`](crate::facade::ConfiguratorService).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfiguratorError {
    /// The owner could not be keyed or its id could not be decomposed.
    #[error(transparent)]
    Owner(#[from] OwnerError),

    /// The group an attribute change refers to is not part of the configuration.
    #[error("Group '{group_id}' not found in configuration (top-level groups: {available:?})")]
    GroupNotFound {
        group_id: String,
        available: Vec<String>,
    },

    /// The operation needs a created configuration under this owner key.
    #[error("Configuration not loaded: {0}")]
    NotLoaded(String),

    /// The operation needs a loaded active cart.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// An error occurred while communicating with the store.
    #[error("Store communication error: {0}")]
    Store(#[from] FrameworkError),
}

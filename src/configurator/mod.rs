//! # Configurator Store
//!
//! Product configurations keyed by owner key (`product/<code>`, `cartEntry/<n>`,
//! `orderEntry/<doc>+<n>`), plus a second, purely local store of per-owner UI state.
//!
//! ## Structure
//!
//! - [`events`] - [`ConfiguratorEvent`] intents and completions
//! - [`entity`] - [`StoreEntity`](process_store::StoreEntity) implementation for
//!   [`Configuration`] and its effect [`ConfiguratorContext`]
//! - [`extract`] - building the partial configuration sent for a single attribute change
//! - [`ui_state`] - [`UiState`] entity and events
//! - [`error`] - [`ConfiguratorError`]
//!
//! ## Cross-Store Effects
//!
//! Adding a configured product to the cart, or writing a configuration back to a cart entry,
//! changes the cart on the backend. The effects for those completions reload the cart through
//! the cart store client held in [`ConfiguratorContext`].

pub mod entity;
pub mod error;
pub mod events;
pub mod extract;
pub mod ui_state;

pub use entity::ConfiguratorContext;
pub use error::*;
pub use events::*;
pub use extract::extract_partial_update;
pub use ui_state::{UiEvent, UiState};

use crate::model::Configuration;
use process_store::{EntityStore, StoreClient};

/// Creates a new configuration store and its client.
pub fn new(buffer_size: usize) -> (EntityStore<Configuration>, StoreClient<Configuration>) {
    EntityStore::new(buffer_size)
}

/// Creates a new UI state store and its client.
pub fn new_ui(buffer_size: usize) -> (EntityStore<UiState>, StoreClient<UiState>) {
    EntityStore::new(buffer_size)
}

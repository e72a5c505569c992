//! # Cart Store
//!
//! The multi-cart store: every cart the session knows about, keyed by cart id, each with its
//! own load / update lifecycle.
//!
//! ## Structure
//!
//! - [`events`] - [`CartEvent`], the intents and completions the store handles
//! - [`entity`] - [`StoreEntity`](process_store::StoreEntity) implementation for [`Cart`]
//! - [`error`] - [`CartError`] returned by the cart facades
//! - [`new()`] - Factory function that creates the store and its client
//!
//! ## The Fresh Slot
//!
//! A cart that is being created has no id yet, so its lifecycle is tracked under
//! [`FRESH_CART_ID`]. On success the created cart is written both there and under its real id.

pub mod entity;
pub mod error;
pub mod events;

pub use error::*;
pub use events::*;

use crate::model::Cart;
use process_store::{EntityStore, StoreClient};

/// Key of the slot that tracks cart creation.
pub const FRESH_CART_ID: &str = "fresh";

/// Creates a new cart store and its client.
pub fn new(buffer_size: usize) -> (EntityStore<Cart>, StoreClient<Cart>) {
    EntityStore::new(buffer_size)
}

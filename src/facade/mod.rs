//! # Facades
//!
//! The public API of the storefront state. Each facade wraps a [`StoreClient`] and implements
//! [`EntityFacade`], which provides the generic keyed reads (`observe_process_state`,
//! `observe_entity`, `is_stable`). The domain operations on top either dispatch an intent or
//! derive a stream from the keyed state.
//!
//! Facades never touch the backend. Loads are requested by dispatching intents, and their
//! outcome shows up on the observed process state.
//!
//! [`StoreClient`]: process_store::StoreClient
//! [`EntityFacade`]: process_store::EntityFacade

pub mod active_cart;
pub mod cart_service;
pub mod configurator_service;

pub use active_cart::ActiveCartService;
pub use cart_service::CartService;
pub use configurator_service::ConfiguratorService;

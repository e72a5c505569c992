//! # Backend Adapters
//!
//! The commerce backend as seen by store effects. Effects only ever talk to these traits, so
//! a store can be started against the real connector, the [`memory`] backends, or a test fake.
//!
//! Backend failures come back as [`EntityLoadError`]. Effects never surface them to callers;
//! they turn them into `*Fail` events that the reducer records on the entity's process state.

pub mod memory;

use crate::model::{
    AddToCart, Cart, CartChange, CartCreate, CartEntryRead, CartEntryUpdate, Configuration,
    OrderEntryRead, Overview, Owner,
};
use async_trait::async_trait;

/// Why a backend call failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EntityLoadError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Rejected by backend: {0}")]
    Rejected(String),
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait CartAdapter: Send + Sync {
    async fn load(&self, user_id: &str, cart_id: &str) -> Result<Cart, EntityLoadError>;

    async fn create(&self, user_id: &str, params: &CartCreate) -> Result<Cart, EntityLoadError>;

    /// Applies `change` and returns the cart as the backend now holds it.
    async fn update(
        &self,
        user_id: &str,
        cart_id: &str,
        change: &CartChange,
    ) -> Result<Cart, EntityLoadError>;

    async fn delete(&self, user_id: &str, cart_id: &str) -> Result<(), EntityLoadError>;
}

#[async_trait]
pub trait ConfiguratorAdapter: Send + Sync {
    /// Creates a default configuration for a product owner.
    async fn create(&self, owner: &Owner) -> Result<Configuration, EntityLoadError>;

    async fn read_cart_entry(
        &self,
        params: &CartEntryRead,
    ) -> Result<Configuration, EntityLoadError>;

    async fn read_order_entry(
        &self,
        params: &OrderEntryRead,
    ) -> Result<Configuration, EntityLoadError>;

    /// Sends a partial configuration (one changed attribute on its group path) and returns the
    /// full configuration after the change.
    async fn update(&self, partial: &Configuration) -> Result<Configuration, EntityLoadError>;

    async fn update_cart_entry(&self, params: &CartEntryUpdate) -> Result<(), EntityLoadError>;

    async fn overview(&self, configuration: &Configuration) -> Result<Overview, EntityLoadError>;

    async fn add_to_cart(&self, params: &AddToCart) -> Result<(), EntityLoadError>;
}

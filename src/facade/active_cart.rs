//! # Active Cart
//!
//! Tracks which cart the session is working with and hands out that cart once it is loaded.

use super::CartService;
use crate::cart::{CartError, CartEvent};
use crate::identity::resolve_cart_identity;
use crate::model::{Cart, CartAddress};
use process_store::{select, EntityFacade, FrameworkError, ProcessState};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, instrument};

/// The session's active cart on top of [`CartService`].
///
/// Clones share the same active cart.
#[derive(Clone)]
pub struct ActiveCartService {
    carts: CartService,
    active: Arc<watch::Sender<Option<CartAddress>>>,
}

impl ActiveCartService {
    pub fn new(carts: CartService) -> Self {
        let (active, _) = watch::channel(None);
        Self {
            carts,
            active: Arc::new(active),
        }
    }

    pub fn carts(&self) -> &CartService {
        &self.carts
    }

    pub fn activate(&self, address: CartAddress) {
        info!(user_id = %address.user_id, cart_id = %address.cart_id, "Cart activated");
        self.active.send_replace(Some(address));
    }

    /// Activates `cart` at the address its owner resolves to.
    pub fn activate_cart(&self, cart: &Cart) {
        self.activate(resolve_cart_identity(cart));
    }

    pub fn deactivate(&self) {
        self.active.send_replace(None);
    }

    pub fn active_cart(&self) -> Option<CartAddress> {
        self.active.borrow().clone()
    }

    /// Waits for the active cart to be loaded, triggering the load if nothing is cached.
    ///
    /// Resolves once the cart's process is stable and it either holds a cart or has failed.
    ///
    /// # Errors
    /// - [`CartError::NoActiveCart`] if no cart is active.
    /// - [`CartError::LoadFailed`] if the load failed and no earlier value is cached.
    #[instrument(skip(self))]
    pub async fn require_loaded_cart(&self) -> Result<Cart, CartError> {
        let address = self.active_cart().ok_or(CartError::NoActiveCart)?;
        let load = CartEvent::LoadCart {
            user_id: address.user_id.clone(),
            cart_id: address.cart_id.clone(),
        };
        let triggered = self
            .carts
            .store()
            .dispatch_if(
                address.cart_id.clone(),
                |state: &ProcessState<Cart>| state.value.is_none() && !state.loading,
                load,
            )
            .await?;
        if triggered {
            debug!(cart_id = %address.cart_id, "Loading active cart");
        }

        // Subscribed after the guarded dispatch, so a stale failure cannot settle the wait.
        let states = self.carts.get_cart_entity(&address.cart_id).await?;
        let settled = select::first_matching(states, |state| {
            state.is_stable() && (state.value.is_some() || state.error)
        })
        .await;
        match settled {
            Some(ProcessState {
                value: Some(cart), ..
            }) => Ok(cart),
            Some(_) => Err(CartError::LoadFailed(address.cart_id)),
            None => Err(CartError::Store(FrameworkError::StoreDropped)),
        }
    }
}

//! [`StoreEntity`] implementation for [`Cart`].
//!
//! Intents start the cart's process, backend completions settle it. Creation is tracked under
//! [`FRESH_CART_ID`] until the backend has assigned the cart an id.

use super::{CartEvent, FRESH_CART_ID};
use crate::backend::CartAdapter;
use crate::identity::resolve_cart_identity;
use crate::model::Cart;
use async_trait::async_trait;
use process_store::{KeyedStore, StoreEntity, Transition};
use std::sync::Arc;
use tracing::{debug, info};

#[async_trait]
impl StoreEntity for Cart {
    type Event = CartEvent;
    type Context = Arc<dyn CartAdapter>;

    fn reduce(store: &mut KeyedStore<Self>, event: &CartEvent) {
        match event {
            CartEvent::LoadCart { cart_id, .. }
            | CartEvent::UpdateCart { cart_id, .. }
            | CartEvent::DeleteCart { cart_id, .. } => store.apply(cart_id, Transition::Start),

            CartEvent::LoadCartSuccess { cart_id, cart }
            | CartEvent::UpdateCartSuccess { cart_id, cart } => {
                store.apply(cart_id, Transition::Success(cart.clone()))
            }

            CartEvent::LoadCartFail { cart_id, error }
            | CartEvent::UpdateCartFail { cart_id, error }
            | CartEvent::DeleteCartFail { cart_id, error } => {
                store.apply(cart_id, Transition::Fail(error.to_string()))
            }

            CartEvent::CreateCart { .. } => {
                // A new creation must not show the previous creation's cart.
                store.remove(FRESH_CART_ID);
                store.apply(FRESH_CART_ID, Transition::Start);
            }
            CartEvent::CreateCartSuccess {
                cart,
                merged_cart_guid,
            } => {
                let address = resolve_cart_identity(cart);
                info!(cart_id = %address.cart_id, "Cart created");
                store.apply(FRESH_CART_ID, Transition::Success(cart.clone()));
                store.apply(&address.cart_id, Transition::Success(cart.clone()));
                if let Some(guid) = merged_cart_guid.as_deref() {
                    if guid != address.cart_id {
                        store.remove(guid);
                    }
                }
            }
            CartEvent::CreateCartFail { error } => {
                store.apply(FRESH_CART_ID, Transition::Fail(error.to_string()))
            }

            CartEvent::DeleteCartSuccess { cart_id } | CartEvent::RemoveCart { cart_id } => {
                store.remove(cart_id);
            }
            CartEvent::ResetCart { cart_id } => store.apply(cart_id, Transition::Reset),
        }
    }

    async fn effect(event: CartEvent, backend: &Arc<dyn CartAdapter>) -> Vec<CartEvent> {
        match event {
            CartEvent::LoadCart { user_id, cart_id } => {
                debug!(cart_id = %cart_id, "Loading cart");
                match backend.load(&user_id, &cart_id).await {
                    Ok(cart) => vec![CartEvent::LoadCartSuccess { cart_id, cart }],
                    Err(error) => vec![CartEvent::LoadCartFail { cart_id, error }],
                }
            }
            CartEvent::CreateCart { user_id, params } => {
                match backend.create(&user_id, &params).await {
                    Ok(cart) => vec![CartEvent::CreateCartSuccess {
                        cart,
                        merged_cart_guid: params.to_merge_cart_guid,
                    }],
                    Err(error) => vec![CartEvent::CreateCartFail { error }],
                }
            }
            CartEvent::UpdateCart {
                user_id,
                cart_id,
                change,
            } => match backend.update(&user_id, &cart_id, &change).await {
                Ok(cart) => vec![CartEvent::UpdateCartSuccess { cart_id, cart }],
                Err(error) => vec![CartEvent::UpdateCartFail { cart_id, error }],
            },
            CartEvent::DeleteCart { user_id, cart_id } => {
                match backend.delete(&user_id, &cart_id).await {
                    Ok(()) => vec![CartEvent::DeleteCartSuccess { cart_id }],
                    Err(error) => vec![CartEvent::DeleteCartFail { cart_id, error }],
                }
            }
            _ => Vec::new(),
        }
    }

    fn is_created(&self) -> bool {
        !self.code.is_empty() || !self.guid.is_empty()
    }
}

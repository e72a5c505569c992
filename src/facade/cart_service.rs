//! # Cart Service
//!
//! Multi-cart facade: every operation addresses one cart by id.

use crate::cart::{CartError, CartEvent, FRESH_CART_ID};
use crate::model::{Cart, CartChange, CartCreate, EntryRequest, OrderEntry};
use futures::stream::{BoxStream, StreamExt};
use process_store::{select, EntityFacade, FrameworkError, ProcessState, StoreClient};
use tracing::{debug, info, instrument};

/// Facade over the cart store.
#[derive(Clone)]
pub struct CartService {
    store: StoreClient<Cart>,
}

impl CartService {
    pub fn new(store: StoreClient<Cart>) -> Self {
        Self { store }
    }

    /// Created carts stored under `cart_id`.
    pub async fn get_cart(&self, cart_id: &str) -> Result<BoxStream<'static, Cart>, CartError> {
        self.observe_entity(cart_id).await
    }

    /// Full process state of `cart_id`.
    pub async fn get_cart_entity(
        &self,
        cart_id: &str,
    ) -> Result<BoxStream<'static, ProcessState<Cart>>, CartError> {
        self.observe_process_state(cart_id).await
    }

    /// Creates a cart, optionally merging an anonymous cart into it.
    ///
    /// Returns the process state of the creation slot, starting with the in-flight state.
    #[instrument(skip(self))]
    pub async fn create_cart(
        &self,
        user_id: &str,
        params: CartCreate,
    ) -> Result<BoxStream<'static, ProcessState<Cart>>, CartError> {
        info!("Creating cart");
        self.store
            .dispatch(CartEvent::CreateCart {
                user_id: user_id.to_string(),
                params,
            })
            .await?;
        self.observe_process_state(FRESH_CART_ID).await
    }

    #[instrument(skip(self))]
    pub async fn load_cart(&self, user_id: &str, cart_id: &str) -> Result<(), CartError> {
        self.store
            .dispatch(CartEvent::LoadCart {
                user_id: user_id.to_string(),
                cart_id: cart_id.to_string(),
            })
            .await?;
        Ok(())
    }

    /// Entries of `cart_id`, empty while no cart is cached.
    pub async fn get_entries(
        &self,
        cart_id: &str,
    ) -> Result<BoxStream<'static, Vec<OrderEntry>>, CartError> {
        let entries = self
            .observe_process_state(cart_id)
            .await?
            .map(|state| state.value.map(|cart| cart.entries).unwrap_or_default());
        Ok(select::distinct_until_changed(entries).boxed())
    }

    /// The entry for `product_code` in `cart_id`, if any.
    pub async fn get_entry(
        &self,
        cart_id: &str,
        product_code: &str,
    ) -> Result<BoxStream<'static, Option<OrderEntry>>, CartError> {
        let product_code = product_code.to_string();
        let entry = self
            .observe_process_state(cart_id)
            .await?
            .map(move |state| {
                state
                    .value
                    .and_then(|cart| cart.entry_for_product(&product_code).cloned())
            });
        Ok(select::distinct_until_changed(entry).boxed())
    }

    #[instrument(skip(self))]
    pub async fn add_entry(
        &self,
        user_id: &str,
        cart_id: &str,
        product_code: &str,
        quantity: u32,
    ) -> Result<(), CartError> {
        self.change(
            user_id,
            cart_id,
            CartChange::AddEntry {
                product_code: product_code.to_string(),
                quantity,
            },
        )
        .await
    }

    /// Adds each entry with its own update, in order.
    #[instrument(skip(self, entries), fields(count = entries.len()))]
    pub async fn add_entries(
        &self,
        user_id: &str,
        cart_id: &str,
        entries: &[EntryRequest],
    ) -> Result<(), CartError> {
        for entry in entries {
            self.add_entry(user_id, cart_id, &entry.product_code, entry.quantity)
                .await?;
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn remove_entry(
        &self,
        user_id: &str,
        cart_id: &str,
        entry_number: u32,
    ) -> Result<(), CartError> {
        self.change(user_id, cart_id, CartChange::RemoveEntry { entry_number })
            .await
    }

    /// Sets the quantity of an entry. A quantity of 0 removes the entry.
    #[instrument(skip(self))]
    pub async fn update_entry(
        &self,
        user_id: &str,
        cart_id: &str,
        entry_number: u32,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove_entry(user_id, cart_id, entry_number).await;
        }
        self.change(
            user_id,
            cart_id,
            CartChange::UpdateEntry {
                entry_number,
                quantity,
            },
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn assign_email(
        &self,
        user_id: &str,
        cart_id: &str,
        email: &str,
    ) -> Result<(), CartError> {
        self.change(
            user_id,
            cart_id,
            CartChange::AssignEmail {
                email: email.to_string(),
            },
        )
        .await
    }

    /// Deletes the cart on the backend; the entry is dropped once that succeeds.
    #[instrument(skip(self))]
    pub async fn delete_cart(&self, user_id: &str, cart_id: &str) -> Result<(), CartError> {
        info!("Deleting cart");
        self.store
            .dispatch(CartEvent::DeleteCart {
                user_id: user_id.to_string(),
                cart_id: cart_id.to_string(),
            })
            .await?;
        Ok(())
    }

    /// Drops the cart from the local store only.
    #[instrument(skip(self))]
    pub async fn remove_cart(&self, cart_id: &str) -> Result<(), CartError> {
        self.store
            .dispatch(CartEvent::RemoveCart {
                cart_id: cart_id.to_string(),
            })
            .await?;
        Ok(())
    }

    /// Clears the flags of a cart after a failure, keeping its cached value.
    #[instrument(skip(self))]
    pub async fn reset_cart(&self, cart_id: &str) -> Result<(), CartError> {
        self.store
            .dispatch(CartEvent::ResetCart {
                cart_id: cart_id.to_string(),
            })
            .await?;
        Ok(())
    }

    async fn change(&self, user_id: &str, cart_id: &str, change: CartChange) -> Result<(), CartError> {
        debug!(cart_id, ?change, "Updating cart");
        self.store
            .dispatch(CartEvent::UpdateCart {
                user_id: user_id.to_string(),
                cart_id: cart_id.to_string(),
                change,
            })
            .await?;
        Ok(())
    }
}

impl EntityFacade<Cart> for CartService {
    type Error = CartError;

    fn store(&self) -> &StoreClient<Cart> {
        &self.store
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        CartError::Store(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use process_store::mock::{create_mock_store, expect_dispatch};

    #[tokio::test]
    async fn test_update_to_zero_removes_entry() {
        let (client, mut requests) = create_mock_store::<Cart>(10);
        let service = CartService::new(client);

        let task = tokio::spawn(async move { service.update_entry("current", "0001", 2, 0).await });

        let (event, ack) = expect_dispatch(&mut requests).await.expect("Expected Dispatch");
        assert_eq!(
            event,
            CartEvent::UpdateCart {
                user_id: "current".into(),
                cart_id: "0001".into(),
                change: CartChange::RemoveEntry { entry_number: 2 },
            }
        );
        ack.send(Ok(())).unwrap();
        assert_eq!(task.await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn test_add_entries_dispatches_one_add_per_product() {
        let (client, mut requests) = create_mock_store::<Cart>(10);
        let service = CartService::new(client);
        let entries = vec![
            EntryRequest {
                product_code: "A".into(),
                quantity: 1,
            },
            EntryRequest {
                product_code: "B".into(),
                quantity: 3,
            },
        ];

        let task = tokio::spawn(async move { service.add_entries("current", "0001", &entries).await });

        for (code, quantity) in [("A", 1), ("B", 3)] {
            let (event, ack) = expect_dispatch(&mut requests).await.expect("Expected Dispatch");
            assert_eq!(
                event,
                CartEvent::UpdateCart {
                    user_id: "current".into(),
                    cart_id: "0001".into(),
                    change: CartChange::AddEntry {
                        product_code: code.into(),
                        quantity,
                    },
                }
            );
            ack.send(Ok(())).unwrap();
        }
        assert_eq!(task.await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn test_store_gone_is_reported() {
        let (client, requests) = create_mock_store::<Cart>(10);
        drop(requests);
        let service = CartService::new(client);

        assert_eq!(
            service.load_cart("current", "0001").await,
            Err(CartError::Store(FrameworkError::StoreClosed))
        );
    }
}

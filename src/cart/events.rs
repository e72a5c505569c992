use crate::backend::EntityLoadError;
use crate::model::{Cart, CartChange, CartCreate};

/// Intents dispatched by the cart facades and the completions their effects produce.
#[derive(Debug, Clone, PartialEq)]
pub enum CartEvent {
    LoadCart {
        user_id: String,
        cart_id: String,
    },
    LoadCartSuccess {
        cart_id: String,
        cart: Cart,
    },
    LoadCartFail {
        cart_id: String,
        error: EntityLoadError,
    },
    CreateCart {
        user_id: String,
        params: CartCreate,
    },
    CreateCartSuccess {
        cart: Cart,
        merged_cart_guid: Option<String>,
    },
    CreateCartFail {
        error: EntityLoadError,
    },
    UpdateCart {
        user_id: String,
        cart_id: String,
        change: CartChange,
    },
    UpdateCartSuccess {
        cart_id: String,
        cart: Cart,
    },
    UpdateCartFail {
        cart_id: String,
        error: EntityLoadError,
    },
    DeleteCart {
        user_id: String,
        cart_id: String,
    },
    DeleteCartSuccess {
        cart_id: String,
    },
    DeleteCartFail {
        cart_id: String,
        error: EntityLoadError,
    },
    /// Clears the flags of a cart, keeping the cached value.
    ResetCart {
        cart_id: String,
    },
    /// Drops a cart from the store without touching the backend.
    RemoveCart {
        cart_id: String,
    },
}

/// A shopping cart as returned by the commerce backend.
///
/// # Addressing
/// A cart is stored under its *cart id*, which depends on who owns it: anonymous carts are
/// addressed by `guid`, carts of a signed-in user by `code`. See
/// [`resolve_cart_identity`](crate::identity::resolve_cart_identity).
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub code: String,
    pub guid: String,
    pub user: CartUser,
    #[serde(default)]
    pub entries: Vec<OrderEntry>,
    pub total_items: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Cart {
    /// Creates an empty cart for `uid`.
    pub fn new(code: impl Into<String>, guid: impl Into<String>, uid: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            guid: guid.into(),
            user: CartUser { uid: uid.into() },
            ..Self::default()
        }
    }

    pub fn entry_for_product(&self, product_code: &str) -> Option<&OrderEntry> {
        self.entries
            .iter()
            .find(|entry| entry.product.code == product_code)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartUser {
    pub uid: String,
}

/// One line of a cart or order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEntry {
    pub entry_number: u32,
    pub product: ProductRef,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRef {
    pub code: String,
}

/// Where a cart lives on the backend: the user path segment and the cart id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartAddress {
    pub user_id: String,
    pub cart_id: String,
}

impl CartAddress {
    pub fn new(user_id: impl Into<String>, cart_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            cart_id: cart_id.into(),
        }
    }
}

/// Payload for creating a cart.
///
/// With `to_merge_cart_guid` set, the backend merges that anonymous cart into the new (or
/// `old_cart_id`) cart and the anonymous one ceases to exist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartCreate {
    pub old_cart_id: Option<String>,
    pub to_merge_cart_guid: Option<String>,
}

/// A product code and quantity, as passed to bulk add.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryRequest {
    pub product_code: String,
    pub quantity: u32,
}

/// A write against an existing cart.
#[derive(Debug, Clone, PartialEq)]
pub enum CartChange {
    AddEntry { product_code: String, quantity: u32 },
    UpdateEntry { entry_number: u32, quantity: u32 },
    RemoveEntry { entry_number: u32 },
    AssignEmail { email: String },
}

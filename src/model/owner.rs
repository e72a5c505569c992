//! The owner of a product configuration.

use crate::identity::{self, OwnerError};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

/// What a configuration belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OwnerType {
    #[serde(rename = "product")]
    Product,
    #[serde(rename = "cartEntry")]
    CartEntry,
    #[serde(rename = "orderEntry")]
    OrderEntry,
}

impl OwnerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerType::Product => "product",
            OwnerType::CartEntry => "cartEntry",
            OwnerType::OrderEntry => "orderEntry",
        }
    }
}

impl Display for OwnerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OwnerType {
    type Err = OwnerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "product" => Ok(OwnerType::Product),
            "cartEntry" => Ok(OwnerType::CartEntry),
            "orderEntry" => Ok(OwnerType::OrderEntry),
            other => Err(OwnerError::InvalidOwner(format!(
                "unknown owner type '{other}'"
            ))),
        }
    }
}

/// The semantic subject a configuration belongs to.
///
/// `key` is derived as `<type>/<id>` by [`identity::set_owner_key`] and is the key the
/// configuration is stored under. For [`OwnerType::OrderEntry`] (and cart entries addressed
/// across documents) `id` is a compound `<documentId>+<entryNumber>`, see
/// [`identity::compose_owner_id`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    #[serde(rename = "type")]
    pub owner_type: OwnerType,
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub has_obsolete_state: bool,
}

impl Owner {
    /// Builds an owner and derives its key.
    ///
    /// # Errors
    /// [`OwnerError::InvalidOwner`] if `id` is empty.
    pub fn new(owner_type: OwnerType, id: impl Into<String>) -> Result<Self, OwnerError> {
        let mut owner = Self {
            owner_type,
            id: id.into(),
            key: String::new(),
            has_obsolete_state: false,
        };
        identity::set_owner_key(&mut owner)?;
        Ok(owner)
    }

    /// Builds an owner from an untyped description, e.g. a route parameter.
    pub fn parse(owner_type: &str, id: impl Into<String>) -> Result<Self, OwnerError> {
        Self::new(owner_type.parse()?, id)
    }

    pub fn product(product_code: impl Into<String>) -> Result<Self, OwnerError> {
        Self::new(OwnerType::Product, product_code)
    }

    pub fn cart_entry(entry_number: impl Into<String>) -> Result<Self, OwnerError> {
        Self::new(OwnerType::CartEntry, entry_number)
    }

    pub fn order_entry(document_id: &str, entry_number: u32) -> Result<Self, OwnerError> {
        Self::new(
            OwnerType::OrderEntry,
            identity::compose_owner_id(document_id, entry_number),
        )
    }

    /// Marks the cached configuration as outdated so the next get-or-create re-reads it.
    pub fn with_obsolete_state(mut self) -> Self {
        self.has_obsolete_state = true;
        self
    }
}

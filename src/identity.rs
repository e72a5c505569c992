//! Owner identity resolution.
//!
//! Pure functions that turn semantic owners into store keys, split compound owner ids back into
//! their parts, and work out which backend address a cart lives at.

use crate::model::{Cart, CartAddress, Owner};

/// User id the backend uses for anonymous (guest) sessions.
pub const OCC_USER_ID_ANONYMOUS: &str = "anonymous";

/// User id placeholder meaning "whoever is signed in".
pub const OCC_USER_ID_CURRENT: &str = "current";

const OWNER_ID_SEPARATOR: char = '+';

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OwnerError {
    #[error("Invalid owner: {0}")]
    InvalidOwner(String),
    #[error("Malformed owner id '{0}': expected <documentId>+<entryNumber>")]
    MalformedOwnerId(String),
}

/// The two halves of a compound owner id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerIdParts {
    pub document_id: String,
    pub entry_number: u32,
}

/// Derives `owner.key` as `<type>/<id>`.
///
/// # Errors
/// [`OwnerError::InvalidOwner`] if the id is empty. The message names what kind of id was
/// expected for the owner's type.
pub fn set_owner_key(owner: &mut Owner) -> Result<(), OwnerError> {
    use crate::model::OwnerType;

    if owner.id.is_empty() {
        let expected = match owner.owner_type {
            OwnerType::Product => "expected a product code",
            OwnerType::CartEntry | OwnerType::OrderEntry => "expected a document entry id",
        };
        return Err(OwnerError::InvalidOwner(expected.to_string()));
    }
    owner.key = format!("{}/{}", owner.owner_type, owner.id);
    Ok(())
}

pub fn compose_owner_id(document_id: &str, entry_number: u32) -> String {
    format!("{document_id}{OWNER_ID_SEPARATOR}{entry_number}")
}

/// Splits `<documentId>+<entryNumber>` at the last separator.
///
/// Splitting at the last `+` keeps document ids that themselves contain `+` intact, so
/// composing and decomposing round-trips for every document id.
///
/// # Errors
/// [`OwnerError::MalformedOwnerId`] if there is no separator, the document id is empty, or the
/// entry number is not a non-negative integer.
pub fn decompose_owner_id(owner_id: &str) -> Result<OwnerIdParts, OwnerError> {
    let malformed = || OwnerError::MalformedOwnerId(owner_id.to_string());
    let (document_id, entry_number) = owner_id
        .rsplit_once(OWNER_ID_SEPARATOR)
        .ok_or_else(malformed)?;
    if document_id.is_empty() {
        return Err(malformed());
    }
    let entry_number = entry_number.parse().map_err(|_| malformed())?;
    Ok(OwnerIdParts {
        document_id: document_id.to_string(),
        entry_number,
    })
}

/// Anonymous carts are addressed by guid under the anonymous user, every other cart by code
/// under the current user.
pub fn resolve_cart_identity(cart: &Cart) -> CartAddress {
    if cart.user.uid == OCC_USER_ID_ANONYMOUS {
        CartAddress::new(OCC_USER_ID_ANONYMOUS, cart.guid.clone())
    } else {
        CartAddress::new(OCC_USER_ID_CURRENT, cart.code.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OwnerType;

    #[test]
    fn test_owner_key_joins_type_and_id() {
        let owner = Owner::product("CONF_LAPTOP").unwrap();
        assert_eq!(owner.key, "product/CONF_LAPTOP");

        let owner = Owner::cart_entry("3").unwrap();
        assert_eq!(owner.key, "cartEntry/3");

        let owner = Owner::order_entry("0001000", 2).unwrap();
        assert_eq!(owner.key, "orderEntry/0001000+2");
    }

    #[test]
    fn test_empty_id_is_rejected() {
        assert_eq!(
            Owner::product(""),
            Err(OwnerError::InvalidOwner("expected a product code".into()))
        );
        assert!(matches!(
            Owner::new(OwnerType::OrderEntry, ""),
            Err(OwnerError::InvalidOwner(_))
        ));
    }

    #[test]
    fn test_unknown_owner_type_is_rejected() {
        assert!(matches!(
            Owner::parse("quote", "Q1"),
            Err(OwnerError::InvalidOwner(_))
        ));
        assert_eq!(Owner::parse("cartEntry", "1").unwrap().key, "cartEntry/1");
    }

    #[test]
    fn test_compose_then_decompose() {
        let id = compose_owner_id("0001000", 12);
        assert_eq!(id, "0001000+12");
        assert_eq!(
            decompose_owner_id(&id).unwrap(),
            OwnerIdParts {
                document_id: "0001000".into(),
                entry_number: 12
            }
        );
    }

    #[test]
    fn test_document_id_may_contain_separator() {
        let id = compose_owner_id("A+B", 1);
        let parts = decompose_owner_id(&id).unwrap();
        assert_eq!(parts.document_id, "A+B");
        assert_eq!(parts.entry_number, 1);
    }

    #[test]
    fn test_malformed_owner_ids() {
        for id in ["0001000", "+3", "0001000+", "0001000+x", "0001000+-1"] {
            assert_eq!(
                decompose_owner_id(id),
                Err(OwnerError::MalformedOwnerId(id.to_string())),
                "{id}"
            );
        }
    }

    #[test]
    fn test_cart_identity_depends_on_user() {
        let anonymous = Cart::new("00001", "guid-1", OCC_USER_ID_ANONYMOUS);
        assert_eq!(
            resolve_cart_identity(&anonymous),
            CartAddress::new("anonymous", "guid-1")
        );

        let registered = Cart::new("00002", "guid-2", "jane@example.com");
        assert_eq!(
            resolve_cart_identity(&registered),
            CartAddress::new("current", "00002")
        );
    }
}

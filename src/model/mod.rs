//! Plain data structures for the storefront domain.
//!
//! These types carry no behaviour beyond small derived predicates. They become store entities
//! through the [`StoreEntity`](process_store::StoreEntity) impls in [`crate::cart`],
//! [`crate::configurator`] and [`crate::configurator::ui_state`].

pub mod cart;
pub mod configurator;
pub mod owner;

pub use cart::*;
pub use configurator::*;
pub use owner::*;

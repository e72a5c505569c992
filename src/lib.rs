//! # Storefront State
//!
//! Client-side state orchestration for a storefront: many carts and many product
//! configurations, each loaded, created and updated asynchronously, each with its own
//! loading / success / error lifecycle, all behind one serialized reducer path per store.
//!
//! ## 🏗️ Design
//!
//! The generic machinery lives in the [`process_store`] crate: the process state envelope, the
//! keyed store, the store task and the facade trait. This crate supplies the domain:
//!
//! - what a cart and a configuration are ([`model`]),
//! - how owners become keys ([`identity`]),
//! - how events change each store and which backend calls they cause ([`cart`],
//!   [`configurator`]),
//! - what the backend looks like ([`backend`]),
//! - the operations callers use ([`facade`]),
//! - and how it is all started and stopped ([`lifecycle`]).
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Stores ([`cart`], [`configurator`])
//! Each store is a [`StoreEntity`](process_store::StoreEntity) impl: an event enum, a pure
//! reducer and an effect handler calling the backend adapter from its context.
//!
//! ### 2. The Interface ([`facade`])
//! [`CartService`](facade::CartService), [`ActiveCartService`](facade::ActiveCartService) and
//! [`ConfiguratorService`](facade::ConfiguratorService). Reads are infinite streams that
//! start with the current state; writes return once the intent has been reduced.
//!
//! ### 3. The Orchestrator ([`lifecycle`])
//! [`StorefrontSystem`](lifecycle::StorefrontSystem) creates the stores, injects their
//! dependencies and shuts them down.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Run the demo with info logs
//! RUST_LOG=info cargo run
//! ```

pub mod backend;
pub mod cart;
pub mod configurator;
pub mod facade;
pub mod identity;
pub mod lifecycle;
pub mod model;

//! # System Lifecycle
//!
//! Starting, wiring and stopping the stores behind the facades.
//!
//! ## Wiring
//!
//! Stores are created first and started afterwards with their context injected through
//! [`EntityStore::run`](process_store::EntityStore::run). The configuration store's context
//! holds a client of the cart store, so the dependency graph is:
//!
//! ```text
//! ConfiguratorService ──▶ configuration store ──(effects)──▶ cart store
//!         │                                                     ▲
//!         ├──▶ UI state store                                   │
//!         └──▶ ActiveCartService ──▶ CartService ───────────────┘
//! ```
//!
//! The graph is acyclic, so dropping the facades is enough to stop everything: each store
//! exits once its last client is gone, and the cart store's last client lives in the
//! configuration store's context.
//!
//! ## Observability
//!
//! Call [`setup_tracing`] once at startup. `RUST_LOG=debug` shows every reduced event.

pub mod config;
pub mod storefront_system;

pub use config::*;
pub use process_store::tracing::setup_tracing;
pub use storefront_system::*;

//! # Process Store
//!
//! This crate provides the building blocks for managing many independently loaded entities,
//! each with its own loading / success / error / in-flight lifecycle, behind a single
//! serialized reducer path.
//!
//! ## Architecture Overview
//!
//! The crate separates concerns into four layers:
//!
//! 1. **State Layer** ([`ProcessState`], [`Transition`], [`KeyedStore`]) - the lifecycle envelope
//!    of one entity and the key → envelope map, as pure data plus transition rules.
//! 2. **Entity Layer** ([`StoreEntity`]) - the domain's events, reducer and effects.
//! 3. **Runtime Layer** ([`EntityStore`]) - the task that owns the map, reduces events in
//!    dispatch order, publishes per-key watch channels and runs effects.
//! 4. **Interface Layer** ([`StoreClient`], [`EntityFacade`]) - dispatch/observe handles and the
//!    read operations shared by all domain facades.
//!
//! ## Data Flow
//!
//! ```text
//! facade call ──dispatch(intent)──▶ EntityStore ──reduce──▶ KeyedStore ──publish──▶ watch(key)
//!                                       │                                           │
//!                                       └──effect(intent)──▶ backend                ▼
//!                                              │                            facade streams
//!                                              └──dispatch(completion)──▶ EntityStore
//! ```
//!
//! ## Concurrency Model
//!
//! - Each store runs in its own Tokio task and processes requests **sequentially**
//! - Transitions for one key are applied in dispatch order; across keys there is no ordering
//! - Effects run in spawned tasks so a slow backend never blocks the reducer
//! - Observers hold `watch` receivers and always see the latest state of their key
//!
//! ## Testing
//!
//! See the [`mock`] module for asserting facade dispatch behaviour without a running store.

pub mod actor;
pub mod client;
pub mod entity;
pub mod error;
pub mod facade;
pub mod keyed;
pub mod message;
pub mod mock;
pub mod process_state;
pub mod select;
pub mod tracing;

// Re-export core types for convenience
pub use actor::EntityStore;
pub use client::StoreClient;
pub use entity::StoreEntity;
pub use error::FrameworkError;
pub use facade::EntityFacade;
pub use keyed::KeyedStore;
pub use message::{Guard, Response, StoreRequest};
pub use process_state::{ProcessState, Transition};

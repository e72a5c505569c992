//! # Framework Errors
//!
//! Errors raised by the store plumbing itself. Domain failures never show up here: an
//! asynchronous load failure is recorded as a `Fail` transition in the entity's
//! [`ProcessState`](crate::ProcessState), not returned to the caller.

/// Errors that can occur while talking to an [`EntityStore`](crate::EntityStore).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameworkError {
    #[error("Store closed")]
    StoreClosed,
    #[error("Store dropped response channel")]
    StoreDropped,
}

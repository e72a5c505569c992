//! # Observability & Tracing
//!
//! [`setup_tracing`] initializes structured logging for a process hosting one or more stores.
//!
//! ## What Gets Traced
//!
//! - **Store lifecycle**: `Store started` and `Shutdown` (with the final entry count)
//! - **Reductions**: every dispatched event at `debug`, every transition with its key
//! - **Failures**: `Fail` transitions at `warn`, with the key and the failure reason
//! - **Facade calls**: `#[instrument]` spans around the read operations
//!
//! ## Usage
//!
//! ```bash
//! # Lifecycle only
//! RUST_LOG=info cargo run
//!
//! # Every event and transition
//! RUST_LOG=debug cargo run
//!
//! # Only the store plumbing
//! RUST_LOG=process_store=debug cargo run
//! ```
//!
//! With `RUST_LOG=debug` a configuration load reads like:
//!
//! ```text
//! DEBUG Dispatch entity_type="Configuration" event=CreateConfiguration(Owner { .. })
//! DEBUG Transition key="product/CONF_LAPTOP" transition="start"
//! DEBUG Dispatch entity_type="Configuration" event=CreateConfigurationSuccess(Configuration { .. })
//! DEBUG Transition key="product/CONF_LAPTOP" transition="success"
//! ```

/// Installs a compact `fmt` subscriber filtered by `RUST_LOG`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // entity_type and key fields already say where a line comes from
        .compact()
        .init();
}

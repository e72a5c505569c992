use super::SystemConfig;
use crate::backend::{CartAdapter, ConfiguratorAdapter};
use crate::configurator::ConfiguratorContext;
use crate::facade::{ActiveCartService, CartService, ConfiguratorService};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// The composition root: all stores, running, behind their facades.
///
/// # Example
///
/// ```rust
/// use storefront_state::backend::memory::{InMemoryCartBackend, InMemoryConfiguratorBackend};
/// use storefront_state::lifecycle::{StorefrontSystem, SystemConfig};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), String> {
///     let system = StorefrontSystem::new(
///         &SystemConfig::default(),
///         Arc::new(InMemoryCartBackend::new()),
///         Arc::new(InMemoryConfiguratorBackend::new()),
///     );
///
///     system.carts.load_cart("current", "00000001").await.map_err(|e| e.to_string())?;
///
///     system.shutdown().await
/// }
/// ```
pub struct StorefrontSystem {
    pub carts: CartService,
    pub active_cart: ActiveCartService,
    pub configurator: ConfiguratorService,

    /// Store tasks, in the order they are awaited on shutdown.
    handles: Vec<(&'static str, JoinHandle<()>)>,
}

impl StorefrontSystem {
    /// Creates the cart, configuration and UI state stores and starts them.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        config: &SystemConfig,
        cart_backend: Arc<dyn CartAdapter>,
        configurator_backend: Arc<dyn ConfiguratorAdapter>,
    ) -> Self {
        // 1. Create stores (no dependencies yet)
        let (cart_store, cart_client) = crate::cart::new(config.buffer_size);
        let (configuration_store, configuration_client) =
            crate::configurator::new(config.buffer_size);
        let (ui_store, ui_client) = crate::configurator::new_ui(config.buffer_size);

        // 2. Start stores with injected context
        let cart_handle = tokio::spawn(cart_store.run(cart_backend));
        let configuration_handle = tokio::spawn(configuration_store.run(ConfiguratorContext {
            backend: configurator_backend,
            carts: cart_client.clone(),
        }));
        let ui_handle = tokio::spawn(ui_store.run(()));

        // 3. Facades
        let carts = CartService::new(cart_client);
        let active_cart = ActiveCartService::new(carts.clone());
        let configurator =
            ConfiguratorService::new(configuration_client, ui_client, active_cart.clone());

        info!(buffer_size = config.buffer_size, "Storefront system started");
        Self {
            carts,
            active_cart,
            configurator,
            handles: vec![
                ("configuration", configuration_handle),
                ("ui", ui_handle),
                ("cart", cart_handle),
            ],
        }
    }

    /// Gracefully shuts down all stores.
    ///
    /// Drops the facades and waits for every store task to finish. Clones of the facades and
    /// streams obtained from them keep their store alive, so they must be dropped first.
    ///
    /// # Returns
    ///
    /// - `Ok(())` if all stores shut down cleanly
    /// - `Err(String)` if a store task panicked
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down storefront system...");

        drop(self.configurator);
        drop(self.active_cart);
        drop(self.carts);

        for (name, handle) in self.handles {
            if let Err(e) = handle.await {
                error!(store = name, "Store task failed: {:?}", e);
                return Err(format!("Store task '{name}' failed: {e:?}"));
            }
        }

        info!("Storefront system shutdown complete.");
        Ok(())
    }
}

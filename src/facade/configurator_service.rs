//! # Configurator Service
//!
//! Facade over the configuration and UI state stores. Owners are addressed by their key; see
//! [`identity`](crate::identity) for how keys and compound owner ids are formed.
//!
//! ## Get-or-Create
//!
//! [`ConfiguratorService::get_or_create_configuration`] is the composite read. Each state
//! published for the owner key passes through a trigger stage before it is filtered:
//!
//! ```text
//! state ──▶ needs load? ──yes──▶ dispatch_if(guard, load intent)
//!   │                                     │ guard re-checked inside the store
//!   ▼                                     ▼
//! created value? ──▶ emit          at most one load per key in flight
//! ```
//!
//! The guard runs inside the store task, so concurrent subscribers for the same owner produce
//! exactly one backend request.

use crate::configurator::{
    extract_partial_update, ConfiguratorError, ConfiguratorEvent, UiEvent, UiState,
};
use crate::facade::ActiveCartService;
use crate::identity::{decompose_owner_id, resolve_cart_identity, OCC_USER_ID_CURRENT};
use crate::model::{
    AddToCart, Attribute, CartEntryRead, CartEntryUpdate, Configuration, OrderEntryRead, Owner,
    OwnerType,
};
use futures::stream::{BoxStream, StreamExt};
use process_store::{select, EntityFacade, FrameworkError, ProcessState, StoreClient};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn, Instrument};

/// Whether a load should be triggered for a state.
///
/// Not while loading or after a failure; otherwise when nothing usable is cached, or when
/// `force` asks for a re-read of an obsolete value.
fn needs_load(state: &ProcessState<Configuration>, force: bool) -> bool {
    let created = state.value.as_ref().is_some_and(Configuration::is_created);
    (force || !created) && !state.loading && !state.error
}

/// Whether an overview should be requested. Earlier failures of unrelated processes do not
/// block it.
fn needs_overview(state: &ProcessState<Configuration>) -> bool {
    state
        .value
        .as_ref()
        .is_some_and(|configuration| configuration.is_created() && !configuration.has_overview())
        && !state.loading
}

fn has_pending_changes(state: &ProcessState<Configuration>) -> bool {
    state.processes_count > 0
        || state
            .value
            .as_ref()
            .and_then(|configuration| configuration.is_cart_entry_update_pending)
            == Some(true)
}

/// Facade over product configurations and their UI state.
#[derive(Clone)]
pub struct ConfiguratorService {
    store: StoreClient<Configuration>,
    ui: StoreClient<UiState>,
    active_cart: ActiveCartService,
}

impl ConfiguratorService {
    pub fn new(
        store: StoreClient<Configuration>,
        ui: StoreClient<UiState>,
        active_cart: ActiveCartService,
    ) -> Self {
        Self {
            store,
            ui,
            active_cart,
        }
    }

    /// `true` while any process is in flight for the owner or a cart entry write is pending.
    pub async fn has_pending_changes(
        &self,
        owner_key: &str,
    ) -> Result<BoxStream<'static, bool>, ConfiguratorError> {
        let pending = self
            .observe_process_state(owner_key)
            .await?
            .map(|state| has_pending_changes(&state));
        Ok(select::distinct_until_changed(pending).boxed())
    }

    pub async fn configuration_is_loading(
        &self,
        owner_key: &str,
    ) -> Result<BoxStream<'static, bool>, ConfiguratorError> {
        let loading = self
            .observe_process_state(owner_key)
            .await?
            .map(|state| state.loading);
        Ok(select::distinct_until_changed(loading).boxed())
    }

    /// Created configurations of the owner. Never triggers a load.
    pub async fn get_configuration(
        &self,
        owner_key: &str,
    ) -> Result<BoxStream<'static, Configuration>, ConfiguratorError> {
        self.observe_entity(owner_key).await
    }

    /// Created configurations of `owner`, loading or creating one when none is cached.
    ///
    /// # Errors
    /// [`ConfiguratorError::Owner`] if an order entry owner id does not decompose.
    ///
    /// Product owners get a new default configuration, cart and order entry owners are read
    /// from the entry. With `has_obsolete_state` set the cached value is re-read once, at the
    /// first opportunity of this stream.
    #[instrument(skip(self, owner), fields(owner_key = %owner.key))]
    pub async fn get_or_create_configuration(
        &self,
        owner: &Owner,
    ) -> Result<BoxStream<'static, Configuration>, ConfiguratorError> {
        if owner.owner_type == OwnerType::OrderEntry {
            decompose_owner_id(&owner.id)?;
        }
        let states = self.observe_process_state(&owner.key).await?;
        let service = self.clone();
        let owner = Arc::new(owner.clone());
        let obsolete = Arc::new(AtomicBool::new(owner.has_obsolete_state));

        let triggered = states.then(move |state| {
            let service = service.clone();
            let owner = Arc::clone(&owner);
            let obsolete = Arc::clone(&obsolete);
            async move {
                let force = obsolete.load(Ordering::SeqCst);
                if needs_load(&state, force) {
                    match service.load_for_owner(&owner, force).await {
                        Ok(true) => obsolete.store(false, Ordering::SeqCst),
                        Ok(false) => debug!(owner_key = %owner.key, "Load already in flight"),
                        Err(e) => {
                            warn!(owner_key = %owner.key, error = %e, "Could not trigger load")
                        }
                    }
                }
                state
            }
        });
        Ok(select::created_values(triggered).boxed())
    }

    /// Reads the configuration of a cart entry of the active cart.
    #[instrument(skip(self, owner), fields(owner_key = %owner.key))]
    pub async fn read_configuration_for_cart_entry(
        &self,
        owner: &Owner,
    ) -> Result<(), ConfiguratorError> {
        let params = self.cart_entry_read(owner).await?;
        self.store
            .dispatch(ConfiguratorEvent::ReadCartEntryConfiguration(params))
            .await?;
        Ok(())
    }

    /// Reads the configuration of an order entry; the owner id is `<orderId>+<entryNumber>`.
    #[instrument(skip(self, owner), fields(owner_key = %owner.key))]
    pub async fn read_configuration_for_order_entry(
        &self,
        owner: &Owner,
    ) -> Result<(), ConfiguratorError> {
        let params = order_entry_read(owner)?;
        self.store
            .dispatch(ConfiguratorEvent::ReadOrderEntryConfiguration(params))
            .await?;
        Ok(())
    }

    /// Sends a single attribute change of group `group_id`.
    ///
    /// # Errors
    /// - [`ConfiguratorError::NotLoaded`] if no created configuration is cached for the owner.
    /// - [`ConfiguratorError::GroupNotFound`] if the group is not part of it.
    #[instrument(skip(self, changed_attribute), fields(attribute = %changed_attribute.name))]
    pub async fn update_configuration(
        &self,
        owner_key: &str,
        group_id: &str,
        changed_attribute: Attribute,
    ) -> Result<(), ConfiguratorError> {
        let configuration = self.created(owner_key).await?;
        let partial = extract_partial_update(group_id, &changed_attribute, &configuration)?;
        self.store
            .dispatch(ConfiguratorEvent::UpdateConfiguration(partial))
            .await?;
        Ok(())
    }

    /// Created configurations of the owner that carry an overview, requesting one when the
    /// cached configuration has none.
    #[instrument(skip(self, configuration), fields(owner_key = %configuration.owner.key))]
    pub async fn get_configuration_with_overview(
        &self,
        configuration: &Configuration,
    ) -> Result<BoxStream<'static, Configuration>, ConfiguratorError> {
        let states = self.observe_process_state(&configuration.owner.key).await?;
        let store = self.store.clone();
        let request = configuration.clone();
        // Set while a request from this stream is unanswered, so a failed overview is not
        // requested again until an overview has arrived.
        let requested = Arc::new(AtomicBool::new(false));

        let triggered = states.then(move |state| {
            let store = store.clone();
            let request = request.clone();
            let requested = Arc::clone(&requested);
            async move {
                if state.value.as_ref().is_some_and(Configuration::has_overview) {
                    requested.store(false, Ordering::SeqCst);
                } else if needs_overview(&state) && !requested.load(Ordering::SeqCst) {
                    let key = request.owner.key.clone();
                    let event = ConfiguratorEvent::GetConfigurationOverview(request);
                    match store.dispatch_if(key, needs_overview, event).await {
                        Ok(true) => requested.store(true, Ordering::SeqCst),
                        Ok(false) => {}
                        Err(e) => warn!(error = %e, "Could not request overview"),
                    }
                }
                state
            }
        });
        let with_overview =
            select::created_values(triggered).filter(|configuration| {
                futures::future::ready(configuration.has_overview())
            });
        Ok(with_overview.boxed())
    }

    /// Adds the configured product to the active cart, once that cart is loaded.
    ///
    /// # Errors
    /// - [`ConfiguratorError::NotLoaded`] if no created configuration is cached for the owner.
    /// - [`ConfiguratorError::Cart`] if there is no loadable active cart.
    #[instrument(skip(self))]
    pub async fn add_to_cart(
        &self,
        product_code: &str,
        config_id: &str,
        owner_key: &str,
    ) -> Result<(), ConfiguratorError> {
        self.created(owner_key).await?;
        let cart = self.active_cart.require_loaded_cart().await?;
        let address = resolve_cart_identity(&cart);
        info!(cart_id = %address.cart_id, "Adding configuration to cart");
        self.store
            .dispatch(ConfiguratorEvent::AddToCart(AddToCart {
                user_id: address.user_id,
                cart_id: address.cart_id,
                product_code: product_code.to_string(),
                quantity: 1,
                config_id: config_id.to_string(),
                owner_key: owner_key.to_string(),
            }))
            .await?;
        Ok(())
    }

    /// Writes `configuration` back to its cart entry, then re-reads it from the entry.
    ///
    /// The write marks the cached configuration as pending. The returned task waits for the
    /// write to complete (successfully or not) and then dispatches the re-read, so observers
    /// end up with what the backend actually stored.
    ///
    /// # Errors
    /// [`ConfiguratorError::NotLoaded`] if the owner has no cached configuration to mark.
    #[instrument(skip(self, configuration), fields(owner_key = %configuration.owner.key))]
    pub async fn update_cart_entry(
        &self,
        configuration: Configuration,
    ) -> Result<JoinHandle<()>, ConfiguratorError> {
        let owner = configuration.owner.clone();
        self.created(&owner.key).await?;
        let cart = self.active_cart.require_loaded_cart().await?;
        let address = resolve_cart_identity(&cart);

        self.store
            .dispatch(ConfiguratorEvent::UpdateCartEntry(CartEntryUpdate {
                user_id: address.user_id,
                cart_id: address.cart_id,
                cart_entry_number: owner.id.clone(),
                configuration,
            }))
            .await?;

        // Subscribed after the write is reduced: the first state seen is already pending.
        let states = self.observe_process_state(&owner.key).await?;
        let service = self.clone();
        let refresh = async move {
            let done = select::first_matching(states, |state| {
                state
                    .value
                    .as_ref()
                    .and_then(|configuration| configuration.is_cart_entry_update_pending)
                    == Some(false)
            })
            .await;
            if done.is_none() {
                debug!("Store closed before the cart entry update completed");
                return;
            }
            if let Err(e) = service.read_configuration_for_cart_entry(&owner).await {
                warn!(error = %e, "Could not re-read cart entry configuration");
            }
        };
        Ok(tokio::spawn(refresh.in_current_span()))
    }

    #[instrument(skip(self))]
    pub async fn remove_configuration(&self, owner_key: &str) -> Result<(), ConfiguratorError> {
        self.store
            .dispatch(ConfiguratorEvent::RemoveConfiguration {
                owner_key: owner_key.to_string(),
            })
            .await?;
        Ok(())
    }

    /// UI state of the owner, created empty on first access.
    pub async fn get_or_create_ui_state(
        &self,
        owner_key: &str,
    ) -> Result<BoxStream<'static, UiState>, ConfiguratorError> {
        self.ui
            .dispatch(UiEvent::CreateUiState {
                owner_key: owner_key.to_string(),
            })
            .await?;
        self.get_ui_state(owner_key).await
    }

    pub async fn get_ui_state(
        &self,
        owner_key: &str,
    ) -> Result<BoxStream<'static, UiState>, ConfiguratorError> {
        let receiver = self.ui.select(owner_key).await?;
        Ok(select::created_values(select::states(receiver)).boxed())
    }

    pub async fn set_ui_state(&self, owner_key: &str, state: UiState) -> Result<(), ConfiguratorError> {
        self.ui
            .dispatch(UiEvent::SetUiState {
                owner_key: owner_key.to_string(),
                state,
            })
            .await?;
        Ok(())
    }

    pub async fn remove_ui_state(&self, owner_key: &str) -> Result<(), ConfiguratorError> {
        self.ui
            .dispatch(UiEvent::RemoveUiState {
                owner_key: owner_key.to_string(),
            })
            .await?;
        Ok(())
    }

    /// Dispatches the load intent for `owner` if the store-side guard still agrees.
    ///
    /// Returns whether the intent was dispatched.
    async fn load_for_owner(&self, owner: &Owner, force: bool) -> Result<bool, ConfiguratorError> {
        let event = match owner.owner_type {
            OwnerType::Product => ConfiguratorEvent::CreateConfiguration(owner.clone()),
            OwnerType::CartEntry => {
                ConfiguratorEvent::ReadCartEntryConfiguration(self.cart_entry_read(owner).await?)
            }
            OwnerType::OrderEntry => {
                ConfiguratorEvent::ReadOrderEntryConfiguration(order_entry_read(owner)?)
            }
        };
        let dispatched = self
            .store
            .dispatch_if(owner.key.clone(), move |state| needs_load(state, force), event)
            .await?;
        Ok(dispatched)
    }

    async fn cart_entry_read(&self, owner: &Owner) -> Result<CartEntryRead, ConfiguratorError> {
        let cart = self.active_cart.require_loaded_cart().await?;
        let address = resolve_cart_identity(&cart);
        Ok(CartEntryRead {
            user_id: address.user_id,
            cart_id: address.cart_id,
            cart_entry_number: owner.id.clone(),
            owner: owner.clone(),
        })
    }

    async fn created(&self, owner_key: &str) -> Result<Configuration, ConfiguratorError> {
        self.store
            .current(owner_key)
            .await?
            .value
            .filter(Configuration::is_created)
            .ok_or_else(|| ConfiguratorError::NotLoaded(owner_key.to_string()))
    }
}

fn order_entry_read(owner: &Owner) -> Result<OrderEntryRead, ConfiguratorError> {
    let parts = decompose_owner_id(&owner.id)?;
    Ok(OrderEntryRead {
        user_id: OCC_USER_ID_CURRENT.to_string(),
        order_id: parts.document_id,
        order_entry_number: parts.entry_number,
        owner: owner.clone(),
    })
}

impl EntityFacade<Configuration> for ConfiguratorService {
    type Error = ConfiguratorError;

    fn store(&self) -> &StoreClient<Configuration> {
        &self.store
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        ConfiguratorError::Store(e)
    }
}

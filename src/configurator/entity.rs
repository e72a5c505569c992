//! [`StoreEntity`] implementation for [`Configuration`].

use super::ConfiguratorEvent;
use crate::backend::ConfiguratorAdapter;
use crate::cart::CartEvent;
use crate::model::{Cart, Configuration};
use async_trait::async_trait;
use process_store::{KeyedStore, StoreClient, StoreEntity, Transition};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Dependencies of configurator effects.
///
/// Holds a client of the cart store so completions that changed the cart on the backend can
/// reload it. The cart store must therefore outlive the configuration store.
pub struct ConfiguratorContext {
    pub backend: Arc<dyn ConfiguratorAdapter>,
    pub carts: StoreClient<Cart>,
}

/// Settles the process of `key` with its cached value, patched by `patch`.
///
/// Used by completions whose backend response does not carry a full configuration. An entry
/// without a value still has its process ended; a removed entry stays removed.
fn settle(store: &mut KeyedStore<Configuration>, key: &str, patch: impl FnOnce(&mut Configuration)) {
    match store.entry(key).map(|state| state.value.clone()) {
        Some(Some(mut configuration)) => {
            patch(&mut configuration);
            store.apply(key, Transition::Success(configuration));
        }
        Some(None) => store.apply(key, Transition::Finish),
        None => debug!(owner_key = key, "Completion for a removed configuration ignored"),
    }
}

#[async_trait]
impl StoreEntity for Configuration {
    type Event = ConfiguratorEvent;
    type Context = ConfiguratorContext;

    fn reduce(store: &mut KeyedStore<Self>, event: &ConfiguratorEvent) {
        let key = event.owner_key();
        match event {
            ConfiguratorEvent::CreateConfiguration(_)
            | ConfiguratorEvent::ReadCartEntryConfiguration(_)
            | ConfiguratorEvent::ReadOrderEntryConfiguration(_)
            | ConfiguratorEvent::UpdateConfiguration(_)
            | ConfiguratorEvent::GetConfigurationOverview(_)
            | ConfiguratorEvent::AddToCart(_) => store.apply(key, Transition::Start),

            ConfiguratorEvent::UpdateCartEntry(_) => {
                store.apply(key, Transition::Start);
                store.update_value(key, |configuration| {
                    configuration.is_cart_entry_update_pending = Some(true)
                });
            }

            ConfiguratorEvent::CreateConfigurationSuccess(configuration)
            | ConfiguratorEvent::ReadCartEntryConfigurationSuccess(configuration)
            | ConfiguratorEvent::ReadOrderEntryConfigurationSuccess(configuration)
            | ConfiguratorEvent::UpdateConfigurationSuccess(configuration) => {
                store.apply(key, Transition::Success(configuration.clone()))
            }

            ConfiguratorEvent::GetConfigurationOverviewSuccess { overview, .. } => {
                settle(store, key, |configuration| {
                    configuration.overview = Some(overview.clone())
                })
            }
            ConfiguratorEvent::AddToCartSuccess { .. } => settle(store, key, |_| {}),
            ConfiguratorEvent::UpdateCartEntrySuccess { .. } => settle(store, key, |configuration| {
                configuration.is_cart_entry_update_pending = Some(false)
            }),

            ConfiguratorEvent::UpdateCartEntryFail { error, .. } => {
                // Clear the pending flag so a waiting refresh re-reads what the backend kept.
                store.update_value(key, |configuration| {
                    configuration.is_cart_entry_update_pending = Some(false)
                });
                store.apply(key, Transition::Fail(error.to_string()));
            }
            ConfiguratorEvent::CreateConfigurationFail { error, .. }
            | ConfiguratorEvent::ReadCartEntryConfigurationFail { error, .. }
            | ConfiguratorEvent::ReadOrderEntryConfigurationFail { error, .. }
            | ConfiguratorEvent::UpdateConfigurationFail { error, .. }
            | ConfiguratorEvent::GetConfigurationOverviewFail { error, .. }
            | ConfiguratorEvent::AddToCartFail { error, .. } => {
                store.apply(key, Transition::Fail(error.to_string()))
            }

            ConfiguratorEvent::RemoveConfiguration { .. } => {
                if store.remove(key).is_some() {
                    info!(owner_key = key, "Configuration removed");
                }
            }
        }
    }

    async fn effect(event: ConfiguratorEvent, ctx: &ConfiguratorContext) -> Vec<ConfiguratorEvent> {
        let owner_key = event.owner_key().to_string();
        match event {
            ConfiguratorEvent::CreateConfiguration(owner) => {
                match ctx.backend.create(&owner).await {
                    Ok(configuration) => {
                        info!(owner_key = %owner.key, config_id = %configuration.config_id, "Configuration created");
                        vec![ConfiguratorEvent::CreateConfigurationSuccess(configuration)]
                    }
                    Err(error) => vec![ConfiguratorEvent::CreateConfigurationFail { owner_key, error }],
                }
            }
            ConfiguratorEvent::ReadCartEntryConfiguration(params) => {
                match ctx.backend.read_cart_entry(&params).await {
                    Ok(configuration) => vec![
                        ConfiguratorEvent::ReadCartEntryConfigurationSuccess(configuration),
                    ],
                    Err(error) => vec![ConfiguratorEvent::ReadCartEntryConfigurationFail { owner_key, error }],
                }
            }
            ConfiguratorEvent::ReadOrderEntryConfiguration(params) => {
                match ctx.backend.read_order_entry(&params).await {
                    Ok(configuration) => vec![
                        ConfiguratorEvent::ReadOrderEntryConfigurationSuccess(configuration),
                    ],
                    Err(error) => vec![ConfiguratorEvent::ReadOrderEntryConfigurationFail { owner_key, error }],
                }
            }
            ConfiguratorEvent::UpdateConfiguration(partial) => {
                match ctx.backend.update(&partial).await {
                    Ok(configuration) => {
                        vec![ConfiguratorEvent::UpdateConfigurationSuccess(configuration)]
                    }
                    Err(error) => vec![ConfiguratorEvent::UpdateConfigurationFail { owner_key, error }],
                }
            }
            ConfiguratorEvent::GetConfigurationOverview(configuration) => {
                match ctx.backend.overview(&configuration).await {
                    Ok(overview) => vec![ConfiguratorEvent::GetConfigurationOverviewSuccess {
                        owner_key,
                        overview,
                    }],
                    Err(error) => vec![ConfiguratorEvent::GetConfigurationOverviewFail { owner_key, error }],
                }
            }
            ConfiguratorEvent::AddToCart(params) => match ctx.backend.add_to_cart(&params).await {
                Ok(()) => vec![ConfiguratorEvent::AddToCartSuccess {
                    owner_key,
                    user_id: params.user_id,
                    cart_id: params.cart_id,
                }],
                Err(error) => vec![ConfiguratorEvent::AddToCartFail { owner_key, error }],
            },
            ConfiguratorEvent::UpdateCartEntry(params) => {
                match ctx.backend.update_cart_entry(&params).await {
                    Ok(()) => vec![ConfiguratorEvent::UpdateCartEntrySuccess {
                        owner_key,
                        user_id: params.user_id,
                        cart_id: params.cart_id,
                    }],
                    Err(error) => vec![ConfiguratorEvent::UpdateCartEntryFail { owner_key, error }],
                }
            }
            ConfiguratorEvent::AddToCartSuccess {
                user_id, cart_id, ..
            }
            | ConfiguratorEvent::UpdateCartEntrySuccess {
                user_id, cart_id, ..
            } => {
                debug!(cart_id = %cart_id, "Reloading cart after configurator write");
                let reload = CartEvent::LoadCart { user_id, cart_id };
                if let Err(e) = ctx.carts.dispatch(reload).await {
                    warn!(error = %e, "Could not reload cart");
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn is_created(&self) -> bool {
        Configuration::is_created(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::EntityLoadError;
    use crate::model::{AddToCart, CartEntryUpdate, Overview, Owner};
    use process_store::ProcessState;

    fn owner() -> Owner {
        Owner::cart_entry("1").unwrap()
    }

    fn loaded(store: &mut KeyedStore<Configuration>) -> Configuration {
        let configuration = Configuration::new("CFG-1", "LAPTOP", owner());
        Configuration::reduce(
            store,
            &ConfiguratorEvent::ReadCartEntryConfigurationSuccess(configuration.clone()),
        );
        configuration
    }

    fn update_cart_entry(configuration: &Configuration) -> ConfiguratorEvent {
        ConfiguratorEvent::UpdateCartEntry(CartEntryUpdate {
            user_id: "current".into(),
            cart_id: "00000001".into(),
            cart_entry_number: "1".into(),
            configuration: configuration.clone(),
        })
    }

    #[test]
    fn test_create_lifecycle() {
        let mut store = KeyedStore::new();
        let owner = Owner::product("LAPTOP").unwrap();
        Configuration::reduce(&mut store, &ConfiguratorEvent::CreateConfiguration(owner.clone()));
        assert!(store.get("product/LAPTOP").loading);

        let configuration = Configuration::new("CFG-7", "LAPTOP", owner);
        Configuration::reduce(
            &mut store,
            &ConfiguratorEvent::CreateConfigurationSuccess(configuration.clone()),
        );
        let state = store.get("product/LAPTOP");
        assert_eq!(
            state,
            ProcessState {
                success: true,
                value: Some(configuration),
                ..ProcessState::default()
            }
        );
    }

    #[test]
    fn test_cart_entry_update_pending_flag() {
        let mut store = KeyedStore::new();
        let configuration = loaded(&mut store);

        Configuration::reduce(&mut store, &update_cart_entry(&configuration));
        let state = store.get(&owner().key);
        assert_eq!(state.processes_count, 1);
        assert_eq!(
            state.value.unwrap().is_cart_entry_update_pending,
            Some(true)
        );

        Configuration::reduce(
            &mut store,
            &ConfiguratorEvent::UpdateCartEntrySuccess {
                owner_key: owner().key,
                user_id: "current".into(),
                cart_id: "00000001".into(),
            },
        );
        let state = store.get(&owner().key);
        assert_eq!(state.processes_count, 0);
        assert_eq!(
            state.value.unwrap().is_cart_entry_update_pending,
            Some(false)
        );
    }

    #[test]
    fn test_failed_cart_entry_update_clears_pending() {
        let mut store = KeyedStore::new();
        let configuration = loaded(&mut store);
        Configuration::reduce(&mut store, &update_cart_entry(&configuration));

        Configuration::reduce(
            &mut store,
            &ConfiguratorEvent::UpdateCartEntryFail {
                owner_key: owner().key,
                error: EntityLoadError::Unavailable("timeout".into()),
            },
        );
        let state = store.get(&owner().key);
        assert!(state.error);
        assert_eq!(
            state.value.unwrap().is_cart_entry_update_pending,
            Some(false)
        );
    }

    #[test]
    fn test_overview_is_patched_onto_cached_value() {
        let mut store = KeyedStore::new();
        let configuration = loaded(&mut store);
        Configuration::reduce(
            &mut store,
            &ConfiguratorEvent::GetConfigurationOverview(configuration.clone()),
        );
        let overview = Overview {
            config_id: "CFG-1".into(),
            groups: Vec::new(),
        };
        Configuration::reduce(
            &mut store,
            &ConfiguratorEvent::GetConfigurationOverviewSuccess {
                owner_key: owner().key,
                overview: overview.clone(),
            },
        );

        let state = store.get(&owner().key);
        assert!(state.is_stable());
        assert_eq!(state.value.unwrap().overview, Some(overview));
    }

    #[test]
    fn test_add_to_cart_without_value_still_settles() {
        let mut store = KeyedStore::new();
        let key = "product/LAPTOP";
        Configuration::reduce(
            &mut store,
            &ConfiguratorEvent::AddToCart(AddToCart {
                user_id: "current".into(),
                cart_id: "00000001".into(),
                product_code: "LAPTOP".into(),
                quantity: 1,
                config_id: "CFG-1".into(),
                owner_key: key.into(),
            }),
        );
        assert_eq!(store.get(key).processes_count, 1);

        Configuration::reduce(
            &mut store,
            &ConfiguratorEvent::AddToCartSuccess {
                owner_key: key.into(),
                user_id: "current".into(),
                cart_id: "00000001".into(),
            },
        );
        let state = store.get(key);
        assert!(state.is_stable());
        assert!(!state.loading);
        assert_eq!(state.value, None);
    }

    #[test]
    fn test_completion_after_remove_is_ignored() {
        let mut store = KeyedStore::new();
        loaded(&mut store);
        Configuration::reduce(
            &mut store,
            &ConfiguratorEvent::RemoveConfiguration {
                owner_key: owner().key,
            },
        );
        Configuration::reduce(
            &mut store,
            &ConfiguratorEvent::GetConfigurationOverviewSuccess {
                owner_key: owner().key,
                overview: Overview::default(),
            },
        );

        assert!(!store.contains(&owner().key));
    }
}

use crate::backend::EntityLoadError;
use crate::model::{
    AddToCart, CartEntryRead, CartEntryUpdate, Configuration, OrderEntryRead, Overview, Owner,
};

/// Intents dispatched by [`ConfiguratorService`](crate::facade::ConfiguratorService) and the
/// completions their effects produce.
///
/// Every variant addresses exactly one owner key.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfiguratorEvent {
    CreateConfiguration(Owner),
    CreateConfigurationSuccess(Configuration),
    CreateConfigurationFail {
        owner_key: String,
        error: EntityLoadError,
    },
    ReadCartEntryConfiguration(CartEntryRead),
    ReadCartEntryConfigurationSuccess(Configuration),
    ReadCartEntryConfigurationFail {
        owner_key: String,
        error: EntityLoadError,
    },
    ReadOrderEntryConfiguration(OrderEntryRead),
    ReadOrderEntryConfigurationSuccess(Configuration),
    ReadOrderEntryConfigurationFail {
        owner_key: String,
        error: EntityLoadError,
    },
    /// Carries the partial configuration built by
    /// [`extract_partial_update`](super::extract_partial_update).
    UpdateConfiguration(Configuration),
    UpdateConfigurationSuccess(Configuration),
    UpdateConfigurationFail {
        owner_key: String,
        error: EntityLoadError,
    },
    GetConfigurationOverview(Configuration),
    GetConfigurationOverviewSuccess {
        owner_key: String,
        overview: Overview,
    },
    GetConfigurationOverviewFail {
        owner_key: String,
        error: EntityLoadError,
    },
    AddToCart(AddToCart),
    AddToCartSuccess {
        owner_key: String,
        user_id: String,
        cart_id: String,
    },
    AddToCartFail {
        owner_key: String,
        error: EntityLoadError,
    },
    UpdateCartEntry(CartEntryUpdate),
    UpdateCartEntrySuccess {
        owner_key: String,
        user_id: String,
        cart_id: String,
    },
    UpdateCartEntryFail {
        owner_key: String,
        error: EntityLoadError,
    },
    RemoveConfiguration {
        owner_key: String,
    },
}

impl ConfiguratorEvent {
    /// The owner key this event addresses.
    pub fn owner_key(&self) -> &str {
        match self {
            ConfiguratorEvent::CreateConfiguration(owner) => &owner.key,
            ConfiguratorEvent::ReadCartEntryConfiguration(params) => &params.owner.key,
            ConfiguratorEvent::ReadOrderEntryConfiguration(params) => &params.owner.key,
            ConfiguratorEvent::UpdateCartEntry(params) => &params.configuration.owner.key,
            ConfiguratorEvent::AddToCart(params) => &params.owner_key,
            ConfiguratorEvent::CreateConfigurationSuccess(configuration)
            | ConfiguratorEvent::ReadCartEntryConfigurationSuccess(configuration)
            | ConfiguratorEvent::ReadOrderEntryConfigurationSuccess(configuration)
            | ConfiguratorEvent::UpdateConfiguration(configuration)
            | ConfiguratorEvent::UpdateConfigurationSuccess(configuration)
            | ConfiguratorEvent::GetConfigurationOverview(configuration) => {
                &configuration.owner.key
            }
            ConfiguratorEvent::CreateConfigurationFail { owner_key, .. }
            | ConfiguratorEvent::ReadCartEntryConfigurationFail { owner_key, .. }
            | ConfiguratorEvent::ReadOrderEntryConfigurationFail { owner_key, .. }
            | ConfiguratorEvent::UpdateConfigurationFail { owner_key, .. }
            | ConfiguratorEvent::GetConfigurationOverviewSuccess { owner_key, .. }
            | ConfiguratorEvent::GetConfigurationOverviewFail { owner_key, .. }
            | ConfiguratorEvent::AddToCartSuccess { owner_key, .. }
            | ConfiguratorEvent::AddToCartFail { owner_key, .. }
            | ConfiguratorEvent::UpdateCartEntrySuccess { owner_key, .. }
            | ConfiguratorEvent::UpdateCartEntryFail { owner_key, .. }
            | ConfiguratorEvent::RemoveConfiguration { owner_key } => owner_key,
        }
    }
}

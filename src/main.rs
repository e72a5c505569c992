//! # Storefront State Demo
//!
//! Walks through a configurable product purchase against the in-memory backends:
//! 1. Create an anonymous cart and make it the active cart.
//! 2. Get-or-create a configuration for a product and change one attribute.
//! 3. Add the configured product to the cart.
//! 4. Open the configuration from the cart entry, change it and write it back.

use futures::StreamExt;
use process_store::select;
use std::sync::Arc;
use storefront_state::backend::memory::{InMemoryCartBackend, InMemoryConfiguratorBackend};
use storefront_state::identity::OCC_USER_ID_ANONYMOUS;
use storefront_state::lifecycle::{setup_tracing, StorefrontSystem, SystemConfig};
use storefront_state::model::{Attribute, CartCreate, Group, GroupType, Owner};
use tracing::{info, Instrument};

const PRODUCT: &str = "CONF_LAPTOP";

fn laptop() -> Vec<Group> {
    vec![
        Group::new("BASICS", GroupType::AttributeGroup)
            .with_attributes(vec![Attribute::new("COLOR").with_value("SILVER")])
            .with_sub_groups(vec![Group::new("DISPLAY", GroupType::AttributeGroup)
                .with_attributes(vec![Attribute::new("SIZE").with_value("13")])]),
        Group::new("SOFTWARE", GroupType::AttributeGroup)
            .with_attributes(vec![Attribute::new("OFFICE")]),
    ]
}

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = SystemConfig::from_env();
    let cart_backend = Arc::new(InMemoryCartBackend::new());
    let configurator_backend = InMemoryConfiguratorBackend::new()
        .with_product(PRODUCT, laptop())
        .with_cart_backend(cart_backend.clone());
    let system = StorefrontSystem::new(&config, cart_backend, Arc::new(configurator_backend));

    let span = tracing::info_span!("cart_creation");
    let cart = async {
        let states = system
            .carts
            .create_cart(OCC_USER_ID_ANONYMOUS, CartCreate::default())
            .await
            .map_err(|e| e.to_string())?;
        let created = select::first_matching(states, |state| state.value.is_some())
            .await
            .and_then(|state| state.value)
            .ok_or("cart creation did not complete")?;
        system.active_cart.activate_cart(&created);
        Ok::<_, String>(created)
    }
    .instrument(span)
    .await?;
    info!(guid = %cart.guid, "Anonymous cart active");

    let span = tracing::info_span!("product_configuration");
    let configuration = async {
        let owner = Owner::product(PRODUCT).map_err(|e| e.to_string())?;
        let mut configurations = system
            .configurator
            .get_or_create_configuration(&owner)
            .await
            .map_err(|e| e.to_string())?;
        let created = configurations
            .next()
            .await
            .ok_or("configuration stream ended")?;
        info!(config_id = %created.config_id, "Configuration created");

        system
            .configurator
            .update_configuration(&owner.key, "DISPLAY", Attribute::new("SIZE").with_value("15"))
            .await
            .map_err(|e| e.to_string())?;
        let updated = configurations
            .next()
            .await
            .ok_or("configuration stream ended")?;
        Ok::<_, String>(updated)
    }
    .instrument(span)
    .await?;

    let span = tracing::info_span!("add_to_cart");
    async {
        let mut entries = system
            .carts
            .get_entries(&cart.guid)
            .await
            .map_err(|e| e.to_string())?;
        system
            .configurator
            .add_to_cart(PRODUCT, &configuration.config_id, &configuration.owner.key)
            .await
            .map_err(|e| e.to_string())?;
        while let Some(entries) = entries.next().await {
            info!(count = entries.len(), "Cart entries");
            if !entries.is_empty() {
                break;
            }
        }
        Ok::<_, String>(())
    }
    .instrument(span)
    .await?;

    let span = tracing::info_span!("cart_entry_configuration");
    async {
        let owner = Owner::cart_entry("0").map_err(|e| e.to_string())?;
        let mut configurations = system
            .configurator
            .get_or_create_configuration(&owner)
            .await
            .map_err(|e| e.to_string())?;
        let mut from_entry = configurations
            .next()
            .await
            .ok_or("configuration stream ended")?;
        info!(config_id = %from_entry.config_id, "Configuration read from cart entry");

        if let Some(software) = from_entry.groups.iter_mut().find(|g| g.id == "SOFTWARE") {
            software.attributes = vec![Attribute::new("OFFICE").with_value("YES")];
        }
        let refresh = system
            .configurator
            .update_cart_entry(from_entry)
            .await
            .map_err(|e| e.to_string())?;
        refresh.await.map_err(|e| e.to_string())?;

        let overview_source = configurations
            .next()
            .await
            .ok_or("configuration stream ended")?;
        let mut with_overview = system
            .configurator
            .get_configuration_with_overview(&overview_source)
            .await
            .map_err(|e| e.to_string())?;
        if let Some(overview) = with_overview.next().await.and_then(|c| c.overview) {
            for group in overview.groups {
                for attribute in group.attributes {
                    info!(group = %group.description, attribute = %attribute.attribute, value = %attribute.value, "Overview");
                }
            }
        }
        Ok::<_, String>(())
    }
    .instrument(span)
    .await?;

    system.shutdown().await?;
    info!("Demo completed successfully");
    Ok(())
}

mod common;

use common::*;
use process_store::{select, EntityFacade};
use storefront_state::backend::memory::BackendCall;
use storefront_state::identity::OCC_USER_ID_ANONYMOUS;
use storefront_state::model::{Attribute, CartCreate, Owner};
use tokio::time::timeout;

#[tokio::test]
async fn test_configure_and_buy_as_anonymous_user() {
    let harness = start();
    let system = &harness.system;

    let fresh = system
        .carts
        .create_cart(OCC_USER_ID_ANONYMOUS, CartCreate::default())
        .await
        .unwrap();
    let cart = timeout(WAIT, select::first_matching(fresh, |state| state.success))
        .await
        .unwrap()
        .and_then(|state| state.value)
        .unwrap();
    system.active_cart.activate_cart(&cart);
    let address = system.active_cart.active_cart().unwrap();
    assert_eq!(address.user_id, "anonymous");
    assert_eq!(address.cart_id, cart.guid);

    let product = Owner::product(PRODUCT).unwrap();
    let mut configurations = system
        .configurator
        .get_or_create_configuration(&product)
        .await
        .unwrap();
    let configuration = next(&mut configurations).await;
    system
        .configurator
        .update_configuration(&product.key, "SOFTWARE", Attribute::new("OFFICE").with_value("YES"))
        .await
        .unwrap();
    let updated = timeout(
        WAIT,
        select::first_matching(&mut configurations, |configuration| {
            configuration.groups[1].attributes[0].selected_single_value.is_some()
        }),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.config_id, configuration.config_id);

    system
        .configurator
        .add_to_cart(PRODUCT, &configuration.config_id, &product.key)
        .await
        .unwrap();

    // The cart store is refreshed after the configuration was added.
    let entries = system.carts.get_entries(&address.cart_id).await.unwrap();
    let entries = timeout(
        WAIT,
        select::first_matching(entries, |entries| !entries.is_empty()),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(entries[0].product.code, PRODUCT);

    let entry_owner = Owner::cart_entry(entries[0].entry_number.to_string()).unwrap();
    let mut from_cart = system
        .configurator
        .get_or_create_configuration(&entry_owner)
        .await
        .unwrap();
    let in_cart = next(&mut from_cart).await;
    assert_eq!(in_cart.config_id, configuration.config_id);
    assert_eq!(
        in_cart.groups[1].attributes[0].selected_single_value.as_deref(),
        Some("YES")
    );

    let calls = harness.configurator.controls().calls().await;
    assert!(calls.contains(&BackendCall::ReadCartEntryConfiguration {
        owner_key: entry_owner.key.clone(),
        cart_id: cart.guid.clone(),
        cart_entry_number: "0".into(),
    }));
}

#[tokio::test]
async fn test_shutdown_after_streams_dropped() {
    let harness = start().with_active_cart().await;
    let product = Owner::product(PRODUCT).unwrap();
    let mut configurations = harness
        .system
        .configurator
        .get_or_create_configuration(&product)
        .await
        .unwrap();
    next(&mut configurations).await;
    harness
        .system
        .active_cart
        .require_loaded_cart()
        .await
        .unwrap();
    drop(configurations);

    timeout(WAIT, harness.system.shutdown())
        .await
        .expect("stores did not stop")
        .unwrap();
}

#[tokio::test]
async fn test_snapshot_lists_cached_configurations() {
    let harness = start();
    let product = Owner::product(PRODUCT).unwrap();
    let mut configurations = harness
        .system
        .configurator
        .get_or_create_configuration(&product)
        .await
        .unwrap();
    let configuration = next(&mut configurations).await;

    let snapshot = harness.system.configurator.store().snapshot().await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[&product.key].value.as_ref(), Some(&configuration));
}

#![allow(dead_code)]

use futures::stream::{BoxStream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use storefront_state::backend::memory::{
    BackendCall, InMemoryCartBackend, InMemoryConfiguratorBackend,
};
use storefront_state::lifecycle::{StorefrontSystem, SystemConfig};
use storefront_state::model::{Attribute, Cart, CartAddress, Group, GroupType};
use tokio::time::{sleep, timeout};

pub const PRODUCT: &str = "CONF_LAPTOP";
pub const WAIT: Duration = Duration::from_secs(2);
pub const QUIET: Duration = Duration::from_millis(50);

pub fn laptop() -> Vec<Group> {
    vec![
        Group::new("BASICS", GroupType::AttributeGroup)
            .with_attributes(vec![Attribute::new("COLOR").with_value("SILVER")])
            .with_sub_groups(vec![Group::new("DISPLAY", GroupType::AttributeGroup)
                .with_attributes(vec![Attribute::new("SIZE").with_value("13")])]),
        Group::new("SOFTWARE", GroupType::AttributeGroup)
            .with_attributes(vec![Attribute::new("OFFICE")]),
    ]
}

pub struct Harness {
    pub system: StorefrontSystem,
    pub carts: Arc<InMemoryCartBackend>,
    pub configurator: Arc<InMemoryConfiguratorBackend>,
}

pub fn start() -> Harness {
    start_with(InMemoryConfiguratorBackend::new())
}

/// Starts a system whose configurator backend knows [`PRODUCT`] and is linked to the cart
/// backend.
pub fn start_with(configurator: InMemoryConfiguratorBackend) -> Harness {
    let carts = Arc::new(InMemoryCartBackend::new());
    let configurator = Arc::new(
        configurator
            .with_product(PRODUCT, laptop())
            .with_cart_backend(carts.clone()),
    );
    let system = StorefrontSystem::new(&SystemConfig::default(), carts.clone(), configurator.clone());
    Harness {
        system,
        carts,
        configurator,
    }
}

impl Harness {
    /// Seeds a cart of a signed-in user and makes it the active cart.
    pub async fn with_active_cart(self) -> Self {
        let cart = Cart::new("00000100", "guid-100", "jane@example.com");
        self.carts.insert(cart).await;
        self.system
            .active_cart
            .activate(CartAddress::new("current", "00000100"));
        self
    }
}

/// Next item of `stream`, failing the test if none arrives in time.
pub async fn next<T>(stream: &mut BoxStream<'static, T>) -> T {
    timeout(WAIT, stream.next())
        .await
        .expect("timed out waiting for stream item")
        .expect("stream ended")
}

/// Polls `condition` until it holds, failing the test after [`WAIT`].
pub async fn eventually<F, Fut>(mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    timeout(WAIT, async {
        while !condition().await {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

pub fn count(calls: &[BackendCall], matches: impl Fn(&BackendCall) -> bool) -> usize {
    calls.iter().filter(|call| matches(call)).count()
}

//! # In-Memory Backends
//!
//! [`CartAdapter`] and [`ConfiguratorAdapter`] implementations that keep everything in process.
//! They back the demo binary and the integration tests.
//!
//! Both share [`BackendControls`], which lets a test:
//!
//! - read back every call in order ([`BackendControls::calls`]),
//! - hold responses until released ([`BackendControls::pause`] / [`BackendControls::release`]),
//!   to observe in-flight states and races deterministically,
//! - make every call fail ([`BackendControls::fail_with`]).

use super::{CartAdapter, ConfiguratorAdapter, EntityLoadError};
use crate::identity::resolve_cart_identity;
use crate::model::{
    AddToCart, Attribute, AttributeOverview, Cart, CartChange, CartCreate, CartEntryRead,
    CartEntryUpdate, Configuration, Group, GroupOverview, OrderEntry, OrderEntryRead, Overview,
    Owner, OwnerType, ProductRef,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tracing::debug;

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    LoadCart {
        user_id: String,
        cart_id: String,
    },
    CreateCart {
        user_id: String,
        params: CartCreate,
    },
    UpdateCart {
        cart_id: String,
        change: CartChange,
    },
    DeleteCart {
        cart_id: String,
    },
    CreateConfiguration {
        owner_key: String,
    },
    ReadCartEntryConfiguration {
        owner_key: String,
        cart_id: String,
        cart_entry_number: String,
    },
    ReadOrderEntryConfiguration {
        owner_key: String,
        order_id: String,
        order_entry_number: u32,
    },
    UpdateConfiguration(Configuration),
    UpdateCartEntry {
        cart_id: String,
        cart_entry_number: String,
        config_id: String,
    },
    GetOverview {
        config_id: String,
    },
    AddToCart {
        cart_id: String,
        product_code: String,
        config_id: String,
    },
}

/// Call log, pause gate and failure switch.
#[derive(Debug)]
pub struct BackendControls {
    calls: Mutex<Vec<BackendCall>>,
    paused: AtomicBool,
    waiting: AtomicUsize,
    gate: Semaphore,
    failure: Mutex<Option<EntityLoadError>>,
}

impl Default for BackendControls {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            paused: AtomicBool::new(false),
            waiting: AtomicUsize::new(0),
            gate: Semaphore::new(0),
            failure: Mutex::new(None),
        }
    }
}

impl BackendControls {
    pub async fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().await.clone()
    }

    /// Calls made from now on block until [`release`](Self::release)d.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    /// Lets `n` blocked (or future) calls through.
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    /// Stops pausing and releases every call currently blocked.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
        self.gate.add_permits(self.waiting.load(Ordering::SeqCst));
    }

    /// Makes every following call fail with `error`, or succeed again with `None`.
    pub async fn fail_with(&self, error: Option<EntityLoadError>) {
        *self.failure.lock().await = error;
    }

    /// Number of calls currently held by the pause gate.
    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    async fn enter(&self, call: BackendCall) -> Result<(), EntityLoadError> {
        debug!(?call, "Backend call");
        self.calls.lock().await.push(call);
        if self.paused.load(Ordering::SeqCst) {
            self.waiting.fetch_add(1, Ordering::SeqCst);
            if let Ok(permit) = self.gate.acquire().await {
                permit.forget();
            }
            self.waiting.fetch_sub(1, Ordering::SeqCst);
        }
        match self.failure.lock().await.clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

// --- Carts ---

/// Carts keyed by cart id (guid for anonymous carts, code otherwise).
#[derive(Debug, Default)]
pub struct InMemoryCartBackend {
    carts: Mutex<HashMap<String, Cart>>,
    next_code: AtomicU64,
    controls: BackendControls,
}

impl InMemoryCartBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn controls(&self) -> &BackendControls {
        &self.controls
    }

    /// Seeds a cart, stored under its resolved cart id.
    pub async fn insert(&self, cart: Cart) {
        let cart_id = resolve_cart_identity(&cart).cart_id;
        self.carts.lock().await.insert(cart_id, cart);
    }

    pub async fn cart(&self, cart_id: &str) -> Option<Cart> {
        self.carts.lock().await.get(cart_id).cloned()
    }

    fn new_cart(&self, user_id: &str) -> Cart {
        let n = self.next_code.fetch_add(1, Ordering::SeqCst) + 1;
        Cart::new(format!("{n:08}"), format!("{n:08}-guid"), user_id)
    }
}

fn apply_change(cart: &mut Cart, change: &CartChange) -> Result<(), EntityLoadError> {
    let missing = |entry_number: &u32| {
        EntityLoadError::NotFound(format!("entry {entry_number} of cart {}", cart.code))
    };
    match change {
        CartChange::AddEntry {
            product_code,
            quantity,
        } => {
            match cart
                .entries
                .iter_mut()
                .find(|entry| &entry.product.code == product_code)
            {
                Some(entry) => entry.quantity += quantity,
                None => cart.entries.push(OrderEntry {
                    entry_number: cart.entries.len() as u32,
                    product: ProductRef {
                        code: product_code.clone(),
                    },
                    quantity: *quantity,
                }),
            }
        }
        CartChange::UpdateEntry {
            entry_number,
            quantity,
        } => {
            let error = missing(entry_number);
            let entry = cart
                .entries
                .iter_mut()
                .find(|entry| entry.entry_number == *entry_number)
                .ok_or(error)?;
            entry.quantity = *quantity;
        }
        CartChange::RemoveEntry { entry_number } => {
            let error = missing(entry_number);
            let position = cart
                .entries
                .iter()
                .position(|entry| entry.entry_number == *entry_number)
                .ok_or(error)?;
            cart.entries.remove(position);
            for (index, entry) in cart.entries.iter_mut().enumerate() {
                entry.entry_number = index as u32;
            }
        }
        CartChange::AssignEmail { email } => cart.email = Some(email.clone()),
    }
    cart.total_items = cart.entries.iter().map(|entry| entry.quantity).sum();
    Ok(())
}

#[async_trait]
impl CartAdapter for InMemoryCartBackend {
    async fn load(&self, user_id: &str, cart_id: &str) -> Result<Cart, EntityLoadError> {
        self.controls
            .enter(BackendCall::LoadCart {
                user_id: user_id.to_string(),
                cart_id: cart_id.to_string(),
            })
            .await?;
        self.cart(cart_id)
            .await
            .ok_or_else(|| EntityLoadError::NotFound(format!("cart {cart_id}")))
    }

    async fn create(&self, user_id: &str, params: &CartCreate) -> Result<Cart, EntityLoadError> {
        self.controls
            .enter(BackendCall::CreateCart {
                user_id: user_id.to_string(),
                params: params.clone(),
            })
            .await?;
        let mut carts = self.carts.lock().await;
        let mut cart = match params.old_cart_id.as_deref().and_then(|id| carts.get(id)) {
            Some(existing) => existing.clone(),
            None => self.new_cart(user_id),
        };
        if let Some(guid) = &params.to_merge_cart_guid {
            if let Some(anonymous) = carts.remove(guid) {
                for entry in anonymous.entries {
                    apply_change(
                        &mut cart,
                        &CartChange::AddEntry {
                            product_code: entry.product.code,
                            quantity: entry.quantity,
                        },
                    )?;
                }
            }
        }
        carts.insert(resolve_cart_identity(&cart).cart_id, cart.clone());
        Ok(cart)
    }

    async fn update(
        &self,
        _user_id: &str,
        cart_id: &str,
        change: &CartChange,
    ) -> Result<Cart, EntityLoadError> {
        self.controls
            .enter(BackendCall::UpdateCart {
                cart_id: cart_id.to_string(),
                change: change.clone(),
            })
            .await?;
        let mut carts = self.carts.lock().await;
        let cart = carts
            .get_mut(cart_id)
            .ok_or_else(|| EntityLoadError::NotFound(format!("cart {cart_id}")))?;
        apply_change(cart, change)?;
        Ok(cart.clone())
    }

    async fn delete(&self, _user_id: &str, cart_id: &str) -> Result<(), EntityLoadError> {
        self.controls
            .enter(BackendCall::DeleteCart {
                cart_id: cart_id.to_string(),
            })
            .await?;
        self.carts
            .lock()
            .await
            .remove(cart_id)
            .map(|_| ())
            .ok_or_else(|| EntityLoadError::NotFound(format!("cart {cart_id}")))
    }
}

// --- Configurations ---

#[derive(Debug, Default)]
struct ConfiguratorData {
    /// Group templates per configurable product.
    products: HashMap<String, Vec<Group>>,
    configurations: HashMap<String, Configuration>,
    /// (cart id, entry number) → config id
    cart_entries: HashMap<(String, String), String>,
    /// (order id, entry number) → product code
    order_entries: HashMap<(String, u32), String>,
    next_id: u64,
}

impl ConfiguratorData {
    fn instantiate(&mut self, product_code: &str, owner: &Owner) -> Result<Configuration, EntityLoadError> {
        let groups = self
            .products
            .get(product_code)
            .cloned()
            .ok_or_else(|| EntityLoadError::NotFound(format!("product {product_code}")))?;
        self.next_id += 1;
        let configuration = Configuration::new(
            format!("CFG-{:04}", self.next_id),
            product_code,
            owner.clone(),
        )
        .with_groups(groups);
        self.configurations
            .insert(configuration.config_id.clone(), configuration.clone());
        Ok(configuration)
    }

    fn stored(&self, config_id: &str) -> Result<&Configuration, EntityLoadError> {
        self.configurations
            .get(config_id)
            .ok_or_else(|| EntityLoadError::NotFound(format!("configuration {config_id}")))
    }
}

fn find_group_mut<'a>(groups: &'a mut [Group], group_id: &str) -> Option<&'a mut Group> {
    groups.iter_mut().find_map(|group| {
        if group.id == group_id {
            Some(group)
        } else {
            find_group_mut(&mut group.sub_groups, group_id)
        }
    })
}

/// Copies every attribute carried by `changes` onto the group with the same id in `target`.
fn merge_attributes(target: &mut [Group], changes: &[Group]) {
    for change in changes {
        if let Some(group) = find_group_mut(target, &change.id) {
            for attribute in &change.attributes {
                match group
                    .attributes
                    .iter_mut()
                    .find(|existing| existing.name == attribute.name)
                {
                    Some(existing) => *existing = attribute.clone(),
                    None => group.attributes.push(attribute.clone()),
                }
            }
        }
        merge_attributes(target, &change.sub_groups);
    }
}

fn attribute_value(attribute: &Attribute) -> Option<String> {
    attribute
        .selected_single_value
        .clone()
        .or_else(|| attribute.user_input.clone())
}

fn collect_overview(groups: &[Group], into: &mut Vec<GroupOverview>) {
    for group in groups {
        let attributes: Vec<_> = group
            .attributes
            .iter()
            .filter_map(|attribute| {
                attribute_value(attribute).map(|value| AttributeOverview {
                    attribute: attribute.label.clone().unwrap_or_else(|| attribute.name.clone()),
                    value,
                })
            })
            .collect();
        if !attributes.is_empty() {
            into.push(GroupOverview {
                id: group.id.clone(),
                description: group.description.clone().unwrap_or_else(|| group.id.clone()),
                attributes,
            });
        }
        collect_overview(&group.sub_groups, into);
    }
}

/// Configurations keyed by config id, plus the cart and order entries they are attached to.
///
/// Linked to an [`InMemoryCartBackend`] via [`with_cart_backend`](Self::with_cart_backend),
/// adding a configuration to a cart also adds the product entry to that cart.
#[derive(Debug, Default)]
pub struct InMemoryConfiguratorBackend {
    data: Mutex<ConfiguratorData>,
    carts: Option<Arc<InMemoryCartBackend>>,
    controls: BackendControls,
}

impl InMemoryConfiguratorBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a configurable product and the group tree new configurations start from.
    pub fn with_product(mut self, product_code: impl Into<String>, groups: Vec<Group>) -> Self {
        self.data.get_mut().products.insert(product_code.into(), groups);
        self
    }

    /// Registers an entry of a placed order.
    pub fn with_order_entry(
        mut self,
        order_id: impl Into<String>,
        entry_number: u32,
        product_code: impl Into<String>,
    ) -> Self {
        self.data
            .get_mut()
            .order_entries
            .insert((order_id.into(), entry_number), product_code.into());
        self
    }

    pub fn with_cart_backend(mut self, carts: Arc<InMemoryCartBackend>) -> Self {
        self.carts = Some(carts);
        self
    }

    pub fn controls(&self) -> &BackendControls {
        &self.controls
    }

    /// The configuration currently attached to a cart entry.
    pub async fn cart_entry_configuration(
        &self,
        cart_id: &str,
        cart_entry_number: &str,
    ) -> Option<Configuration> {
        let data = self.data.lock().await;
        data.cart_entries
            .get(&(cart_id.to_string(), cart_entry_number.to_string()))
            .and_then(|config_id| data.configurations.get(config_id))
            .cloned()
    }
}

#[async_trait]
impl ConfiguratorAdapter for InMemoryConfiguratorBackend {
    async fn create(&self, owner: &Owner) -> Result<Configuration, EntityLoadError> {
        self.controls
            .enter(BackendCall::CreateConfiguration {
                owner_key: owner.key.clone(),
            })
            .await?;
        if owner.owner_type != OwnerType::Product {
            return Err(EntityLoadError::Rejected(format!(
                "cannot create a configuration for {}",
                owner.key
            )));
        }
        self.data.lock().await.instantiate(&owner.id, owner)
    }

    async fn read_cart_entry(
        &self,
        params: &CartEntryRead,
    ) -> Result<Configuration, EntityLoadError> {
        self.controls
            .enter(BackendCall::ReadCartEntryConfiguration {
                owner_key: params.owner.key.clone(),
                cart_id: params.cart_id.clone(),
                cart_entry_number: params.cart_entry_number.clone(),
            })
            .await?;
        let data = self.data.lock().await;
        let config_id = data
            .cart_entries
            .get(&(params.cart_id.clone(), params.cart_entry_number.clone()))
            .ok_or_else(|| {
                EntityLoadError::NotFound(format!(
                    "configuration of entry {} in cart {}",
                    params.cart_entry_number, params.cart_id
                ))
            })?;
        let mut configuration = data.stored(config_id)?.clone();
        configuration.owner = params.owner.clone();
        configuration.overview = None;
        configuration.is_cart_entry_update_pending = None;
        Ok(configuration)
    }

    async fn read_order_entry(
        &self,
        params: &OrderEntryRead,
    ) -> Result<Configuration, EntityLoadError> {
        self.controls
            .enter(BackendCall::ReadOrderEntryConfiguration {
                owner_key: params.owner.key.clone(),
                order_id: params.order_id.clone(),
                order_entry_number: params.order_entry_number,
            })
            .await?;
        let mut data = self.data.lock().await;
        let product_code = data
            .order_entries
            .get(&(params.order_id.clone(), params.order_entry_number))
            .cloned()
            .ok_or_else(|| {
                EntityLoadError::NotFound(format!(
                    "entry {} of order {}",
                    params.order_entry_number, params.order_id
                ))
            })?;
        data.instantiate(&product_code, &params.owner)
    }

    async fn update(&self, partial: &Configuration) -> Result<Configuration, EntityLoadError> {
        self.controls
            .enter(BackendCall::UpdateConfiguration(partial.clone()))
            .await?;
        let mut data = self.data.lock().await;
        let stored = data
            .configurations
            .get_mut(&partial.config_id)
            .ok_or_else(|| {
                EntityLoadError::NotFound(format!("configuration {}", partial.config_id))
            })?;
        merge_attributes(&mut stored.groups, &partial.groups);
        let mut configuration = stored.clone();
        configuration.owner = partial.owner.clone();
        Ok(configuration)
    }

    async fn update_cart_entry(&self, params: &CartEntryUpdate) -> Result<(), EntityLoadError> {
        let config_id = params.configuration.config_id.clone();
        self.controls
            .enter(BackendCall::UpdateCartEntry {
                cart_id: params.cart_id.clone(),
                cart_entry_number: params.cart_entry_number.clone(),
                config_id: config_id.clone(),
            })
            .await?;
        let mut data = self.data.lock().await;
        let mut configuration = params.configuration.clone();
        configuration.overview = None;
        configuration.is_cart_entry_update_pending = None;
        data.configurations.insert(config_id.clone(), configuration);
        data.cart_entries.insert(
            (params.cart_id.clone(), params.cart_entry_number.clone()),
            config_id,
        );
        Ok(())
    }

    async fn overview(&self, configuration: &Configuration) -> Result<Overview, EntityLoadError> {
        self.controls
            .enter(BackendCall::GetOverview {
                config_id: configuration.config_id.clone(),
            })
            .await?;
        let data = self.data.lock().await;
        let stored = data.stored(&configuration.config_id)?;
        let mut groups = Vec::new();
        collect_overview(&stored.groups, &mut groups);
        Ok(Overview {
            config_id: stored.config_id.clone(),
            groups,
        })
    }

    async fn add_to_cart(&self, params: &AddToCart) -> Result<(), EntityLoadError> {
        self.controls
            .enter(BackendCall::AddToCart {
                cart_id: params.cart_id.clone(),
                product_code: params.product_code.clone(),
                config_id: params.config_id.clone(),
            })
            .await?;
        self.data.lock().await.stored(&params.config_id)?;

        let linked_entry = match &self.carts {
            Some(carts) => {
                let change = CartChange::AddEntry {
                    product_code: params.product_code.clone(),
                    quantity: params.quantity,
                };
                let cart = carts.update(&params.user_id, &params.cart_id, &change).await?;
                cart.entry_for_product(&params.product_code)
                    .map(|entry| entry.entry_number)
            }
            None => None,
        };

        let mut data = self.data.lock().await;
        let entry_number = match linked_entry {
            Some(entry_number) => entry_number as usize,
            None => data
                .cart_entries
                .keys()
                .filter(|(cart_id, _)| cart_id == &params.cart_id)
                .count(),
        };
        data.cart_entries.insert(
            (params.cart_id.clone(), entry_number.to_string()),
            params.config_id.clone(),
        );
        Ok(())
    }
}

//! Per-owner UI state of the configurator (current group, menu position).
//!
//! Purely local: no effects, no backend. Entries exist from `CreateUiState` until
//! `RemoveUiState`, and any present entry counts as created.

use async_trait::async_trait;
use process_store::{KeyedStore, StoreEntity, Transition};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu_parent_group: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Creates an empty UI state unless one exists already.
    CreateUiState { owner_key: String },
    SetUiState { owner_key: String, state: UiState },
    RemoveUiState { owner_key: String },
}

#[async_trait]
impl StoreEntity for UiState {
    type Event = UiEvent;
    type Context = ();

    fn reduce(store: &mut KeyedStore<Self>, event: &UiEvent) {
        match event {
            UiEvent::CreateUiState { owner_key } => {
                if !store.contains(owner_key) {
                    store.apply(owner_key, Transition::Success(UiState::default()));
                }
            }
            UiEvent::SetUiState { owner_key, state } => {
                store.apply(owner_key, Transition::Success(state.clone()))
            }
            UiEvent::RemoveUiState { owner_key } => {
                store.remove(owner_key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_does_not_overwrite() {
        let mut store = KeyedStore::new();
        let state = UiState {
            current_group: Some("G2".into()),
            menu_parent_group: None,
        };
        UiState::reduce(
            &mut store,
            &UiEvent::SetUiState {
                owner_key: "product/LAPTOP".into(),
                state: state.clone(),
            },
        );
        UiState::reduce(
            &mut store,
            &UiEvent::CreateUiState {
                owner_key: "product/LAPTOP".into(),
            },
        );

        assert_eq!(store.get("product/LAPTOP").value, Some(state));
    }
}

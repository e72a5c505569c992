//! Product configuration data: groups, attributes, price overview and the backend request
//! payloads that read or write them.

use super::owner::Owner;
use serde::{Deserialize, Serialize};

/// A configuration of a configurable product, bound to one [`Owner`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub config_id: String,
    pub product_code: String,
    pub owner: Owner,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<Overview>,
    /// `Some(true)` between dispatching a cart entry write and its completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_cart_entry_update_pending: Option<bool>,
}

impl Configuration {
    pub fn new(config_id: impl Into<String>, product_code: impl Into<String>, owner: Owner) -> Self {
        Self {
            config_id: config_id.into(),
            product_code: product_code.into(),
            owner,
            groups: Vec::new(),
            overview: None,
            is_cart_entry_update_pending: None,
        }
    }

    pub fn with_groups(mut self, groups: Vec<Group>) -> Self {
        self.groups = groups;
        self
    }

    /// A configuration counts as created once the backend has assigned it an id.
    pub fn is_created(&self) -> bool {
        !self.config_id.is_empty()
    }

    pub fn has_overview(&self) -> bool {
        self.overview.is_some()
    }

    pub fn owner_key(&self) -> &str {
        &self.owner.key
    }

    /// Lookup of a group by id, resolving to the leaf of [`find_group_path`].
    pub fn find_group(&self, group_id: &str) -> Option<&Group> {
        find_group_path(group_id, &self.groups).and_then(|path| path.last().copied())
    }
}

/// Root-to-leaf path to the group with `group_id`.
///
/// Groups of a level are checked before descending, and children are searched in order, so the
/// first match found depth-first wins when ids repeat.
pub fn find_group_path<'a>(group_id: &str, groups: &'a [Group]) -> Option<Vec<&'a Group>> {
    if let Some(group) = groups.iter().find(|group| group.id == group_id) {
        return Some(vec![group]);
    }
    groups.iter().find_map(|parent| {
        find_group_path(group_id, &parent.sub_groups).map(|mut path| {
            path.insert(0, parent);
            path
        })
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupType {
    #[default]
    AttributeGroup,
    SubItemGroup,
}

/// A node of the configuration's group tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub group_type: GroupType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub sub_groups: Vec<Group>,
}

impl Group {
    pub fn new(id: impl Into<String>, group_type: GroupType) -> Self {
        Self {
            id: id.into(),
            group_type,
            ..Self::default()
        }
    }

    pub fn with_attributes(mut self, attributes: Vec<Attribute>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_sub_groups(mut self, sub_groups: Vec<Group>) -> Self {
        self.sub_groups = sub_groups;
        self
    }

    /// Id and type only: no description, attributes or children.
    pub fn skeleton(&self) -> Self {
        Self::new(self.id.clone(), self.group_type)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_single_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_input: Option<String>,
}

impl Attribute {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.selected_single_value = Some(value.into());
        self
    }
}

/// Read-only summary of a configuration's selections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub config_id: String,
    #[serde(default)]
    pub groups: Vec<GroupOverview>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupOverview {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub attributes: Vec<AttributeOverview>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeOverview {
    pub attribute: String,
    pub value: String,
}

/// Reads the configuration attached to an existing cart entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CartEntryRead {
    pub user_id: String,
    pub cart_id: String,
    pub cart_entry_number: String,
    pub owner: Owner,
}

/// Reads the configuration attached to an entry of a placed order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderEntryRead {
    pub user_id: String,
    pub order_id: String,
    pub order_entry_number: u32,
    pub owner: Owner,
}

/// Writes a configuration back to the cart entry it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct CartEntryUpdate {
    pub user_id: String,
    pub cart_id: String,
    pub cart_entry_number: String,
    pub configuration: Configuration,
}

/// Adds the product of a configuration to a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct AddToCart {
    pub user_id: String,
    pub cart_id: String,
    pub product_code: String,
    pub quantity: u32,
    pub config_id: String,
    pub owner_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_once_config_id_assigned() {
        let owner = Owner::product("LAPTOP").unwrap();
        assert!(!Configuration::new("", "LAPTOP", owner.clone()).is_created());
        assert!(Configuration::new("CFG-0001", "LAPTOP", owner).is_created());
    }

    #[test]
    fn test_find_group_searches_sub_groups() {
        let configuration = Configuration::new("CFG-0001", "LAPTOP", Owner::product("LAPTOP").unwrap())
            .with_groups(vec![Group::new("BASICS", GroupType::AttributeGroup)
                .with_sub_groups(vec![Group::new("DISPLAY", GroupType::SubItemGroup)])]);

        let display = configuration.find_group("DISPLAY").unwrap();
        assert_eq!(display.group_type, GroupType::SubItemGroup);
        assert!(configuration.find_group("AUDIO").is_none());
    }

    #[test]
    fn test_find_group_prefers_shallower_duplicate() {
        let configuration = Configuration::new("CFG-0001", "LAPTOP", Owner::product("LAPTOP").unwrap())
            .with_groups(vec![
                Group::new("BASICS", GroupType::AttributeGroup).with_sub_groups(vec![Group::new(
                    "DUP",
                    GroupType::SubItemGroup,
                )]),
                Group::new("DUP", GroupType::AttributeGroup),
            ]);

        let found = configuration.find_group("DUP").unwrap();
        assert_eq!(found.group_type, GroupType::AttributeGroup);
        let path = find_group_path("DUP", &configuration.groups).unwrap();
        assert!(std::ptr::eq(found, *path.last().unwrap()));
    }
}

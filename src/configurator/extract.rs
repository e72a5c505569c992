//! Partial configuration updates.
//!
//! A single attribute change is sent to the backend as a configuration containing only the path
//! from a top-level group down to the group holding the attribute. Every group on that path is
//! reduced to its id and type; only the leaf carries the changed attribute.

use super::ConfiguratorError;
use crate::model::{find_group_path, Attribute, Configuration};

/// Builds the partial configuration carrying `changed_attribute` in group `group_id`.
///
/// # Errors
/// [`ConfiguratorError::GroupNotFound`] if no group with `group_id` exists anywhere in the
/// configuration.
pub fn extract_partial_update(
    group_id: &str,
    changed_attribute: &Attribute,
    configuration: &Configuration,
) -> Result<Configuration, ConfiguratorError> {
    let not_found = || ConfiguratorError::GroupNotFound {
        group_id: group_id.to_string(),
        available: configuration
            .groups
            .iter()
            .map(|group| group.id.clone())
            .collect(),
    };
    let path = find_group_path(group_id, &configuration.groups).ok_or_else(not_found)?;
    let Some((leaf, ancestors)) = path.split_last() else {
        return Err(not_found());
    };

    let mut extract = leaf
        .skeleton()
        .with_attributes(vec![changed_attribute.clone()]);
    for ancestor in ancestors.iter().rev() {
        extract = ancestor.skeleton().with_sub_groups(vec![extract]);
    }

    Ok(Configuration::new(
        configuration.config_id.clone(),
        configuration.product_code.clone(),
        configuration.owner.clone(),
    )
    .with_groups(vec![extract]))
}

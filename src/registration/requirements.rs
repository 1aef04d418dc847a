use std::collections::BTreeSet;

use serde::Serialize;

use super::domain::{RegistrationType, RequirementKey};
use super::policy::PolicyTable;

/// Declarative descriptor of the requirements panel for a selected type.
///
/// The rendering layer shows fields in `visible`, flags fields in `required`
/// as mandatory, and hides everything else. Applying the same descriptor
/// twice is a no-op, so repeated selection changes cannot accumulate
/// duplicate required markers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequirementSet {
    pub visible: BTreeSet<RequirementKey>,
    pub required: BTreeSet<RequirementKey>,
}

impl RequirementSet {
    /// Empty sets; the consuming layer hides the whole requirements panel.
    pub fn hidden() -> Self {
        Self::default()
    }

    pub fn is_hidden(&self) -> bool {
        self.visible.is_empty()
    }
}

/// Resolve the requirements panel for a registration type.
pub fn resolve_type(table: &PolicyTable, registration_type: RegistrationType) -> RequirementSet {
    let Some(policy) = table.lookup(registration_type) else {
        return RequirementSet::hidden();
    };

    let mut required: BTreeSet<RequirementKey> = policy.required.iter().copied().collect();
    if policy.needs_annual_rent {
        required.insert(RequirementKey::AnnualRent);
    }

    let mut visible = required.clone();
    visible.insert(RequirementKey::AdditionalDocs);

    RequirementSet { visible, required }
}

/// Resolve from a raw wire key. Blank or unknown keys yield the hidden
/// panel, matching the "no type selected" behavior.
pub fn resolve(table: &PolicyTable, type_key: &str) -> RequirementSet {
    match RegistrationType::from_key(type_key) {
        Some(registration_type) => resolve_type(table, registration_type),
        None => RequirementSet::hidden(),
    }
}

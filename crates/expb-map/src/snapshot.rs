use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use expb_model::{ColumnMapping, ComponentId};

/// Persistable state of a mapping store: each component's type and bindings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingSnapshot {
    pub components: BTreeMap<ComponentId, StoredComponent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredComponent {
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(default)]
    pub mapping: ColumnMapping,
}

impl MappingSnapshot {
    pub fn binding_count(&self) -> usize {
        self.components.values().map(|c| c.mapping.len()).sum()
    }
}

//! Project files: trials, their placed components and per-parameter config.
//!
//! A project is the unit handed to the runtime. Loading one populates a
//! [`MappingStore`]; exporting writes the store's bindings back into each
//! component's `config`.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use expb_map::{MappingStore, StoreOptions};
use expb_model::{ColumnMappingEntry, ComponentId, TrialId};
use expb_schema::SchemaRegistry;

use crate::error::{ExportError, Result};
use crate::sequencing::BranchRule;

/// A config value as written by the builder.
///
/// Current files hold tagged bindings; a bare JSON value is read as a literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Entry(ColumnMappingEntry),
    Literal(Value),
}

impl ConfigValue {
    pub fn into_entry(self) -> ColumnMappingEntry {
        match self {
            Self::Entry(entry) => entry,
            Self::Literal(value) => ColumnMappingEntry::Typed(value),
        }
    }
}

/// A component placed on a trial's canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialComponent {
    pub id: ComponentId,
    #[serde(rename = "type")]
    pub component_type: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default)]
    pub config: BTreeMap<String, ConfigValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    pub id: TrialId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub components: Vec<TrialComponent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<BranchRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub trials: Vec<Trial>,
    /// Data columns holding the presentation order, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_columns: Option<Vec<String>>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            trials: Vec::new(),
            order_columns: None,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| ExportError::io(path, e))?;
        let project: Self = serde_json::from_str(&contents).map_err(|source| ExportError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        project.check_ids()?;
        debug!(path = %path.display(), trials = project.trials.len(), "project loaded");
        Ok(project)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|source| ExportError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|e| ExportError::io(path, e))
    }

    pub fn trial(&self, id: &TrialId) -> Option<&Trial> {
        self.trials.iter().find(|t| &t.id == id)
    }

    pub fn components(&self) -> impl Iterator<Item = (&Trial, &TrialComponent)> {
        self.trials
            .iter()
            .flat_map(|trial| trial.components.iter().map(move |c| (trial, c)))
    }

    /// Trial and component ids must each be unique across the project.
    pub fn check_ids(&self) -> Result<()> {
        let mut trials = BTreeSet::new();
        let mut components = BTreeSet::new();
        for trial in &self.trials {
            if !trials.insert(&trial.id) {
                return Err(ExportError::DuplicateTrial(trial.id.clone()));
            }
            for component in &trial.components {
                if !components.insert(&component.id) {
                    return Err(ExportError::DuplicateComponent {
                        component: component.id.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Builds a mapping store holding every component's bindings.
    ///
    /// Bindings go through the store's boundary checks, so a literal of the
    /// wrong shape fails the load under strict options.
    ///
    /// A component whose metadata is unknown or failed to load is placed with
    /// no parameters. Its config is left unchecked and is not bound, so
    /// [`apply_store`](Self::apply_store) writes it back unchanged.
    pub fn to_store(&self, registry: SchemaRegistry, options: StoreOptions) -> Result<MappingStore> {
        self.check_ids()?;
        let mut store = MappingStore::with_options(registry, options);
        for (_, component) in self.components() {
            store.place_component(component.id.clone(), &component.component_type)?;
            if !has_schema(store.registry(), &component.component_type) {
                if !component.config.is_empty() {
                    warn!(
                        component = %component.id,
                        component_type = %component.component_type,
                        keys = component.config.len(),
                        "no metadata for component type; config kept unchecked"
                    );
                }
                continue;
            }
            for (key, value) in &component.config {
                store
                    .set_binding(&component.id, key, value.clone().into_entry())
                    .map_err(|source| ExportError::Binding {
                        component: component.id.clone(),
                        key: key.clone(),
                        source,
                    })?;
            }
        }
        info!(
            project = %self.name,
            components = store.components().count(),
            "project loaded into mapping store"
        );
        Ok(store)
    }

    /// Replaces each component's config with the store's current bindings.
    ///
    /// Components the store does not hold get an empty config. Components
    /// without metadata keep the config they were loaded with.
    pub fn apply_store(&mut self, store: &MappingStore) {
        for trial in &mut self.trials {
            for component in &mut trial.components {
                if !has_schema(store.registry(), &component.component_type) {
                    continue;
                }
                component.config = store
                    .component(&component.id)
                    .map(|mapping| {
                        mapping
                            .mapping()
                            .iter()
                            .map(|(key, entry)| (key.to_string(), ConfigValue::Entry(entry.clone())))
                            .collect()
                    })
                    .unwrap_or_default();
            }
        }
    }
}

fn has_schema(registry: &SchemaRegistry, component_type: &str) -> bool {
    registry.error(component_type).is_none() && registry.schema(component_type).is_some()
}

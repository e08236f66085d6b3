//! Per-participant trial configuration.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use expb_map::MappingStore;
use expb_model::{ComponentId, Dataset, Row, TrialId};

use crate::error::{ExportError, Result};
use crate::project::{Project, Trial};

/// A component with every parameter resolved to its runtime value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedComponent {
    pub id: ComponentId,
    #[serde(rename = "type")]
    pub component_type: String,
    pub config: BTreeMap<String, Value>,
    /// Parameters whose numeric cell did not parse; their value is `null`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedTrial {
    pub id: TrialId,
    pub components: Vec<ResolvedComponent>,
}

/// Resolves one trial against a participant's row.
///
/// Components missing from the store resolve to an empty config.
pub fn resolve_trial(trial: &Trial, store: &MappingStore, row: Option<&Row>) -> ResolvedTrial {
    let components = trial
        .components
        .iter()
        .map(|component| {
            let mut config = BTreeMap::new();
            let mut unresolved = Vec::new();
            if let Some(mapping) = store.component(&component.id) {
                for (key, resolved) in mapping.resolve_all(row) {
                    if resolved.is_nan() {
                        unresolved.push(key.to_string());
                    }
                    config.insert(key.to_string(), resolved.into_json());
                }
            }
            if !unresolved.is_empty() {
                warn!(component = %component.id, keys = ?unresolved, "numeric parameters did not resolve");
            }
            ResolvedComponent {
                id: component.id.clone(),
                component_type: component.component_type.clone(),
                config,
                unresolved,
            }
        })
        .collect();
    ResolvedTrial {
        id: trial.id.clone(),
        components,
    }
}

/// Resolves every trial of `project` for the participant at `row_index`.
pub fn resolve_participant(
    project: &Project,
    store: &MappingStore,
    dataset: &Dataset,
    row_index: usize,
) -> Result<Vec<ResolvedTrial>> {
    let row = dataset.row(row_index).ok_or(ExportError::RowOutOfRange {
        row: row_index,
        len: dataset.len(),
    })?;
    Ok(project
        .trials
        .iter()
        .map(|trial| resolve_trial(trial, store, Some(row)))
        .collect())
}

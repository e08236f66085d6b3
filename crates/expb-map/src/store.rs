//! The column mapping store: bindings of every placed component.

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::{debug, info, warn};

use expb_model::{ColumnMappingEntry, ComponentId, Row};
use expb_schema::SchemaRegistry;

use crate::autosave::{
    Autosave, ChangeKind, Clock, DEFAULT_AUTOSAVE_DELAY, Flush, PersistSink, SystemClock,
};
use crate::error::MappingError;
use crate::presets::{Preset, PresetLibrary};
use crate::resolve::Resolved;
use crate::snapshot::{MappingSnapshot, StoredComponent};
use crate::state::ComponentMapping;
use crate::validate::parse_manual_input;

/// Behavior switches for a [`MappingStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Reject typed literals that do not fit the parameter's declared type.
    pub strict_types: bool,
    /// Debounce delay before changes are handed to the persistence sink.
    pub autosave_delay: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            strict_types: true,
            autosave_delay: DEFAULT_AUTOSAVE_DELAY,
        }
    }
}

/// Owns the [`ComponentMapping`] of every component on the canvas.
///
/// Mutations are synchronous and each one schedules a debounced autosave.
/// The store is meant for a single thread of control.
pub struct MappingStore {
    registry: SchemaRegistry,
    presets: PresetLibrary,
    options: StoreOptions,
    components: BTreeMap<ComponentId, ComponentMapping>,
    autosave: Autosave,
    clock: Box<dyn Clock>,
}

impl MappingStore {
    pub fn new(registry: SchemaRegistry) -> Self {
        Self::with_options(registry, StoreOptions::default())
    }

    pub fn with_options(registry: SchemaRegistry, options: StoreOptions) -> Self {
        Self {
            registry,
            presets: PresetLibrary::builtin(),
            options,
            components: BTreeMap::new(),
            autosave: Autosave::new(options.autosave_delay),
            clock: Box::new(SystemClock),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    #[must_use]
    pub fn with_presets(mut self, presets: PresetLibrary) -> Self {
        self.presets = presets;
        self
    }

    /// Rebuilds a store from a snapshot, re-checking every binding.
    pub fn restore(
        registry: SchemaRegistry,
        options: StoreOptions,
        snapshot: MappingSnapshot,
    ) -> Result<Self, MappingError> {
        let mut store = Self::with_options(registry, options);
        for (id, stored) in snapshot.components {
            store.insert_component(id.clone(), &stored.component_type)?;
            for (key, entry) in stored.mapping.iter() {
                store.component_mut(&id)?.set_binding(
                    key,
                    entry.clone(),
                    options.strict_types,
                )?;
            }
        }
        // Restored state is already persisted.
        store.autosave.take();
        info!(components = store.components.len(), "mapping store restored");
        Ok(store)
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn presets(&self) -> &PresetLibrary {
        &self.presets
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    pub fn component(&self, id: &ComponentId) -> Option<&ComponentMapping> {
        self.components.get(id)
    }

    pub fn components(&self) -> impl Iterator<Item = (&ComponentId, &ComponentMapping)> {
        self.components.iter()
    }

    /// Places a component with an empty mapping.
    ///
    /// Types the registry does not know get an empty parameter set.
    pub fn place_component(
        &mut self,
        id: ComponentId,
        component_type: &str,
    ) -> Result<&ComponentMapping, MappingError> {
        self.insert_component(id.clone(), component_type)?;
        self.touch(&id, None, ChangeKind::Set);
        self.component_ref(&id)
    }

    /// Deletes a component and its mapping.
    pub fn remove_component(&mut self, id: &ComponentId) -> Option<ComponentMapping> {
        let removed = self.components.remove(id)?;
        debug!(component = %id, "component removed");
        self.touch(id, None, ChangeKind::Removed);
        Some(removed)
    }

    /// Inserts or replaces the binding of `key`.
    pub fn set_binding(
        &mut self,
        id: &ComponentId,
        key: &str,
        entry: ColumnMappingEntry,
    ) -> Result<(), MappingError> {
        let strict = self.options.strict_types;
        let source = entry.source_name();
        self.component_mut(id)?.set_binding(key, entry, strict)?;
        debug!(component = %id, key, source, "binding set");
        self.touch(id, Some(key), ChangeKind::Set);
        Ok(())
    }

    /// Returns `key` to its default by removing its binding.
    ///
    /// Clearing an unbound parameter is a no-op. Returns whether a binding
    /// was removed.
    pub fn clear_binding(&mut self, id: &ComponentId, key: &str) -> Result<bool, MappingError> {
        let component = self.component_mut(id)?;
        component.parameter(key)?;
        if !component.clear_binding(key) {
            return Ok(false);
        }
        debug!(component = %id, key, "binding cleared");
        self.touch(id, Some(key), ChangeKind::Removed);
        Ok(true)
    }

    /// Value of `key` for an optional participant row.
    pub fn effective_value(
        &self,
        id: &ComponentId,
        key: &str,
        row: Option<&Row>,
    ) -> Result<Resolved, MappingError> {
        self.component_ref(id)?.effective_value(key, row)
    }

    /// Commits text typed into a parameter's input field as a literal.
    ///
    /// Text that does not parse is not committed; the stored binding stays as
    /// it was so the user can correct the input.
    pub fn commit_manual_input(
        &mut self,
        id: &ComponentId,
        key: &str,
        text: &str,
    ) -> Result<(), MappingError> {
        let spec = self.component_ref(id)?.parameter(key)?;
        let value = match parse_manual_input(spec, text) {
            Ok(value) => value,
            Err(error) => {
                debug!(component = %id, key, %error, "manual input left uncommitted");
                return Err(error);
            }
        };
        self.set_binding(id, key, ColumnMappingEntry::Typed(value))
    }

    /// Presets offered for `key`; empty when the parameter is not eligible.
    pub fn presets_for(&self, id: &ComponentId, key: &str) -> Result<&[Preset], MappingError> {
        let spec = self.component_ref(id)?.parameter(key)?;
        Ok(self.presets.offered_for(spec))
    }

    /// Binds `key` to the literal of the preset labelled `label`.
    pub fn apply_preset(
        &mut self,
        id: &ComponentId,
        key: &str,
        label: &str,
    ) -> Result<(), MappingError> {
        let spec = self.component_ref(id)?.parameter(key)?;
        if !PresetLibrary::is_offered(spec) {
            return Err(MappingError::PresetNotOffered(key.to_string()));
        }
        let value = self
            .presets
            .get(label)
            .ok_or_else(|| MappingError::UnknownPreset(label.to_string()))?
            .value()
            .clone();
        self.set_binding(id, key, ColumnMappingEntry::Typed(value))
    }

    /// Label of the preset the current literal binding of `key` matches.
    pub fn selected_preset(&self, id: &ComponentId, key: &str) -> Option<&str> {
        match self.components.get(id)?.binding(key)? {
            ColumnMappingEntry::Typed(value) => self.presets.selected(value).map(Preset::label),
            ColumnMappingEntry::Csv(_) => None,
        }
    }

    pub fn snapshot(&self) -> MappingSnapshot {
        MappingSnapshot {
            components: self
                .components
                .iter()
                .map(|(id, component)| {
                    (
                        id.clone(),
                        StoredComponent {
                            component_type: component.component_type().to_string(),
                            mapping: component.mapping().clone(),
                        },
                    )
                })
                .collect(),
        }
    }

    pub fn autosave_pending(&self) -> bool {
        self.autosave.is_pending()
    }

    /// Hands pending changes to `sink` once the debounce delay has lapsed.
    ///
    /// Returns whether a flush happened. Sink failures are logged and do not
    /// affect the store.
    pub fn poll_autosave(&mut self, sink: &mut dyn PersistSink) -> bool {
        let now = self.clock.now();
        match self.autosave.poll(now) {
            Some(flush) => {
                self.persist(sink, &flush);
                true
            }
            None => false,
        }
    }

    /// Hands pending changes to `sink` immediately.
    pub fn flush_autosave(&mut self, sink: &mut dyn PersistSink) -> bool {
        match self.autosave.take() {
            Some(flush) => {
                self.persist(sink, &flush);
                true
            }
            None => false,
        }
    }

    fn persist(&self, sink: &mut dyn PersistSink, flush: &Flush) {
        let snapshot = self.snapshot();
        if let Err(error) = sink.persist(flush, &snapshot) {
            warn!(error = %error, changes = flush.changes.len(), "autosave failed");
        } else {
            debug!(changes = flush.changes.len(), "autosave flushed");
        }
    }

    fn insert_component(
        &mut self,
        id: ComponentId,
        component_type: &str,
    ) -> Result<(), MappingError> {
        if self.components.contains_key(&id) {
            return Err(MappingError::ComponentAlreadyPlaced(id));
        }
        let parameters = self.registry.parameters(component_type).to_vec();
        if parameters.is_empty() {
            match self.registry.error(component_type) {
                Some(error) => {
                    warn!(component = %id, component_type, error, "placing component without schema");
                }
                None => debug!(component = %id, component_type, "component type has no parameters"),
            }
        }
        self.components
            .insert(id, ComponentMapping::new(component_type, parameters));
        Ok(())
    }

    fn touch(&mut self, id: &ComponentId, key: Option<&str>, kind: ChangeKind) {
        let now = self.clock.now();
        self.autosave.record(id, key, kind, now);
    }

    fn component_ref(&self, id: &ComponentId) -> Result<&ComponentMapping, MappingError> {
        self.components
            .get(id)
            .ok_or_else(|| MappingError::ComponentNotFound(id.clone()))
    }

    fn component_mut(&mut self, id: &ComponentId) -> Result<&mut ComponentMapping, MappingError> {
        self.components
            .get_mut(id)
            .ok_or_else(|| MappingError::ComponentNotFound(id.clone()))
    }
}

impl std::fmt::Debug for MappingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappingStore")
            .field("options", &self.options)
            .field("components", &self.components)
            .field("autosave", &self.autosave)
            .finish_non_exhaustive()
    }
}

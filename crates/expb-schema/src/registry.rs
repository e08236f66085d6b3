#![deny(unsafe_code)]

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use expb_model::ParameterSpec;

use crate::error::SchemaError;
use crate::metadata::ComponentMetadata;
use crate::naming::kebab_name;
use crate::source::{BuiltinSource, MetadataSource};

/// Parameter schema of one registered component type.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ComponentSchema {
    pub name: String,
    pub version: Option<String>,
    pub parameters: Vec<ParameterSpec>,
    pub data_fields: Vec<String>,
}

impl ComponentSchema {
    pub fn from_metadata(metadata: &ComponentMetadata) -> Result<Self, SchemaError> {
        Ok(Self {
            name: metadata.name.clone(),
            version: metadata.version.clone(),
            parameters: metadata.parameter_specs()?,
            data_fields: metadata.data_fields(),
        })
    }

    pub fn parameter(&self, key: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.key == key)
    }
}

/// Registry of component parameter schemas, keyed by kebab-cased type name.
///
/// Populated once, then read-only. A type whose metadata could not be loaded
/// keeps an error string and reports an empty parameter set.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, ComponentSchema>,
    errors: BTreeMap<String, String>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every compiled-in component type.
    pub fn builtin() -> Self {
        Self::load_all(&BuiltinSource)
    }

    /// Loads every type the source can enumerate.
    pub fn load_all<S: MetadataSource + ?Sized>(source: &S) -> Self {
        match source.available() {
            Ok(types) => Self::load(&types, source),
            Err(error) => {
                warn!(%error, "failed to enumerate component metadata");
                Self::new()
            }
        }
    }

    /// Loads the given component types from a metadata source.
    ///
    /// Failures are recorded per type and never abort the remaining types.
    pub fn load<S, T>(types: &[T], source: &S) -> Self
    where
        S: MetadataSource + ?Sized,
        T: AsRef<str>,
    {
        let mut registry = Self::new();
        for component_type in types {
            // A failed load is already recorded against the type.
            let _ = registry.fetch_and_register(component_type.as_ref(), source);
        }
        info!(
            loaded = registry.schemas.len(),
            failed = registry.errors.len(),
            "component schemas loaded"
        );
        registry
    }

    /// Registers a parsed metadata document under its own name.
    pub fn register(&mut self, metadata: &ComponentMetadata) -> Result<(), SchemaError> {
        let name = kebab_name(&metadata.name);
        self.insert_schema(name, metadata)
    }

    /// Re-fetches a type whose earlier load failed.
    ///
    /// Types already registered are returned unchanged; their parameter types
    /// never change after registration.
    pub fn retry<S: MetadataSource + ?Sized>(
        &mut self,
        component_type: &str,
        source: &S,
    ) -> Result<&ComponentSchema, SchemaError> {
        let name = kebab_name(component_type);
        if !self.schemas.contains_key(&name) {
            self.fetch_and_register(&name, source)?;
        }
        self.schemas
            .get(&name)
            .ok_or(SchemaError::UnknownComponent(name))
    }

    /// Ordered parameters of a component type.
    ///
    /// Unknown or failed types have nothing to configure and yield an empty slice.
    pub fn parameters(&self, component_type: &str) -> &[ParameterSpec] {
        self.schema(component_type)
            .map(|schema| schema.parameters.as_slice())
            .unwrap_or_default()
    }

    pub fn parameter(&self, component_type: &str, key: &str) -> Option<&ParameterSpec> {
        self.schema(component_type)
            .and_then(|schema| schema.parameter(key))
    }

    pub fn schema(&self, component_type: &str) -> Option<&ComponentSchema> {
        self.schemas.get(&kebab_name(component_type))
    }

    /// Load error recorded for a component type, if any.
    pub fn error(&self, component_type: &str) -> Option<&str> {
        self.errors
            .get(&kebab_name(component_type))
            .map(String::as_str)
    }

    pub fn component_types(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn schemas(&self) -> impl Iterator<Item = (&str, &ComponentSchema)> {
        self.schemas.iter().map(|(name, schema)| (name.as_str(), schema))
    }

    pub fn errors(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors
            .iter()
            .map(|(name, error)| (name.as_str(), error.as_str()))
    }

    fn fetch_and_register<S: MetadataSource + ?Sized>(
        &mut self,
        component_type: &str,
        source: &S,
    ) -> Result<(), SchemaError> {
        let name = kebab_name(component_type);
        let result = source
            .fetch(&name)
            .and_then(|metadata| self.insert_schema(name.clone(), &metadata));
        if let Err(error) = &result {
            warn!(component = %name, %error, "component metadata unavailable");
            self.errors.insert(name, error.to_string());
        }
        result
    }

    fn insert_schema(
        &mut self,
        name: String,
        metadata: &ComponentMetadata,
    ) -> Result<(), SchemaError> {
        if self.schemas.contains_key(&name) {
            return Err(SchemaError::DuplicateComponent(name));
        }
        let schema = ComponentSchema::from_metadata(metadata)?;
        debug!(
            component = %name,
            parameters = schema.parameters.len(),
            "registered component schema"
        );
        self.errors.remove(&name);
        self.schemas.insert(name, schema);
        Ok(())
    }
}

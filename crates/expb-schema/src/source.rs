//! Where component metadata comes from.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SchemaError;
use crate::metadata::ComponentMetadata;

const BUILTIN: &[(&str, &str)] = &[
    (
        "html-button-response",
        include_str!("../data/html-button-response.json"),
    ),
    (
        "html-slider-response",
        include_str!("../data/html-slider-response.json"),
    ),
    (
        "image-keyboard-response",
        include_str!("../data/image-keyboard-response.json"),
    ),
    (
        "webgazer-calibrate",
        include_str!("../data/webgazer-calibrate.json"),
    ),
    (
        "webgazer-validate",
        include_str!("../data/webgazer-validate.json"),
    ),
];

/// Supplies metadata documents by kebab-cased component type name.
pub trait MetadataSource {
    fn fetch(&self, kebab_name: &str) -> Result<ComponentMetadata, SchemaError>;

    /// Component types this source can enumerate.
    fn available(&self) -> Result<Vec<String>, SchemaError>;
}

/// Metadata compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinSource;

impl MetadataSource for BuiltinSource {
    fn fetch(&self, kebab_name: &str) -> Result<ComponentMetadata, SchemaError> {
        let (name, text) = BUILTIN
            .iter()
            .find(|(name, _)| *name == kebab_name)
            .ok_or_else(|| SchemaError::UnknownComponent(kebab_name.to_string()))?;
        ComponentMetadata::from_json(name, text)
    }

    fn available(&self) -> Result<Vec<String>, SchemaError> {
        Ok(BUILTIN.iter().map(|(name, _)| (*name).to_string()).collect())
    }
}

/// Metadata read from `<dir>/<kebab-name>.json` files.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl MetadataSource for DirectorySource {
    fn fetch(&self, kebab_name: &str) -> Result<ComponentMetadata, SchemaError> {
        let path = self.dir.join(format!("{kebab_name}.json"));
        if !path.is_file() {
            return Err(SchemaError::UnknownComponent(kebab_name.to_string()));
        }
        let text = fs::read_to_string(&path).map_err(|e| SchemaError::io(&path, e))?;
        ComponentMetadata::from_json(kebab_name, &text)
    }

    fn available(&self) -> Result<Vec<String>, SchemaError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| SchemaError::io(&self.dir, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| SchemaError::io(&self.dir, e))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

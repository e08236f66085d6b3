#![deny(unsafe_code)]

pub mod error;
pub mod metadata;
pub mod naming;
pub mod registry;
pub mod source;

pub use crate::error::SchemaError;
pub use crate::metadata::{ComponentMetadata, ParameterInfo};
pub use crate::naming::kebab_name;
pub use crate::registry::{ComponentSchema, SchemaRegistry};
pub use crate::source::{BuiltinSource, DirectorySource, MetadataSource};

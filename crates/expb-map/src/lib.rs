//! Parameter binding model for experiment components.
//!
//! Each placed component owns a mapping from parameter key to a binding: a
//! typed literal or a reference to a participant data column. The store
//! validates bindings at its boundary, resolves them against participant rows
//! and debounces change notifications for persistence.

#![deny(unsafe_code)]

pub mod autosave;
pub mod error;
pub mod order;
pub mod presets;
pub mod repository;
pub mod resolve;
pub mod snapshot;
pub mod state;
pub mod store;
pub mod validate;

pub use autosave::{
    Autosave, Change, ChangeKind, Clock, DEFAULT_AUTOSAVE_DELAY, Flush, ManualClock, PersistSink,
    SystemClock,
};
pub use error::{MappingError, OrderError, PresetError};
pub use order::{OrderColumn, OrderSpecification, extract_order, order_indices};
pub use presets::{PRESET_PARAMETERS, Preset, PresetLibrary};
pub use repository::{ProjectMetadata, ProjectRepository, RepositorySink, StoredSnapshot};
pub use resolve::{Resolved, resolve_binding, resolve_cell};
pub use snapshot::{MappingSnapshot, StoredComponent};
pub use state::{BindingStatus, BindingSummary, ComponentMapping};
pub use store::{MappingStore, StoreOptions};
pub use validate::{json_kind, parse_manual_input, validate_entry};

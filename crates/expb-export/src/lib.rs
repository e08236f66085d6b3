//! Experiment projects as handed to the runtime.
//!
//! Loads and saves project files, turns a project into a mapping store and
//! back, resolves trials per participant and sequences trials through
//! explicit skip and jump requests.

#![deny(unsafe_code)]

pub mod error;
pub mod project;
pub mod resolve;
pub mod sequencing;

pub use error::{ExportError, Result, SequenceError};
pub use project::{ConfigValue, Project, Trial, TrialComponent};
pub use resolve::{ResolvedComponent, ResolvedTrial, resolve_participant, resolve_trial};
pub use sequencing::{
    BranchAction, BranchRule, SequenceMode, SequencingContext, SequencingController,
};

//! File-system storage for mapping snapshots.
//!
//! Snapshots are stored as pretty-printed JSON files named after the project:
//! `{project}.mapping.json`. The repository doubles as the autosave sink.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::autosave::{Flush, PersistSink};
use crate::snapshot::MappingSnapshot;

const FILE_SUFFIX: &str = ".mapping.json";

/// Directory of stored mapping snapshots.
#[derive(Debug, Clone)]
pub struct ProjectRepository {
    base_dir: PathBuf,
}

/// A snapshot with repository metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSnapshot {
    #[serde(flatten)]
    pub snapshot: MappingSnapshot,
    /// RFC 3339 timestamp of the write.
    pub saved_at: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl StoredSnapshot {
    pub fn new(snapshot: MappingSnapshot) -> Self {
        Self {
            snapshot,
            saved_at: Some(chrono::Utc::now().to_rfc3339()),
            version: default_version(),
        }
    }
}

/// Summary of one stored project.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectMetadata {
    pub project: String,
    pub file_path: PathBuf,
    pub component_count: usize,
    pub binding_count: usize,
    pub saved_at: Option<String>,
}

impl ProjectRepository {
    /// Opens a repository, creating the directory if needed.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir).with_context(|| {
            format!(
                "Failed to create mapping repository: {}",
                base_dir.display()
            )
        })?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn save(&self, project: &str, snapshot: &MappingSnapshot) -> Result<PathBuf> {
        let path = self.path_for(project);
        let stored = StoredSnapshot::new(snapshot.clone());
        let json = serde_json::to_string_pretty(&stored)
            .with_context(|| format!("Failed to serialize mapping for {project}"))?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write mapping to {}", path.display()))?;
        Ok(path)
    }

    /// Loads a project's snapshot; `None` when nothing is stored.
    pub fn load(&self, project: &str) -> Result<Option<MappingSnapshot>> {
        Ok(self.load_stored(project)?.map(|stored| stored.snapshot))
    }

    pub fn load_stored(&self, project: &str) -> Result<Option<StoredSnapshot>> {
        let path = self.path_for(project);
        if !path.exists() {
            return Ok(None);
        }
        read_stored(&path).map(Some)
    }

    /// Lists stored projects, sorted by name. Unreadable files are skipped.
    pub fn list(&self) -> Result<Vec<ProjectMetadata>> {
        let mut projects = Vec::new();
        for entry in fs::read_dir(&self.base_dir)
            .with_context(|| format!("Failed to read repository: {}", self.base_dir.display()))?
        {
            let path = entry?.path();
            let Some(project) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_suffix(FILE_SUFFIX))
                .map(str::to_string)
            else {
                continue;
            };
            if let Ok(stored) = read_stored(&path) {
                projects.push(ProjectMetadata {
                    project,
                    component_count: stored.snapshot.components.len(),
                    binding_count: stored.snapshot.binding_count(),
                    saved_at: stored.saved_at,
                    file_path: path,
                });
            }
        }
        projects.sort_by(|a, b| a.project.cmp(&b.project));
        Ok(projects)
    }

    pub fn delete(&self, project: &str) -> Result<bool> {
        let path = self.path_for(project);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to delete mapping: {}", path.display()))?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn exists(&self, project: &str) -> bool {
        self.path_for(project).exists()
    }

    /// Autosave sink writing `project` on every flush.
    pub fn sink(&self, project: impl Into<String>) -> RepositorySink {
        RepositorySink {
            repository: self.clone(),
            project: project.into(),
            writes: 0,
        }
    }

    fn path_for(&self, project: &str) -> PathBuf {
        self.base_dir
            .join(format!("{}{FILE_SUFFIX}", normalize_name(project)))
    }
}

fn read_stored(path: &Path) -> Result<StoredSnapshot> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read mapping from {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse mapping from {}", path.display()))
}

/// Normalize a project name for use in filenames.
fn normalize_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

/// Writes the full snapshot of one project whenever autosave flushes.
#[derive(Debug, Clone)]
pub struct RepositorySink {
    repository: ProjectRepository,
    project: String,
    writes: usize,
}

impl RepositorySink {
    /// Number of snapshots written so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl PersistSink for RepositorySink {
    fn persist(&mut self, flush: &Flush, snapshot: &MappingSnapshot) -> Result<()> {
        let path = self.repository.save(&self.project, snapshot)?;
        self.writes += 1;
        tracing::debug!(
            path = %path.display(),
            changes = flush.changes.len(),
            "mapping snapshot written"
        );
        Ok(())
    }
}

//! Project discovery and layout
//!
//! An EquipTrak project is a directory containing `.eqt/` (configuration)
//! and `records/` (one `*.eqt.yaml` file per service record).

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::identity::EntityId;

/// Marker directory identifying a project root
pub const PROJECT_DIR: &str = ".eqt";

/// Directory holding service record files
pub const RECORDS_DIR: &str = "records";

/// File extension for record files
pub const RECORD_EXTENSION: &str = ".eqt.yaml";

const CONFIG_TEMPLATE: &str = r#"# EquipTrak project configuration

# Engineers allowed to sign off service records. Leave empty to accept anyone.
engineers: []

retest:
  # Days from service to retest
  interval_days: 364
  # Retests this close are reported as upcoming
  upcoming_window_days: 30
  # locked: retest date always follows the service date
  # manual: engineers may set the retest date by hand
  mode: locked

certificates:
  spot_welder:
    prefix: SW
    pad_width: 4
  lift_equipment:
    prefix: BWS
    pad_width: 4
  other:
    prefix: EQ
    pad_width: 4
"#;

/// Errors locating or creating a project
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not inside an EquipTrak project (no .eqt/ found). Run 'eqt init' first")]
    NotFound,

    #[error("Project already exists at {0}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A discovered project root
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    /// Find the project containing the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let cwd = std::env::current_dir()?;
        Self::discover_from(&cwd)
    }

    /// Find the project containing `start`, walking up through parents
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        start
            .ancestors()
            .find(|dir| dir.join(PROJECT_DIR).is_dir())
            .map(|root| Self {
                root: root.to_path_buf(),
            })
            .ok_or(ProjectError::NotFound)
    }

    /// Create a new project at `root`
    pub fn init(root: &Path) -> Result<Self, ProjectError> {
        let marker = root.join(PROJECT_DIR);
        if marker.exists() {
            return Err(ProjectError::AlreadyExists(root.to_path_buf()));
        }

        fs::create_dir_all(&marker)?;
        fs::create_dir_all(root.join(RECORDS_DIR))?;
        fs::write(marker.join("config.yaml"), CONFIG_TEMPLATE)?;

        tracing::info!(root = %root.display(), "initialized project");
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(PROJECT_DIR).join("config.yaml")
    }

    pub fn records_dir(&self) -> PathBuf {
        self.root.join(RECORDS_DIR)
    }

    /// Path of the file holding the record with `id`
    pub fn record_path(&self, id: &EntityId) -> PathBuf {
        self.records_dir().join(format!("{}{}", id, RECORD_EXTENSION))
    }
}

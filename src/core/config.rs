//! Layered configuration
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults
//! 2. user config (`<config dir>/equiptrak/config.yaml`)
//! 3. project config (`.eqt/config.yaml`)
//! 4. environment (`EQT_AUTHOR`, `EQT_EDITOR`)
//!
//! YAML layers are merged key by key, so a project file that only sets
//! `engineers:` keeps the user's `author:`.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_yml::Value;
use thiserror::Error;

use crate::core::certificate::CertificateScheme;
use crate::core::project::Project;
use crate::core::retest::RetestPolicy;
use crate::core::roster::EngineerRoster;
use crate::entities::equipment::EquipmentKind;

/// Errors loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Certificate scheme per equipment kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateConfig {
    pub spot_welder: CertificateScheme,
    pub lift_equipment: CertificateScheme,
    pub other: CertificateScheme,
}

impl Default for CertificateConfig {
    fn default() -> Self {
        Self {
            spot_welder: CertificateScheme::new("SW", 4),
            lift_equipment: CertificateScheme::new("BWS", 4),
            other: CertificateScheme::new("EQ", 4),
        }
    }
}

impl CertificateConfig {
    pub fn scheme_for(&self, kind: EquipmentKind) -> &CertificateScheme {
        match kind {
            EquipmentKind::SpotWelder => &self.spot_welder,
            EquipmentKind::LiftEquipment => &self.lift_equipment,
            EquipmentKind::Other => &self.other,
        }
    }
}

/// Effective configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Name recorded as `author` on new records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Editor for `eqt svc edit`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,

    /// Authorized engineers
    pub engineers: EngineerRoster,

    /// Retest scheduling
    pub retest: RetestPolicy,

    /// Certificate numbering schemes
    pub certificates: CertificateConfig,
}

impl Config {
    /// Load user and project configuration for `project`
    pub fn load(project: &Project) -> Result<Self, ConfigError> {
        let mut layers = Vec::new();
        if let Some(path) = user_config_path() {
            layers.push(path);
        }
        layers.push(project.config_path());

        let mut config = Self::from_files(&layers)?;
        config.apply_env();
        Ok(config)
    }

    /// Merge the given YAML files in order; missing files are skipped
    pub fn from_files(paths: &[PathBuf]) -> Result<Self, ConfigError> {
        let mut merged = Value::Mapping(Default::default());
        let mut source = PathBuf::new();

        for path in paths {
            if !path.is_file() {
                continue;
            }
            tracing::debug!(path = %path.display(), "loading config layer");
            let layer = read_layer(path)?;
            merge_values(&mut merged, layer);
            source = path.clone();
        }

        let config = Config::deserialize(merged).map_err(|e| ConfigError::Parse {
            path: source.clone(),
            message: e.to_string(),
        })?;
        config.validate().map_err(|message| ConfigError::Parse {
            path: source,
            message,
        })?;
        Ok(config)
    }

    /// Check merged settings that serde alone cannot constrain
    fn validate(&self) -> Result<(), String> {
        self.retest.validate().map_err(|e| e.to_string())?;
        for kind in EquipmentKind::all() {
            self.certificates
                .scheme_for(kind)
                .validate()
                .map_err(|e| format!("certificates.{}: {}", kind.as_key(), e))?;
        }
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(author) = std::env::var("EQT_AUTHOR") {
            if !author.trim().is_empty() {
                self.author = Some(author);
            }
        }
        if let Ok(editor) = std::env::var("EQT_EDITOR") {
            if !editor.trim().is_empty() {
                self.editor = Some(editor);
            }
        }
    }

    /// Author name for new records
    pub fn author(&self) -> String {
        self.author
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .or_else(|| std::env::var("USERNAME").ok())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Editor command for interactive edits
    pub fn editor(&self) -> String {
        self.editor
            .clone()
            .or_else(|| std::env::var("VISUAL").ok())
            .or_else(|| std::env::var("EDITOR").ok())
            .unwrap_or_else(|| "vi".to_string())
    }
}

/// Location of the per-user config file, if the platform has a config directory
pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "equiptrak").map(|dirs| dirs.config_dir().join("config.yaml"))
}

fn read_layer(path: &Path) -> Result<Value, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let value: Value = serde_yml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    // An empty file parses as null
    Ok(match value {
        Value::Null => Value::Mapping(Default::default()),
        other => other,
    })
}

/// Deep-merge `overlay` into `base`; mappings merge per key, anything else replaces
fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::retest::RetestMode;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_files(&[]).unwrap();
        assert_eq!(config.retest, RetestPolicy::default());
        assert!(config.engineers.is_empty());
        assert_eq!(
            config.certificates.scheme_for(EquipmentKind::SpotWelder),
            &CertificateScheme::new("SW", 4)
        );
    }

    #[test]
    fn test_project_template_parses() {
        let tmp = tempfile::tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        let config = Config::from_files(&[project.config_path()]).unwrap();
        assert_eq!(config.retest.interval_days, 364);
        assert_eq!(config.retest.mode, RetestMode::Locked);
        assert_eq!(config.certificates.lift_equipment.prefix, "BWS");
    }

    #[test]
    fn test_layers_merge_per_key() {
        let tmp = tempfile::tempdir().unwrap();
        let user = write(
            tmp.path(),
            "user.yaml",
            "author: Sam Patel\nretest:\n  upcoming_window_days: 45\n",
        );
        let project = write(
            tmp.path(),
            "project.yaml",
            "engineers: [Alice Brown]\nretest:\n  mode: manual\n",
        );

        let config = Config::from_files(&[user, project]).unwrap();
        assert_eq!(config.author.as_deref(), Some("Sam Patel"));
        assert_eq!(config.retest.upcoming_window_days, 45);
        assert_eq!(config.retest.mode, RetestMode::Manual);
        assert_eq!(config.retest.interval_days, 364);
        assert!(config.engineers.is_authorized("alice brown"));
    }

    #[test]
    fn test_partial_scheme_override() {
        let tmp = tempfile::tempdir().unwrap();
        let project = write(
            tmp.path(),
            "project.yaml",
            "certificates:\n  other:\n    prefix: GEN\n",
        );
        let config = Config::from_files(&[project]).unwrap();
        assert_eq!(config.certificates.other, CertificateScheme::new("GEN", 4));
        assert_eq!(config.certificates.spot_welder.prefix, "SW");
    }

    #[test]
    fn test_negative_interval_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let project = write(tmp.path(), "project.yaml", "retest:\n  interval_days: -30\n");
        let err = Config::from_files(&[project.clone()]).unwrap_err();
        match err {
            ConfigError::Parse { path, message } => {
                assert_eq!(path, project);
                assert!(message.contains("interval_days"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_huge_interval_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let project = write(
            tmp.path(),
            "project.yaml",
            "retest:\n  interval_days: 1000000000000000\n",
        );
        assert!(matches!(
            Config::from_files(&[project]),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_negative_window_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let project = write(
            tmp.path(),
            "project.yaml",
            "retest:\n  upcoming_window_days: -1\n",
        );
        assert!(matches!(
            Config::from_files(&[project]),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_bad_certificate_scheme_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let empty = write(
            tmp.path(),
            "empty.yaml",
            "certificates:\n  other:\n    prefix: \"\"\n",
        );
        let err = Config::from_files(&[empty]).unwrap_err();
        assert!(err.to_string().contains("certificates.other"));

        let wide = write(
            tmp.path(),
            "wide.yaml",
            "certificates:\n  spot_welder:\n    prefix: SW\n    pad_width: 1000000\n",
        );
        assert!(matches!(
            Config::from_files(&[wide]),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_empty_file_is_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let project = write(tmp.path(), "project.yaml", "");
        let config = Config::from_files(&[project]).unwrap();
        assert_eq!(config.retest, RetestPolicy::default());
    }

    #[test]
    fn test_bad_mode_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let project = write(tmp.path(), "project.yaml", "retest:\n  mode: sometimes\n");
        assert!(matches!(
            Config::from_files(&[project]),
            Err(ConfigError::Parse { .. })
        ));
    }
}

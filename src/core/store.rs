//! Plain-text record store
//!
//! Each service record lives in its own `records/<ID>.eqt.yaml` file. Files
//! that fail to parse are reported, not fatal: listing carries on without
//! them, and the dashboard still counts them when their retest date can be
//! recovered from the raw YAML.

use std::path::{Path, PathBuf};

use serde_yml::Value;
use thiserror::Error;
use walkdir::WalkDir;

use crate::core::aggregate::{RetestField, RetestSource};
use crate::core::certificate::find_duplicates;
use crate::core::project::{Project, RECORD_EXTENSION};
use crate::entities::service_record::ServiceRecord;
use crate::yaml::{parse_yaml_file, write_yaml_file, YamlError};

/// Errors from the record store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Records directory {0} is missing or unreadable")]
    Unavailable(PathBuf),

    #[error("Failed to walk records directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error(transparent)]
    Yaml(#[from] YamlError),

    #[error("No service record found matching '{0}'")]
    NotFound(String),

    #[error("Ambiguous query '{query}' matches: {}", .candidates.join(", "))]
    Ambiguous {
        query: String,
        candidates: Vec<String>,
    },
}

/// A record file that could not be parsed as a [`ServiceRecord`]
#[derive(Debug, Clone)]
pub struct UnreadableRecord {
    pub path: PathBuf,
    pub error: String,
    /// Retest date recovered from the raw YAML, if any
    pub retest: RetestField,
    /// Certificate number recovered from the raw YAML, if any
    pub certificate_number: Option<String>,
}

impl RetestSource for UnreadableRecord {
    fn retest_field(&self) -> RetestField {
        self.retest.clone()
    }
}

/// Everything found in the records directory
#[derive(Debug, Default)]
pub struct LoadedRecords {
    pub records: Vec<(ServiceRecord, PathBuf)>,
    pub unreadable: Vec<UnreadableRecord>,
}

impl LoadedRecords {
    /// Retest fields of every record, readable or not
    pub fn retest_fields(&self) -> impl Iterator<Item = RetestField> + '_ {
        self.records
            .iter()
            .map(|(r, _)| r.retest_field())
            .chain(self.unreadable.iter().map(|u| u.retest_field()))
    }

    /// Certificate numbers of every record, readable or not
    pub fn certificate_numbers(&self) -> impl Iterator<Item = &str> + '_ {
        self.records
            .iter()
            .map(|(r, _)| r.certificate_number())
            .chain(
                self.unreadable
                    .iter()
                    .filter_map(|u| u.certificate_number.as_deref()),
            )
    }
}

/// Record store rooted at a project's `records/` directory
pub struct RecordStore {
    dir: PathBuf,
    project: Project,
}

impl RecordStore {
    pub fn new(project: &Project) -> Self {
        Self {
            dir: project.records_dir(),
            project: project.clone(),
        }
    }

    fn record_files(&self) -> Result<Vec<PathBuf>, StoreError> {
        if !self.dir.is_dir() {
            return Err(StoreError::Unavailable(self.dir.clone()));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.dir).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file()
                && entry.path().to_string_lossy().ends_with(RECORD_EXTENSION)
            {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    /// Load every record file
    pub fn load_all(&self) -> Result<LoadedRecords, StoreError> {
        let mut loaded = LoadedRecords::default();

        for path in self.record_files()? {
            match parse_yaml_file::<ServiceRecord>(&path) {
                Ok(record) => loaded.records.push((record, path)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to parse record");
                    loaded.unreadable.push(salvage(&path, e.to_string()));
                }
            }
        }

        tracing::debug!(
            records = loaded.records.len(),
            unreadable = loaded.unreadable.len(),
            "loaded records"
        );
        Ok(loaded)
    }

    /// Certificate numbers issued so far, including those on unreadable records
    pub fn certificate_numbers(&self) -> Result<Vec<String>, StoreError> {
        let loaded = self.load_all()?;
        Ok(loaded.certificate_numbers().map(str::to_string).collect())
    }

    /// Certificate numbers held by more than one record
    pub fn find_duplicate_certificates(&self) -> Result<Vec<(String, usize)>, StoreError> {
        let numbers = self.certificate_numbers()?;
        Ok(find_duplicates(&numbers))
    }

    /// Write a record to its file, returning the path
    pub fn save(&self, record: &ServiceRecord) -> Result<PathBuf, StoreError> {
        let path = self.project.record_path(&record.id);
        write_yaml_file(&path, record)?;
        tracing::debug!(id = %record.id, path = %path.display(), "saved record");
        Ok(path)
    }

    /// Find one record by full ID, ID prefix, or certificate number
    pub fn find(&self, query: &str) -> Result<(ServiceRecord, PathBuf), StoreError> {
        let query = query.trim();
        let loaded = self.load_all()?;

        // An exact certificate number wins over ID prefixes
        let mut by_cert: Vec<_> = loaded
            .records
            .iter()
            .filter(|(r, _)| r.certificate_number().eq_ignore_ascii_case(query))
            .cloned()
            .collect();
        if by_cert.len() == 1 {
            return Ok(by_cert.remove(0));
        }

        let mut matches: Vec<_> = if by_cert.is_empty() {
            loaded
                .records
                .into_iter()
                .filter(|(r, _)| !query.is_empty() && r.id.to_string().starts_with(query))
                .collect()
        } else {
            by_cert
        };

        match matches.len() {
            0 => Err(StoreError::NotFound(query.to_string())),
            1 => Ok(matches.remove(0)),
            _ => Err(StoreError::Ambiguous {
                query: query.to_string(),
                candidates: matches.iter().map(|(r, _)| r.id.to_string()).collect(),
            }),
        }
    }
}

/// Recover what the dashboard and numbering need from a file that failed to parse
fn salvage(path: &Path, error: String) -> UnreadableRecord {
    let raw: Option<Value> = std::fs::read_to_string(path)
        .ok()
        .and_then(|content| serde_yml::from_str(&content).ok());

    let (retest, certificate_number) = match raw {
        Some(doc) => {
            let retest = match doc.get("retest_date") {
                None | Some(Value::Null) => RetestField::Missing,
                Some(Value::String(s)) => s.retest_field(),
                Some(other) => RetestField::Malformed(
                    serde_yml::to_string(other)
                        .map(|s| s.trim().to_string())
                        .unwrap_or_default(),
                ),
            };
            let cert = doc
                .get("certificate_number")
                .and_then(Value::as_str)
                .map(str::to_string);
            (retest, cert)
        }
        None => (RetestField::Malformed(error.clone()), None),
    };

    UnreadableRecord {
        path: path.to_path_buf(),
        error,
        retest,
        certificate_number,
    }
}

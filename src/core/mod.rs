//! Core module - retest rules, certificate numbering and project plumbing

pub mod aggregate;
pub mod certificate;
pub mod config;
pub mod entity;
pub mod identity;
pub mod project;
pub mod retest;
pub mod roster;
pub mod store;

pub use aggregate::{aggregate, summarize, RetestField, RetestSource, StatusCounts, StatusSummary};
pub use certificate::{next_certificate_number, CertificateScheme};
pub use config::{CertificateConfig, Config, ConfigError};
pub use entity::{Entity, ServiceStatus};
pub use identity::{EntityId, EntityPrefix, IdParseError};
pub use project::{Project, ProjectError};
pub use retest::{
    classify_status, compute_retest_date, days_until, format_display_date, RetestError,
    RetestMode, RetestPolicy,
};
pub use roster::{EngineerRoster, RosterError};
pub use store::{LoadedRecords, RecordStore, StoreError};

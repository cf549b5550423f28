//! Entity trait and the canonical service status

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::core::identity::EntityId;

/// Common trait for all persisted EquipTrak entities
pub trait Entity: Serialize + DeserializeOwned {
    /// The entity type prefix (e.g., "SVC")
    const PREFIX: &'static str;

    /// Get the entity's unique ID
    fn id(&self) -> &EntityId;

    /// Get the entity's display title
    fn title(&self) -> String;

    /// Get the creation timestamp
    fn created(&self) -> DateTime<Utc>;

    /// Get the author
    fn author(&self) -> &str;
}

/// Compliance status of a piece of equipment, derived from its retest date.
///
/// Never stored authoritatively. Older records carry a cached `status`
/// string that used both `expired` and `invalid` for the same condition;
/// both parse to [`ServiceStatus::Expired`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Valid,
    Upcoming,
    #[serde(alias = "invalid")]
    Expired,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Valid => "valid",
            ServiceStatus::Upcoming => "upcoming",
            ServiceStatus::Expired => "expired",
        }
    }

    /// True when the equipment may still be used without a retest
    pub fn is_compliant(&self) -> bool {
        !matches!(self, ServiceStatus::Expired)
    }
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a status string matches none of the known spellings
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown service status: '{0}'. Use valid, upcoming or expired")]
pub struct UnknownStatus(pub String);

impl FromStr for ServiceStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "valid" => Ok(ServiceStatus::Valid),
            "upcoming" => Ok(ServiceStatus::Upcoming),
            "expired" | "invalid" => Ok(ServiceStatus::Expired),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

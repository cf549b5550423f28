//! Engineer roster - who may sign off a service record
//!
//! The roster comes from configuration (`engineers:` in `.eqt/config.yaml`).
//! An empty roster means the project has not configured one, and any
//! non-empty name is accepted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from roster checks
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("Engineer name is empty")]
    Empty,

    #[error("'{name}' is not an authorized engineer (known: {known})")]
    Unauthorized { name: String, known: String },
}

/// List of authorized engineer names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EngineerRoster {
    engineers: Vec<String>,
}

impl EngineerRoster {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            engineers: names
                .into_iter()
                .map(Into::into)
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.engineers.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.engineers
    }

    /// Roster entry matching `name`, ignoring case and surrounding whitespace
    pub fn find(&self, name: &str) -> Option<&str> {
        let wanted = name.trim();
        self.engineers
            .iter()
            .find(|e| e.eq_ignore_ascii_case(wanted))
            .map(String::as_str)
    }

    pub fn is_authorized(&self, name: &str) -> bool {
        if name.trim().is_empty() {
            return false;
        }
        self.is_empty() || self.find(name).is_some()
    }

    /// Canonical spelling of `name`, or an error if it is not on the roster
    pub fn validate<'a>(&'a self, name: &'a str) -> Result<&'a str, RosterError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(RosterError::Empty);
        }
        if self.is_empty() {
            return Ok(trimmed);
        }
        self.find(trimmed).ok_or_else(|| RosterError::Unauthorized {
            name: trimmed.to_string(),
            known: self.engineers.join(", "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_returns_canonical_name() {
        let roster = EngineerRoster::new(["Alice Brown", "Sam Patel"]);
        assert_eq!(roster.validate("  alice brown "), Ok("Alice Brown"));
        assert!(roster.is_authorized("SAM PATEL"));
    }

    #[test]
    fn test_unknown_engineer_rejected() {
        let roster = EngineerRoster::new(["Alice Brown"]);
        let err = roster.validate("Mallory").unwrap_err();
        assert_eq!(
            err,
            RosterError::Unauthorized {
                name: "Mallory".to_string(),
                known: "Alice Brown".to_string(),
            }
        );
        assert!(!roster.is_authorized("Mallory"));
    }

    #[test]
    fn test_empty_roster_accepts_any_name() {
        let roster = EngineerRoster::default();
        assert_eq!(roster.validate("Anyone"), Ok("Anyone"));
        assert_eq!(roster.validate("   "), Err(RosterError::Empty));
        assert!(!roster.is_authorized(""));
    }

    #[test]
    fn test_blank_entries_dropped() {
        let roster = EngineerRoster::new(["", "  ", "Jo"]);
        assert_eq!(roster.names(), ["Jo".to_string()]);
    }

    #[test]
    fn test_deserializes_from_plain_list() {
        let roster: EngineerRoster = serde_yml::from_str("- Alice Brown\n- Sam Patel\n").unwrap();
        assert_eq!(roster.names().len(), 2);
    }
}

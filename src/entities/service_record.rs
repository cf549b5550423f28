//! Service record entity - one inspection of one piece of equipment

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::aggregate::{RetestField, RetestSource};
use crate::core::entity::{Entity, ServiceStatus};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::retest::{RetestError, RetestMode, RetestPolicy};
use crate::entities::equipment::Equipment;

/// A ServiceRecord entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRecord {
    /// Unique identifier
    pub id: EntityId,

    /// Certificate number, assigned at creation
    certificate_number: String,

    /// The equipment inspected
    pub equipment: Equipment,

    /// Customer company owning the equipment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,

    /// Engineer who performed the inspection
    pub engineer: String,

    /// Date the service was performed
    pub service_date: NaiveDate,

    /// Date by which the equipment must be retested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retest_date: Option<NaiveDate>,

    /// Set when the retest date was entered by hand
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub retest_override: bool,

    /// Cached status written by older tooling. Not authoritative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author (who created this record)
    pub author: String,

    /// Entity revision number
    #[serde(default = "default_revision")]
    pub entity_revision: u32,
}

fn default_revision() -> u32 {
    1
}

impl Entity for ServiceRecord {
    const PREFIX: &'static str = "SVC";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> String {
        format!("{} {}", self.certificate_number, self.equipment.label())
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn author(&self) -> &str {
        &self.author
    }
}

impl RetestSource for ServiceRecord {
    fn retest_field(&self) -> RetestField {
        self.retest_date.retest_field()
    }
}

impl ServiceRecord {
    /// Create a record for a service just performed, scheduling its retest
    pub fn new(
        certificate_number: impl Into<String>,
        equipment: Equipment,
        engineer: impl Into<String>,
        service_date: NaiveDate,
        policy: &RetestPolicy,
        author: impl Into<String>,
    ) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Svc),
            certificate_number: certificate_number.into(),
            equipment,
            customer: None,
            engineer: engineer.into(),
            service_date,
            retest_date: Some(policy.retest_date(service_date)),
            retest_override: false,
            status: None,
            notes: None,
            created: Utc::now(),
            author: author.into(),
            entity_revision: 1,
        }
    }

    pub fn certificate_number(&self) -> &str {
        &self.certificate_number
    }

    /// Derived status as of `today`
    pub fn status_on(&self, today: NaiveDate, policy: &RetestPolicy) -> ServiceStatus {
        policy.classify(self.retest_date, today)
    }

    /// Change the service date, rescheduling the retest.
    ///
    /// A manual retest date survives only in manual mode and only while it
    /// is not earlier than the new service date.
    pub fn set_service_date(&mut self, service_date: NaiveDate, policy: &RetestPolicy) {
        self.service_date = service_date;

        let keep_override = self.retest_override
            && policy.mode == RetestMode::Manual
            && self.retest_date.is_some_and(|r| r >= service_date);

        if !keep_override {
            self.retest_date = Some(policy.retest_date(service_date));
            self.retest_override = false;
        }
        self.entity_revision += 1;
    }

    /// Builder form of [`ServiceRecord::override_retest_date`] for records being created
    pub fn with_retest_date(
        mut self,
        retest_date: NaiveDate,
        policy: &RetestPolicy,
    ) -> Result<Self, RetestError> {
        self.apply_override(retest_date, policy)?;
        Ok(self)
    }

    /// Set the retest date by hand (manual mode only)
    pub fn override_retest_date(
        &mut self,
        retest_date: NaiveDate,
        policy: &RetestPolicy,
    ) -> Result<(), RetestError> {
        self.apply_override(retest_date, policy)?;
        self.entity_revision += 1;
        Ok(())
    }

    fn apply_override(
        &mut self,
        retest_date: NaiveDate,
        policy: &RetestPolicy,
    ) -> Result<(), RetestError> {
        let retest_date = policy.check_override(self.service_date, retest_date)?;
        self.retest_date = Some(retest_date);
        self.retest_override = true;
        Ok(())
    }

    /// Scheduled retest date when the stored one has drifted from the policy.
    ///
    /// Manual overrides only count as drift once the project is locked.
    pub fn retest_drift(&self, policy: &RetestPolicy) -> Option<NaiveDate> {
        if self.retest_override && policy.mode == RetestMode::Manual {
            return None;
        }
        let expected = policy.retest_date(self.service_date);
        (self.retest_date != Some(expected)).then_some(expected)
    }

    /// Drop a manual retest date and go back to the policy's schedule
    pub fn clear_override(&mut self, policy: &RetestPolicy) {
        self.retest_date = Some(policy.retest_date(self.service_date));
        self.retest_override = false;
        self.entity_revision += 1;
    }

    /// The cached `status` field, if present and different from the derived status
    pub fn stale_cached_status(&self, today: NaiveDate, policy: &RetestPolicy) -> Option<&str> {
        let cached = self.status.as_deref()?;
        let derived = self.status_on(today, policy);
        match cached.parse::<ServiceStatus>() {
            Ok(s) if s == derived => None,
            _ => Some(cached),
        }
    }

    /// Rewrite the cached status with the derived one; returns true if it changed
    pub fn refresh_cached_status(&mut self, today: NaiveDate, policy: &RetestPolicy) -> bool {
        let derived = self.status_on(today, policy).to_string();
        if self.status.as_deref() == Some(derived.as_str()) {
            return false;
        }
        self.status = Some(derived);
        true
    }
}

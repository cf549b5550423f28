//! Retest date arithmetic and status classification
//!
//! A retest falls 364 days after the service date, keeping it inside the
//! 12-month regulatory deadline whatever the calendar does. Status is derived
//! from the retest date and an injected `today`, never read from a clock here:
//!
//! | days until retest | status     |
//! |-------------------|------------|
//! | none recorded     | `expired`  |
//! | `< 0`             | `expired`  |
//! | `0..=30`          | `upcoming` |
//! | `> 30`            | `valid`    |

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::entity::ServiceStatus;

/// Days between a service and the retest it schedules
pub const RETEST_INTERVAL_DAYS: i64 = 364;

/// A retest this many days away (or fewer) is flagged as upcoming
pub const UPCOMING_WINDOW_DAYS: i64 = 30;

/// Longest retest interval a policy may configure (ten years)
pub const MAX_INTERVAL_DAYS: i64 = 3660;

/// Fixed display format for dates on lists and certificates
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Retest date for a service performed on `service_date`
pub fn compute_retest_date(service_date: NaiveDate) -> NaiveDate {
    RetestPolicy::default().retest_date(service_date)
}

/// Whole calendar days from `today` until `retest_date` (negative once passed)
pub fn days_until(retest_date: NaiveDate, today: NaiveDate) -> i64 {
    (retest_date - today).num_days()
}

/// Classify a retest date against `today` using the default window
pub fn classify_status(retest_date: Option<NaiveDate>, today: NaiveDate) -> ServiceStatus {
    RetestPolicy::default().classify(retest_date, today)
}

/// Render a date as `dd/mm/yyyy`, or `N/A` when absent
pub fn format_display_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => d.format(DISPLAY_DATE_FORMAT).to_string(),
        None => "N/A".to_string(),
    }
}

/// Parse a `YYYY-MM-DD` date, as used on the command line and in record files
pub fn parse_iso_date(s: &str) -> Result<NaiveDate, RetestError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| RetestError::InvalidDate(s.to_string()))
}

/// Whether a retest date may diverge from the service date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetestMode {
    /// Retest date always follows the service date; manual edits are rejected
    #[default]
    Locked,
    /// An engineer may set the retest date by hand
    Manual,
}

impl std::fmt::Display for RetestMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RetestMode::Locked => write!(f, "locked"),
            RetestMode::Manual => write!(f, "manual"),
        }
    }
}

/// Errors from retest scheduling
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetestError {
    #[error("Retest date is locked to the service date. Set 'retest.mode: manual' in .eqt/config.yaml to override it")]
    Locked,

    #[error("Retest date {retest} is earlier than service date {service}")]
    BeforeServiceDate { service: NaiveDate, retest: NaiveDate },

    #[error("Invalid date '{0}'. Use YYYY-MM-DD")]
    InvalidDate(String),

    #[error("retest.interval_days must be between 0 and {max}, got {value}")]
    IntervalOutOfRange { value: i64, max: i64 },

    #[error("retest.upcoming_window_days must not be negative, got {0}")]
    NegativeWindow(i64),
}

/// Retest scheduling parameters, usually taken from project configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetestPolicy {
    /// Days from service to retest
    pub interval_days: i64,

    /// Days before the retest at which equipment counts as upcoming
    pub upcoming_window_days: i64,

    /// Locked or manual retest dates
    pub mode: RetestMode,
}

impl Default for RetestPolicy {
    fn default() -> Self {
        Self {
            interval_days: RETEST_INTERVAL_DAYS,
            upcoming_window_days: UPCOMING_WINDOW_DAYS,
            mode: RetestMode::Locked,
        }
    }
}

impl RetestPolicy {
    /// Reject intervals and windows that would break the retest rules
    pub fn validate(&self) -> Result<(), RetestError> {
        if !(0..=MAX_INTERVAL_DAYS).contains(&self.interval_days) {
            return Err(RetestError::IntervalOutOfRange {
                value: self.interval_days,
                max: MAX_INTERVAL_DAYS,
            });
        }
        if self.upcoming_window_days < 0 {
            return Err(RetestError::NegativeWindow(self.upcoming_window_days));
        }
        Ok(())
    }

    /// Retest date for `service_date`, never earlier than the service itself.
    ///
    /// Out-of-range intervals are clamped and dates past the calendar's end
    /// saturate at [`NaiveDate::MAX`].
    pub fn retest_date(&self, service_date: NaiveDate) -> NaiveDate {
        let days = self.interval_days.clamp(0, MAX_INTERVAL_DAYS) as u64;
        service_date
            .checked_add_days(Days::new(days))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn classify(&self, retest_date: Option<NaiveDate>, today: NaiveDate) -> ServiceStatus {
        let Some(retest) = retest_date else {
            return ServiceStatus::Expired;
        };

        let diff = days_until(retest, today);
        if diff < 0 {
            ServiceStatus::Expired
        } else if diff <= self.upcoming_window_days.max(0) {
            ServiceStatus::Upcoming
        } else {
            ServiceStatus::Valid
        }
    }

    /// Check a hand-entered retest date against this policy
    pub fn check_override(
        &self,
        service_date: NaiveDate,
        retest_date: NaiveDate,
    ) -> Result<NaiveDate, RetestError> {
        if self.mode == RetestMode::Locked {
            return Err(RetestError::Locked);
        }
        if retest_date < service_date {
            return Err(RetestError::BeforeServiceDate {
                service: service_date,
                retest: retest_date,
            });
        }
        Ok(retest_date)
    }
}

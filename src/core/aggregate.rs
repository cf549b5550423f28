//! Dashboard status counts over a batch of service records

use chrono::NaiveDate;
use serde::Serialize;

use crate::core::entity::ServiceStatus;
use crate::core::retest::RetestPolicy;

/// A retest date as found on a record, before classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetestField {
    /// No retest date recorded
    Missing,
    Date(NaiveDate),
    /// Stored text that is not a calendar date
    Malformed(String),
}

/// Anything that carries a retest date
pub trait RetestSource {
    fn retest_field(&self) -> RetestField;
}

impl RetestSource for NaiveDate {
    fn retest_field(&self) -> RetestField {
        RetestField::Date(*self)
    }
}

impl RetestSource for Option<NaiveDate> {
    fn retest_field(&self) -> RetestField {
        match self {
            Some(d) => RetestField::Date(*d),
            None => RetestField::Missing,
        }
    }
}

impl RetestSource for str {
    fn retest_field(&self) -> RetestField {
        let trimmed = self.trim();
        if trimmed.is_empty() {
            return RetestField::Missing;
        }
        match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            Ok(d) => RetestField::Date(d),
            Err(_) => RetestField::Malformed(self.to_string()),
        }
    }
}

impl RetestSource for String {
    fn retest_field(&self) -> RetestField {
        self.as_str().retest_field()
    }
}

impl RetestSource for RetestField {
    fn retest_field(&self) -> RetestField {
        self.clone()
    }
}

impl<T: RetestSource + ?Sized> RetestSource for &T {
    fn retest_field(&self) -> RetestField {
        (**self).retest_field()
    }
}

/// Per-bucket record counts
///
/// `invalid` holds expired records and records with no retest date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub valid: usize,
    pub upcoming: usize,
    pub invalid: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.valid + self.upcoming + self.invalid
    }

    pub fn add(&mut self, status: ServiceStatus) {
        match status {
            ServiceStatus::Valid => self.valid += 1,
            ServiceStatus::Upcoming => self.upcoming += 1,
            ServiceStatus::Expired => self.invalid += 1,
        }
    }

    pub fn get(&self, status: ServiceStatus) -> usize {
        match status {
            ServiceStatus::Valid => self.valid,
            ServiceStatus::Upcoming => self.upcoming,
            ServiceStatus::Expired => self.invalid,
        }
    }
}

/// Bucket counts plus the records that could not be classified
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    #[serde(flatten)]
    pub counts: StatusCounts,

    /// Records excluded from every bucket because their retest date is malformed
    pub skipped: usize,
}

/// Count records per status bucket using the default retest policy
pub fn aggregate<I>(records: I, today: NaiveDate) -> StatusCounts
where
    I: IntoIterator,
    I::Item: RetestSource,
{
    summarize(records, today, &RetestPolicy::default()).counts
}

/// Count records per status bucket, tallying malformed retest dates separately
pub fn summarize<I>(records: I, today: NaiveDate, policy: &RetestPolicy) -> StatusSummary
where
    I: IntoIterator,
    I::Item: RetestSource,
{
    let mut summary = StatusSummary::default();

    for record in records {
        match record.retest_field() {
            RetestField::Missing => summary.counts.add(policy.classify(None, today)),
            RetestField::Date(d) => summary.counts.add(policy.classify(Some(d), today)),
            RetestField::Malformed(raw) => {
                tracing::debug!(retest_date = %raw, "skipping record with malformed retest date");
                summary.skipped += 1;
            }
        }
    }

    summary
}

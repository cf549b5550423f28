//! Certificate numbering
//!
//! Certificate numbers are `<PREFIX>-<sequence>` with the sequence zero-padded
//! to the scheme's width (`SW-0001`, `SW-0002`, ...). The next number is one
//! past the highest sequence already issued under the same prefix, so gaps
//! left by deleted records are never refilled.
//!
//! Nothing here reserves a number. Two records created concurrently from the
//! same list of existing numbers receive the same certificate number; see
//! [`find_duplicates`] for detecting that after the fact.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Widest zero-padding a scheme may ask for
pub const MAX_PAD_WIDTH: usize = 12;

/// Errors from certificate scheme settings
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CertificateError {
    #[error("Certificate prefix must not be empty")]
    EmptyPrefix,

    #[error("Certificate prefix '{0}' must not contain whitespace")]
    WhitespaceInPrefix(String),

    #[error("Certificate pad width {width} exceeds the maximum of {max}")]
    PadWidthTooLarge { width: usize, max: usize },
}

/// A certificate namespace: a prefix plus the zero-padding width of its sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateScheme {
    /// Namespace prefix, e.g. `SW` for spot welders
    pub prefix: String,

    /// Minimum digits in the sequence (0 = no padding)
    #[serde(default = "default_pad_width")]
    pub pad_width: usize,
}

fn default_pad_width() -> usize {
    4
}

impl CertificateScheme {
    pub fn new(prefix: impl Into<String>, pad_width: usize) -> Self {
        Self {
            prefix: prefix.into(),
            pad_width,
        }
    }

    /// Reject prefixes and widths that cannot produce usable numbers
    pub fn validate(&self) -> Result<(), CertificateError> {
        if self.prefix.is_empty() {
            return Err(CertificateError::EmptyPrefix);
        }
        if self.prefix.chars().any(char::is_whitespace) {
            return Err(CertificateError::WhitespaceInPrefix(self.prefix.clone()));
        }
        if self.pad_width > MAX_PAD_WIDTH {
            return Err(CertificateError::PadWidthTooLarge {
                width: self.pad_width,
                max: MAX_PAD_WIDTH,
            });
        }
        Ok(())
    }

    /// The number issued when no earlier certificates exist
    pub fn first(&self) -> String {
        format_certificate_number(&self.prefix, 1, self.pad_width)
    }

    /// Next number in this scheme given every number issued so far
    pub fn next<I, S>(&self, existing: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        next_certificate_number(existing, &self.prefix, self.pad_width)
    }

    /// Like [`CertificateScheme::next`], but falls back to the first number
    /// when the existing numbers could not be read.
    ///
    /// Record creation must not fail because the numbering source did.
    pub fn next_or_first<I, S, E>(&self, existing: Result<I, E>) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        E: std::fmt::Display,
    {
        match existing {
            Ok(numbers) => self.next(numbers),
            Err(e) => {
                let fallback = self.first();
                tracing::warn!(
                    prefix = %self.prefix,
                    error = %e,
                    fallback = %fallback,
                    "existing certificate numbers unavailable, using first number"
                );
                fallback
            }
        }
    }

    /// True if `number` belongs to this scheme's namespace
    pub fn owns(&self, number: &str) -> bool {
        sequence_of(number, &self.prefix).is_some()
    }
}

impl std::fmt::Display for CertificateScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let zeros = "0".repeat(self.pad_width.saturating_sub(1));
        write!(f, "{}-{}N", self.prefix, zeros)
    }
}

/// Next certificate number for `prefix`, one past the highest valid sequence in `existing`
///
/// Entries under other prefixes and entries whose suffix is not a plain
/// non-negative integer are ignored.
pub fn next_certificate_number<I, S>(existing: I, prefix: &str, pad_width: usize) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let next = existing
        .into_iter()
        .filter_map(|n| sequence_of(n.as_ref(), prefix))
        .max()
        .map_or(1, |max| max.saturating_add(1));

    format_certificate_number(prefix, next, pad_width)
}

/// Format `prefix-sequence` with the sequence zero-padded to `pad_width`
///
/// Widths above [`MAX_PAD_WIDTH`] are capped.
pub fn format_certificate_number(prefix: &str, sequence: u64, pad_width: usize) -> String {
    let width = pad_width.min(MAX_PAD_WIDTH);
    format!("{}-{:0width$}", prefix, sequence, width = width)
}

/// Numeric sequence of `number` within `prefix`, if it is well formed
pub fn sequence_of(number: &str, prefix: &str) -> Option<u64> {
    let suffix = number.strip_prefix(prefix)?.strip_prefix('-')?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

/// Certificate numbers that appear more than once, with how often each occurs
pub fn find_duplicates<I, S>(numbers: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for n in numbers {
        *counts.entry(n.as_ref().to_string()).or_default() += 1;
    }
    counts.into_iter().filter(|(_, c)| *c > 1).collect()
}

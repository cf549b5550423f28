//! `eqt check` command - Record consistency checks

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::commands::utils::open_project;
use crate::cli::output::{effective_format, print_rows};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::certificate::find_duplicates;
use crate::core::retest::format_display_date;
use crate::core::store::RecordStore;

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Treat warnings as failures
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct Issue {
    #[tabled(rename = "SEVERITY")]
    pub severity: Severity,
    #[tabled(rename = "RECORD")]
    pub record: String,
    #[tabled(rename = "PROBLEM")]
    pub message: String,
}

impl Issue {
    fn error(record: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            record: record.into(),
            message: message.into(),
        }
    }

    fn warning(record: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            record: record.into(),
            message: message.into(),
        }
    }
}

pub fn run(args: CheckArgs, global: &GlobalOpts) -> Result<()> {
    let (project, config) = open_project()?;
    let store = RecordStore::new(&project);
    let loaded = store.load_all().into_diagnostic()?;
    let today = global.today();
    let policy = &config.retest;

    let mut issues = Vec::new();

    for unreadable in &loaded.unreadable {
        let name = unreadable
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        issues.push(Issue::error(name, format!("unreadable: {}", unreadable.error)));
    }

    let numbers: Vec<&str> = loaded.certificate_numbers().collect();
    for (number, count) in find_duplicates(&numbers) {
        issues.push(Issue::error(
            number,
            format!("certificate number used by {} records", count),
        ));
    }

    for (record, _) in &loaded.records {
        let label = record.certificate_number().to_string();

        match record.retest_date {
            None => issues.push(Issue::warning(&label, "no retest date")),
            Some(retest) if retest < record.service_date => issues.push(Issue::error(
                &label,
                format!(
                    "retest date {} is before service date {}",
                    format_display_date(Some(retest)),
                    format_display_date(Some(record.service_date))
                ),
            )),
            Some(_) => {
                if let Some(expected) = record.retest_drift(policy) {
                    issues.push(Issue::error(
                        &label,
                        format!(
                            "retest date {} does not follow service date (expected {})",
                            format_display_date(record.retest_date),
                            format_display_date(Some(expected))
                        ),
                    ));
                }
            }
        }

        if let Some(cached) = record.stale_cached_status(today, policy) {
            issues.push(Issue::warning(
                &label,
                format!(
                    "stored status '{}' differs from derived status '{}'",
                    cached,
                    record.status_on(today, policy)
                ),
            ));
        }

        if !config.engineers.is_authorized(&record.engineer) {
            issues.push(Issue::warning(
                &label,
                format!("engineer '{}' is not on the roster", record.engineer),
            ));
        }
    }

    issues.sort_by(|a, b| {
        a.severity
            .cmp(&b.severity)
            .then_with(|| a.record.cmp(&b.record))
    });

    let errors = issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .count();
    let warnings = issues.len() - errors;
    tracing::debug!(errors, warnings, "check finished");

    let format = effective_format(global.format, true);
    match format {
        OutputFormat::Table if issues.is_empty() => {
            println!(
                "{} {} record(s) checked, no problems found",
                style("✓").green(),
                loaded.records.len() + loaded.unreadable.len()
            );
        }
        OutputFormat::Table => {
            print_rows(&issues, format)?;
            println!();
            println!(
                "{} error(s), {} warning(s)",
                style(errors).red(),
                style(warnings).yellow()
            );
        }
        OutputFormat::Id => {
            for issue in &issues {
                println!("{}", issue.record);
            }
        }
        other => print_rows(&issues, other)?,
    }

    if errors > 0 || (args.strict && warnings > 0) {
        return Err(miette::miette!(
            "Check failed: {} error(s), {} warning(s)",
            errors,
            warnings
        ));
    }

    Ok(())
}

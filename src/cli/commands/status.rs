//! `eqt status` command - Dashboard counts

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::commands::utils::open_project;
use crate::cli::filters::KindArg;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::aggregate::{summarize, RetestField, RetestSource, StatusSummary};
use crate::core::store::RecordStore;
use crate::entities::equipment::EquipmentKind;

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Only count equipment of this kind
    #[arg(long, short = 'k')]
    pub kind: Option<KindArg>,
}

#[derive(Debug, Serialize)]
struct StatusReport {
    date: String,
    #[serde(flatten)]
    summary: StatusSummary,
    total: usize,
}

pub fn run(args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let (project, config) = open_project()?;
    let store = RecordStore::new(&project);
    let loaded = store.load_all().into_diagnostic()?;
    let today = global.today();

    let summary = match args.kind.map(EquipmentKind::from) {
        // Unreadable files have no trustworthy kind, so a kind filter leaves them out
        Some(kind) => {
            let fields: Vec<RetestField> = loaded
                .records
                .iter()
                .filter(|(r, _)| r.equipment.kind == kind)
                .map(|(r, _)| r.retest_field())
                .collect();
            summarize(fields, today, &config.retest)
        }
        None => summarize(loaded.retest_fields(), today, &config.retest),
    };

    let report = StatusReport {
        date: today.to_string(),
        total: summary.counts.total(),
        summary,
    };

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&report).into_diagnostic()?);
        }
        _ => print_dashboard(&report, config.retest.upcoming_window_days),
    }

    Ok(())
}

fn print_dashboard(report: &StatusReport, window_days: i64) {
    let counts = &report.summary.counts;

    println!("{}", style(format!("Equipment status as of {}", report.date)).bold());
    println!("{}", style("─".repeat(40)).dim());
    println!(
        "  {:<10} {:>6}   {}",
        style("Valid").green(),
        counts.valid,
        style(format!("retest more than {} days away", window_days)).dim()
    );
    println!(
        "  {:<10} {:>6}   {}",
        style("Upcoming").yellow(),
        counts.upcoming,
        style(format!("retest within {} days", window_days)).dim()
    );
    println!(
        "  {:<10} {:>6}   {}",
        style("Invalid").red(),
        counts.invalid,
        style("retest overdue or not set").dim()
    );
    println!("{}", style("─".repeat(40)).dim());
    println!("  {:<10} {:>6}", style("Total").bold(), report.total);

    if report.summary.skipped > 0 {
        println!();
        println!(
            "{} {} record(s) with an unreadable retest date were not counted. Run {} for details",
            style("!").yellow(),
            report.summary.skipped,
            style("eqt check").cyan()
        );
    }
}

//! `eqt svc` command - Service record management

use chrono::NaiveDate;
use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::args::parse_date_arg;
use crate::cli::commands::utils::open_project;
use crate::cli::filters::{KindArg, StatusFilter};
use crate::cli::helpers::{describe_days, format_short_id, styled_status, truncate_str};
use crate::cli::output::{effective_format, print_rows};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::certificate::find_duplicates;
use crate::core::config::Config;
use crate::core::entity::ServiceStatus;
use crate::core::retest::{days_until, format_display_date, RetestPolicy};
use crate::core::store::RecordStore;
use crate::entities::equipment::{Equipment, EquipmentKind};
use crate::entities::service_record::ServiceRecord;

#[derive(Subcommand, Debug)]
pub enum SvcCommands {
    /// Record a service and issue its certificate number
    New(NewArgs),

    /// List service records with derived status
    List(ListArgs),

    /// Show a service record's details
    Show(ShowArgs),

    /// Change the service date (the retest date follows it)
    SetServiceDate(SetDateArgs),

    /// Set the retest date by hand (requires retest.mode: manual)
    SetRetestDate(SetDateArgs),

    /// Drop a manual retest date and reschedule from the service date
    ClearOverride(IdArgs),

    /// Rewrite cached status fields with the derived status
    RefreshStatus,

    /// Open a service record in your editor
    Edit(IdArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Equipment kind
    #[arg(long, short = 'k')]
    pub kind: KindArg,

    /// Equipment serial number
    #[arg(long, short = 's')]
    pub serial: String,

    /// Engineer who performed the service (must be on the roster)
    #[arg(long, short = 'e', env = "EQT_ENGINEER")]
    pub engineer: String,

    /// Date the service was performed (YYYY-MM-DD)
    #[arg(long, short = 'd', value_parser = parse_date_arg)]
    pub service_date: NaiveDate,

    /// Retest date set by hand (requires retest.mode: manual)
    #[arg(long, value_parser = parse_date_arg)]
    pub retest_date: Option<NaiveDate>,

    /// Customer company
    #[arg(long, short = 'c')]
    pub customer: Option<String>,

    /// Equipment description
    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub manufacturer: Option<String>,

    #[arg(long)]
    pub model: Option<String>,

    /// Location at the customer site
    #[arg(long)]
    pub location: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by derived status
    #[arg(long, short = 's', default_value = "all")]
    pub status: StatusFilter,

    /// Filter by equipment kind
    #[arg(long, short = 'k')]
    pub kind: Option<KindArg>,

    /// Filter by customer (case-insensitive substring)
    #[arg(long, short = 'c')]
    pub customer: Option<String>,

    /// Filter by engineer (case-insensitive substring)
    #[arg(long, short = 'e')]
    pub engineer: Option<String>,

    /// Limit output to N items
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show count only, not the items
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Record ID (or prefix) or certificate number
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct IdArgs {
    /// Record ID (or prefix) or certificate number
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct SetDateArgs {
    /// Record ID (or prefix) or certificate number
    pub id: String,

    /// New date (YYYY-MM-DD)
    #[arg(value_parser = parse_date_arg)]
    pub date: NaiveDate,
}

/// One line of `svc list` output
#[derive(Debug, Serialize, Tabled)]
pub struct RecordRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "CERTIFICATE")]
    pub certificate: String,
    #[tabled(rename = "KIND")]
    pub kind: String,
    #[tabled(rename = "EQUIPMENT")]
    pub equipment: String,
    #[tabled(rename = "CUSTOMER")]
    pub customer: String,
    #[tabled(rename = "SERVICED")]
    pub service_date: String,
    #[tabled(rename = "RETEST")]
    pub retest_date: String,
    #[tabled(rename = "DAYS")]
    pub days: String,
    #[tabled(rename = "STATUS")]
    pub status: ServiceStatus,
}

impl RecordRow {
    fn new(record: &ServiceRecord, today: NaiveDate, policy: &RetestPolicy) -> Self {
        Self {
            id: record.id.to_string(),
            certificate: record.certificate_number().to_string(),
            kind: record.equipment.kind.to_string(),
            equipment: truncate_str(&record.equipment.label(), 32),
            customer: record.customer.clone().unwrap_or_default(),
            service_date: format_display_date(Some(record.service_date)),
            retest_date: format_display_date(record.retest_date),
            days: record
                .retest_date
                .map(|r| days_until(r, today).to_string())
                .unwrap_or_default(),
            status: record.status_on(today, policy),
        }
    }
}

pub fn run(cmd: SvcCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        SvcCommands::New(args) => run_new(args, global),
        SvcCommands::List(args) => run_list(args, global),
        SvcCommands::Show(args) => run_show(args, global),
        SvcCommands::SetServiceDate(args) => run_set_service_date(args, global),
        SvcCommands::SetRetestDate(args) => run_set_retest_date(args, global),
        SvcCommands::ClearOverride(args) => run_clear_override(args, global),
        SvcCommands::RefreshStatus => run_refresh_status(global),
        SvcCommands::Edit(args) => run_edit(args),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let (project, config) = open_project()?;
    let store = RecordStore::new(&project);

    let engineer = config
        .engineers
        .validate(&args.engineer)
        .map_err(|e| miette::miette!("{}", e))?
        .to_string();

    let kind = EquipmentKind::from(args.kind);
    let equipment = Equipment {
        kind,
        serial_number: args.serial,
        description: args.description,
        manufacturer: args.manufacturer,
        model: args.model,
        location: args.location,
    };

    let scheme = config.certificates.scheme_for(kind);
    let certificate = scheme.next_or_first(store.certificate_numbers());

    let mut record = ServiceRecord::new(
        certificate,
        equipment,
        engineer,
        args.service_date,
        &config.retest,
        config.author(),
    );
    if let Some(retest) = args.retest_date {
        record = record
            .with_retest_date(retest, &config.retest)
            .map_err(|e| miette::miette!("{}", e))?;
    }
    record.customer = args.customer;
    record.notes = args.notes;

    let path = store.save(&record).into_diagnostic()?;
    tracing::info!(id = %record.id, certificate = record.certificate_number(), "created service record");

    if global.format == OutputFormat::Id {
        println!("{}", record.id);
        return Ok(());
    }

    println!(
        "{} Created service record {} ({})",
        style("✓").green(),
        style(record.certificate_number()).cyan(),
        format_short_id(&record.id)
    );
    println!("   {}", style(path.display()).dim());
    println!(
        "   Retest due {} ({})",
        style(format_display_date(record.retest_date)).yellow(),
        styled_status(record.status_on(global.today(), &config.retest))
    );

    // Another record may have taken the same number concurrently
    if let Ok(numbers) = store.certificate_numbers() {
        let clash = find_duplicates(&numbers)
            .into_iter()
            .any(|(n, _)| n == record.certificate_number());
        if clash {
            println!(
                "{} Certificate number {} is also used by another record. Run {} to review",
                style("!").yellow(),
                record.certificate_number(),
                style("eqt check").cyan()
            );
        }
    }

    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (project, config) = open_project()?;
    let store = RecordStore::new(&project);
    let loaded = store.load_all().into_diagnostic()?;
    let today = global.today();

    let kind = args.kind.map(EquipmentKind::from);
    let customer = args.customer.as_deref().map(str::to_lowercase);
    let engineer = args.engineer.as_deref().map(str::to_lowercase);

    let mut records: Vec<&ServiceRecord> = loaded
        .records
        .iter()
        .map(|(r, _)| r)
        .filter(|r| args.status.matches(r.status_on(today, &config.retest)))
        .filter(|r| kind.map_or(true, |k| r.equipment.kind == k))
        .filter(|r| {
            customer.as_ref().map_or(true, |c| {
                r.customer
                    .as_deref()
                    .is_some_and(|rc| rc.to_lowercase().contains(c.as_str()))
            })
        })
        .filter(|r| {
            engineer
                .as_ref()
                .map_or(true, |e| r.engineer.to_lowercase().contains(e.as_str()))
        })
        .collect();

    // Most urgent first; records without a retest date lead
    records.sort_by(|a, b| {
        a.retest_date
            .cmp(&b.retest_date)
            .then_with(|| a.certificate_number().cmp(b.certificate_number()))
    });

    if let Some(limit) = args.limit {
        records.truncate(limit);
    }

    if args.count {
        println!("{}", records.len());
        return Ok(());
    }

    let format = effective_format(global.format, true);
    if format == OutputFormat::Id {
        for r in &records {
            println!("{}", r.id);
        }
        return Ok(());
    }

    if records.is_empty() && format == OutputFormat::Table {
        println!("No service records found.");
        println!();
        println!("Create one with: {}", style("eqt svc new").yellow());
        return Ok(());
    }

    let rows: Vec<RecordRow> = records
        .iter()
        .map(|r| RecordRow::new(r, today, &config.retest))
        .collect();
    print_rows(&rows, format)?;

    if format == OutputFormat::Table {
        println!();
        println!("{} service record(s) found", style(rows.len()).cyan());
        if !loaded.unreadable.is_empty() {
            println!(
                "{} {} record file(s) could not be parsed. Run {} for details",
                style("!").yellow(),
                loaded.unreadable.len(),
                style("eqt check").cyan()
            );
        }
    }

    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let (project, config) = open_project()?;
    let store = RecordStore::new(&project);
    let (record, path) = store.find(&args.id).into_diagnostic()?;
    let today = global.today();
    let policy = &config.retest;

    match global.format {
        OutputFormat::Yaml => {
            let content = std::fs::read_to_string(&path).into_diagnostic()?;
            print!("{}", content);
            return Ok(());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&record).into_diagnostic()?);
            return Ok(());
        }
        OutputFormat::Id => {
            println!("{}", record.id);
            return Ok(());
        }
        _ => {}
    }

    let status = record.status_on(today, policy);

    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("ID").bold(), style(&record.id.to_string()).cyan());
    println!(
        "{}: {}",
        style("Certificate").bold(),
        style(record.certificate_number()).yellow()
    );
    println!("{}: {}", style("Equipment").bold(), record.equipment.label());
    println!("{}: {}", style("Kind").bold(), record.equipment.kind);
    if let Some(ref m) = record.equipment.manufacturer {
        println!("{}: {}", style("Manufacturer").bold(), m);
    }
    if let Some(ref m) = record.equipment.model {
        println!("{}: {}", style("Model").bold(), m);
    }
    if let Some(ref l) = record.equipment.location {
        println!("{}: {}", style("Location").bold(), l);
    }
    if let Some(ref c) = record.customer {
        println!("{}: {}", style("Customer").bold(), c);
    }
    println!("{}: {}", style("Engineer").bold(), record.engineer);
    println!("{}", style("─".repeat(60)).dim());
    println!(
        "{}: {}",
        style("Service date").bold(),
        format_display_date(Some(record.service_date))
    );
    let retest_note = match record.retest_date {
        Some(r) => format!(" ({})", describe_days(days_until(r, today))),
        None => String::new(),
    };
    println!(
        "{}: {}{}{}",
        style("Retest date").bold(),
        format_display_date(record.retest_date),
        retest_note,
        if record.retest_override {
            style(" [manual]").dim().to_string()
        } else {
            String::new()
        }
    );
    println!("{}: {}", style("Status").bold(), styled_status(status));

    if let Some(cached) = record.stale_cached_status(today, policy) {
        println!(
            "{} Stored status '{}' is out of date. Run {} to rewrite it",
            style("!").yellow(),
            cached,
            style("eqt svc refresh-status").cyan()
        );
    }
    if let Some(expected) = record.retest_drift(policy) {
        println!(
            "{} Retest date does not follow the service date (expected {})",
            style("!").yellow(),
            format_display_date(Some(expected))
        );
    }

    if let Some(ref notes) = record.notes {
        println!();
        println!("{}", notes);
    }

    println!("{}", style("─".repeat(60)).dim());
    println!(
        "{}: {} | {}: {} | {}: {}",
        style("Author").dim(),
        record.author,
        style("Created").dim(),
        record.created.format("%Y-%m-%d %H:%M"),
        style("Revision").dim(),
        record.entity_revision
    );

    Ok(())
}

fn run_set_service_date(args: SetDateArgs, global: &GlobalOpts) -> Result<()> {
    let (project, config) = open_project()?;
    let store = RecordStore::new(&project);
    let (mut record, _) = store.find(&args.id).into_diagnostic()?;

    let previous = record.retest_date;
    record.set_service_date(args.date, &config.retest);
    store.save(&record).into_diagnostic()?;

    println!(
        "{} Service date of {} set to {}",
        style("✓").green(),
        style(record.certificate_number()).cyan(),
        format_display_date(Some(record.service_date))
    );
    if record.retest_date != previous {
        println!(
            "   Retest rescheduled {} → {}",
            format_display_date(previous),
            style(format_display_date(record.retest_date)).yellow()
        );
    } else if record.retest_override {
        println!("   Manual retest date kept");
    }
    print_status_line(&record, &config, global);
    Ok(())
}

fn run_set_retest_date(args: SetDateArgs, global: &GlobalOpts) -> Result<()> {
    let (project, config) = open_project()?;
    let store = RecordStore::new(&project);
    let (mut record, _) = store.find(&args.id).into_diagnostic()?;

    record
        .override_retest_date(args.date, &config.retest)
        .map_err(|e| miette::miette!("{}", e))?;
    store.save(&record).into_diagnostic()?;

    println!(
        "{} Retest date of {} set to {}",
        style("✓").green(),
        style(record.certificate_number()).cyan(),
        format_display_date(record.retest_date)
    );
    print_status_line(&record, &config, global);
    Ok(())
}

fn run_clear_override(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let (project, config) = open_project()?;
    let store = RecordStore::new(&project);
    let (mut record, _) = store.find(&args.id).into_diagnostic()?;

    record.clear_override(&config.retest);
    store.save(&record).into_diagnostic()?;

    println!(
        "{} Retest date of {} rescheduled to {}",
        style("✓").green(),
        style(record.certificate_number()).cyan(),
        format_display_date(record.retest_date)
    );
    print_status_line(&record, &config, global);
    Ok(())
}

fn run_refresh_status(global: &GlobalOpts) -> Result<()> {
    let (project, config) = open_project()?;
    let store = RecordStore::new(&project);
    let loaded = store.load_all().into_diagnostic()?;
    let today = global.today();

    let mut refreshed = 0;
    for (mut record, _) in loaded.records {
        // Only records that already carry a cached status are touched
        if record.status.is_some() && record.refresh_cached_status(today, &config.retest) {
            store.save(&record).into_diagnostic()?;
            refreshed += 1;
        }
    }

    println!(
        "{} Refreshed {} cached status field(s)",
        style("✓").green(),
        style(refreshed).cyan()
    );
    Ok(())
}

fn run_edit(args: IdArgs) -> Result<()> {
    let (project, config) = open_project()?;
    let store = RecordStore::new(&project);
    let (record, path) = store.find(&args.id).into_diagnostic()?;

    let editor = config.editor();
    println!(
        "Opening {} in {}...",
        style(record.certificate_number()).cyan(),
        style(&editor).yellow()
    );

    let status = std::process::Command::new(&editor)
        .arg(&path)
        .status()
        .into_diagnostic()?;
    if !status.success() {
        return Err(miette::miette!(
            help = "The record file was left as the editor wrote it",
            "Editor '{}' failed ({})",
            editor,
            status
        ));
    }

    // Hand edits can move the retest date away from the service date
    let edited: ServiceRecord =
        crate::yaml::parse_yaml_file(&path).map_err(miette::Report::new)?;
    if let Some(expected) = edited.retest_drift(&config.retest) {
        println!(
            "{} Retest date no longer follows the service date (expected {})",
            style("!").yellow(),
            format_display_date(Some(expected))
        );
    }
    if edited.certificate_number() != record.certificate_number() {
        println!(
            "{} Certificate number changed from {} to {}. Certificate numbers should not change once issued",
            style("!").yellow(),
            record.certificate_number(),
            edited.certificate_number()
        );
    }

    Ok(())
}

fn print_status_line(record: &ServiceRecord, config: &Config, global: &GlobalOpts) {
    let status = record.status_on(global.today(), &config.retest);
    println!("   Status: {}", styled_status(status));
}

//! `eqt cert` command - Certificate numbering

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::commands::utils::open_project;
use crate::cli::filters::KindArg;
use crate::cli::output::{effective_format, print_rows};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::certificate::{find_duplicates, CertificateScheme};
use crate::core::store::RecordStore;
use crate::entities::equipment::EquipmentKind;

#[derive(Subcommand, Debug)]
pub enum CertCommands {
    /// Preview the next certificate number without issuing it
    Next(NextArgs),

    /// List the numbering scheme of each equipment kind
    Schemes,
}

#[derive(clap::Args, Debug)]
pub struct NextArgs {
    /// Equipment kind whose scheme to use
    #[arg(long, short = 'k', conflicts_with = "prefix")]
    pub kind: Option<KindArg>,

    /// Use an ad-hoc prefix instead of a configured scheme
    #[arg(long, short = 'p')]
    pub prefix: Option<String>,

    /// Zero-padding width for --prefix
    #[arg(long, short = 'w', default_value_t = 4, requires = "prefix")]
    pub width: usize,
}

#[derive(Debug, Serialize, Tabled)]
struct SchemeRow {
    #[tabled(rename = "KIND")]
    kind: String,
    #[tabled(rename = "PREFIX")]
    prefix: String,
    #[tabled(rename = "WIDTH")]
    pad_width: usize,
    #[tabled(rename = "ISSUED")]
    issued: usize,
    #[tabled(rename = "NEXT")]
    next: String,
}

pub fn run(cmd: CertCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CertCommands::Next(args) => run_next(args),
        CertCommands::Schemes => run_schemes(global),
    }
}

fn run_next(args: NextArgs) -> Result<()> {
    let (project, config) = open_project()?;
    let store = RecordStore::new(&project);

    let scheme = match (args.prefix, args.kind) {
        (Some(prefix), _) => {
            let scheme = CertificateScheme::new(prefix.trim(), args.width);
            scheme.validate().map_err(|e| miette::miette!("{}", e))?;
            scheme
        }
        (None, Some(kind)) => config
            .certificates
            .scheme_for(EquipmentKind::from(kind))
            .clone(),
        (None, None) => {
            return Err(miette::miette!(
                help = "e.g. eqt cert next --kind spot-welder",
                "Specify --kind or --prefix"
            ))
        }
    };

    println!("{}", scheme.next_or_first(store.certificate_numbers()));
    Ok(())
}

fn run_schemes(global: &GlobalOpts) -> Result<()> {
    let (project, config) = open_project()?;
    let store = RecordStore::new(&project);
    let numbers = store.certificate_numbers().into_diagnostic()?;

    let rows: Vec<SchemeRow> = EquipmentKind::all()
        .into_iter()
        .map(|kind| {
            let scheme = config.certificates.scheme_for(kind);
            SchemeRow {
                kind: kind.to_string(),
                prefix: scheme.prefix.clone(),
                pad_width: scheme.pad_width,
                issued: numbers.iter().filter(|n| scheme.owns(n)).count(),
                next: scheme.next(&numbers),
            }
        })
        .collect();

    let format = effective_format(global.format, true);
    if format == OutputFormat::Id {
        for row in &rows {
            println!("{}", row.next);
        }
        return Ok(());
    }
    print_rows(&rows, format)?;

    let duplicates = find_duplicates(&numbers);
    if !duplicates.is_empty() && format == OutputFormat::Table {
        println!();
        println!(
            "{} {} certificate number(s) are used more than once. Run {} for details",
            style("!").yellow(),
            duplicates.len(),
            style("eqt check").cyan()
        );
    }

    Ok(())
}

use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use equiptrak::cli::commands;
use equiptrak::cli::{Cli, Commands};

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let global = &cli.global;
    match cli.command {
        Commands::Init(args) => commands::init::run(args),
        Commands::Svc(cmd) => commands::svc::run(cmd, global),
        Commands::Status(args) => commands::status::run(args, global),
        Commands::Cert(cmd) => commands::cert::run(cmd, global),
        Commands::Check(args) => commands::check::run(args, global),
        Commands::Completions(args) => commands::completions::run(args),
    }
}

/// Logs go to stderr; `EQT_LOG` overrides the `-v` level
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("EQT_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("equiptrak={default_level},eqt={default_level}")));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

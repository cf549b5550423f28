//! `eqt init` command - create a project

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::core::project::{Project, ProjectError};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg()]
    pub path: Option<std::path::PathBuf>,
}

pub fn run(args: InitArgs) -> Result<()> {
    let root = match args.path {
        Some(p) => p,
        None => std::env::current_dir().into_diagnostic()?,
    };

    match Project::init(&root) {
        Ok(project) => {
            println!(
                "{} Initialized EquipTrak project in {}",
                style("✓").green(),
                style(project.root().display()).cyan()
            );
            println!("   Edit {} to set the engineer roster", style(".eqt/config.yaml").yellow());
            Ok(())
        }
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} Project already exists at {}",
                style("!").yellow(),
                path.display()
            );
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}

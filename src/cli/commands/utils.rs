//! Shared utilities for CLI commands

use miette::Result;

use crate::core::config::Config;
use crate::core::project::Project;

/// Discover the current project and load its configuration
pub fn open_project() -> Result<(Project, Config)> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let config = Config::load(&project).map_err(|e| miette::miette!("{}", e))?;
    tracing::debug!(
        root = %project.root().display(),
        mode = %config.retest.mode,
        engineers = config.engineers.names().len(),
        "opened project"
    );
    Ok((project, config))
}

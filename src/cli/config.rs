use crate::config::resolve::{find_project_config, find_user_config, resolve_config, CliOverrides};
use crate::errors::{RestcError, Result};
use clap::{Args, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Show resolved configuration with provenance
    Show {
        /// Project directory (defaults to current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Print where config files are looked up
    Paths {
        /// Project directory (defaults to current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

pub fn run(args: &ConfigArgs) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    match &args.action {
        ConfigAction::Show { path } => {
            let project_dir = project_dir(path.as_deref())?;
            let config = resolve_config(&project_dir, &CliOverrides::default())?;
            crate::config::show::render_show(&mut stdout, &config)?;
        }
        ConfigAction::Paths { path } => {
            let project_dir = project_dir(path.as_deref())?;
            let user = find_user_config();
            let project = find_project_config(&project_dir);
            writeln!(stdout, "user:    {}", describe(user.as_deref()))?;
            writeln!(stdout, "project: {}", describe(project.as_deref()))?;
        }
    }
    Ok(())
}

fn describe(path: Option<&Path>) -> String {
    match path {
        Some(path) if path.exists() => path.display().to_string(),
        Some(path) => format!("{} (not present)", path.display()),
        None => "(none)".to_string(),
    }
}

fn project_dir(path: Option<&Path>) -> Result<PathBuf> {
    let path = path.unwrap_or(Path::new("."));
    path.canonicalize()
        .map_err(|_| RestcError::Config(format!("Invalid path: {}", path.display())))
}

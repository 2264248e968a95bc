pub mod analyze;
pub mod config;
pub mod generate;

use crate::config::ResolvedConfig;
use crate::definition::AnalysisOptions;
use crate::errors::{RestcError, Result};
use crate::parse::go::read_go_mod;
use crate::resolver::QualifiedIdent;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(
    name = "restc",
    version,
    about = "REST API definition extractor for annotated Go projects"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Extract the API definitions of a Go project
    Analyze(analyze::AnalyzeArgs),
    /// Extract the API definitions and pass them to a generator plugin
    Generate(generate::GenerateArgs),
    /// Inspect resolved configuration
    Config(config::ConfigArgs),
}

/// Dispatch to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze(args) => analyze::run(&args),
        Commands::Generate(args) => generate::run(&args),
        Commands::Config(args) => config::run(&args),
    }
}

/// Analysis flags shared by `analyze` and `generate`.
#[derive(Debug, Clone, Args)]
pub struct AnalysisArgs {
    /// Project root (defaults to the current directory)
    pub path: Option<PathBuf>,

    /// Go module path; read from go.mod when omitted
    #[arg(long)]
    pub module: Option<String>,

    /// Include glob patterns, relative to the project root
    #[arg(long)]
    pub include: Vec<String>,

    /// Exclude glob patterns, relative to the project root
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Scan *_test.go files too
    #[arg(long)]
    pub include_tests: bool,

    /// Request context type as "<package path> <name>"
    #[arg(long)]
    pub context_type: Option<String>,
}

impl AnalysisArgs {
    /// Canonical project root.
    pub fn root(&self) -> Result<PathBuf> {
        let path = self.path.clone().unwrap_or_else(|| PathBuf::from("."));
        path.canonicalize()
            .map_err(|_| RestcError::NoFiles { path: path.clone() })
    }
}

/// Build analysis inputs from resolved configuration.
pub fn analysis_options(root: &Path, config: &ResolvedConfig) -> Result<AnalysisOptions> {
    let module = match &config.module {
        Some(module) => module.clone(),
        None => read_go_mod(root)?,
    };
    let context_type = config
        .context_type
        .parse::<QualifiedIdent>()
        .map_err(|e| RestcError::Config(format!("invalid context type: {e}")))?;

    Ok(AnalysisOptions {
        project_root: root.to_path_buf(),
        module,
        include: config.include.clone(),
        exclude: config.exclude.clone(),
        include_tests: config.include_tests,
        context_type,
    })
}

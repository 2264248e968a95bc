use crate::cli::{analysis_options, AnalysisArgs};
use crate::config::resolve::{resolve_config, CliOverrides};
use crate::definition::analyze;
use crate::errors::{RestcError, Result};
use crate::output::OutputFormat;
use clap::Args;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub analysis: AnalysisArgs,

    /// Output format
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Write the document to FILE instead of stdout
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl AnalyzeArgs {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            module: self.analysis.module.clone(),
            include: self.analysis.include.clone(),
            exclude: self.analysis.exclude.clone(),
            include_tests: self.analysis.include_tests,
            context_type: self.analysis.context_type.clone(),
            format: self.format,
            ..Default::default()
        }
    }
}

pub fn run(args: &AnalyzeArgs) -> Result<()> {
    let start = Instant::now();
    let root = args.analysis.root()?;
    let config = resolve_config(&root, &args.overrides())?;
    let format = config
        .format
        .parse::<OutputFormat>()
        .map_err(RestcError::Config)?;

    let options = analysis_options(&root, &config)?;
    let definitions = analyze(&options)?;

    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout().lock()),
    };
    match format {
        OutputFormat::Json => {
            crate::output::json::write_definitions_json(&mut writer, &definitions)?
        }
        OutputFormat::Text => {
            crate::output::text::write_definitions_text(&mut writer, &definitions, &root)?
        }
    }
    writer.flush()?;

    tracing::info!(
        controllers = definitions.controllers.len(),
        types = definitions.types.len(),
        responders = definitions.responders.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "wrote definitions"
    );
    Ok(())
}

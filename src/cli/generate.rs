use crate::cli::{analysis_options, AnalysisArgs};
use crate::config::resolve::{resolve_config, CliOverrides};
use crate::definition::analyze;
use crate::errors::{RestcError, Result};
use crate::plugin::{run_plugin, Plugin};
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub analysis: AnalysisArgs,

    /// Generator plugin; runs `restc-<NAME>` from PATH
    #[arg(long, value_name = "NAME")]
    pub plugin: Option<String>,

    /// Treat the plugin as a shell command line
    #[arg(long)]
    pub shell: bool,

    /// Directory the plugin writes into (defaults to the project root)
    #[arg(long, short = 'o', value_name = "DIR")]
    pub output: Option<PathBuf>,
}

impl GenerateArgs {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            module: self.analysis.module.clone(),
            include: self.analysis.include.clone(),
            exclude: self.analysis.exclude.clone(),
            include_tests: self.analysis.include_tests,
            context_type: self.analysis.context_type.clone(),
            plugin: self.plugin.clone(),
            shell: self.shell,
            output: self.output.clone(),
            ..Default::default()
        }
    }
}

pub fn run(args: &GenerateArgs) -> Result<()> {
    let root = args.analysis.root()?;
    let config = resolve_config(&root, &args.overrides())?;

    let Some(name) = config.generate.plugin.as_deref() else {
        return Err(RestcError::Config(
            "no generator plugin configured; pass --plugin or set `generate.plugin`".to_string(),
        ));
    };
    let plugin = Plugin::new(name, config.generate.shell);

    let options = analysis_options(&root, &config)?;
    let definitions = analyze(&options)?;

    // CLI paths are relative to the invocation directory; config paths are
    // already anchored at their file.
    let output = match (&args.output, &config.generate.output) {
        (Some(path), _) => std::env::current_dir()?.join(path),
        (None, Some(path)) => path.clone(),
        (None, None) => root.clone(),
    };

    run_plugin(&plugin, &definitions, &root, &output)
}

use clap::Parser;
use miette::Result;
use restc::cli;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Warnings about ignored annotations are shown unless RUST_LOG says otherwise.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();
    cli::dispatch(cli).map_err(miette::Report::new)?;
    Ok(())
}

//! Hand-off of the definitions document to an external generator.
//!
//! A plugin receives the JSON document on stdin and the absolute output
//! directory in `RESTC_OUTPUT`. It runs with the project root as its working
//! directory and inherits stdout and stderr.

use crate::definition::Definitions;
use crate::errors::{RestcError, Result};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

pub const PLUGIN_PREFIX: &str = "restc-";
pub const OUTPUT_ENV: &str = "RESTC_OUTPUT";

/// How a generator is launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plugin {
    /// `restc-<name>` looked up on `PATH`.
    Executable(String),
    /// A command line run through `sh -c`.
    Shell(String),
}

impl Plugin {
    pub fn new(name: &str, shell: bool) -> Self {
        if shell {
            Plugin::Shell(name.to_string())
        } else {
            Plugin::Executable(name.to_string())
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Plugin::Executable(name) | Plugin::Shell(name) => name,
        }
    }

    fn command(&self) -> Command {
        match self {
            Plugin::Executable(name) => Command::new(format!("{PLUGIN_PREFIX}{name}")),
            Plugin::Shell(script) => {
                let mut command = Command::new("sh");
                command.arg("-c").arg(script);
                command
            }
        }
    }
}

/// Run `plugin` over `definitions`, writing into `output_dir`.
pub fn run_plugin(
    plugin: &Plugin,
    definitions: &Definitions,
    project_root: &Path,
    output_dir: &Path,
) -> Result<()> {
    let output_dir = absolute(project_root, output_dir);
    let payload = serde_json::to_vec(definitions)?;

    let mut command = plugin.command();
    command
        .current_dir(project_root)
        .env(OUTPUT_ENV, &output_dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    tracing::info!(
        plugin = plugin.name(),
        output = %output_dir.display(),
        bytes = payload.len(),
        "running generator plugin"
    );

    let mut child = command.spawn().map_err(|e| RestcError::Plugin {
        plugin: plugin.name().to_string(),
        message: match (e.kind(), plugin) {
            (ErrorKind::NotFound, Plugin::Executable(name)) => {
                format!("`{PLUGIN_PREFIX}{name}` was not found on PATH")
            }
            _ => format!("could not start: {e}"),
        },
    })?;

    if let Some(mut stdin) = child.stdin.take() {
        match stdin.write_all(&payload) {
            Ok(()) => {}
            // Plugins may exit without reading their input.
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                tracing::debug!(plugin = plugin.name(), "plugin closed stdin early");
            }
            Err(e) => return Err(e.into()),
        }
    }

    let status = child.wait()?;
    if !status.success() {
        return Err(RestcError::Plugin {
            plugin: plugin.name().to_string(),
            message: match status.code() {
                Some(code) => format!("exited with status {code}"),
                None => "terminated by a signal".to_string(),
            },
        });
    }

    tracing::info!(plugin = plugin.name(), "generator plugin finished");
    Ok(())
}

fn absolute(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

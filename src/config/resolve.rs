use crate::config::provenance::{ProvenanceMap, Source};
use crate::config::schema::FileConfig;
use crate::config::{ResolvedConfig, ResolvedGenerateConfig};
use crate::definition::builder::DEFAULT_CONTEXT_TYPE;
use crate::errors::{RestcError, Result};
use crate::output::OutputFormat;
use std::path::{Path, PathBuf};

pub const PROJECT_CONFIG_FILE: &str = ".restc.toml";

/// CLI overrides extracted from command arguments.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub module: Option<String>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub include_tests: bool,
    pub context_type: Option<String>,
    pub format: Option<OutputFormat>,
    pub plugin: Option<String>,
    pub shell: bool,
    pub output: Option<PathBuf>,
}

/// Resolve configuration by applying layers bottom-up:
/// 1. Built-in defaults
/// 2. User config (~/.config/restc/config.toml)
/// 3. Project config (nearest .restc.toml walking up from working_dir)
/// 4. Environment variables
/// 5. CLI overrides
pub fn resolve_config(working_dir: &Path, cli: &CliOverrides) -> Result<ResolvedConfig> {
    resolve_config_with_user(working_dir, cli, find_user_config().as_deref())
}

/// [`resolve_config`] with an explicit user config location.
pub fn resolve_config_with_user(
    working_dir: &Path,
    cli: &CliOverrides,
    user_config: Option<&Path>,
) -> Result<ResolvedConfig> {
    let mut prov = ProvenanceMap::new();
    let mut loaded_files = Vec::new();

    let mut config = ResolvedConfig {
        module: None,
        include: Vec::new(),
        exclude: Vec::new(),
        include_tests: false,
        context_type: DEFAULT_CONTEXT_TYPE.to_string(),
        format: OutputFormat::default().to_string(),
        generate: ResolvedGenerateConfig::default(),
        provenance: ProvenanceMap::new(),
        loaded_files: Vec::new(),
    };

    set_all_default_provenance(&mut prov);

    if let Some(path) = user_config.filter(|p| p.exists()) {
        let file_config = load_file(path, "user")?;
        apply_file_config(
            &mut config,
            &file_config,
            Source::UserConfig(path.to_path_buf()),
            &mut prov,
        );
        loaded_files.push(path.to_path_buf());
    }

    if let Some(path) = find_project_config(working_dir) {
        let file_config = load_file(&path, "project")?;
        apply_file_config(
            &mut config,
            &file_config,
            Source::ProjectConfig(path.clone()),
            &mut prov,
        );
        loaded_files.push(path);
    }

    apply_env_vars(&mut config, &mut prov);
    apply_cli_overrides(&mut config, cli, &mut prov);

    config.provenance = prov;
    config.loaded_files = loaded_files;

    tracing::debug!(files = config.loaded_files.len(), "resolved configuration");
    Ok(config)
}

fn load_file(path: &Path, kind: &str) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path).map_err(|_| {
        RestcError::Config(format!("Could not read {kind} config: {}", path.display()))
    })?;
    FileConfig::from_toml(&content).map_err(|e| {
        RestcError::Config(format!("Invalid {kind} config {}: {e}", path.display()))
    })
}

/// Location of the per-user config file, whether or not it exists.
pub fn find_user_config() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("restc").join("config.toml"))
}

/// Nearest `.restc.toml` at or above `start`.
pub fn find_project_config(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let config_path = dir.join(PROJECT_CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

fn set_all_default_provenance(prov: &mut ProvenanceMap) {
    let defaults = [
        "analysis.module",
        "analysis.include",
        "analysis.exclude",
        "analysis.include_tests",
        "analysis.context_type",
        "output.format",
        "generate.plugin",
        "generate.shell",
        "generate.output",
    ];
    for key in defaults {
        prov.set(key, Source::Default);
    }
}

fn apply_file_config(
    config: &mut ResolvedConfig,
    file: &FileConfig,
    source: Source,
    prov: &mut ProvenanceMap,
) {
    if let Some(ref module) = file.analysis.module {
        config.module = Some(module.clone());
        prov.set("analysis.module", source.clone());
    }
    if !file.analysis.include.is_empty() {
        config.include = file.analysis.include.clone();
        prov.set("analysis.include", source.clone());
    }
    if !file.analysis.exclude.is_empty() {
        config.exclude = file.analysis.exclude.clone();
        prov.set("analysis.exclude", source.clone());
    }
    if let Some(include_tests) = file.analysis.include_tests {
        config.include_tests = include_tests;
        prov.set("analysis.include_tests", source.clone());
    }
    if let Some(ref context_type) = file.analysis.context_type {
        config.context_type = context_type.clone();
        prov.set("analysis.context_type", source.clone());
    }

    if let Some(ref format) = file.output.format {
        config.format = format.clone();
        prov.set("output.format", source.clone());
    }

    if let Some(ref plugin) = file.generate.plugin {
        config.generate.plugin = Some(plugin.clone());
        prov.set("generate.plugin", source.clone());
    }
    if let Some(shell) = file.generate.shell {
        config.generate.shell = shell;
        prov.set("generate.shell", source.clone());
    }
    if let Some(ref output) = file.generate.output {
        // Relative to the file that names it.
        let base = match &source {
            Source::UserConfig(path) | Source::ProjectConfig(path) => path.parent(),
            _ => None,
        };
        let output = match base {
            Some(base) if output.is_relative() => base.join(output),
            _ => output.clone(),
        };
        config.generate.output = Some(output);
        prov.set("generate.output", source);
    }
}

fn is_truthy(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}

fn split_list(val: &str) -> Vec<String> {
    val.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn apply_env_vars(config: &mut ResolvedConfig, prov: &mut ProvenanceMap) {
    if let Ok(val) = std::env::var("RESTC_MODULE") {
        config.module = Some(val);
        prov.set("analysis.module", Source::EnvVar("RESTC_MODULE".into()));
    }
    if let Ok(val) = std::env::var("RESTC_INCLUDE") {
        config.include = split_list(&val);
        prov.set("analysis.include", Source::EnvVar("RESTC_INCLUDE".into()));
    }
    if let Ok(val) = std::env::var("RESTC_EXCLUDE") {
        config.exclude = split_list(&val);
        prov.set("analysis.exclude", Source::EnvVar("RESTC_EXCLUDE".into()));
    }
    if let Ok(val) = std::env::var("RESTC_INCLUDE_TESTS") {
        config.include_tests = is_truthy(&val);
        prov.set(
            "analysis.include_tests",
            Source::EnvVar("RESTC_INCLUDE_TESTS".into()),
        );
    }
    if let Ok(val) = std::env::var("RESTC_CONTEXT_TYPE") {
        config.context_type = val;
        prov.set(
            "analysis.context_type",
            Source::EnvVar("RESTC_CONTEXT_TYPE".into()),
        );
    }
    if let Ok(val) = std::env::var("RESTC_FORMAT") {
        config.format = val;
        prov.set("output.format", Source::EnvVar("RESTC_FORMAT".into()));
    }
    if let Ok(val) = std::env::var("RESTC_PLUGIN") {
        config.generate.plugin = Some(val);
        prov.set("generate.plugin", Source::EnvVar("RESTC_PLUGIN".into()));
    }
}

fn apply_cli_overrides(config: &mut ResolvedConfig, cli: &CliOverrides, prov: &mut ProvenanceMap) {
    if let Some(ref module) = cli.module {
        config.module = Some(module.clone());
        prov.set("analysis.module", Source::CliFlag("--module".into()));
    }
    if !cli.include.is_empty() {
        config.include = cli.include.clone();
        prov.set("analysis.include", Source::CliFlag("--include".into()));
    }
    if !cli.exclude.is_empty() {
        config.exclude = cli.exclude.clone();
        prov.set("analysis.exclude", Source::CliFlag("--exclude".into()));
    }
    if cli.include_tests {
        config.include_tests = true;
        prov.set(
            "analysis.include_tests",
            Source::CliFlag("--include-tests".into()),
        );
    }
    if let Some(ref context_type) = cli.context_type {
        config.context_type = context_type.clone();
        prov.set(
            "analysis.context_type",
            Source::CliFlag("--context-type".into()),
        );
    }
    if let Some(format) = cli.format {
        config.format = format.to_string();
        prov.set("output.format", Source::CliFlag("--format".into()));
    }
    if let Some(ref plugin) = cli.plugin {
        config.generate.plugin = Some(plugin.clone());
        prov.set("generate.plugin", Source::CliFlag("--plugin".into()));
    }
    if cli.shell {
        config.generate.shell = true;
        prov.set("generate.shell", Source::CliFlag("--shell".into()));
    }
    if let Some(ref output) = cli.output {
        config.generate.output = Some(output.clone());
        prov.set("generate.output", Source::CliFlag("--output".into()));
    }
}

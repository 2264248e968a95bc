use crate::config::ResolvedConfig;
use std::io::Write;

/// Render `config show` output.
pub fn render_show<W: Write>(w: &mut W, config: &ResolvedConfig) -> std::io::Result<()> {
    if config.loaded_files.is_empty() {
        writeln!(w, "Loaded config files: (none)")?;
    } else {
        writeln!(w, "Loaded config files:")?;
        for (i, path) in config.loaded_files.iter().enumerate() {
            writeln!(w, "  {}. {}", i + 1, path.display())?;
        }
    }
    writeln!(w)?;

    writeln!(w, "Resolved settings:")?;
    for (key, source) in config.provenance.sorted_entries() {
        let value = get_value_for_key(config, key);
        writeln!(w, "  {}: {} <- {}", key, value, source)?;
    }

    Ok(())
}

fn get_value_for_key(config: &ResolvedConfig, key: &str) -> String {
    match key {
        "analysis.module" => config
            .module
            .clone()
            .unwrap_or_else(|| "(from go.mod)".to_string()),
        "analysis.include" => format!("{:?}", config.include),
        "analysis.exclude" => format!("{:?}", config.exclude),
        "analysis.include_tests" => config.include_tests.to_string(),
        "analysis.context_type" => config.context_type.clone(),
        "output.format" => config.format.clone(),
        "generate.plugin" => config
            .generate
            .plugin
            .clone()
            .unwrap_or_else(|| "(none)".to_string()),
        "generate.shell" => config.generate.shell.to_string(),
        "generate.output" => config
            .generate
            .output
            .as_ref()
            .map_or("(project root)".to_string(), |p| p.display().to_string()),
        _ => "(unknown)".to_string(),
    }
}

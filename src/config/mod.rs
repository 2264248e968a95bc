pub mod provenance;
pub mod resolve;
pub mod schema;
pub mod show;

use provenance::ProvenanceMap;
use std::path::PathBuf;

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    // Analysis
    /// Module path override; `None` means read it from go.mod.
    pub module: Option<String>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub include_tests: bool,
    pub context_type: String,

    // Output
    pub format: String,

    // Generation
    pub generate: ResolvedGenerateConfig,

    // Provenance
    pub provenance: ProvenanceMap,
    pub loaded_files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct ResolvedGenerateConfig {
    pub plugin: Option<String>,
    pub shell: bool,
    pub output: Option<PathBuf>,
}

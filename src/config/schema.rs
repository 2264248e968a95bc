use serde::Deserialize;
use std::path::PathBuf;

/// TOML-deserializable config file. All fields are Option for layered merging.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub analysis: AnalysisFileConfig,
    #[serde(default)]
    pub output: OutputFileConfig,
    #[serde(default)]
    pub generate: GenerateFileConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct AnalysisFileConfig {
    pub module: Option<String>,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    pub include_tests: Option<bool>,
    pub context_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct OutputFileConfig {
    pub format: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct GenerateFileConfig {
    pub plugin: Option<String>,
    pub shell: Option<bool>,
    pub output: Option<PathBuf>,
}

impl FileConfig {
    /// Load from a TOML string.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}

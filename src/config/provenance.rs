use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Layer a configuration value was taken from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Default,
    UserConfig(PathBuf),
    ProjectConfig(PathBuf),
    EnvVar(String),
    CliFlag(String),
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Default => write!(f, "default"),
            Source::UserConfig(path) => write!(f, "user config ({})", path.display()),
            Source::ProjectConfig(path) => write!(f, "project config ({})", path.display()),
            Source::EnvVar(name) => write!(f, "env var ({name})"),
            Source::CliFlag(name) => write!(f, "CLI flag ({name})"),
        }
    }
}

/// Source of each resolved setting, keyed by `section.key`.
#[derive(Debug, Clone, Default)]
pub struct ProvenanceMap {
    entries: BTreeMap<String, Source>,
}

impl ProvenanceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `source` for `key`, replacing the layer below it.
    pub fn set(&mut self, key: impl Into<String>, source: Source) {
        self.entries.insert(key.into(), source);
    }

    pub fn get(&self, key: &str) -> Option<&Source> {
        self.entries.get(key)
    }

    pub fn sorted_entries(&self) -> Vec<(&str, &Source)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v)).collect()
    }
}

pub mod json;
pub mod text;

use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Default, Clone, Copy, ValueEnum, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Text => f.write_str("text"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <OutputFormat as ValueEnum>::from_str(s, true)
            .map_err(|_| format!("unknown output format: {s} (expected json or text)"))
    }
}

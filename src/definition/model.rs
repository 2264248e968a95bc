use crate::parse::Annotations;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The complete API description handed to rendering backends.
///
/// Map keys are ordered lexically; `imports` is ordered by package path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Definitions {
    pub imports: Vec<String>,
    pub types: BTreeMap<String, TypeSchema>,
    pub responders: BTreeMap<String, Responder>,
    pub controllers: BTreeMap<String, Controller>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeSchema {
    pub name: String,
    pub alias: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

/// Shape of a record type, in the JSON-schema vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Schema>>,
}

impl Schema {
    pub fn of_kind(kind: &str) -> Self {
        Self {
            kind: Some(kind.to_string()),
            ..Self::default()
        }
    }

    pub fn reference(identifier: impl Into<String>) -> Self {
        Self {
            reference: Some(identifier.into()),
            ..Self::default()
        }
    }

    pub fn array(items: Schema) -> Self {
        Self {
            kind: Some("array".to_string()),
            items: Some(Box::new(items)),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Responder {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub responses: Vec<Response>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub name: String,
    pub annotations: Annotations,
    pub status: String,
    pub params: Vec<Parameter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub source: ParameterSource,
    #[serde(rename = "type")]
    pub ty: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
}

/// Where a handler parameter's value comes from at request time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterSource {
    Context,
    Responder,
    Header,
    Path,
    Query,
    Body,
}

impl ParameterSource {
    pub const ALL: [ParameterSource; 6] = [
        ParameterSource::Context,
        ParameterSource::Responder,
        ParameterSource::Header,
        ParameterSource::Path,
        ParameterSource::Query,
        ParameterSource::Body,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterSource::Context => "Context",
            ParameterSource::Responder => "Responder",
            ParameterSource::Header => "Header",
            ParameterSource::Path => "Path",
            ParameterSource::Query => "Query",
            ParameterSource::Body => "Body",
        }
    }
}

impl FromStr for ParameterSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ParameterSource::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| format!("unknown parameter source: {s}"))
    }
}

impl fmt::Display for ParameterSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Controller {
    pub package: String,
    pub file: String,
    pub name: String,
    pub alias: String,
    pub base: String,
    pub resources: BTreeMap<String, Resource>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub package: String,
    /// Bare file name; `package` holds the directory.
    pub file: String,
    pub name: String,
    pub method: String,
    pub path: String,
    pub params: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

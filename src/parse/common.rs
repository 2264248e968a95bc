use crate::parse::ast::ImportSpec;
use std::collections::BTreeMap;
use std::path::Path;

/// Predeclared Go types. These are never resolved against a package.
const PRIMITIVES: &[&str] = &[
    "bool",
    "string",
    "int",
    "int8",
    "int16",
    "int32",
    "int64",
    "uint",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "uintptr",
    "rune",
    "byte",
    "float32",
    "float64",
    "complex64",
    "complex128",
    "error",
    "any",
];

/// Check if a bare type name is a predeclared Go type.
pub fn is_primitive(name: &str) -> bool {
    PRIMITIVES.contains(&name)
}

/// Check if a Go file is a test file.
pub fn is_go_test_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name.ends_with("_test.go"))
}

/// Package name Go assumes for an unnamed import: the last path element,
/// skipping a `/vN` major-version suffix and trimming a gopkg.in `.vN`.
pub fn default_import_name(path: &str) -> &str {
    let mut segments = path.rsplit('/');
    let last = segments.next().unwrap_or(path);
    let name = if is_major_version(last) {
        segments.next().unwrap_or(last)
    } else {
        last
    };
    match name.rsplit_once('.') {
        Some((base, version)) if !base.is_empty() && is_major_version(version) => base,
        _ => name,
    }
}

fn is_major_version(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

/// Per-file mapping from import alias to import path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportTable {
    aliases: BTreeMap<String, String>,
}

impl ImportTable {
    pub fn from_specs(specs: &[ImportSpec]) -> Self {
        let aliases = specs
            .iter()
            .map(|spec| {
                let alias = match &spec.name {
                    Some(name) => name.clone(),
                    None => default_import_name(&spec.path).to_string(),
                };
                (alias, spec.path.clone())
            })
            .collect();
        Self { aliases }
    }

    pub fn get(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

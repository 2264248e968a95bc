//! `@Tag argument` annotations embedded in documentation comments.

use crate::parse::ast::CommentGroup;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tag name (including the leading `@`) to its arguments, one entry per
/// occurrence in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Annotations {
    tags: BTreeMap<String, Vec<String>>,
}

impl Annotations {
    /// Parse the annotations of an optional documentation block.
    pub fn parse(doc: Option<&CommentGroup>) -> Self {
        let mut annotations = Self::default();
        let Some(doc) = doc else {
            return annotations;
        };

        for raw in &doc.lines {
            for line in comment_lines(raw) {
                if !line.starts_with('@') {
                    continue;
                }
                let (tag, argument) = match line.split_once(char::is_whitespace) {
                    Some((tag, rest)) => (tag, rest.trim()),
                    None => (line, ""),
                };
                annotations
                    .tags
                    .entry(tag.to_string())
                    .or_default()
                    .push(argument.to_string());
            }
        }

        annotations
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains_key(tag)
    }

    /// All arguments of `tag`, empty when the tag is absent.
    pub fn get(&self, tag: &str) -> &[String] {
        self.tags.get(tag).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn first(&self, tag: &str) -> Option<&str> {
        self.get(tag).first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }
}

/// Strip comment markers from one raw comment, yielding its trimmed lines.
fn comment_lines(raw: &str) -> Vec<&str> {
    if let Some(rest) = raw.strip_prefix("//") {
        return vec![rest.trim()];
    }
    let Some(body) = raw.strip_prefix("/*") else {
        return vec![raw.trim()];
    };
    let body = body.strip_suffix("*/").unwrap_or(body);
    body.lines()
        .map(|line| {
            let line = line.trim();
            line.strip_prefix('*').map(str::trim).unwrap_or(line)
        })
        .collect()
}

/// Split `text` on whitespace into at most `n` fields; the last field keeps
/// the remainder verbatim (trimmed).
pub fn split_fields(text: &str, n: usize) -> Vec<&str> {
    let mut fields = Vec::with_capacity(n);
    let mut rest = text.trim();
    while !rest.is_empty() {
        if fields.len() + 1 == n {
            fields.push(rest);
            break;
        }
        match rest.find(char::is_whitespace) {
            Some(idx) => {
                fields.push(&rest[..idx]);
                rest = rest[idx..].trim_start();
            }
            None => {
                fields.push(rest);
                break;
            }
        }
    }
    fields
}

//! Schemas for record types reachable from handler signatures.

use crate::definition::builder::DefinitionBuilder;
use crate::definition::model::{Schema, TypeSchema};
use crate::errors::{RestcError, Result};
use crate::parse::ast::{Field, ShapeKind, TypeExpr};
use crate::resolver::{ResolvedType, TypeResolvingContext};
use indexmap::IndexMap;

impl DefinitionBuilder {
    /// Register `resolved` under its canonical identifier along with every
    /// project type its fields reference.
    pub(crate) fn register_type(&mut self, resolved: &ResolvedType) -> Result<()> {
        let ident = resolved.ident();
        let key = ident.to_string();
        if self.definitions.types.contains_key(&key) || !self.resolving.insert(ident.clone()) {
            return Ok(());
        }

        let schema = self.schema_for(&resolved.context(), &resolved.ty)?;
        tracing::debug!(identifier = %key, "registered type");

        self.definitions.types.insert(
            key,
            TypeSchema {
                name: resolved.name.clone(),
                alias: String::new(),
                schema: Some(schema),
            },
        );
        self.resolving.remove(&ident);
        Ok(())
    }

    fn schema_for(&mut self, ctx: &TypeResolvingContext, expr: &TypeExpr) -> Result<Schema> {
        match expr {
            TypeExpr::Struct(fields) => self.struct_schema(ctx, fields),
            TypeExpr::Pointer(inner) => self.schema_for(ctx, inner),
            TypeExpr::Slice(inner) | TypeExpr::Array(inner) => {
                // encoding/json writes byte slices as base64 strings
                if matches!(inner.as_ref(), TypeExpr::Ident(name) if name == "byte") {
                    return Ok(Schema::of_kind("string"));
                }
                Ok(Schema::array(self.schema_for(ctx, inner)?))
            }
            TypeExpr::Map { .. } | TypeExpr::Interface(_) => Ok(Schema::of_kind("object")),
            TypeExpr::Ident(_) | TypeExpr::Qualified { .. } => self.named_schema(ctx, expr),
            TypeExpr::Other(_) => Ok(Schema::default()),
        }
    }

    fn named_schema(&mut self, ctx: &TypeResolvingContext, expr: &TypeExpr) -> Result<Schema> {
        let ident = self.resolver.resolve_identifier(ctx, expr)?;
        if ident.is_primitive() {
            return Ok(primitive_schema(&ident.name));
        }

        match self.resolver.resolve_type(&ident) {
            Ok(Some(resolved)) => {
                if resolved.shape() != ShapeKind::Contract {
                    self.register_type(&resolved)?;
                }
                Ok(Schema::reference(ident.to_string()))
            }
            Ok(None) => Err(RestcError::TypeNotFound {
                identifier: ident.to_string(),
            }),
            Err(RestcError::ExternalType { identifier }) => {
                tracing::warn!(identifier = %identifier, "field type outside module root left opaque");
                Ok(Schema::reference(identifier))
            }
            Err(e) => Err(e),
        }
    }

    fn struct_schema(&mut self, ctx: &TypeResolvingContext, fields: &[Field]) -> Result<Schema> {
        let mut properties = IndexMap::new();
        let mut required = Vec::new();

        for field in fields {
            let Some(name) = field_name(field) else {
                continue;
            };
            if !is_exported(name) {
                continue;
            }

            let tag = field.tag.as_deref().and_then(|tag| lookup_tag(tag, "json"));
            let (key, omitempty) = match tag {
                Some("-") => continue,
                Some(value) => {
                    let mut options = value.split(',');
                    let key = options.next().filter(|k| !k.is_empty()).unwrap_or(name);
                    (key.to_string(), options.any(|o| o == "omitempty"))
                }
                None => (name.to_string(), false),
            };

            let schema = self.schema_for(ctx, &field.ty)?;
            if !omitempty && !matches!(field.ty, TypeExpr::Pointer(_)) {
                required.push(key.clone());
            }
            properties.insert(key, schema);
        }

        Ok(Schema {
            kind: Some("object".to_string()),
            required,
            properties: Some(properties),
            ..Schema::default()
        })
    }
}

/// Declared name, or the type name for an embedded field.
fn field_name(field: &Field) -> Option<&str> {
    if let Some(name) = &field.name {
        return Some(name);
    }
    match field.ty.deref() {
        TypeExpr::Ident(name) | TypeExpr::Qualified { name, .. } => Some(name),
        _ => None,
    }
}

fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

pub fn primitive_schema(name: &str) -> Schema {
    match name {
        "string" => Schema::of_kind("string"),
        "bool" => Schema::of_kind("boolean"),
        "float32" | "float64" => Schema::of_kind("number"),
        "int" | "int8" | "int16" | "int32" | "int64" | "uint" | "uint8" | "uint16" | "uint32"
        | "uint64" | "uintptr" | "byte" | "rune" => Schema::of_kind("integer"),
        _ => Schema::default(),
    }
}

/// Value of `key` in a Go struct tag such as `json:"id,omitempty" db:"id"`.
pub fn lookup_tag<'a>(tag: &'a str, key: &str) -> Option<&'a str> {
    let mut rest = tag.trim_start();
    while !rest.is_empty() {
        let colon = rest.find(':')?;
        let name = &rest[..colon];
        let value = rest[colon + 1..].strip_prefix('"')?;

        let mut end = None;
        let mut escaped = false;
        for (idx, c) in value.char_indices() {
            match c {
                '\\' if !escaped => escaped = true,
                '"' if !escaped => {
                    end = Some(idx);
                    break;
                }
                _ => escaped = false,
            }
        }
        let end = end?;

        if name == key {
            return Some(&value[..end]);
        }
        rest = value[end + 1..].trim_start();
    }
    None
}

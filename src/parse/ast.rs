use std::fmt;

/// Owned syntax model of one Go source file.
///
/// Only the parts the analysis needs survive the conversion from the
/// tree-sitter CST: imports, type specs and function/method signatures.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoFile {
    pub package: String,
    pub imports: Vec<ImportSpec>,
    pub types: Vec<TypeSpec>,
    pub funcs: Vec<FuncDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Explicit import name (`foo`, `.` or `_`), if any.
    pub name: Option<String>,
    pub path: String,
}

/// Raw comment texts attached to a declaration, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentGroup {
    pub lines: Vec<String>,
}

impl CommentGroup {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub name: String,
    pub doc: Option<CommentGroup>,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub name: String,
    pub doc: Option<CommentGroup>,
    /// Receiver type for methods, `None` for plain functions.
    pub receiver: Option<TypeExpr>,
    pub params: Vec<Param>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Option<String>,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// `None` for embedded fields.
    pub name: Option<String>,
    pub ty: TypeExpr,
    /// Raw struct tag without the surrounding backquotes.
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodSpec {
    pub name: String,
    pub doc: Option<CommentGroup>,
    pub params: Vec<Param>,
}

/// One element of an interface body, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub enum InterfaceElem {
    Method(MethodSpec),
    /// Embedded interface name: `Errors`, `models.Errors`.
    Embedded(TypeExpr),
}

/// Closed set of type expression shapes the analysis distinguishes.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// Bare name: `string`, `User`.
    Ident(String),
    /// Package-qualified name: `context.Context`.
    Qualified { package: String, name: String },
    Pointer(Box<TypeExpr>),
    Slice(Box<TypeExpr>),
    Array(Box<TypeExpr>),
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    Struct(Vec<Field>),
    Interface(Vec<InterfaceElem>),
    /// Anything else (generics, channels, funcs), kept as source text.
    Other(String),
}

/// Structural shape of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Record,
    Contract,
    Other,
}

impl TypeExpr {
    pub fn shape(&self) -> ShapeKind {
        match self {
            TypeExpr::Struct(_) => ShapeKind::Record,
            TypeExpr::Interface(_) => ShapeKind::Contract,
            TypeExpr::Ident(_)
            | TypeExpr::Qualified { .. }
            | TypeExpr::Pointer(_)
            | TypeExpr::Slice(_)
            | TypeExpr::Array(_)
            | TypeExpr::Map { .. }
            | TypeExpr::Other(_) => ShapeKind::Other,
        }
    }

    /// Strip any number of pointer indirections.
    pub fn deref(&self) -> &TypeExpr {
        match self {
            TypeExpr::Pointer(inner) => inner.deref(),
            other => other,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Ident(name) => write!(f, "{name}"),
            TypeExpr::Qualified { package, name } => write!(f, "{package}.{name}"),
            TypeExpr::Pointer(inner) => write!(f, "*{inner}"),
            TypeExpr::Slice(inner) => write!(f, "[]{inner}"),
            TypeExpr::Array(inner) => write!(f, "[...]{inner}"),
            TypeExpr::Map { key, value } => write!(f, "map[{key}]{value}"),
            TypeExpr::Struct(_) => write!(f, "struct{{...}}"),
            TypeExpr::Interface(_) => write!(f, "interface{{...}}"),
            TypeExpr::Other(text) => write!(f, "{text}"),
        }
    }
}

use crate::errors::{RestcError, Result};
use crate::parse::ast::{CommentGroup, ShapeKind, TypeExpr};
use crate::parse::common::{is_primitive, ImportTable};
use crate::parse::GoParser;
use crate::walk::{package_dir, package_files};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::str::FromStr;

/// Canonical `(package path, type name)` lookup key.
///
/// Primitives carry an empty package and display as the bare name; every
/// other identifier displays as `"<package path> <name>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedIdent {
    pub package: String,
    pub name: String,
}

impl QualifiedIdent {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    pub fn primitive(name: impl Into<String>) -> Self {
        Self::new(String::new(), name)
    }

    pub fn is_primitive(&self) -> bool {
        self.package.is_empty()
    }
}

impl fmt::Display for QualifiedIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} {}", self.package, self.name)
        }
    }
}

impl FromStr for QualifiedIdent {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().split_once(' ') {
            Some((package, name)) if !package.is_empty() && !name.is_empty() => {
                Ok(Self::new(package, name))
            }
            None if !s.trim().is_empty() => Ok(Self::primitive(s.trim())),
            _ => Err(format!("invalid type identifier: {s:?}")),
        }
    }
}

/// Where an identifier is being resolved from: the current package and the
/// current file's imports.
#[derive(Debug, Clone)]
pub struct TypeResolvingContext {
    pub package_path: String,
    pub imports: ImportTable,
}

impl TypeResolvingContext {
    pub fn new(package_path: impl Into<String>, imports: ImportTable) -> Self {
        Self {
            package_path: package_path.into(),
            imports,
        }
    }
}

/// A top-level type declaration loaded from a project package.
#[derive(Debug, Clone)]
pub struct ResolvedType {
    pub package: String,
    pub file: PathBuf,
    pub name: String,
    pub doc: Option<CommentGroup>,
    pub ty: TypeExpr,
    /// Imports of the declaring file, for resolving references inside `ty`.
    pub imports: ImportTable,
}

impl ResolvedType {
    pub fn ident(&self) -> QualifiedIdent {
        QualifiedIdent::new(self.package.clone(), self.name.clone())
    }

    pub fn shape(&self) -> ShapeKind {
        self.ty.shape()
    }

    /// Context for resolving the references this declaration makes.
    pub fn context(&self) -> TypeResolvingContext {
        TypeResolvingContext::new(self.package.clone(), self.imports.clone())
    }
}

/// Outcome of a lookup, cached permanently per identifier.
#[derive(Debug, Clone)]
enum Lookup {
    Found(Rc<ResolvedType>),
    Missing,
    External,
}

/// Session-scoped type resolver.
///
/// Loading any type of a package registers every top-level type declared in
/// that package's directory in one pass, so each file is parsed at most once.
pub struct TypeResolver {
    project_root: PathBuf,
    module: String,
    include_tests: bool,
    parser: GoParser,
    cache: HashMap<QualifiedIdent, Lookup>,
    loaded_packages: HashSet<String>,
    files_parsed: usize,
}

impl TypeResolver {
    pub fn new(project_root: &Path, module: &str) -> Result<Self> {
        Ok(Self {
            project_root: project_root.to_path_buf(),
            module: module.trim_end_matches('/').to_string(),
            include_tests: false,
            parser: GoParser::new()?,
            cache: HashMap::new(),
            loaded_packages: HashSet::new(),
            files_parsed: 0,
        })
    }

    pub fn with_include_tests(mut self, include: bool) -> Self {
        self.include_tests = include;
        self
    }

    /// Number of source files parsed by this resolver so far.
    pub fn files_parsed(&self) -> usize {
        self.files_parsed
    }

    /// Number of identifiers with a cached lookup outcome.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Convert a bare or package-qualified name to its canonical identifier.
    pub fn resolve_identifier(
        &self,
        ctx: &TypeResolvingContext,
        expr: &TypeExpr,
    ) -> Result<QualifiedIdent> {
        match expr {
            TypeExpr::Ident(name) if is_primitive(name) => Ok(QualifiedIdent::primitive(name)),
            TypeExpr::Ident(name) => Ok(QualifiedIdent::new(ctx.package_path.clone(), name)),
            TypeExpr::Qualified { package, name } => {
                let path =
                    ctx.imports
                        .get(package)
                        .ok_or_else(|| RestcError::UnknownImportAlias {
                            alias: package.clone(),
                            package: ctx.package_path.clone(),
                        })?;
                Ok(QualifiedIdent::new(path, name))
            }
            other => Err(RestcError::UnsupportedTypeExpr {
                expr: other.to_string(),
                package: ctx.package_path.clone(),
            }),
        }
    }

    fn is_project_package(&self, package: &str) -> bool {
        package == self.module
            || package
                .strip_prefix(&self.module)
                .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Look up the declaration of `ident`.
    ///
    /// Returns `Ok(None)` for primitives and for project types that do not
    /// exist, and [`RestcError::ExternalType`] for packages outside the module.
    pub fn resolve_type(&mut self, ident: &QualifiedIdent) -> Result<Option<Rc<ResolvedType>>> {
        if ident.is_primitive() {
            return Ok(None);
        }

        if let Some(lookup) = self.cache.get(ident) {
            return lookup_result(ident, lookup);
        }

        if !self.is_project_package(&ident.package) {
            tracing::debug!(identifier = %ident, "type outside module root");
            self.cache.insert(ident.clone(), Lookup::External);
            return Err(RestcError::ExternalType {
                identifier: ident.to_string(),
            });
        }

        if !self.loaded_packages.contains(&ident.package) {
            self.load_package(&ident.package)?;
        }

        let lookup = self
            .cache
            .entry(ident.clone())
            .or_insert(Lookup::Missing);
        if matches!(lookup, Lookup::Missing) {
            tracing::debug!(identifier = %ident, "type not found in package");
        }
        lookup_result(ident, lookup)
    }

    /// Parse every file of `package` and register all of its type declarations.
    fn load_package(&mut self, package: &str) -> Result<()> {
        self.loaded_packages.insert(package.to_string());

        let Some(dir) = package_dir(&self.project_root, &self.module, package) else {
            return Ok(());
        };
        let files = package_files(&dir, self.include_tests)?;
        tracing::debug!(package, files = files.len(), "loading package declarations");

        for path in files {
            let file = self.parser.parse_file(&path)?;
            self.files_parsed += 1;

            let imports = ImportTable::from_specs(&file.imports);
            for spec in file.types {
                let ident = QualifiedIdent::new(package, spec.name.clone());
                let resolved = ResolvedType {
                    package: package.to_string(),
                    file: path.clone(),
                    name: spec.name,
                    doc: spec.doc,
                    ty: spec.ty,
                    imports: imports.clone(),
                };
                self.cache
                    .entry(ident)
                    .or_insert_with(|| Lookup::Found(Rc::new(resolved)));
            }
        }
        Ok(())
    }
}

fn lookup_result(ident: &QualifiedIdent, lookup: &Lookup) -> Result<Option<Rc<ResolvedType>>> {
    match lookup {
        Lookup::Found(resolved) => Ok(Some(Rc::clone(resolved))),
        Lookup::Missing => Ok(None),
        Lookup::External => Err(RestcError::ExternalType {
            identifier: ident.to_string(),
        }),
    }
}

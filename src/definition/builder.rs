use crate::definition::model::{
    Controller, Definitions, Parameter, ParameterSource, Resource, Responder, Response,
};
use crate::errors::{RestcError, Result};
use crate::parse::annotations::split_fields;
use crate::parse::ast::{FuncDecl, InterfaceElem, MethodSpec, ShapeKind, TypeExpr};
use crate::parse::Annotations;
use crate::resolver::{QualifiedIdent, ResolvedType, TypeResolver, TypeResolvingContext};
use crate::walk::{FileFilter, ScannedFile, SourceScanner};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

pub const CONTROLLER: &str = "@Controller";
pub const RESOURCE: &str = "@Resource";
pub const PARAM: &str = "@Param";
pub const STATUS: &str = "@Status";
pub const SUMMARY: &str = "@Summary";
pub const DETAILS: &str = "@Details";
pub const TAGS: &str = "@Tags";

pub const DEFAULT_STATUS: &str = "200";
pub const DEFAULT_CONTEXT_TYPE: &str = "context Context";

/// Inputs of one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub project_root: PathBuf,
    pub module: String,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub include_tests: bool,
    /// Type that marks a handler parameter as the request context.
    pub context_type: QualifiedIdent,
}

impl AnalysisOptions {
    pub fn new(project_root: impl Into<PathBuf>, module: impl Into<String>) -> Self {
        Self {
            project_root: project_root.into(),
            module: module.into(),
            include: Vec::new(),
            exclude: Vec::new(),
            include_tests: false,
            context_type: QualifiedIdent::new("context", "Context"),
        }
    }
}

/// Scan the project and build its [`Definitions`].
///
/// Every file is parsed before any declaration is analyzed, so a syntax
/// error anywhere aborts the run without partial output.
pub fn analyze(options: &AnalysisOptions) -> Result<Definitions> {
    let filter = FileFilter::new(&options.include, &options.exclude, options.include_tests)?;
    let scanner = SourceScanner::new(&options.project_root, &options.module, filter)?;
    let files = scanner.collect::<Result<Vec<_>>>()?;

    if files.is_empty() {
        tracing::warn!(root = %options.project_root.display(), "no Go source files matched");
    }

    let mut builder = DefinitionBuilder::new(options)?;
    builder.build(&files)?;

    tracing::info!(
        files = files.len(),
        resolver_files = builder.resolver().files_parsed(),
        "analysis complete"
    );

    Ok(builder.finish())
}

/// Turns scanned files into the aggregate API model.
pub struct DefinitionBuilder {
    pub(crate) context_type: QualifiedIdent,
    pub(crate) resolver: TypeResolver,
    pub(crate) definitions: Definitions,
    /// Types whose registration is in progress; never descended into twice.
    pub(crate) resolving: HashSet<QualifiedIdent>,
}

impl DefinitionBuilder {
    pub fn new(options: &AnalysisOptions) -> Result<Self> {
        let resolver = TypeResolver::new(&options.project_root, &options.module)?
            .with_include_tests(options.include_tests);
        Ok(Self {
            context_type: options.context_type.clone(),
            resolver,
            definitions: Definitions::default(),
            resolving: HashSet::new(),
        })
    }

    pub fn resolver(&self) -> &TypeResolver {
        &self.resolver
    }

    /// Controllers first across the whole tree, then their resources, so a
    /// controller and its methods may live in different files.
    pub fn build(&mut self, files: &[ScannedFile]) -> Result<()> {
        for file in files {
            self.collect_controllers(file)?;
        }
        for file in files {
            self.collect_resources(file)?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> Definitions {
        self.assign_aliases();
        self.definitions
    }

    fn collect_controllers(&mut self, file: &ScannedFile) -> Result<()> {
        for spec in &file.file.types {
            if spec.ty.shape() != ShapeKind::Record {
                continue;
            }
            let annotations = Annotations::parse(spec.doc.as_ref());
            if !annotations.contains(CONTROLLER) {
                continue;
            }

            let file_path = format!("{}/{}", file.package_path, file.file_name);
            if let Some(existing) = self.definitions.controllers.get(&spec.name) {
                return Err(RestcError::DuplicateController {
                    name: spec.name.clone(),
                    first: existing.file.clone(),
                    second: file_path,
                });
            }

            let base = annotations.first(CONTROLLER).unwrap_or_default().to_string();
            tracing::debug!(controller = %spec.name, base = %base, "found controller");

            self.definitions.controllers.insert(
                spec.name.clone(),
                Controller {
                    package: file.package_path.clone(),
                    file: file_path,
                    name: spec.name.clone(),
                    alias: String::new(),
                    base,
                    resources: BTreeMap::new(),
                },
            );
        }
        Ok(())
    }

    fn collect_resources(&mut self, file: &ScannedFile) -> Result<()> {
        let ctx = TypeResolvingContext::new(file.package_path.clone(), file.imports.clone());

        for func in &file.file.funcs {
            let annotations = Annotations::parse(func.doc.as_ref());
            let Some(argument) = annotations.first(RESOURCE) else {
                continue;
            };
            if annotations.get(RESOURCE).len() > 1 {
                tracing::warn!(func = %func.name, "multiple @Resource annotations, using the first");
            }

            let tokens: Vec<&str> = argument.split_whitespace().collect();
            let [method, path, rest @ ..] = tokens.as_slice() else {
                return Err(RestcError::MalformedResource {
                    func: func.name.clone(),
                    annotation: argument.to_string(),
                });
            };
            if !rest.is_empty() {
                tracing::warn!(func = %func.name, extra = %rest.join(" "), "ignoring extra @Resource tokens");
            }

            let receiver = receiver_name(func).unwrap_or_default();
            let owned = self
                .definitions
                .controllers
                .get(&receiver)
                .is_some_and(|c| c.package == file.package_path);
            if !owned {
                return Err(RestcError::OrphanResource {
                    func: func.name.clone(),
                    receiver,
                    package: file.package_path.clone(),
                });
            }

            let params = self.classify_params(&ctx, func, path, &annotations)?;
            let resource = Resource {
                package: file.package_path.clone(),
                file: file.file_name.clone(),
                name: func.name.clone(),
                method: method.to_string(),
                path: path.to_string(),
                params,
                summary: annotations
                    .first(SUMMARY)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
                details: details(&annotations),
                tags: tags(&annotations),
            };

            tracing::debug!(
                controller = %receiver,
                resource = %func.name,
                method = %resource.method,
                path = %resource.path,
                "found resource"
            );

            if let Some(controller) = self.definitions.controllers.get_mut(&receiver) {
                controller.resources.insert(func.name.clone(), resource);
            }
        }
        Ok(())
    }

    /// Assign each parameter its source. Later steps override earlier ones:
    /// type-based default, path placeholder, then explicit `@Param`.
    fn classify_params(
        &mut self,
        ctx: &TypeResolvingContext,
        func: &FuncDecl,
        path: &str,
        annotations: &Annotations,
    ) -> Result<Vec<Parameter>> {
        let mut params = Vec::with_capacity(func.params.len());
        for param in &func.params {
            let Some(name) = &param.name else {
                tracing::warn!(func = %func.name, ty = %param.ty, "skipping unnamed parameter");
                continue;
            };
            let ident = self.resolver.resolve_identifier(ctx, &param.ty)?;
            let source = self.classify_type(&ident)?;
            params.push(Parameter {
                source,
                ty: ident.to_string(),
                name: name.clone(),
                metadata: None,
            });
        }

        for placeholder in path_placeholders(path) {
            if let Some(param) = params.iter_mut().find(|p| p.name == placeholder) {
                param.source = ParameterSource::Path;
            }
        }

        for argument in annotations.get(PARAM) {
            let fields = split_fields(argument, 3);
            if fields.len() < 2 {
                tracing::warn!(func = %func.name, value = %argument, "incorrect @Param annotation");
                continue;
            }
            let Some(param) = params.iter_mut().find(|p| p.name == fields[0]) else {
                return Err(RestcError::UnknownParam {
                    func: func.name.clone(),
                    name: fields[0].to_string(),
                });
            };
            let Ok(source) = fields[1].parse::<ParameterSource>() else {
                tracing::warn!(func = %func.name, value = %argument, "unknown @Param source");
                continue;
            };
            param.source = source;
            if let Some(metadata) = fields.get(2) {
                param.metadata = Some(metadata.to_string());
            }
        }

        Ok(params)
    }

    fn classify_type(&mut self, ident: &QualifiedIdent) -> Result<ParameterSource> {
        if *ident == self.context_type {
            return Ok(ParameterSource::Context);
        }
        if ident.is_primitive() {
            return Ok(ParameterSource::Query);
        }

        let resolved = self.require_type(ident)?;
        match resolved.shape() {
            ShapeKind::Record => {
                self.register_type(&resolved)?;
                Ok(ParameterSource::Body)
            }
            ShapeKind::Contract => {
                self.register_responder(&resolved)?;
                Ok(ParameterSource::Responder)
            }
            ShapeKind::Other => Ok(ParameterSource::Query),
        }
    }

    pub(crate) fn require_type(
        &mut self,
        ident: &QualifiedIdent,
    ) -> Result<std::rc::Rc<ResolvedType>> {
        self.resolver
            .resolve_type(ident)?
            .ok_or_else(|| RestcError::TypeNotFound {
                identifier: ident.to_string(),
            })
    }

    fn register_responder(&mut self, resolved: &ResolvedType) -> Result<()> {
        let ident = resolved.ident();
        let key = ident.to_string();
        if self.definitions.responders.contains_key(&key) || !self.resolving.insert(ident.clone()) {
            return Ok(());
        }

        let mut methods = Vec::new();
        let mut embedded = HashSet::from([ident.clone()]);
        self.contract_methods(resolved, &mut embedded, &mut methods)?;

        let mut responses = Vec::with_capacity(methods.len());
        for (method, ctx) in &methods {
            let annotations = Annotations::parse(method.doc.as_ref());
            let status = annotations
                .first(STATUS)
                .filter(|s| !s.is_empty())
                .unwrap_or(DEFAULT_STATUS)
                .to_string();

            let mut params = Vec::with_capacity(method.params.len());
            for param in &method.params {
                let Some(name) = &param.name else {
                    tracing::warn!(
                        responder = %resolved.name,
                        response = %method.name,
                        "skipping unnamed response parameter"
                    );
                    continue;
                };
                let param_ident = self.resolver.resolve_identifier(ctx, &param.ty)?;
                if !param_ident.is_primitive() {
                    let param_type = self.require_type(&param_ident)?;
                    if param_type.shape() == ShapeKind::Record {
                        self.register_type(&param_type)?;
                    }
                }
                params.push(Parameter {
                    source: ParameterSource::Body,
                    ty: param_ident.to_string(),
                    name: name.clone(),
                    metadata: None,
                });
            }

            responses.push(Response {
                name: method.name.clone(),
                annotations,
                status,
                params,
            });
        }

        tracing::debug!(responder = %key, responses = responses.len(), "registered responder");
        self.definitions.responders.insert(
            key,
            Responder {
                name: resolved.name.clone(),
                responses,
            },
        );
        self.resolving.remove(&ident);
        Ok(())
    }

    /// Methods of a contract in declaration order, with embedded project
    /// interfaces expanded in place. Each method carries the context of the
    /// file that declares it.
    fn contract_methods(
        &mut self,
        contract: &ResolvedType,
        seen: &mut HashSet<QualifiedIdent>,
        out: &mut Vec<(MethodSpec, TypeResolvingContext)>,
    ) -> Result<()> {
        let TypeExpr::Interface(elems) = &contract.ty else {
            return Ok(());
        };
        let ctx = contract.context();
        for elem in elems {
            match elem {
                InterfaceElem::Method(method) => out.push((method.clone(), ctx.clone())),
                InterfaceElem::Embedded(ty) => {
                    let ident = self.resolver.resolve_identifier(&ctx, ty)?;
                    let embedded = if ident.is_primitive() {
                        None
                    } else {
                        Some(self.require_type(&ident)?)
                    };
                    let Some(embedded) = embedded.filter(|t| t.shape() == ShapeKind::Contract)
                    else {
                        return Err(RestcError::InvalidEmbedding {
                            contract: contract.ident().to_string(),
                            embedded: ident.to_string(),
                        });
                    };
                    if seen.insert(ident) {
                        self.contract_methods(&embedded, seen, out)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn assign_aliases(&mut self) {
        let mut packages: BTreeMap<String, String> = BTreeMap::new();

        for (key, schema) in self.definitions.types.iter_mut() {
            let Ok(ident) = key.parse::<QualifiedIdent>() else {
                continue;
            };
            let alias = package_alias(&ident.package);
            schema.alias = format!("{alias}.{}", ident.name);
            packages.insert(ident.package, alias);
        }

        for controller in self.definitions.controllers.values_mut() {
            let alias = package_alias(&controller.package);
            controller.alias = format!("{alias}.{}", controller.name);
            packages.insert(controller.package.clone(), alias);
        }

        self.definitions.imports = packages
            .iter()
            .map(|(package, alias)| format!("{alias} \"{package}\""))
            .collect();
    }
}

/// Receiver type name of a method, with pointers and type arguments removed.
fn receiver_name(func: &FuncDecl) -> Option<String> {
    match func.receiver.as_ref()?.deref() {
        TypeExpr::Ident(name) => Some(name.clone()),
        TypeExpr::Other(text) => text
            .split('[')
            .next()
            .map(|name| name.trim_start_matches('*').trim().to_string()),
        _ => None,
    }
}

/// Names of the `{name}` placeholders in a path pattern.
pub fn path_placeholders(pattern: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = pattern;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            break;
        };
        let name = &after[..end];
        if !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_') {
            names.push(name);
        }
        rest = &after[end + 1..];
    }
    names
}

/// Lowercase package path with every run of punctuation collapsed to `_`.
pub fn package_alias(package: &str) -> String {
    let mut alias = String::with_capacity(package.len());
    let mut in_separator = false;
    for c in package.chars() {
        if c.is_alphanumeric() || c == '_' {
            alias.extend(c.to_lowercase());
            in_separator = false;
        } else if !in_separator {
            alias.push('_');
            in_separator = true;
        }
    }
    alias
}

fn details(annotations: &Annotations) -> Option<String> {
    let lines: Vec<&str> = annotations
        .get(DETAILS)
        .iter()
        .map(String::as_str)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn tags(annotations: &Annotations) -> Vec<String> {
    annotations
        .get(TAGS)
        .iter()
        .flat_map(|value| value.split(|c: char| c == ',' || c.is_whitespace()))
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    const MODULE: &str = "example.com/shop";

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn run(root: &Path) -> Result<Definitions> {
        analyze(&AnalysisOptions::new(root, MODULE))
    }

    const ITEMS_CONTROLLER: &str = r#"package api

import (
	"context"

	"example.com/shop/models"
)

// ItemController manages the catalogue.
// @Controller /api
type ItemController struct{}

// Get returns a single item.
// @Resource GET /items/{id}
// @Param filter Header X-Filter
// @Summary Fetch an item
// @Tags items, catalogue
func (c *ItemController) Get(ctx context.Context, id string, filter string) error {
	return nil
}

// @Resource POST /items
// @Details Creates an item.
// @Details Fails on duplicates.
func (c *ItemController) Create(ctx context.Context, item models.Item, res models.ItemResponder) error {
	return nil
}

// Helper is not an endpoint.
func (c *ItemController) Helper() {}
"#;

    const MODELS: &str = r#"package models

type Item struct {
	ID    string `json:"id"`
	Owner *User  `json:"owner,omitempty"`
	Tags  []string
	note  string
}

type User struct {
	Name string `json:"name"`
	Items []Item `json:"-"`
}

type ItemResponder interface {
	// @Status 201
	Created(item Item)
	NotFound(message string)
}
"#;

    fn shop() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "go.mod", "module example.com/shop\n");
        write(tmp.path(), "api/items.go", ITEMS_CONTROLLER);
        write(tmp.path(), "models/models.go", MODELS);
        tmp
    }

    fn sources(params: &[Parameter]) -> Vec<(&str, ParameterSource)> {
        params.iter().map(|p| (p.name.as_str(), p.source)).collect()
    }

    #[test]
    fn explicit_param_overrides_path_and_type() {
        let tmp = shop();
        let defs = run(tmp.path()).unwrap();

        let controller = &defs.controllers["ItemController"];
        assert_eq!(controller.base, "/api");
        assert_eq!(controller.package, "example.com/shop/api");
        assert_eq!(controller.file, "example.com/shop/api/items.go");
        assert_eq!(controller.resources.len(), 2);

        let get = &controller.resources["Get"];
        assert_eq!(get.file, "items.go");
        assert_eq!(get.method, "GET");
        assert_eq!(get.path, "/items/{id}");
        assert_eq!(
            sources(&get.params),
            vec![
                ("ctx", ParameterSource::Context),
                ("id", ParameterSource::Path),
                ("filter", ParameterSource::Header),
            ]
        );
        assert_eq!(get.params[0].ty, "context Context");
        assert_eq!(get.params[2].metadata.as_deref(), Some("X-Filter"));
        assert_eq!(get.summary.as_deref(), Some("Fetch an item"));
        assert_eq!(get.tags, vec!["items", "catalogue"]);
        assert_eq!(get.details, None);
    }

    #[test]
    fn detects_body_and_responder_parameters() {
        let tmp = shop();
        let defs = run(tmp.path()).unwrap();

        let create = &defs.controllers["ItemController"].resources["Create"];
        assert_eq!(
            sources(&create.params),
            vec![
                ("ctx", ParameterSource::Context),
                ("item", ParameterSource::Body),
                ("res", ParameterSource::Responder),
            ]
        );
        assert_eq!(create.params[1].ty, "example.com/shop/models Item");
        assert_eq!(
            create.details.as_deref(),
            Some("Creates an item.\nFails on duplicates.")
        );

        assert!(defs.types.contains_key("example.com/shop/models Item"));
        // Reached through Item.Owner.
        assert!(defs.types.contains_key("example.com/shop/models User"));

        let responder = &defs.responders["example.com/shop/models ItemResponder"];
        assert_eq!(responder.name, "ItemResponder");
        assert_eq!(responder.responses.len(), 2);
        assert_eq!(responder.responses[0].name, "Created");
        assert_eq!(responder.responses[0].status, "201");
        assert_eq!(responder.responses[1].name, "NotFound");
        assert_eq!(responder.responses[1].status, DEFAULT_STATUS);
        assert_eq!(responder.responses[1].params[0].ty, "string");
        assert_eq!(
            responder.responses[0].params[0].source,
            ParameterSource::Body
        );
    }

    const EMBEDDING_CONTROLLER: &str = r#"package api

import "example.com/shop/models"

// @Controller /orders
type Orders struct{}

// @Resource POST /
func (o *Orders) Create(res OrderResponder) error {
	return nil
}

type OrderResponder interface {
	models.Errors
	// @Status 201
	Created(id string)
}
"#;

    const ERRORS: &str = r#"package models

type Errors interface {
	// @Status 404
	NotFound(message string)
	Problems
}

type Problems interface {
	// @Status 422
	Invalid(problem Problem)
}

type Problem struct {
	Field string `json:"field"`
}
"#;

    #[test]
    fn responder_expands_embedded_interfaces() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "api/orders.go", EMBEDDING_CONTROLLER);
        write(tmp.path(), "models/errors.go", ERRORS);
        let defs = run(tmp.path()).unwrap();

        let responder = &defs.responders["example.com/shop/api OrderResponder"];
        let responses: Vec<(&str, &str)> = responder
            .responses
            .iter()
            .map(|r| (r.name.as_str(), r.status.as_str()))
            .collect();
        assert_eq!(
            responses,
            vec![("NotFound", "404"), ("Invalid", "422"), ("Created", "201")]
        );
        // Resolved against the file that declares the method.
        assert_eq!(
            responder.responses[1].params[0].ty,
            "example.com/shop/models Problem"
        );
        assert!(defs.types.contains_key("example.com/shop/models Problem"));
    }

    #[test]
    fn responder_embedding_outside_project_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "api/orders.go",
            &EMBEDDING_CONTROLLER.replace("example.com/shop/models", "github.com/other/models"),
        );
        assert!(matches!(
            run(tmp.path()),
            Err(RestcError::ExternalType { .. })
        ));

        write(
            tmp.path(),
            "api/orders.go",
            &EMBEDDING_CONTROLLER.replace("models.Errors", "error"),
        );
        match run(tmp.path()) {
            Err(RestcError::InvalidEmbedding { contract, embedded }) => {
                assert_eq!(contract, "example.com/shop/api OrderResponder");
                assert_eq!(embedded, "error");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn builds_record_schemas() {
        let tmp = shop();
        let defs = run(tmp.path()).unwrap();

        let item = defs.types["example.com/shop/models Item"]
            .schema
            .as_ref()
            .unwrap();
        assert_eq!(item.kind.as_deref(), Some("object"));
        let properties = item.properties.as_ref().unwrap();
        let keys: Vec<&str> = properties.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "owner", "Tags"]);
        assert_eq!(item.required, vec!["id", "Tags"]);
        assert_eq!(
            properties["owner"].reference.as_deref(),
            Some("example.com/shop/models User")
        );
        assert_eq!(properties["Tags"].kind.as_deref(), Some("array"));

        let user = defs.types["example.com/shop/models User"]
            .schema
            .as_ref()
            .unwrap();
        let keys: Vec<&str> = user
            .properties
            .as_ref()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["name"]);
    }

    #[test]
    fn computes_aliases_and_imports() {
        let tmp = shop();
        let defs = run(tmp.path()).unwrap();

        assert_eq!(
            defs.imports,
            vec![
                "example_com_shop_api \"example.com/shop/api\"".to_string(),
                "example_com_shop_models \"example.com/shop/models\"".to_string(),
            ]
        );
        assert_eq!(
            defs.controllers["ItemController"].alias,
            "example_com_shop_api.ItemController"
        );
        assert_eq!(
            defs.types["example.com/shop/models Item"].alias,
            "example_com_shop_models.Item"
        );
    }

    #[test]
    fn mutually_recursive_records_register_once() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "api/graph.go",
            r#"package api

type A struct {
	B B
}

type B struct {
	A *A
}

// @Controller
type Graph struct{}

// @Resource POST /a
func (g *Graph) Put(a A) error { return nil }

// @Resource POST /b
func (g *Graph) PutB(b B) error { return nil }
"#,
        );

        let defs = run(tmp.path()).unwrap();
        let keys: Vec<&str> = defs.types.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["example.com/shop/api A", "example.com/shop/api B"]);

        let b = defs.types["example.com/shop/api B"].schema.as_ref().unwrap();
        assert_eq!(
            b.properties.as_ref().unwrap()["A"].reference.as_deref(),
            Some("example.com/shop/api A")
        );
        assert_eq!(defs.controllers["Graph"].base, "");
    }

    #[test]
    fn unknown_param_annotation_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "api/c.go",
            r#"package api

// @Controller
type C struct{}

// @Resource GET /x
// @Param missing Header X-Missing
func (c *C) X(id string) error { return nil }
"#,
        );

        let err = run(tmp.path()).unwrap_err();
        match err {
            RestcError::UnknownParam { func, name } => {
                assert_eq!(func, "X");
                assert_eq!(name, "missing");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn malformed_param_annotation_is_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "api/c.go",
            r#"package api

// @Controller
type C struct{}

// @Resource GET /x
// @Param id
// @Param id Cookie session
func (c *C) X(id string) error { return nil }
"#,
        );

        let defs = run(tmp.path()).unwrap();
        let x = &defs.controllers["C"].resources["X"];
        assert_eq!(x.params[0].source, ParameterSource::Query);
        assert_eq!(x.params[0].metadata, None);
    }

    #[test]
    fn malformed_resource_annotation_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "api/c.go",
            r#"package api

// @Controller
type C struct{}

// @Resource GET
func (c *C) X() error { return nil }
"#,
        );

        assert!(matches!(
            run(tmp.path()),
            Err(RestcError::MalformedResource { .. })
        ));
    }

    #[test]
    fn resource_without_controller_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "api/c.go",
            r#"package api

type Plain struct{}

// @Resource GET /x
func (p Plain) X() error { return nil }
"#,
        );

        match run(tmp.path()) {
            Err(RestcError::OrphanResource { receiver, .. }) => assert_eq!(receiver, "Plain"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn controller_and_resources_may_span_files() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "api/a_handlers.go",
            "package api\n\n// @Resource DELETE /{id}\nfunc (c *Users) Remove(id string) error { return nil }\n",
        );
        write(
            tmp.path(),
            "api/z_controller.go",
            "package api\n\n// @Controller /users\ntype Users struct{}\n",
        );

        let defs = run(tmp.path()).unwrap();
        let remove = &defs.controllers["Users"].resources["Remove"];
        assert_eq!(remove.method, "DELETE");
        assert_eq!(remove.params[0].source, ParameterSource::Path);
    }

    #[test]
    fn duplicate_controller_names_are_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "a/c.go", "package a\n\n// @Controller\ntype C struct{}\n");
        write(tmp.path(), "b/c.go", "package b\n\n// @Controller\ntype C struct{}\n");

        assert!(matches!(
            run(tmp.path()),
            Err(RestcError::DuplicateController { .. })
        ));
    }

    #[test]
    fn external_parameter_type_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "api/c.go",
            r#"package api

import "time"

// @Controller
type C struct{}

// @Resource GET /x
func (c *C) X(since time.Time) error { return nil }
"#,
        );

        match run(tmp.path()) {
            Err(RestcError::ExternalType { identifier }) => assert_eq!(identifier, "time Time"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn missing_project_type_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "api/c.go",
            "package api\n\n// @Controller\ntype C struct{}\n\n// @Resource POST /x\nfunc (c *C) X(body Ghost) error { return nil }\n",
        );

        assert!(matches!(
            run(tmp.path()),
            Err(RestcError::TypeNotFound { .. })
        ));
    }

    #[test]
    fn custom_context_type_is_recognized() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "api/c.go",
            r#"package api

import "github.com/gin-gonic/gin"

// @Controller
type C struct{}

// @Resource GET /x
func (c *C) X(ctx *gin.Context) error { return nil }

// @Resource GET /y
func (c *C) Y(ctx gin.Context, q string) error { return nil }
"#,
        );

        let mut options = AnalysisOptions::new(tmp.path(), MODULE);
        options.context_type = QualifiedIdent::new("github.com/gin-gonic/gin", "Context");

        // Pointer parameter types cannot be resolved.
        assert!(matches!(
            analyze(&options),
            Err(RestcError::UnsupportedTypeExpr { .. })
        ));

        write(
            tmp.path(),
            "api/c.go",
            r#"package api

import "github.com/gin-gonic/gin"

// @Controller
type C struct{}

// @Resource GET /y
func (c *C) Y(ctx gin.Context, q string) error { return nil }
"#,
        );
        let defs = analyze(&options).unwrap();
        assert_eq!(
            sources(&defs.controllers["C"].resources["Y"].params),
            vec![("ctx", ParameterSource::Context), ("q", ParameterSource::Query)]
        );
    }

    #[test]
    fn analysis_is_idempotent() {
        let tmp = shop();
        let first = run(tmp.path()).unwrap();
        let second = run(tmp.path()).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn resolver_parses_each_package_once() {
        let tmp = shop();
        let options = AnalysisOptions::new(tmp.path(), MODULE);
        let filter = FileFilter::new(&[], &[], false).unwrap();
        let files = SourceScanner::new(tmp.path(), MODULE, filter)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();

        let mut builder = DefinitionBuilder::new(&options).unwrap();
        builder.build(&files).unwrap();
        // Only models/models.go is loaded by the resolver.
        assert_eq!(builder.resolver().files_parsed(), 1);
    }

    #[test]
    fn empty_project_yields_empty_definitions() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(run(tmp.path()).unwrap(), Definitions::default());

        write(tmp.path(), "api/c.go", "package api

// @Controller
type C struct{}
");
        let mut options = AnalysisOptions::new(tmp.path(), MODULE);
        options.include = vec!["internal/**/*.go".into()];
        let defs = analyze(&options).unwrap();
        assert!(defs.controllers.is_empty());
        assert!(defs.imports.is_empty());
    }

    #[test]
    fn placeholder_extraction() {
        assert_eq!(
            path_placeholders("/users/{userId}/items/{item_id}"),
            vec!["userId", "item_id"]
        );
        assert_eq!(path_placeholders("/static/{}/x/{a-b}"), Vec::<&str>::new());
        assert_eq!(path_placeholders("/open/{id"), Vec::<&str>::new());
    }

    #[test]
    fn alias_normalization() {
        assert_eq!(
            package_alias("github.com/Acme/my-shop/api"),
            "github_com_acme_my_shop_api"
        );
        assert_eq!(package_alias("example.com//x..y"), "example_com_x_y");
    }
}

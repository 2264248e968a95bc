use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum RestcError {
    #[error("No Go source files found in {path}")]
    #[diagnostic(code(restc::no_files))]
    NoFiles { path: PathBuf },

    #[error("Could not determine module path: no `module` line in {path}")]
    #[diagnostic(
        code(restc::module_not_found),
        help("pass --module or set `analysis.module` in .restc.toml")
    )]
    ModuleNotFound { path: PathBuf },

    #[error("Parse error in {file}: {message}")]
    #[diagnostic(code(restc::parse_error))]
    ParseError { file: PathBuf, message: String },

    #[error("Go grammar could not be loaded: {0}")]
    #[diagnostic(code(restc::grammar))]
    Grammar(String),

    #[error("Unsupported type expression `{expr}` in package {package}")]
    #[diagnostic(
        code(restc::unsupported_type),
        help("only bare names and package-qualified names can be resolved")
    )]
    UnsupportedTypeExpr { expr: String, package: String },

    #[error("Unknown import alias `{alias}` in package {package}")]
    #[diagnostic(code(restc::unknown_import))]
    UnknownImportAlias { alias: String, package: String },

    #[error("Type `{identifier}` is declared outside the project module")]
    #[diagnostic(code(restc::external_type))]
    ExternalType { identifier: String },

    #[error("Type `{identifier}` not found")]
    #[diagnostic(code(restc::type_not_found))]
    TypeNotFound { identifier: String },

    #[error("Contract `{contract}` embeds `{embedded}`, which is not a project interface")]
    #[diagnostic(code(restc::invalid_embedding))]
    InvalidEmbedding { contract: String, embedded: String },

    #[error("Malformed @Resource annotation on {func}: `{annotation}` (expected `<METHOD> <path>`)")]
    #[diagnostic(code(restc::malformed_resource))]
    MalformedResource { func: String, annotation: String },

    #[error("Resource {func} has no matching controller `{receiver}` in package {package}")]
    #[diagnostic(code(restc::orphan_resource))]
    OrphanResource {
        func: String,
        receiver: String,
        package: String,
    },

    #[error("@Param annotation on {func} names unknown parameter `{name}`")]
    #[diagnostic(code(restc::unknown_param))]
    UnknownParam { func: String, name: String },

    #[error("Controller `{name}` declared twice: in {first} and {second}")]
    #[diagnostic(code(restc::duplicate_controller))]
    DuplicateController {
        name: String,
        first: String,
        second: String,
    },

    #[error("Generator plugin `{plugin}` failed: {message}")]
    #[diagnostic(code(restc::plugin))]
    Plugin { plugin: String, message: String },

    #[error("Configuration error: {0}")]
    #[diagnostic(code(restc::config))]
    Config(String),

    #[error(transparent)]
    #[diagnostic(code(restc::io))]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(code(restc::walk))]
    Walk(#[from] walkdir::Error),

    #[error(transparent)]
    #[diagnostic(code(restc::json))]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    #[diagnostic(code(restc::glob))]
    Glob(#[from] globset::Error),
}

pub type Result<T> = std::result::Result<T, RestcError>;

pub mod builder;
pub mod model;
pub mod schema;

pub use builder::{analyze, AnalysisOptions, DefinitionBuilder};
pub use model::{
    Controller, Definitions, Parameter, ParameterSource, Resource, Responder, Response, Schema,
    TypeSchema,
};

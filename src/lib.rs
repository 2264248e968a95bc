//! Extracts a REST API description from a Go project whose handlers are
//! marked with `@Controller`, `@Resource` and related comment annotations.
//!
//! The result is a [`definition::Definitions`] document that generator
//! plugins turn into routing code.

pub mod cli;
pub mod config;
pub mod definition;
pub mod errors;
pub mod output;
pub mod parse;
pub mod plugin;
pub mod resolver;
pub mod walk;

pub use definition::{analyze, AnalysisOptions, Definitions};
pub use errors::{RestcError, Result};

pub mod annotations;
pub mod ast;
pub mod common;
pub mod go;

pub use annotations::Annotations;
pub use ast::{CommentGroup, GoFile, ShapeKind, TypeExpr};
pub use common::{is_primitive, ImportTable};
pub use go::GoParser;

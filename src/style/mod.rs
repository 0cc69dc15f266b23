//! A small Stylus-like preprocessor: parser, evaluation pass and native
//! import lookup.

pub mod ast;
pub mod error;
pub mod eval;
pub mod lookup;
pub mod parser;

pub use ast::{Expr, ImportKeyword, ImportNode, Node, Position, Stylesheet};
pub use error::{CompileError, ParseError};
pub use eval::{
    eval_expr, eval_target, Block, CompileOptions, Evaluator, ImportHandler, NativeImports, Scope,
    Target,
};
pub use parser::parse;

pub mod ast;
pub mod codegen;
pub mod cli;

pub use ast::AstNode;
pub use codegen::{compile, CompileError, CompileFailure, Compiler};
pub use cli::{Cli, CliHandler};

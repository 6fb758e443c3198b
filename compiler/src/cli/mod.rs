//! Command line front end for monkey-lang.
//!
//! Syntax trees are read as JSON (see [`crate::ast::AstNode`]).

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use monkey::bytecode::{disassemble, Bytecode};
use monkey::runtime::RuntimeConfig;
use monkey::utils::write_bytecode;
use monkey::{Runtime, Value};
use tracing::info;

use crate::ast::AstNode;
use crate::codegen::compile;

/// monkey-lang - compile Monkey syntax trees to bytecode and run them
#[derive(Parser, Debug)]
#[command(name = "monkey-lang")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a syntax tree into a bytecode file
    Compile {
        /// JSON syntax tree
        input: PathBuf,

        /// Output path (defaults to the input with a .mnk extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compile a syntax tree and execute it
    Run {
        /// JSON syntax tree
        input: PathBuf,

        /// Log every executed instruction
        #[arg(long)]
        trace: bool,
    },

    /// Print the compiled instructions and constant pool
    Disasm {
        /// JSON syntax tree
        input: PathBuf,
    },
}

#[derive(Debug, Default)]
pub struct CliHandler;

impl CliHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, cli: Cli) -> Result<()> {
        match cli.command {
            Commands::Compile { input, output } => {
                let written = self.compile_file(&input, output)?;
                println!("Wrote {}", written.display());
            }
            Commands::Run { input, trace } => {
                let result = self.run_file(&input, trace)?;
                println!("{}", result);
            }
            Commands::Disasm { input } => {
                print!("{}", self.disassemble_file(&input)?);
            }
        }
        Ok(())
    }

    /// Compile `input` and write the bytecode file, returning its path
    pub fn compile_file(&self, input: &Path, output: Option<PathBuf>) -> Result<PathBuf> {
        let bytecode = self.compile_ast_file(input)?;
        let output = output.unwrap_or_else(|| input.with_extension("mnk"));
        write_bytecode(&bytecode, &output)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        info!(path = %output.display(), bytes = bytecode.instructions.len(), "Wrote bytecode");
        Ok(output)
    }

    pub fn run_file(&self, input: &Path, trace: bool) -> Result<Value> {
        let bytecode = self.compile_ast_file(input)?;
        let runtime = Runtime::with_config(RuntimeConfig::new().with_stack_trace(trace))?;
        Ok(runtime.execute(Arc::new(bytecode))?)
    }

    pub fn disassemble_file(&self, input: &Path) -> Result<String> {
        let bytecode = self.compile_ast_file(input)?;
        let mut output = disassemble(&bytecode.instructions);
        if !bytecode.constants.is_empty() {
            output.push_str("\nConstants:\n");
            for (index, constant) in bytecode.constants.iter().enumerate() {
                writeln!(output, "{:04} {} {}", index, constant.type_name(), constant)?;
            }
        }
        Ok(output)
    }

    fn compile_ast_file(&self, input: &Path) -> Result<Bytecode> {
        let ast = load_ast(input)?;
        Ok(compile(&ast)?)
    }
}

/// Read a JSON syntax tree from disk
pub fn load_ast(path: &Path) -> Result<AstNode> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&source)
        .with_context(|| format!("Invalid syntax tree in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_ast(dir: &TempDir, name: &str, ast: &AstNode) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, serde_json::to_string(ast).unwrap()).unwrap();
        path
    }

    fn sum_program() -> AstNode {
        AstNode::program(vec![
            AstNode::let_statement("x", AstNode::Integer(40)),
            AstNode::statement(AstNode::infix(AstNode::identifier("x"), "+", AstNode::Integer(2))),
        ])
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["monkey-lang", "compile", "tree.json", "-o", "out.mnk"]).unwrap();
        match cli.command {
            Commands::Compile { input, output } => {
                assert_eq!(input, PathBuf::from("tree.json"));
                assert_eq!(output, Some(PathBuf::from("out.mnk")));
            }
            other => panic!("Expected compile, got {:?}", other),
        }

        let cli = Cli::try_parse_from(["monkey-lang", "run", "tree.json", "--trace"]).unwrap();
        assert!(matches!(cli.command, Commands::Run { trace: true, .. }));

        assert!(Cli::try_parse_from(["monkey-lang"]).is_err());
    }

    #[test]
    fn test_run_file() {
        let dir = TempDir::new().unwrap();
        let path = write_ast(&dir, "sum.json", &sum_program());

        let result = CliHandler::new().run_file(&path, false).unwrap();
        assert_eq!(result, Value::Integer(42));
    }

    #[test]
    fn test_compile_file_default_output() {
        let dir = TempDir::new().unwrap();
        let path = write_ast(&dir, "sum.json", &sum_program());

        let written = CliHandler::new().compile_file(&path, None).unwrap();
        assert_eq!(written, dir.path().join("sum.mnk"));

        let result = Runtime::new().unwrap().execute_file(&written).unwrap();
        assert_eq!(result, Value::Integer(42));
    }

    #[test]
    fn test_disassemble_file() {
        let dir = TempDir::new().unwrap();
        let path = write_ast(&dir, "sum.json", &sum_program());

        let listing = CliHandler::new().disassemble_file(&path).unwrap();
        assert_eq!(
            listing,
            "0000 OpConstant 0\n\
             0003 OpSetGlobal 0\n\
             0006 OpGetGlobal 0\n\
             0009 OpConstant 1\n\
             0012 OpAdd\n\
             0013 OpPop\n\
             \n\
             Constants:\n\
             0000 INTEGER 40\n\
             0001 INTEGER 2\n"
        );
    }

    #[test]
    fn test_compile_errors_surface() {
        let dir = TempDir::new().unwrap();
        let ast = AstNode::program(vec![AstNode::statement(AstNode::identifier("y"))]);
        let path = write_ast(&dir, "bad.json", &ast);

        let err = CliHandler::new().run_file(&path, false).unwrap_err();
        assert!(err.to_string().contains("Identifier y is not bound"));
    }

    #[test]
    fn test_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();

        let err = load_ast(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid syntax tree"));
    }
}

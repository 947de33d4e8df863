pub mod syntax;
pub mod types;
pub mod runtime;
pub mod csg;
pub mod error;
pub mod run;

pub use csg::{BooleanEngine, BooleanOp, EngineConfig};
pub use error::{Error, ErrorCode, NameKind, SyntaxError};
pub use run::{
    MemoryParameterStore, MemoryShapeStore, ParameterStore, RecordShapeFactory, RunOptions,
    RunOutcome, Runner, ShapeFactory, ShapeStore, evaluate,
};
pub use runtime::interpreter::{InterpretResult, Interpreter};
pub use runtime::value::Value;
pub use syntax::token::{Token, TokenKind};
pub use types::shape::{Shape, ShapeId, ShapeKind};

// ─── Public API ───────────────────────────────────────────────────────────────

/// Lex and parse source text into statements.
pub fn parse(source: &str) -> Result<Vec<syntax::ast::Stmt>, Error> {
    let tokens = syntax::lexer::Lexer::new(source).tokenize()?;
    syntax::parser::Parser::new(tokens).parse()
}

/// Parse and evaluate source text with a fresh interpreter and the default
/// boolean engine.
pub fn interpret(source: &str) -> Result<InterpretResult, Error> {
    evaluate(source, EngineConfig::default())
}

pub mod ast;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod runtime;
pub mod types;

pub use ast::Node;
pub use config::Config;
pub use error::{Error, ErrorClass, Result};
pub use interpreter::Interpreter;
pub use lexer::{Token, TokenKind};
pub use runtime::{register_builtins, Environment, Function};
pub use types::{Value, ValueKind};

/// Split a formula into tokens, terminated by a single end-of-input token.
pub fn lex(input: &str) -> Result<Vec<Token>> {
    lexer::lex(input)
}

/// Parse a formula into an expression tree.
pub fn parse(input: &str) -> Result<Node> {
    parser::parse_tokens(lexer::lex(input)?)
}

/// Evaluate a formula that uses no variables or functions.
pub fn evaluate(input: &str) -> Result<Value> {
    evaluate_with(input, &Environment::new())
}

/// Evaluate a formula against the given bindings.
pub fn evaluate_with(input: &str, env: &Environment) -> Result<Value> {
    let node = parse(input)?;
    runtime::eval(&node, env)
}

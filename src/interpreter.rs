use crate::ast::Node;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::runtime::{register_builtins, Environment, Evaluator, Function};
use crate::types::Value;
use std::collections::HashMap;

/// Runs formulas against an owned [`Environment`].
///
/// `execute` keeps no state between calls: the same formula against an
/// unchanged environment always yields the same result. The interpreter does
/// no locking of its own; share it across threads only behind the caller's
/// synchronization.
#[derive(Debug, Default)]
pub struct Interpreter {
    env: Environment,
    config: Config,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Config) -> Self {
        Self { env: Environment::new(), config }
    }

    /// An interpreter with the standard functions (`Sum`, `If`, ...) registered.
    pub fn with_builtins() -> Self {
        let mut interpreter = Self::new();
        register_builtins(&mut interpreter.env);
        interpreter
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// Lex and parse `formula` without evaluating it.
    pub fn parse(&self, formula: &str) -> Result<Node> {
        let tokens = Lexer::new(formula).tokenize()?;
        Parser::new(tokens).with_max_depth(self.config.max_depth).parse()
    }

    pub fn execute(&self, formula: &str) -> Result<Value> {
        let result = self.parse(formula).and_then(|node| {
            Evaluator::new(&self.env)
                .with_max_depth(self.config.max_depth)
                .eval(&node)
        });
        match &result {
            Ok(value) => tracing::debug!(formula, %value, "formula evaluated"),
            Err(err) => tracing::debug!(formula, error = %err, "formula failed"),
        }
        result
    }

    pub fn set_variable<N: Into<String>, V: Into<Value>>(&mut self, name: N, value: V) {
        self.env.set_variable(name, value);
    }

    pub fn clear_variables(&mut self) {
        self.env.clear_variables();
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.env.variable(name)
    }

    pub fn set_function<N: Into<String>, F: Function + 'static>(&mut self, name: N, function: F) {
        self.env.set_function(name, function);
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.env.has_function(name)
    }

    /// Set variables from a flat JSON object, e.g. `{"X": 10, "Name": "a", "Ok": true}`.
    /// Values must be numbers, strings or booleans; on any error no variable
    /// is changed.
    pub fn set_variables_from_json(&mut self, json: &str) -> Result<()> {
        for (name, value) in json_to_variables(json)? {
            self.env.set_variable(name, value);
        }
        Ok(())
    }
}

/// Convert a flat JSON object into variable bindings.
pub fn json_to_variables(json: &str) -> Result<HashMap<String, Value>> {
    let parsed: serde_json::Value =
        serde_json::from_str(json).map_err(|e| Error::Json(e.to_string()))?;
    let map = match parsed {
        serde_json::Value::Object(map) => map,
        _ => return Err(Error::Json("JSON must be an object with key-value pairs".to_string())),
    };
    let mut vars = HashMap::with_capacity(map.len());
    for (key, value) in map {
        let value = json_to_value(&key, value)?;
        vars.insert(key, value);
    }
    Ok(vars)
}

fn json_to_value(key: &str, json: serde_json::Value) -> Result<Value> {
    match json {
        serde_json::Value::Bool(b) => Ok(Value::Boolean(b)),
        serde_json::Value::String(s) => Ok(Value::String(s)),
        serde_json::Value::Number(n) => n
            .as_f64()
            .map(Value::Number)
            .ok_or_else(|| Error::Json(format!("'{}' is not a representable number", key))),
        serde_json::Value::Null => Err(Error::Json(format!("'{}' is null", key))),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            Err(Error::Json(format!("'{}' must be a number, string or boolean", key)))
        }
    }
}

use crate::error::Result;
use crate::types::Value;
use std::collections::HashMap;
use std::fmt;

/// A host function callable from formulas.
///
/// The function receives exactly the values written at the call site, in
/// order, and is responsible for its own arity and type checks.
///
/// # Example
/// ```rust
/// use formula::{Environment, Error, Value};
///
/// let mut env = Environment::new();
/// env.set_function("Double", |args: Vec<Value>| -> Result<Value, Error> {
///     match args.as_slice() {
///         [Value::Number(n)] => Ok(Value::Number(n * 2.0)),
///         _ => Err(Error::new("Double expects one number")),
///     }
/// });
/// assert!(env.has_function("Double"));
/// ```
pub trait Function: Send + Sync {
    fn call(&self, args: Vec<Value>) -> Result<Value>;
}

impl<F> Function for F
where
    F: Fn(Vec<Value>) -> Result<Value> + Send + Sync,
{
    fn call(&self, args: Vec<Value>) -> Result<Value> {
        self(args)
    }
}

/// Variable and function bindings a formula is evaluated against.
/// Names are case-sensitive; setting an existing name replaces it.
#[derive(Default)]
pub struct Environment {
    variables: HashMap<String, Value>,
    functions: HashMap<String, Box<dyn Function>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_variable<N: Into<String>, V: Into<Value>>(&mut self, name: N, value: V) {
        self.variables.insert(name.into(), value.into());
    }

    /// Replace every variable binding at once.
    pub fn set_variables(&mut self, variables: HashMap<String, Value>) {
        self.variables = variables;
    }

    pub fn clear_variables(&mut self) {
        self.variables.clear();
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn variables(&self) -> &HashMap<String, Value> {
        &self.variables
    }

    pub fn set_function<N: Into<String>, F: Function + 'static>(&mut self, name: N, function: F) {
        let name = name.into();
        if self.functions.insert(name.clone(), Box::new(function)).is_some() {
            tracing::debug!(%name, "function binding overwritten");
        } else {
            tracing::debug!(%name, "function registered");
        }
    }

    pub fn function(&self, name: &str) -> Option<&dyn Function> {
        self.functions.get(name).map(|f| f.as_ref())
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered function names, sorted.
    pub fn function_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("variables", &self.variables)
            .field("functions", &self.function_names())
            .finish()
    }
}

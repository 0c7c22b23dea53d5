//! Standard functions registered by [`register_builtins`]. Each one checks its
//! own arity and argument types; the evaluator passes arguments through as-is.

use crate::error::{Error, Result};
use crate::runtime::environment::Environment;
use crate::types::Value;

pub type Builtin = fn(Vec<Value>) -> Result<Value>;

pub const BUILTINS: &[(&str, Builtin)] = &[
    ("Sum", sum),
    ("Len", len),
    ("Mean", mean),
    ("Min", min),
    ("Max", max),
    ("And", and),
    ("Or", or),
    ("If", if_),
    ("Ifs", ifs),
    ("Round", round),
];

pub fn register_builtins(env: &mut Environment) {
    for (name, function) in BUILTINS {
        env.set_function(*name, *function);
    }
}

fn number(v: &Value) -> Result<f64> {
    v.as_number()
        .ok_or_else(|| Error::new(format!("expected number, got {}", v.kind())))
}

fn boolean(v: &Value) -> Result<bool> {
    v.as_bool()
        .ok_or_else(|| Error::new(format!("expected boolean, got {}", v.kind())))
}

fn numbers(args: &[Value]) -> Result<Vec<f64>> {
    args.iter().map(number).collect()
}

pub fn sum(args: Vec<Value>) -> Result<Value> {
    Ok(Value::Number(numbers(&args)?.iter().sum()))
}

pub fn len(args: Vec<Value>) -> Result<Value> {
    Ok(Value::Number(args.len() as f64))
}

pub fn mean(args: Vec<Value>) -> Result<Value> {
    if args.is_empty() {
        return Err(Error::new("Mean expects 1 or more args, got 0"));
    }
    let ns = numbers(&args)?;
    Ok(Value::Number(ns.iter().sum::<f64>() / ns.len() as f64))
}

pub fn min(args: Vec<Value>) -> Result<Value> {
    if args.is_empty() {
        return Err(Error::new("Min expects 1 or more args, got 0"));
    }
    Ok(Value::Number(numbers(&args)?.into_iter().fold(f64::INFINITY, f64::min)))
}

pub fn max(args: Vec<Value>) -> Result<Value> {
    if args.is_empty() {
        return Err(Error::new("Max expects 1 or more args, got 0"));
    }
    Ok(Value::Number(numbers(&args)?.into_iter().fold(f64::NEG_INFINITY, f64::max)))
}

// Arguments are checked in order up to the first one that decides the result;
// anything after it is not type-checked.
pub fn and(args: Vec<Value>) -> Result<Value> {
    for arg in &args {
        if !boolean(arg)? {
            return Ok(Value::Boolean(false));
        }
    }
    Ok(Value::Boolean(true))
}

pub fn or(args: Vec<Value>) -> Result<Value> {
    for arg in &args {
        if boolean(arg)? {
            return Ok(Value::Boolean(true));
        }
    }
    Ok(Value::Boolean(false))
}

pub fn if_(args: Vec<Value>) -> Result<Value> {
    match <[Value; 3]>::try_from(args) {
        Ok([cond, then_v, else_v]) => Ok(if boolean(&cond)? { then_v } else { else_v }),
        Err(args) => Err(Error::new(format!("If expects 3 args, got {}", args.len()))),
    }
}

pub fn ifs(args: Vec<Value>) -> Result<Value> {
    if args.is_empty() {
        return Err(Error::new("Ifs expects 2 or more args, got 0"));
    }
    if args.len() % 2 != 0 {
        return Err(Error::new(format!("Ifs expects an even number of args, got {}", args.len())));
    }
    for pair in args.chunks(2) {
        if boolean(&pair[0])? {
            return Ok(pair[1].clone());
        }
    }
    Err(Error::new("Ifs: none of the conditions is true"))
}

pub fn round(args: Vec<Value>) -> Result<Value> {
    if args.is_empty() || args.len() > 2 {
        return Err(Error::new(format!("Round expects 1 or 2 args, got {}", args.len())));
    }
    let n = number(&args[0])?;
    let precision = match args.get(1) {
        Some(p) => number(p)?,
        None => 0.0,
    };
    if precision < 0.0 {
        return Err(Error::new(format!("Round precision should be >= 0, got {}", precision)));
    }
    let factor = 10f64.powf(precision);
    Ok(Value::Number((n * factor).round() / factor))
}

use crate::ast::{BinaryOp, CompareOp, LiteralKind, Node, NodeKind, UnaryOp};
use crate::config::DEFAULT_MAX_DEPTH;
use crate::error::{Error, Result};
use crate::runtime::environment::Environment;
use crate::types::Value;
use std::cmp::Ordering;

/// Tree-walking evaluator. Reads bindings from `env`, never mutates the tree.
pub struct Evaluator<'a> {
    env: &'a Environment,
    depth: usize,
    max_depth: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(env: &'a Environment) -> Self {
        Self { env, depth: 0, max_depth: DEFAULT_MAX_DEPTH }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn eval(&mut self, node: &Node) -> Result<Value> {
        self.depth += 1;
        if self.depth > self.max_depth {
            self.depth -= 1;
            return Err(Error::NestingTooDeep { limit: self.max_depth, position: node.position });
        }
        let result = self.eval_node(node);
        self.depth -= 1;
        result
    }

    fn eval_node(&mut self, node: &Node) -> Result<Value> {
        match &node.kind {
            NodeKind::Literal { kind: LiteralKind::Number, raw } => eval_number(raw, node.position),
            NodeKind::Literal { kind: LiteralKind::String, raw } => Ok(Value::String(raw.clone())),
            NodeKind::Ident(name) => self
                .env
                .variable(name)
                .cloned()
                .ok_or_else(|| Error::UnknownVariable { name: name.clone(), position: node.position }),
            NodeKind::Unary(op, operand) => {
                let v = self.eval(operand)?;
                let n = expect_number(&v, op.symbol(), node.position)?;
                Ok(Value::Number(match op {
                    UnaryOp::Plus => n,
                    UnaryOp::Minus => -n,
                }))
            }
            NodeKind::Binary(..) | NodeKind::Comparison(..) => self.eval_chain(node),
            NodeKind::Call { name, args } => {
                let env = self.env;
                let function = env
                    .function(name)
                    .ok_or_else(|| Error::UnknownFunction { name: name.clone(), position: node.position })?;
                // Every argument is evaluated, left to right, before the call.
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval(arg)?);
                }
                function.call(values)
            }
        }
    }

    /// Evaluates a left-folded operator chain without recursing down its
    /// spine, so `1+1+...+1` costs one level of depth however long it is.
    /// Operands still go through `eval` and count toward the limit.
    fn eval_chain(&mut self, node: &Node) -> Result<Value> {
        let mut steps = Vec::new();
        let mut head = node;
        loop {
            match &head.kind {
                NodeKind::Binary(lhs, op, rhs) => {
                    steps.push((Step::Arith(*op), rhs, head.position));
                    head = &**lhs;
                }
                NodeKind::Comparison(lhs, op, rhs) => {
                    steps.push((Step::Compare(*op), rhs, head.position));
                    head = &**lhs;
                }
                _ => break,
            }
        }
        let mut acc = self.eval(head)?;
        for (step, rhs, position) in steps.into_iter().rev() {
            let r = self.eval(rhs)?;
            acc = match step {
                Step::Arith(op) => eval_binary(op, &acc, &r, position)?,
                Step::Compare(op) => eval_comparison(op, &acc, &r, position)?,
            };
        }
        Ok(acc)
    }
}

enum Step {
    Arith(BinaryOp),
    Compare(CompareOp),
}

pub fn eval(node: &Node, env: &Environment) -> Result<Value> {
    Evaluator::new(env).eval(node)
}

fn eval_number(raw: &str, position: usize) -> Result<Value> {
    raw.replace(',', ".")
        .parse::<f64>()
        .map(Value::Number)
        .map_err(|_| Error::InvalidNumber { text: raw.to_string(), position })
}

fn expect_number(v: &Value, op: &'static str, position: usize) -> Result<f64> {
    v.as_number()
        .ok_or(Error::TypeMismatch { op, expected: "number", found: v.kind(), position })
}

fn eval_binary(op: BinaryOp, l: &Value, r: &Value, position: usize) -> Result<Value> {
    let a = expect_number(l, op.symbol(), position)?;
    let b = expect_number(r, op.symbol(), position)?;
    let n = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(Error::DivisionByZero { position });
            }
            a / b
        }
        BinaryOp::Pow => a.powf(b),
    };
    Ok(Value::Number(n))
}

fn eval_comparison(op: CompareOp, l: &Value, r: &Value, position: usize) -> Result<Value> {
    // Equality spans every kind; values of different kinds are never equal.
    if op == CompareOp::Eq {
        return Ok(Value::Boolean(l == r));
    }
    let ordering = match (l, r) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Number(_), other) => {
            return Err(Error::TypeMismatch { op: op.symbol(), expected: "number", found: other.kind(), position })
        }
        (Value::String(_), other) => {
            return Err(Error::TypeMismatch { op: op.symbol(), expected: "string", found: other.kind(), position })
        }
        (other, _) => {
            return Err(Error::TypeMismatch {
                op: op.symbol(),
                expected: "number or string",
                found: other.kind(),
                position,
            })
        }
    };
    // NaN orders against nothing, so every ordering comparison with it is false.
    let result = match ordering {
        None => false,
        Some(ord) => match op {
            CompareOp::Lt => ord == Ordering::Less,
            CompareOp::Gt => ord == Ordering::Greater,
            CompareOp::Le => ord != Ordering::Greater,
            CompareOp::Ge => ord != Ordering::Less,
            CompareOp::Eq => ord == Ordering::Equal,
        },
    };
    Ok(Value::Boolean(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::parser::parse_tokens;
    use crate::types::ValueKind;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
    use std::sync::{Arc, Mutex};

    fn run(input: &str, env: &Environment) -> Result<Value> {
        eval(&parse_tokens(lex(input)?)?, env)
    }

    #[test]
    fn literals() {
        let env = Environment::new();
        assert_eq!(run("2,5", &env), Ok(Value::Number(2.5)));
        assert_eq!(run("\"hi\"", &env), Ok(Value::String("hi".into())));
    }

    #[test]
    fn non_ascii_digits_are_invalid_numbers() {
        let env = Environment::new();
        assert!(matches!(run("٣", &env), Err(Error::InvalidNumber { position: 1, .. })));
    }

    #[test]
    fn unary_requires_number() {
        let env = Environment::new();
        assert_eq!(run("--1", &env), Ok(Value::Number(1.0)));
        assert_eq!(
            run("-\"a\"", &env),
            Err(Error::TypeMismatch { op: "-", expected: "number", found: ValueKind::String, position: 1 })
        );
    }

    #[test]
    fn division_by_zero() {
        let env = Environment::new();
        assert_eq!(run("1/0", &env), Err(Error::DivisionByZero { position: 2 }));
        assert_eq!(run("1/(0-0)", &env), Err(Error::DivisionByZero { position: 2 }));
    }

    #[test]
    fn pow_follows_ieee() {
        let env = Environment::new();
        match run("(0-8)^(1/3)", &env) {
            Ok(Value::Number(n)) => assert!(n.is_nan()),
            other => panic!("expected NaN, got {:?}", other),
        }
    }

    #[test]
    fn equality_never_coerces() {
        let env = Environment::new();
        assert_eq!(run("1 = \"1\"", &env), Ok(Value::Boolean(false)));
        assert_eq!(run("(1 = 1) = (2 = 2)", &env), Ok(Value::Boolean(true)));
    }

    #[test]
    fn ordering_rules() {
        let env = Environment::new();
        assert_eq!(run("\"abc\" < \"abd\"", &env), Ok(Value::Boolean(true)));
        assert!(matches!(
            run("1 < \"a\"", &env),
            Err(Error::TypeMismatch { expected: "number", found: ValueKind::String, .. })
        ));
        assert!(matches!(
            run("(1 = 1) < (1 = 1)", &env),
            Err(Error::TypeMismatch { expected: "number or string", found: ValueKind::Boolean, .. })
        ));
    }

    #[test]
    fn unknown_names() {
        let env = Environment::new();
        assert_eq!(run("1 + X", &env), Err(Error::UnknownVariable { name: "X".into(), position: 5 }));
        assert_eq!(run("F(1)", &env), Err(Error::UnknownFunction { name: "F".into(), position: 1 }));
    }

    #[test]
    fn arguments_evaluate_left_to_right() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut env = Environment::new();
        let sink = Arc::clone(&log);
        env.set_function("Tap", move |args: Vec<Value>| -> Result<Value> {
            let v = args.into_iter().next().ok_or_else(|| Error::new("Tap expects 1 arg"))?;
            sink.lock().unwrap().push(v.clone());
            Ok(v)
        });
        env.set_function("Last", |args: Vec<Value>| -> Result<Value> {
            args.last().cloned().ok_or_else(|| Error::new("empty"))
        });
        assert_eq!(run("Last(Tap(1); Tap(2); Tap(3))", &env), Ok(Value::Number(3.0)));
        assert_eq!(*log.lock().unwrap(), vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)]);
    }

    #[test]
    fn failing_argument_stops_the_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut env = Environment::new();
        let counter = Arc::clone(&calls);
        env.set_function("Count", move |args: Vec<Value>| -> Result<Value> {
            counter.fetch_add(1, AtomicOrdering::SeqCst);
            Ok(Value::Number(args.len() as f64))
        });
        assert_eq!(run("Count(1; 1/0)", &env), Err(Error::DivisionByZero { position: 11 }));
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 0);
    }

    #[test]
    fn function_errors_pass_through() {
        let mut env = Environment::new();
        env.set_function("Fail", |_args: Vec<Value>| -> Result<Value> { Err(Error::new("bad input")) });
        assert_eq!(run("1 + Fail()", &env), Err(Error::new("bad input")));
    }

    #[test]
    fn flat_chains_do_not_count_toward_depth() {
        let env = Environment::new();
        let chain = vec!["1"; 5_000].join("+");
        let node = parse_tokens(lex(&chain).unwrap()).unwrap();
        assert_eq!(Evaluator::new(&env).with_max_depth(4).eval(&node), Ok(Value::Number(5_000.0)));

        let mixed = format!("2*{}-1 > 3", vec!["3"; 300].join("/"));
        let node = parse_tokens(lex(&mixed).unwrap()).unwrap();
        assert_eq!(Evaluator::new(&env).with_max_depth(4).eval(&node), Ok(Value::Boolean(false)));
    }

    #[test]
    fn chains_keep_left_to_right_order() {
        let env = Environment::new();
        assert_eq!(run("10 - 2 - 3", &env), Ok(Value::Number(5.0)));
        assert_eq!(run("1 < 2 = (1 = 1)", &env), Ok(Value::Boolean(true)));
        assert_eq!(run("1 + 1/0 + X", &env), Err(Error::DivisionByZero { position: 6 }));
    }

    #[test]
    fn depth_limit_covers_nested_operands() {
        let env = Environment::new();
        let node = parse_tokens(lex("1 + -(-(-(1)))").unwrap()).unwrap();
        assert_eq!(Evaluator::new(&env).eval(&node), Ok(Value::Number(0.0)));
        let err = Evaluator::new(&env).with_max_depth(3).eval(&node).unwrap_err();
        assert!(matches!(err, Error::NestingTooDeep { limit: 3, .. }));
    }
}

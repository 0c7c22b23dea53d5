use formula::{evaluate, Error, Interpreter, Value, ValueKind};

fn b(v: Value) -> bool { if let Value::Boolean(b) = v { b } else { panic!("expected boolean, got {:?}", v) } }

#[test]
fn numeric_comparisons() {
    let cases: &[(&str, bool)] = &[
        ("1 = 1", true),
        ("1 <= 1", true),
        ("1 <= 2", true),
        ("1 < 2", true),
        ("1 < 1", false),
        ("1 <= 0", false),
        ("2 > 1", true),
        ("2 >= 3", false),
        ("1 + 1 = 2", true),
    ];
    for (formula, expected) in cases {
        assert_eq!(b(evaluate(formula).unwrap()), *expected, "{}", formula);
    }
}

#[test]
fn string_comparisons_are_lexicographic() {
    assert!(b(evaluate("\"apple\" < \"banana\"").unwrap()));
    assert!(b(evaluate("\"b\" >= \"b\"").unwrap()));
    assert!(b(evaluate("\"a\" = \"a\"").unwrap()));
    assert!(!b(evaluate("\"a\" = \"A\"").unwrap()));
}

#[test]
fn chains_fold_left_and_only_equality_accepts_booleans() {
    // (1 < 2) = (3 > 2)  ->  true = true
    assert!(b(evaluate("1 < 2 = (3 > 2)").unwrap()));
    // (1 < 2) < 3  ->  boolean is not ordered
    assert!(matches!(
        evaluate("1 < 2 < 3"),
        Err(Error::TypeMismatch { op: "<", found: ValueKind::Boolean, .. })
    ));
}

#[test]
fn equality_across_kinds_is_false() {
    let mut interp = Interpreter::new();
    interp.set_variable("T", true);
    assert!(!b(interp.execute("1 = \"1\"").unwrap()));
    assert!(!b(interp.execute("T = 1").unwrap()));
    assert!(b(interp.execute("T = (1 = 1)").unwrap()));
}

#[test]
fn mismatched_ordering_is_a_type_error() {
    assert!(matches!(
        evaluate("\"a\" > 1"),
        Err(Error::TypeMismatch { op: ">", expected: "string", found: ValueKind::Number, position: 5 })
    ));
}

#[test]
fn comparisons_feed_logical_functions() {
    let mut interp = Interpreter::with_builtins();
    interp.set_variable("X", 10.0);
    interp.set_variable("Y", 100.0);
    assert_eq!(interp.execute("If(And(Sum(1;2;3)=6;X^2=Y);123;0)").unwrap(), Value::Number(123.0));
    assert_eq!(interp.execute("If(Or(X>100;Y<10);\"yes\";\"no\")").unwrap(), Value::String("no".into()));
}

use clap::Parser;
use formula::config::{DEFAULT_MAX_DEPTH, MAX_DEPTH_ENV};
use formula::{Config, Interpreter, Value};
use serde_json::json;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Evaluate a formula such as `Sum(X; 2) * 3 > 10`.
#[derive(Parser, Debug)]
#[command(name = "formula", version, about)]
struct Cli {
    /// The formula to evaluate
    #[arg(allow_hyphen_values = true)]
    expression: String,

    /// Variable bindings in NAME=VALUE form
    #[arg(value_name = "NAME=VALUE", value_parser = parse_binding)]
    vars: Vec<(String, Value)>,

    /// Flat JSON object of variable values
    #[arg(long, value_name = "OBJECT")]
    json: Option<String>,

    /// Output result in JSON format with type and timing
    #[arg(long)]
    output_json: bool,

    /// Deepest expression nesting accepted
    #[arg(long, env = MAX_DEPTH_ENV, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut interpreter = Interpreter::with_config(Config::default().with_max_depth(cli.max_depth));
    formula::register_builtins(interpreter.environment_mut());

    if let Some(json_str) = &cli.json {
        if let Err(e) = interpreter.set_variables_from_json(json_str) {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
    for (name, value) in cli.vars {
        interpreter.set_variable(name, value);
    }

    // Measure execution time
    let start_time = Instant::now();
    let result = interpreter.execute(&cli.expression);
    let execution_time_ms = start_time.elapsed().as_secs_f64() * 1000.0;

    match result {
        Ok(val) => {
            if cli.output_json {
                println!("{}", format_json_output(&val, execution_time_ms));
            } else {
                println!("{}", val);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

fn format_json_output(value: &Value, execution_time_ms: f64) -> String {
    let output = json!({
        "result": value,
        "type": value.kind().name(),
        "execution_time": format!("{:.2} ms", execution_time_ms)
    });

    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}

fn parse_binding(arg: &str) -> Result<(String, Value), String> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("invalid variable assignment '{}', use NAME=VALUE", arg))?;
    if name.is_empty() {
        return Err(format!("missing variable name in '{}'", arg));
    }
    Ok((name.to_string(), parse_value(value)))
}

fn parse_value(s: &str) -> Value {
    // Quoted text is always a string
    if s.len() >= 2 && ((s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\''))) {
        return Value::String(s[1..s.len() - 1].to_string());
    }

    match s.to_lowercase().as_str() {
        "true" => return Value::Boolean(true),
        "false" => return Value::Boolean(false),
        _ => {}
    }

    // Accept both decimal separators on the command line
    if is_plain_number(s) {
        if let Ok(num) = s.replace(',', ".").parse::<f64>() {
            return Value::Number(num);
        }
    }

    Value::String(s.to_string())
}

/// Optional sign, digits, and at most one `.` or `,` between digits. Words
/// like `inf` or `NaN` and exponent forms stay strings.
fn is_plain_number(s: &str) -> bool {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    let (int, frac) = match digits.split_once(['.', ',']) {
        Some((int, frac)) => (int, Some(frac)),
        None => (digits, None),
    };
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    all_digits(int) && frac.map_or(true, all_digits)
}

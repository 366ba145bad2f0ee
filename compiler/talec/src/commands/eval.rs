//! The `eval` command: evaluate one expression.

use serde_json::{Map, Value};

/// Parse `name=value` bindings. Values are read as JSON when they parse,
/// else taken as strings.
fn parse_bindings(bindings: &[String]) -> Result<Map<String, Value>, String> {
    let mut variables = Map::new();
    for binding in bindings {
        let Some((name, raw)) = binding.split_once('=') else {
            return Err(format!("expected name=value, found '{binding}'"));
        };
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        variables.insert(name.trim().to_string(), value);
    }
    Ok(variables)
}

pub fn eval_expression(expression: &str, bindings: &[String]) {
    let variables = match parse_bindings(bindings) {
        Ok(variables) => variables,
        Err(message) => {
            eprintln!("error: {message}");
            std::process::exit(1);
        }
    };
    match tale_block::evaluate(expression, &variables) {
        Ok(value) => println!("{value}"),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

use serde_json::{Number, Value};
use regex::Regex;
use std::sync::OnceLock;

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[-+]?(\d+|\d+\.\d*|\d*\.\d+)$").expect("valid number pattern")
    })
}

/// Render a value the way it appears in template output.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Turn numeric-looking strings into numbers; everything else is unchanged.
/// Whole numbers are stored as integers even when written as `5.0` or `5.`.
pub fn coerce_number(value: Value) -> Value {
    let Value::String(s) = &value else {
        return value;
    };
    if !number_pattern().is_match(s) {
        return value;
    }
    if !s.contains('.') {
        if let Ok(i) = s.parse::<i64>() {
            return Value::from(i);
        }
    }
    let Ok(f) = s.parse::<f64>() else {
        return value;
    };
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        return Value::from(f as i64);
    }
    match Number::from_f64(f) {
        Some(n) => Value::Number(n),
        None => value,
    }
}

pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

use crate::expression::{Template, MAX_DEPTH};
use crate::parser::{nested_interior, split_nested};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

const PARAM_SEPARATOR: char = ',';
const ENTRY_SEPARATOR: char = ':';

fn entry_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]+\s*:").expect("valid entry pattern"))
}

/// A pipe parameter as written in the template.
///
/// `Text` leaves are templates because a parameter may itself contain
/// `${...}`; they are expanded, then coerced to numbers where they look like
/// one, at evaluation time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Param {
    Text(Template),
    Object(Vec<(String, Param)>),
    Array(Vec<Param>),
}

/// Parse a comma separated parameter list. `""` is one empty parameter.
pub fn parse_params(raw: &str) -> Vec<Param> {
    parse_params_at(raw, 0)
}

pub(crate) fn parse_params_at(raw: &str, depth: usize) -> Vec<Param> {
    split_nested(raw, PARAM_SEPARATOR)
        .into_iter()
        .map(|fragment| parse_param(fragment, depth))
        .collect()
}

fn parse_param(fragment: &str, depth: usize) -> Param {
    let fragment = fragment.trim();
    let depth = depth + 1;
    if depth > MAX_DEPTH {
        return Param::Text(Template::parse_at(fragment, depth));
    }
    if fragment.starts_with('{') {
        Param::Object(parse_entries(nested_interior(fragment).trim(), depth))
    } else if fragment.starts_with('[') {
        Param::Array(parse_params_at(nested_interior(fragment).trim(), depth))
    } else {
        Param::Text(Template::parse_at(fragment, depth))
    }
}

// Fragments without a `key:` prefix have no place in an object and are dropped.
fn parse_entries(raw: &str, depth: usize) -> Vec<(String, Param)> {
    split_nested(raw, PARAM_SEPARATOR)
        .into_iter()
        .filter_map(|fragment| {
            let fragment = fragment.trim();
            if !entry_pattern().is_match(fragment) {
                return None;
            }
            let (key, value) = fragment.split_once(ENTRY_SEPARATOR)?;
            Some((key.trim().to_string(), parse_param(value, depth)))
        })
        .collect()
}

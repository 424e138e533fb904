// src/expression.rs
use crate::params::{parse_params_at, Param};
use crate::parser::{split_bracket, split_outer};
use serde::Serialize;
use tracing::warn;

const VAR_START: &str = "${";
const VAR_END: &str = "}";
const OBJ_START: &str = "{";
const PIPE_SEPARATOR: char = '|';
const PARAM_START: char = '(';
const PARAM_END: char = ')';

/// Nesting limit for expressions, pipe parameters and structured literals.
/// Anything deeper is kept as literal text.
pub(crate) const MAX_DEPTH: usize = 64;

/// Expression bodies that stand for themselves: `${$}` and `${:}`.
const ESCAPES: [&str; 2] = ["$", ":"];

/// Parsed template: literal text interleaved with `${...}` expressions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Template {
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Segment {
    Literal(String),
    Expr(Expr),
}

/// One `${...}` body: a path, itself a template, followed by pipes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expr {
    pub path: Template,
    pub pipes: Vec<Pipe>,
}

/// `name` or `name(params)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pipe {
    pub name: String,
    pub params: Option<Vec<Param>>,
}

impl Template {
    /// Parsing never fails; unterminated brackets close at end of input.
    pub fn parse(input: &str) -> Self {
        Self::parse_at(input, 0)
    }

    pub(crate) fn parse_at(input: &str, depth: usize) -> Self {
        if depth > MAX_DEPTH {
            warn!(depth, "template nested too deeply, keeping it as text");
            return Self::literal(input);
        }
        let segments = split_bracket(input, VAR_START, VAR_END, &[OBJ_START])
            .into_iter()
            .enumerate()
            .filter_map(|(n, part)| {
                if n % 2 == 1 {
                    Some(Segment::parse_body(part, depth))
                } else if part.is_empty() {
                    None
                } else {
                    Some(Segment::Literal(part.to_string()))
                }
            })
            .collect();
        Self { segments }
    }

    pub(crate) fn literal(input: &str) -> Self {
        let segments = if input.is_empty() {
            vec![]
        } else {
            vec![Segment::Literal(input.to_string())]
        };
        Self { segments }
    }
}

impl Segment {
    fn parse_body(body: &str, depth: usize) -> Self {
        if ESCAPES.contains(&body) {
            return Segment::Literal(body.to_string());
        }
        Segment::Expr(Expr::parse_at(body, depth + 1))
    }
}

impl Expr {
    pub fn parse(body: &str) -> Self {
        Self::parse_at(body, 0)
    }

    fn parse_at(body: &str, depth: usize) -> Self {
        let mut parts = split_outer(body, PIPE_SEPARATOR, VAR_START).into_iter();
        let path = Template::parse_at(&parts.next().unwrap_or_default(), depth);
        let pipes = parts.map(|segment| Pipe::parse_at(&segment, depth)).collect();
        Self { path, pipes }
    }
}

impl Pipe {
    pub fn parse(segment: &str) -> Self {
        Self::parse_at(segment, 0)
    }

    fn parse_at(segment: &str, depth: usize) -> Self {
        let segment = segment.trim();
        match segment.find(PARAM_START) {
            None => Self {
                name: segment.to_string(),
                params: None,
            },
            Some(open) => {
                // the closing `)` is the last char when present
                let rest = &segment[open + PARAM_START.len_utf8()..];
                let raw = rest.strip_suffix(PARAM_END).unwrap_or(rest);
                Self {
                    name: segment[..open].trim().to_string(),
                    params: Some(parse_params_at(raw, depth)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lit(s: &str) -> Segment {
        Segment::Literal(s.to_string())
    }

    fn path(s: &str) -> Template {
        Template { segments: vec![lit(s)] }
    }

    #[test]
    fn parse_literal_only() {
        assert_eq!(Template::parse("hello $ world:").segments, vec![lit("hello $ world:")]);
        assert!(Template::parse("").segments.is_empty());
    }

    #[test]
    fn parse_escapes_as_literals() {
        let t = Template::parse("a ${$}{var} ${:}");
        assert_eq!(t.segments, vec![lit("a "), lit("$"), lit("{var} "), lit(":")]);
    }

    #[test]
    fn parse_pipe_chain() {
        let t = Template::parse("${param.x | upper | capital(2)}");
        let Segment::Expr(expr) = &t.segments[0] else {
            panic!("expected expression");
        };
        assert_eq!(expr.path, path("param.x"));
        assert_eq!(expr.pipes.len(), 2);
        assert_eq!(expr.pipes[0], Pipe { name: "upper".into(), params: None });
        assert_eq!(expr.pipes[1].name, "capital");
        assert_eq!(expr.pipes[1].params, Some(vec![Param::Text(path("2"))]));
    }

    #[test]
    fn parse_nested_path() {
        let t = Template::parse("${x${param}.y}");
        let Segment::Expr(expr) = &t.segments[0] else {
            panic!("expected expression");
        };
        assert_eq!(expr.path.segments.len(), 3);
        assert_eq!(expr.path.segments[0], lit("x"));
        assert!(matches!(expr.path.segments[1], Segment::Expr(_)));
        assert_eq!(expr.path.segments[2], lit(".y"));
    }

    #[test]
    fn pipe_tolerates_missing_close() {
        assert_eq!(Pipe::parse("capital(2"), Pipe::parse("capital(2)"));
        assert_eq!(Pipe::parse(" name (normal) ").name, "name");
    }

    #[test]
    fn pipe_params_run_to_the_last_paren() {
        let or_else = |raw: &str| Pipe {
            name: "orElse".into(),
            params: Some(vec![Param::Text(path(raw))]),
        };
        assert_eq!(Pipe::parse("orElse(:-))"), or_else(":-)"));
        assert_eq!(Pipe::parse("orElse(a(b)"), or_else("a(b"));
    }

    #[test]
    fn deep_nesting_stops_at_the_limit() {
        let input = "${".repeat(1000);
        let mut template = Template::parse(&input);
        let mut levels = 0;
        while let Some(Segment::Expr(expr)) = template.segments.pop() {
            template = expr.path;
            levels += 1;
        }
        assert_eq!(levels, MAX_DEPTH + 1);
        assert!(matches!(template.segments.as_slice(), [] | [Segment::Literal(_)]));
    }

    #[test]
    fn pipe_params_keep_nested_expressions() {
        let pipe = Pipe::parse("orElse(${param.x | f(a)})");
        let Some(params) = pipe.params else {
            panic!("expected params");
        };
        assert_eq!(params.len(), 1);
        let Param::Text(t) = &params[0] else {
            panic!("expected text param");
        };
        let Segment::Expr(inner) = &t.segments[0] else {
            panic!("expected expression");
        };
        assert_eq!(inner.pipes[0].name, "f");
    }
}

use crate::coerce::{coerce_number, stringify};
use crate::context::Context;
use crate::expression::{Expr, Pipe, Segment, Template};
use crate::formatters::{PipeInput, Registry};
use crate::params::Param;
use itertools::Itertools;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Interpreter for parsed templates. Evaluation is total: every failure
/// degrades to a value.
pub struct Engine<'a> {
    registry: &'a Registry,
    ctx: Context<'a>,
}

impl<'a> Engine<'a> {
    pub fn new(registry: &'a Registry, params: &'a Value) -> Self {
        Self { registry, ctx: Context::new(params) }
    }

    /// A template that evaluates to exactly one non-empty part returns that
    /// part untouched; anything else is concatenated into a string.
    pub fn eval_template(&self, template: &Template, apply_resolvers: bool) -> Value {
        let mut parts = template
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => Value::String(text.clone()),
                Segment::Expr(expr) => self.eval_expr(expr, apply_resolvers),
            })
            .filter(|part| part.as_str() != Some(""))
            .collect::<Vec<_>>();
        if parts.len() == 1 {
            return parts.pop().unwrap_or_default();
        }
        Value::String(parts.iter().map(stringify).join(""))
    }

    pub fn eval_expr(&self, expr: &Expr, apply_resolvers: bool) -> Value {
        let path = stringify(&self.eval_template(&expr.path, false));
        let initial = self.ctx.lookup(path.trim());
        if !expr.pipes.is_empty() {
            return expr.pipes.iter().fold(initial, |value, pipe| self.apply_pipe(value, pipe));
        }
        if !apply_resolvers {
            return initial;
        }
        match self.registry.resolve(&initial) {
            Some(pipe) => {
                debug!(path = path.trim(), pipe = %pipe.name, "resolver matched");
                self.apply_pipe(initial, pipe)
            }
            None => initial,
        }
    }

    /// Unknown pipes pass the value through. A failing formatter is logged
    /// and yields an empty string.
    pub fn apply_pipe(&self, value: Value, pipe: &Pipe) -> Value {
        let Some(registration) = self.registry.get(&pipe.name) else {
            return value;
        };
        let params = match &pipe.params {
            Some(params) => Some(self.eval_params(params)),
            None => registration.default_params.clone(),
        };
        let input = match params {
            Some(params) => PipeInput::Envelope { value, params },
            None => PipeInput::Value(value),
        };
        debug!(pipe = %pipe.name, ?input, "applying pipe");
        match registration.formatter.marshal(input) {
            Ok(out) => out,
            Err(err) => {
                warn!(pipe = %pipe.name, error = %err, "cannot marshal");
                Value::String(String::new())
            }
        }
    }

    pub fn eval_params(&self, params: &[Param]) -> Vec<Value> {
        params.iter().map(|param| self.eval_param(param)).collect()
    }

    fn eval_param(&self, param: &Param) -> Value {
        match param {
            Param::Text(template) => coerce_number(self.eval_template(template, false)),
            Param::Array(items) => Value::Array(self.eval_params(items)),
            Param::Object(entries) => {
                let map = entries
                    .iter()
                    .map(|(key, value)| (key.clone(), self.eval_param(value)))
                    .collect::<Map<String, Value>>();
                Value::Object(map)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{FormatError, Result};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn echo(input: PipeInput) -> Result<Value> {
        Ok(json!(input.params()))
    }

    fn render(registry: &Registry, input: &str, params: &Value) -> Value {
        Engine::new(registry, params).eval_template(&Template::parse(input), true)
    }

    #[test]
    fn single_expression_keeps_its_type() {
        let registry = Registry::new();
        let params = json!({"param": {"a": 1}, "n": 5});
        assert_eq!(render(&registry, "${param}", &params), json!({"a": 1}));
        assert_eq!(render(&registry, "${n}", &params), json!(5));
        assert_eq!(render(&registry, "n=${n}", &params), json!("n=5"));
    }

    #[test]
    fn empty_parts_are_dropped_before_reassembly() {
        let registry = Registry::with_builtins();
        let params = json!({"param": {"a": 1}});
        assert_eq!(render(&registry, "${param}${missing | upper}", &params), json!({"a": 1}));
    }

    #[test]
    fn failing_formatter_yields_empty_string() {
        let mut registry = Registry::new();
        let boom = |_: PipeInput| -> Result<Value> { Err(FormatError::custom("boom")) };
        registry.register("boom", boom, None);
        let params = json!({"x": "v"});
        assert_eq!(render(&registry, "a${x | boom}b", &params), json!("ab"));
    }

    #[test]
    fn default_params_only_without_parentheses() {
        let mut registry = Registry::new();
        registry.register("echo", echo, Some(vec![json!("d")]));
        let params = json!({"x": 1});
        assert_eq!(render(&registry, "${x | echo}", &params), json!(["d"]));
        assert_eq!(render(&registry, "${x | echo()}", &params), json!([""]));
        assert_eq!(
            render(&registry, "${x | echo(1, {k: ${x}}, [a])}", &params),
            json!([1, {"k": 1}, ["a"]])
        );
    }

    #[test]
    fn duplicate_object_keys_last_wins() {
        let mut registry = Registry::new();
        registry.register("echo", echo, None);
        let params = json!({});
        assert_eq!(render(&registry, "${x | echo({a:1, a:2})}", &params), json!([{"a": 2}]));
    }

    #[test]
    fn resolvers_only_apply_at_top_level() {
        let mut registry = Registry::with_builtins();
        registry.register_resolver("upper", |v: &Value| v.is_string());
        let params = json!({"p": "name", "name": "x"});
        assert_eq!(render(&registry, "${p}", &params), json!("NAME"));
        assert_eq!(render(&registry, "${${p}}", &params), json!("X"));
        assert_eq!(render(&registry, "${p | lower}", &params), json!("name"));
    }
}

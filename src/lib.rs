pub mod errors;
pub mod context;
pub mod engine;
pub mod expression;
pub mod formatters;  // plugin model
pub mod params;
mod coerce;
mod parser;

use serde_json::Value;
use engine::Engine;
use expression::Template;
use formatters::{Formatter, Registry};

pub use coerce::stringify;
pub use errors::{FormatError, Result};
pub use formatters::PipeInput;

/// Replaces `${...}` expressions in strings using registered formatters.
///
/// ```
/// use serde_json::json;
/// use string_replacer::Replacer;
///
/// let replacer = Replacer::with_builtins();
/// let out = replacer.replace("hello ${who | upper}", &json!({"who": "world"}));
/// assert_eq!(out, "hello WORLD");
/// ```
#[derive(Clone, Default)]
pub struct Replacer {
    registry: Registry,
}

impl Replacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        Self { registry: Registry::with_builtins() }
    }

    /// Register `formatter` under `name`. `default_params` are passed when the
    /// pipe is written without parentheses, including when picked by a
    /// resolver. The same formatter may be registered under several names.
    pub fn register_formatter<F: Formatter + 'static>(
        &mut self,
        name: &str,
        formatter: F,
        default_params: Option<Vec<Value>>,
    ) -> &mut Self {
        self.registry.register(name, formatter, default_params);
        self
    }

    /// Pipe to apply to expressions written without one, when `check`
    /// accepts the looked-up value. Resolvers are tried in registration order.
    pub fn register_resolver<C>(&mut self, name: &str, check: C) -> &mut Self
    where
        C: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.registry.register_resolver(name, check);
        self
    }

    /// Render `input` against `params`. Never fails.
    pub fn replace(&self, input: &str, params: &Value) -> String {
        stringify(&self.evaluate(input, params))
    }

    /// Like [`Replacer::replace`] but an input consisting of a single
    /// expression keeps the type of its value.
    pub fn evaluate(&self, input: &str, params: &Value) -> Value {
        Engine::new(&self.registry, params).eval_template(&Template::parse(input), true)
    }

    /// Parse and evaluate a pipe parameter list such as `a, {k: ${x}}, [1, 2]`.
    pub fn parse_params(&self, raw: &str, params: &Value) -> Vec<Value> {
        Engine::new(&self.registry, params).eval_params(&crate::params::parse_params(raw))
    }
}

/// Convenience: render with the built-in formatters.
pub fn replace(input: &str, params: &Value) -> String {
    Replacer::with_builtins().replace(input, params)
}

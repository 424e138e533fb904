use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use crate::errors::Result;
use crate::expression::Pipe;

/// What a formatter receives: the bare value when the pipe has no
/// parameters, or the value together with its evaluated parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum PipeInput {
    Value(Value),
    Envelope { value: Value, params: Vec<Value> },
}

impl PipeInput {
    pub fn value(&self) -> &Value {
        match self {
            PipeInput::Value(value) | PipeInput::Envelope { value, .. } => value,
        }
    }

    pub fn params(&self) -> &[Value] {
        match self {
            PipeInput::Value(_) => &[],
            PipeInput::Envelope { params, .. } => params,
        }
    }

    pub fn param(&self, index: usize) -> Option<&Value> {
        self.params().get(index)
    }

    pub fn into_value(self) -> Value {
        match self {
            PipeInput::Value(value) | PipeInput::Envelope { value, .. } => value,
        }
    }
}

/// A named pipe transformation.
pub trait Formatter: Send + Sync {
    fn marshal(&self, input: PipeInput) -> Result<Value>;
}

impl<F> Formatter for F
where
    F: Fn(PipeInput) -> Result<Value> + Send + Sync,
{
    fn marshal(&self, input: PipeInput) -> Result<Value> {
        self(input)
    }
}

#[derive(Clone)]
pub struct Registration {
    pub formatter: Arc<dyn Formatter>,
    /// Used when the pipe is written without parentheses.
    pub default_params: Option<Vec<Value>>,
}

type Check = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Implicit pipe chosen for expressions written without one.
#[derive(Clone)]
struct Resolver {
    pipe: Pipe,
    check: Check,
}

/// Formatters by name plus resolvers in priority order.
#[derive(Clone, Default)]
pub struct Registry {
    formatters: Arc<HashMap<String, Registration>>,
    resolvers: Arc<Vec<Resolver>>,
}

impl Registry {
    pub fn new() -> Self { Self::default() }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("upper", builtins::upper, None);
        registry.register("lower", builtins::lower, None);
        registry.register("trim", builtins::trim, None);
        registry.register("orElse", builtins::or_else, None);
        registry.register("json", builtins::json, None);
        registry
    }

    /// Registering an existing name replaces both formatter and defaults.
    pub fn register<F: Formatter + 'static>(
        &mut self,
        name: &str,
        f: F,
        default_params: Option<Vec<Value>>,
    ) {
        let map = Arc::make_mut(&mut self.formatters);
        map.insert(
            name.trim().to_string(),
            Registration { formatter: Arc::new(f), default_params },
        );
    }

    /// `name` is read like a pipe segment, so `name(sort)` is allowed.
    pub fn register_resolver<C>(&mut self, name: &str, check: C)
    where
        C: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let resolvers = Arc::make_mut(&mut self.resolvers);
        resolvers.push(Resolver { pipe: Pipe::parse(name), check: Arc::new(check) });
    }

    pub fn get(&self, name: &str) -> Option<&Registration> {
        self.formatters.get(name)
    }

    /// First resolver, in registration order, that accepts `value`.
    pub fn resolve(&self, value: &Value) -> Option<&Pipe> {
        self.resolvers.iter().find(|r| (r.check)(value)).map(|r| &r.pipe)
    }
}

pub mod builtins {
    use super::*;
    use crate::coerce::type_name;
    use crate::errors::FormatError;

    fn as_str(value: &Value) -> Result<&str> {
        value.as_str().ok_or(FormatError::Type { expected: "string", got: type_name(value) })
    }

    pub fn upper(input: PipeInput) -> Result<Value> {
        Ok(Value::String(as_str(input.value())?.to_uppercase()))
    }

    pub fn lower(input: PipeInput) -> Result<Value> {
        Ok(Value::String(as_str(input.value())?.to_lowercase()))
    }

    pub fn trim(input: PipeInput) -> Result<Value> {
        Ok(Value::String(as_str(input.value())?.trim().to_string()))
    }

    /// The value unless it is absent, else the first parameter.
    pub fn or_else(input: PipeInput) -> Result<Value> {
        let fallback = input.param(0).cloned().ok_or(FormatError::MissingParam(0))?;
        Ok(match input.into_value() {
            Value::Null => fallback,
            value => value,
        })
    }

    pub fn json(input: PipeInput) -> Result<Value> {
        Ok(Value::String(input.value().to_string()))
    }
}

use serde_json::Value;
use tracing::trace;

/// Parameter object a template is evaluated against.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    params: &'a Value,
}

impl<'a> Context<'a> {
    pub fn new(params: &'a Value) -> Self {
        Self { params }
    }

    /// Follow a dot-separated path (`param.x`, `list.0.name`).
    /// Returns `Null` when any segment is missing or the path is empty.
    pub fn lookup(&self, path: &str) -> Value {
        if path.is_empty() {
            return Value::Null;
        }
        let found = path
            .split('.')
            .map(str::trim)
            .try_fold(self.params, |current, key| match current {
                Value::Object(map) => map.get(key),
                Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            });
        if found.is_none() {
            trace!(path, "unresolved path");
        }
        found.cloned().unwrap_or(Value::Null)
    }
}

use serde_json::{Map, Value};

use super::BlockTypeDefinition;

/// A block's stored attributes viewed through its type's schema.
///
/// Reads fall back to the schema default when a key is missing or when the
/// stored value does not satisfy the declared type. Typed getters never fail.
#[derive(Clone, Copy)]
pub struct Attrs<'a> {
    definition: &'a BlockTypeDefinition,
    stored: &'a Map<String, Value>,
}

static NULL: Value = Value::Null;

impl<'a> Attrs<'a> {
    pub fn new(definition: &'a BlockTypeDefinition, stored: &'a Map<String, Value>) -> Self {
        Self { definition, stored }
    }

    pub fn definition(&self) -> &'a BlockTypeDefinition {
        self.definition
    }

    /// Effective value: stored if well-typed, else default. Undeclared keys
    /// return whatever is stored, or `Null`.
    pub fn get(&self, name: &str) -> &'a Value {
        let stored = self.stored.get(name);
        match self.definition.schema.get(name) {
            Some(spec) => match stored {
                Some(value) if spec.kind.accepts(value) => value,
                Some(value) if lenient_match(spec.kind, value) => value,
                Some(_) => {
                    log::warn!(
                        "`{}` attribute `{name}` is not {}; using default",
                        self.definition.name,
                        spec.kind
                    );
                    &spec.default
                }
                None => &spec.default,
            },
            None => stored.unwrap_or(&NULL),
        }
    }

    pub fn str(&self, name: &str) -> &'a str {
        self.get(name).as_str().unwrap_or("")
    }

    pub fn bool(&self, name: &str) -> bool {
        match self.get(name) {
            Value::Bool(b) => *b,
            Value::String(s) => matches!(s.as_str(), "1" | "true"),
            Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
            _ => false,
        }
    }

    /// Integer value; numeric strings and floats are accepted, anything else
    /// yields the schema default (or 0).
    pub fn int(&self, name: &str) -> i64 {
        as_int(self.get(name))
            .or_else(|| self.default_of(name).and_then(as_int))
            .unwrap_or(0)
    }

    /// Integer clamped to `[min, max]`.
    pub fn int_clamped(&self, name: &str, min: i64, max: i64) -> i64 {
        self.int(name).clamp(min, max)
    }

    pub fn array(&self, name: &str) -> &'a [Value] {
        self.get(name).as_array().map(Vec::as_slice).unwrap_or(&[])
    }

    fn default_of(&self, name: &str) -> Option<&'a Value> {
        self.definition.schema.get(name).map(|spec| &spec.default)
    }
}

/// Storage written by older editors keeps numbers and flags as strings.
fn lenient_match(kind: super::AttrKind, value: &Value) -> bool {
    use super::AttrKind;
    match (kind, value) {
        (AttrKind::Integer, Value::String(s)) => s.trim().parse::<i64>().is_ok(),
        (AttrKind::Integer, Value::Number(n)) => n.as_f64().is_some_and(f64::is_finite),
        (AttrKind::Number, Value::String(s)) => s.trim().parse::<f64>().is_ok_and(f64::is_finite),
        (AttrKind::Boolean, Value::String(s)) => matches!(s.as_str(), "1" | "0" | "true" | "false"),
        (AttrKind::Boolean, Value::Number(_)) => true,
        _ => false,
    }
}

fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

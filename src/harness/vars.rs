use serde_json::{Map, Value};

use crate::utils::error::Error;

/// Variable table used to resolve `{name}` placeholders in a request spec.
///
/// Substitution always produces a fresh deep copy of the input, so a caller
/// can keep one substituted copy untouched while another is consumed
/// destructively.
#[derive(Debug, Default, Clone)]
pub struct VarMap {
    vars: Map<String, Value>,
}

impl VarMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a variable, replacing any previous value under `name`.
    pub fn insert(&mut self, name: &str, value: Value) {
        self.vars.insert(name.to_string(), value);
    }

    /// Substitutes every placeholder in `spec`, returning an independent copy.
    pub fn format_map(&self, spec: &Map<String, Value>) -> Result<Map<String, Value>, Error> {
        spec.iter()
            .map(|(key, value)| Ok((key.clone(), self.format_value(value)?)))
            .collect()
    }

    /// Substitutes placeholders in one value, recursing through collections.
    pub fn format_value(&self, value: &Value) -> Result<Value, Error> {
        match value {
            Value::String(text) => self.format_str(text),
            Value::Array(items) => items
                .iter()
                .map(|item| self.format_value(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Value::Object(map) => self.format_map(map).map(Value::Object),
            other => Ok(other.clone()),
        }
    }

    fn format_str(&self, raw: &str) -> Result<Value, Error> {
        // A string that is exactly one `{name}` token takes the variable's
        // value with its type preserved, so `qos: "{level}"` can resolve to
        // an integer.
        if let Some(name) = raw.strip_prefix('{').and_then(|rest| rest.strip_suffix('}')) {
            if !name.contains(['{', '}']) {
                return match self.vars.get(name) {
                    Some(value) => Ok(value.clone()),
                    None => Err(Error::MissingVariable {
                        name: name.to_string(),
                    }),
                };
            }
        }

        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            match after.find('}') {
                Some(end) => {
                    let name = &after[..end];
                    let value = self.vars.get(name).ok_or_else(|| Error::MissingVariable {
                        name: name.to_string(),
                    })?;
                    out.push_str(&render(value));
                    rest = &after[end + 1..];
                }
                None => {
                    // no closing brace, keep the text as written
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);

        Ok(Value::String(out))
    }
}

/// Text rendition of a variable spliced into a larger string.
fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

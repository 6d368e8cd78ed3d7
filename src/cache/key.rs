//! Key Derivation Module
//!
//! Turns a callee identity and its arguments into a stable cache key.

use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::cache::finite::ensure_finite;
use crate::cache::KEY_PREFIX;
use crate::error::{CacheError, Result};

// == Call Arguments ==
/// Positional and keyword arguments of a memoized call.
///
/// Values are converted to JSON as they are added, so a non-serializable
/// argument fails at the call site rather than during lookup.
///
/// Sets should be passed as ordered collections (`BTreeSet`, sorted `Vec`):
/// hash-ordered sets serialize as sequences in iteration order. Maps of any
/// kind are fine since object keys are sorted during canonicalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    args: Vec<Value>,
    kwargs: Map<String, Value>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an argument pack from values already in JSON form.
    pub fn from_values(args: Vec<Value>, kwargs: Map<String, Value>) -> Self {
        Self { args, kwargs }
    }

    /// Appends a positional argument.
    pub fn arg<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self> {
        self.args.push(to_json(value)?);
        Ok(self)
    }

    /// Sets a keyword argument, replacing any previous value under `name`.
    pub fn kwarg<T: Serialize + ?Sized>(mut self, name: &str, value: &T) -> Result<Self> {
        self.kwargs.insert(name.to_string(), to_json(value)?);
        Ok(self)
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn kwargs(&self) -> &Map<String, Value> {
        &self.kwargs
    }

    // == Canonical Form ==
    /// Compact JSON `[args, kwargs]` with every object's keys sorted.
    pub fn canonical(&self) -> Result<String> {
        let kwargs = Value::Object(self.kwargs.clone());
        let canonical = Value::Array(vec![
            Value::Array(self.args.iter().map(sort_keys).collect()),
            sort_keys(&kwargs),
        ]);
        serde_json::to_string(&canonical).map_err(|e| CacheError::Serialization(e.to_string()))
    }
}

// == Derive Key ==
/// Derives `func:<callee>:<hex sha256 of canonical args>`.
pub fn derive_key(callee: &str, args: &CallArgs) -> Result<String> {
    let canonical = args.canonical()?;
    let digest = Sha256::digest(canonical.as_bytes());
    Ok(format!("{}:{}:{}", KEY_PREFIX, callee, hex::encode(digest)))
}

/// NaN and infinities are rejected: serde_json would turn them into `null`
/// and collide with `None`.
fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    ensure_finite(value)?;
    serde_json::to_value(value).map_err(|e| CacheError::Serialization(e.to_string()))
}

/// Rebuilds objects with keys in lexicographic order, recursively.
///
/// serde_json may be built with `preserve_order`, in which case `Map` keeps
/// insertion order; sorting here keeps the digest independent of that.
fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sort_keys(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

//! Value - A node of the observable data graph.
//!
//! Primitives are leaves. Objects and arrays are always reactive containers:
//! there is no way to hold a plain, unobserved container inside the graph, so
//! anything assigned into an observable property is already observed by the
//! time it is stored.
//!
//! Plain data enters the graph through [`observe`] (or the equivalent
//! `From<serde_json::Value>` impl), which recursively wraps every object and
//! array it finds.

use std::fmt;

use serde_json::{Map, Number};

use super::array::ReactiveArray;
use super::object::ReactiveObject;
use super::tracking::untracked;

/// A value stored in an observable property.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(ReactiveArray),
    Object(ReactiveObject),
}

/// Make plain data observable.
///
/// Primitives pass through unchanged. Objects have every property replaced by
/// an observable one; arrays have every element observed recursively.
pub fn observe(data: serde_json::Value) -> Value {
    match data {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => {
            Value::Array(ReactiveArray::from_values(items.into_iter().map(observe)))
        }
        serde_json::Value::Object(map) => {
            let object = ReactiveObject::new();
            for (key, value) in map {
                object.define(key, observe(value));
            }
            Value::Object(object)
        }
    }
}

impl Value {
    /// Identity comparison used by the intercepted setter.
    ///
    /// Primitives compare by value (`NaN` is never the same as itself);
    /// containers compare by identity, so a structurally equal but distinct
    /// object still counts as a change.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ReactiveObject> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ReactiveArray> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Read `key` if this is an object, `Null` otherwise.
    pub fn get(&self, key: &str) -> Value {
        match self {
            Value::Object(object) => object.get(key),
            Value::Array(array) => key
                .parse::<usize>()
                .map(|index| array.get(index))
                .unwrap_or_default(),
            _ => Value::Null,
        }
    }

    /// Walk a dotted path (`"todos.0.title"`); numeric segments index arrays.
    ///
    /// Every property along the way is a tracked read. Missing segments read
    /// as `Null`.
    pub fn get_path(&self, path: &str) -> Value {
        path.split('.')
            .filter(|segment| !segment.is_empty())
            .fold(self.clone(), |current, segment| current.get(segment))
    }

    /// Write through a dotted path. Returns `false` (and does nothing) when any
    /// segment is missing or the value did not change.
    pub fn set_path(&self, path: &str, value: impl Into<Value>) -> bool {
        let mut segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
        let Some(last) = segments.pop() else {
            return false;
        };
        let parent = segments
            .into_iter()
            .fold(self.clone(), |current, segment| current.get(segment));
        match parent {
            Value::Object(object) => object.set(last, value),
            Value::Array(array) => match last.parse::<usize>() {
                Ok(index) => array.set(index, value),
                Err(_) => false,
            },
            _ => false,
        }
    }

    /// Snapshot back to plain data. Every property visited is a tracked read.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(array) => {
                serde_json::Value::Array(array.to_vec().iter().map(Value::to_json).collect())
            }
            Value::Object(object) => {
                let mut map = Map::new();
                for (key, value) in object.entries() {
                    map.insert(key, value.to_json());
                }
                serde_json::Value::Object(map)
            }
        }
    }
}

/// Integral numbers go back out as integers; non-finite ones become `null`.
fn number_to_json(n: f64) -> serde_json::Value {
    const MAX_SAFE: f64 = 9_007_199_254_740_991.0;
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE {
        return serde_json::Value::Number(Number::from(n as i64));
    }
    Number::from_f64(n)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

/// Identity equality, the same comparison the intercepted setter uses.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Array(array) => fmt::Debug::fmt(array, f),
            Value::Object(object) => fmt::Debug::fmt(object, f),
        }
    }
}

/// Text used when a value is interpolated into a virtual tree.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
            Value::Array(_) | Value::Object(_) => write!(f, "{}", untracked(|| self.to_json())),
        }
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<serde_json::Value> for Value {
    fn from(data: serde_json::Value) -> Self {
        observe(data)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<ReactiveObject> for Value {
    fn from(object: ReactiveObject) -> Self {
        Value::Object(object)
    }
}

impl From<ReactiveArray> for Value {
    fn from(array: ReactiveArray) -> Self {
        Value::Array(array)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

//! Proxy - Top-level forwarding from a context to its backing data.
//!
//! [`proxy_top_level`] snapshots the keys of a data object and produces a
//! [`Proxy`] that forwards `get`/`set` for exactly those keys. It has no
//! dependency tracking of its own: every forwarded access goes through the
//! backing object's observable properties.

use indexmap::IndexSet;

use super::object::ReactiveObject;
use super::value::Value;

/// Forwarding accessor over a [`ReactiveObject`].
#[derive(Clone, Debug)]
pub struct Proxy {
    source: ReactiveObject,
    keys: IndexSet<String>,
}

/// Define forwarding accessors for every own key of `source`.
pub fn proxy_top_level(source: &ReactiveObject) -> Proxy {
    Proxy {
        source: source.clone(),
        keys: source.keys().into_iter().collect(),
    }
}

impl Proxy {
    /// Forwarded read. Keys that were not present when the proxy was built
    /// read as `Null`.
    pub fn get(&self, key: &str) -> Value {
        if self.keys.contains(key) {
            self.source.get(key)
        } else {
            Value::Null
        }
    }

    /// Forwarded write. Unknown keys are ignored.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> bool {
        self.keys.contains(key) && self.source.set(key, value)
    }

    /// Dotted-path read starting at the backing object.
    pub fn get_path(&self, path: &str) -> Value {
        self.source.get_path(path)
    }

    /// Dotted-path write starting at the backing object.
    pub fn set_path(&self, path: &str, value: impl Into<Value>) -> bool {
        self.source.set_path(path, value)
    }

    /// Whether `key` is forwarded.
    pub fn has(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// The backing data object.
    pub fn data(&self) -> &ReactiveObject {
        &self.source
    }
}

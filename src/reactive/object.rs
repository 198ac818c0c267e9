//! ReactiveObject - A container of observable properties.
//!
//! Each property owns its current [`Value`] and a [`Dep`]. Reading through
//! [`ReactiveObject::get`] records a dependency; writing through
//! [`ReactiveObject::set`] compares by identity and, on change, stores the new
//! value and notifies.
//!
//! The set of keys is fixed by [`define`](ReactiveObject::define) calls
//! (normally made once by [`observe`](super::observe)). Reads of unknown keys
//! return `Null` and writes to unknown keys are silent no-ops.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::trace;

use super::dep::Dep;
use super::tracking::untracked;
use super::value::Value;

/// One intercepted (container, key) slot.
struct Property {
    value: RefCell<Value>,
    dep: Dep,
}

impl Property {
    fn new(key: &str, value: Value) -> Self {
        Self {
            value: RefCell::new(value),
            dep: Dep::new(key),
        }
    }

    fn get(&self) -> Value {
        trace!(key = self.dep.label(), "get");
        self.dep.depend();
        self.value.borrow().clone()
    }

    fn set(&self, value: Value) -> bool {
        if self.value.borrow().same(&value) {
            return false;
        }
        trace!(key = self.dep.label(), "set");
        *self.value.borrow_mut() = value;
        self.dep.notify();
        true
    }
}

/// Object whose every property is observable.
///
/// Cloning shares the same underlying object (identity is preserved).
#[derive(Clone, Default)]
pub struct ReactiveObject {
    props: Rc<RefCell<IndexMap<String, Rc<Property>>>>,
}

impl ReactiveObject {
    /// An object with no properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an object from `(key, value)` pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let object = Self::new();
        for (key, value) in pairs {
            object.define(key, value);
        }
        object
    }

    /// Define an observable property.
    ///
    /// Defining a key that already exists behaves like [`set`](Self::set).
    pub fn define(&self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        if let Some(existing) = self.property(&key) {
            existing.set(value);
            return;
        }
        let property = Rc::new(Property::new(&key, value));
        self.props.borrow_mut().insert(key, property);
    }

    // Clone the property handle out so no map borrow is held while a
    // notification re-enters this object.
    fn property(&self, key: &str) -> Option<Rc<Property>> {
        self.props.borrow().get(key).cloned()
    }

    /// Intercepted read. Missing keys read as `Null` and record nothing.
    pub fn get(&self, key: &str) -> Value {
        self.property(key)
            .map(|property| property.get())
            .unwrap_or_default()
    }

    /// Intercepted write.
    ///
    /// Returns `true` if the value changed and subscribers were notified;
    /// `false` when the key is unknown or the value is the same.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> bool {
        match self.property(key) {
            Some(property) => property.set(value.into()),
            None => {
                trace!(key, "set on unknown key ignored");
                false
            }
        }
    }

    /// Whether `key` is an observable property of this object (untracked).
    pub fn contains_key(&self, key: &str) -> bool {
        self.props.borrow().contains_key(key)
    }

    /// Property names in definition order (untracked).
    pub fn keys(&self) -> Vec<String> {
        self.props.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.props.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.borrow().is_empty()
    }

    /// All properties as `(key, value)`; every value read is tracked.
    pub fn entries(&self) -> Vec<(String, Value)> {
        let props: Vec<(String, Rc<Property>)> = self
            .props
            .borrow()
            .iter()
            .map(|(key, property)| (key.clone(), Rc::clone(property)))
            .collect();
        props
            .into_iter()
            .map(|(key, property)| (key, property.get()))
            .collect()
    }

    /// The dependency set behind `key`.
    pub fn dep_of(&self, key: &str) -> Option<Dep> {
        self.property(key).map(|property| property.dep.clone())
    }

    /// See [`Value::get_path`].
    pub fn get_path(&self, path: &str) -> Value {
        Value::Object(self.clone()).get_path(path)
    }

    /// See [`Value::set_path`].
    pub fn set_path(&self, path: &str, value: impl Into<Value>) -> bool {
        Value::Object(self.clone()).set_path(path, value)
    }

    /// Snapshot to plain data (tracked).
    pub fn to_json(&self) -> serde_json::Value {
        Value::Object(self.clone()).to_json()
    }

    /// Whether both handles point at the same object.
    pub fn ptr_eq(&self, other: &ReactiveObject) -> bool {
        Rc::ptr_eq(&self.props, &other.props)
    }
}

impl fmt::Debug for ReactiveObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReactiveObject({})", untracked(|| self.to_json()))
    }
}

//! ReactiveArray - Arrays whose reads and structural writes are observed.
//!
//! An array carries a single structural [`Dep`]. Every read (`len`, `get`,
//! `to_vec`) depends on it and every mutation (`push`, `pop`, `insert`,
//! `remove`, index assignment through `set`, `clear`) notifies it. Values are
//! observed before they are stored, so an object pushed into an array is
//! reactive immediately.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use super::dep::Dep;
use super::tracking::untracked;
use super::value::Value;

struct ArrayInner {
    items: RefCell<Vec<Value>>,
    dep: Dep,
}

/// Observable array. Cloning shares the same array.
#[derive(Clone)]
pub struct ReactiveArray {
    inner: Rc<ArrayInner>,
}

impl Default for ReactiveArray {
    fn default() -> Self {
        Self::new()
    }
}

impl ReactiveArray {
    pub fn new() -> Self {
        Self::from_values(std::iter::empty())
    }

    /// Build an array from already observed values.
    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            inner: Rc::new(ArrayInner {
                items: RefCell::new(values.into_iter().collect()),
                dep: Dep::new("[]"),
            }),
        }
    }

    /// The structural dependency set of this array.
    pub fn dep(&self) -> Dep {
        self.inner.dep.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.dep.depend();
        self.inner.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index`, or `Null` past the end.
    pub fn get(&self, index: usize) -> Value {
        self.inner.dep.depend();
        self.inner
            .items
            .borrow()
            .get(index)
            .cloned()
            .unwrap_or_default()
    }

    /// Copy of all elements.
    pub fn to_vec(&self) -> Vec<Value> {
        self.inner.dep.depend();
        self.inner.items.borrow().clone()
    }

    fn changed(&self, op: &'static str) {
        trace!(op, "array mutated");
        self.inner.dep.notify();
    }

    pub fn push(&self, value: impl Into<Value>) {
        self.inner.items.borrow_mut().push(value.into());
        self.changed("push");
    }

    pub fn pop(&self) -> Option<Value> {
        let popped = self.inner.items.borrow_mut().pop();
        if popped.is_some() {
            self.changed("pop");
        }
        popped
    }

    /// Insert at `index`. Returns `false` (and does nothing) past the end.
    pub fn insert(&self, index: usize, value: impl Into<Value>) -> bool {
        {
            let mut items = self.inner.items.borrow_mut();
            if index > items.len() {
                return false;
            }
            items.insert(index, value.into());
        }
        self.changed("insert");
        true
    }

    pub fn remove(&self, index: usize) -> Option<Value> {
        let removed = {
            let mut items = self.inner.items.borrow_mut();
            (index < items.len()).then(|| items.remove(index))
        };
        if removed.is_some() {
            self.changed("remove");
        }
        removed
    }

    /// Index assignment. Out-of-range indices and identical values are no-ops.
    pub fn set(&self, index: usize, value: impl Into<Value>) -> bool {
        let value = value.into();
        {
            let mut items = self.inner.items.borrow_mut();
            match items.get_mut(index) {
                Some(slot) if !slot.same(&value) => *slot = value,
                _ => return false,
            }
        }
        self.changed("set");
        true
    }

    pub fn clear(&self) {
        let was_empty = {
            let mut items = self.inner.items.borrow_mut();
            let was_empty = items.is_empty();
            items.clear();
            was_empty
        };
        if !was_empty {
            self.changed("clear");
        }
    }

    /// Whether both handles point at the same array.
    pub fn ptr_eq(&self, other: &ReactiveArray) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ReactiveArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ReactiveArray({})",
            untracked(|| Value::Array(self.clone()).to_json())
        )
    }
}

//! Runtime reflection over opaque internal state.
//!
//! A host viewer keeps its internals in slots addressed by `Symbol`s: unique,
//! unnamed keys that cannot be looked up by a string. Slot values expose only
//! structural information through `Reflect`: named fields and marker flags.
//! Nothing here depends on the concrete type stored in a slot.

use std::{
    any::Any,
    fmt,
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

static NEXT_SYMBOL: AtomicU64 = AtomicU64::new(1);

/// A unique slot key. Two symbols with the same description are still distinct.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    id: u64,
    description: Option<&'static str>,
}

impl Symbol {
    pub fn new(description: Option<&'static str>) -> Self {
        Self {
            id: NEXT_SYMBOL.fetch_add(1, Ordering::Relaxed),
            description,
        }
    }

    /// Debug description only. Must never be used to identify a slot.
    pub fn description(&self) -> Option<&'static str> {
        self.description
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description().unwrap_or(""))
    }
}

/// Structural view of a value stored behind a `Symbol`.
pub trait Reflect: Any {
    /// Value of a named field, if the object has one.
    fn field(&self, _name: &str) -> Option<Rc<dyn Reflect>> {
        None
    }

    /// Whether a boolean marker such as `isScene` or `isTexture` is set.
    fn flag(&self, _marker: &str) -> bool {
        false
    }
}

/// Recovers the concrete value once its shape has been checked.
pub fn downcast<T: Any>(value: Rc<dyn Reflect>) -> Option<Rc<T>> {
    let value: Rc<dyn Any> = value;
    value.downcast::<T>().ok()
}

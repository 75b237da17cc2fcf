use log::warn;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Shared handle to a [`Parameter`].
///
/// Modules hand out clones of this handle, so an update made through the
/// handle returned by `add_parameter` is visible from the module and vice versa.
pub type ParamRef<V> = Arc<RwLock<Parameter<V>>>;

/// Hooks a value can implement to be told that it became a learnable parameter.
///
/// Both hooks default to no-ops, so any plain value can be stored in a
/// [`Parameter`]. Tensor-like values override them to turn on gradient
/// tracking and to carry the parameter name for debugging.
pub trait ParameterValue {
    /// Called with `true` whenever the value is wrapped or replaced.
    fn set_requires_grad(&mut self, _requires_grad: bool) {}

    /// Called with the parameter name, if the parameter has a non-empty one.
    fn set_name(&mut self, _name: &str) {}
}

macro_rules! impl_plain_parameter_value {
    ($($t:ty),* $(,)?) => {
        $(impl ParameterValue for $t {})*
    };
}

impl_plain_parameter_value!(
    f32, f64, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, bool, char, String,
);

impl<T> ParameterValue for Vec<T> {}

impl<T: ParameterValue> ParameterValue for Option<T> {
    fn set_requires_grad(&mut self, requires_grad: bool) {
        if let Some(inner) = self {
            inner.set_requires_grad(requires_grad);
        }
    }

    fn set_name(&mut self, name: &str) {
        if let Some(inner) = self {
            inner.set_name(name);
        }
    }
}

impl<T: ParameterValue + ?Sized> ParameterValue for Box<T> {
    fn set_requires_grad(&mut self, requires_grad: bool) {
        (**self).set_requires_grad(requires_grad);
    }

    fn set_name(&mut self, name: &str) {
        (**self).set_name(name);
    }
}

/// A named wrapper around a value indicating it is a learnable parameter of a Module.
///
/// Wrapping (and every later [`update`](Parameter::update)) calls
/// `set_requires_grad(true)` on the value and tags it with the parameter name.
#[derive(Clone, PartialEq)]
pub struct Parameter<V> {
    value: V,
    name: Option<String>,
}

impl<V: ParameterValue> Parameter<V> {
    /// Creates a new Parameter from a value and an optional name.
    pub fn new(value: V, name: Option<String>) -> Self {
        let mut param = Parameter { value, name };
        param.tag_value();
        param
    }

    /// Creates a new Parameter carrying `name`.
    pub fn named(value: V, name: impl Into<String>) -> Self {
        Self::new(value, Some(name.into()))
    }

    /// Creates a new Parameter without a name.
    pub fn new_unnamed(value: V) -> Self {
        Self::new(value, None)
    }

    /// Replaces the held value, re-applying the parameter hooks to the new one.
    pub fn update(&mut self, value: V) {
        self.value = value;
        self.tag_value();
    }

    /// Moves the Parameter behind a shared [`ParamRef`] handle.
    pub fn into_shared(self) -> ParamRef<V> {
        Arc::new(RwLock::new(self))
    }

    fn tag_value(&mut self) {
        self.value.set_requires_grad(true);
        // An empty name does not tag.
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            self.value.set_name(name);
        }
    }
}

impl<V> Parameter<V> {
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Mutable access to the held value. Unlike [`update`](Parameter::update),
    /// this does not re-run the parameter hooks.
    pub fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Consumes the Parameter and returns the underlying value.
    pub fn into_inner(self) -> V {
        self.value
    }
}

// Allow accessing the underlying value via Deref.
impl<V> Deref for Parameter<V> {
    type Target = V;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<V> DerefMut for Parameter<V> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.value
    }
}

impl<V: fmt::Debug> fmt::Debug for Parameter<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parameter({:?})", self.value)
    }
}

impl<V: fmt::Display> fmt::Display for Parameter<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value, f)
    }
}

/// Read-locks a shared parameter, recovering the guard if the lock was poisoned.
pub fn read_param<V>(param: &ParamRef<V>) -> RwLockReadGuard<'_, Parameter<V>> {
    param.read().unwrap_or_else(|poisoned| {
        warn!("RwLock for parameter was poisoned on read. Recovering reader guard.");
        poisoned.into_inner()
    })
}

/// Write-locks a shared parameter, recovering the guard if the lock was poisoned.
pub fn write_param<V>(param: &ParamRef<V>) -> RwLockWriteGuard<'_, Parameter<V>> {
    param.write().unwrap_or_else(|poisoned| {
        warn!("RwLock for parameter was poisoned on write. Recovering writer guard.");
        poisoned.into_inner()
    })
}

#[cfg(test)]
#[path = "parameter_test.rs"]
mod tests;

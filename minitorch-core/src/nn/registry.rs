use crate::error::MiniTorchError;
use crate::nn::attribute::{AttrRef, Attribute, AttributeKind};
use crate::nn::module::Module;
use crate::nn::parameter::{ParamRef, Parameter, ParameterValue};
use indexmap::IndexMap;
use log::{debug, warn};
use std::any::{type_name, Any};
use std::fmt;

/// Separator between the segments of a dotted path (`"layer1.weight"`).
pub const PATH_SEPARATOR: char = '.';

/// The registry every module carries: child modules, parameters and plain
/// values, each kept in insertion order, plus the local training flag.
///
/// A name is registered in at most one of the three mappings.
pub struct ModuleState<V: ParameterValue> {
    modules: IndexMap<String, Box<dyn Module<V>>>,
    parameters: IndexMap<String, ParamRef<V>>,
    values: IndexMap<String, Box<dyn Any + Send + Sync>>,
    training: bool,
}

impl<V: ParameterValue> ModuleState<V> {
    /// Creates an empty registry in training mode.
    pub fn new() -> Self {
        ModuleState {
            modules: IndexMap::new(),
            parameters: IndexMap::new(),
            values: IndexMap::new(),
            training: true,
        }
    }

    pub fn is_training(&self) -> bool {
        self.training
    }

    pub fn set_training(&mut self, training: bool) {
        self.training = training;
    }

    /// Direct child modules keyed by local name.
    pub fn children(&self) -> &IndexMap<String, Box<dyn Module<V>>> {
        &self.modules
    }

    pub(crate) fn children_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Module<V>>> {
        self.modules.values_mut()
    }

    /// Local parameters keyed by local name.
    pub fn parameters(&self) -> &IndexMap<String, ParamRef<V>> {
        &self.parameters
    }

    pub fn value_names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Which mapping, if any, holds `name`.
    pub fn kind_of(&self, name: &str) -> Option<AttributeKind> {
        if self.parameters.contains_key(name) {
            Some(AttributeKind::Parameter)
        } else if self.modules.contains_key(name) {
            Some(AttributeKind::Module)
        } else if self.values.contains_key(name) {
            Some(AttributeKind::Value)
        } else {
            None
        }
    }

    /// Files `attr` under `name` in the mapping matching its kind.
    ///
    /// Reassigning a name of the same kind replaces the entry and keeps its
    /// position. A name already held by another kind is rejected.
    pub fn insert(
        &mut self,
        name: &str,
        attr: impl Into<Attribute<V>>,
    ) -> Result<(), MiniTorchError> {
        validate_name(name)?;
        let attr = attr.into();
        let kind = attr.kind();
        match self.kind_of(name) {
            Some(existing) if existing != kind => {
                return Err(MiniTorchError::NameConflict {
                    name: name.to_string(),
                    existing,
                });
            }
            Some(_) => warn!("Replacing {} '{}'", kind, name),
            None => debug!("Registering {} '{}'", kind, name),
        }

        match attr {
            Attribute::Parameter(param) => {
                self.parameters.insert(name.to_string(), param);
            }
            Attribute::Module(module) => {
                self.modules.insert(name.to_string(), module);
            }
            Attribute::Value(value) => {
                self.values.insert(name.to_string(), value);
            }
        }
        Ok(())
    }

    /// Wraps `value` in a Parameter named `name`, registers it and returns
    /// the shared handle stored in the registry.
    pub fn add_parameter(&mut self, name: &str, value: V) -> Result<ParamRef<V>, MiniTorchError> {
        let param = Parameter::named(value, name).into_shared();
        self.insert(name, Attribute::Parameter(param.clone()))?;
        Ok(param)
    }

    /// Removes `name` from whichever mapping holds it. Later entries keep
    /// their relative order.
    pub fn remove(&mut self, name: &str) -> Option<Attribute<V>> {
        let removed = if let Some(param) = self.parameters.shift_remove(name) {
            Some(Attribute::Parameter(param))
        } else if let Some(module) = self.modules.shift_remove(name) {
            Some(Attribute::Module(module))
        } else {
            self.values.shift_remove(name).map(Attribute::Value)
        };
        if removed.is_some() {
            debug!("Removed attribute '{}'", name);
        }
        removed
    }

    /// Looks `name` up in parameters, then submodules, then plain values.
    /// An unknown name is a silent miss.
    pub fn get(&self, name: &str) -> Option<AttrRef<'_, V>> {
        if let Some(param) = self.parameters.get(name) {
            return Some(AttrRef::Parameter(param.clone()));
        }
        if let Some(module) = self.modules.get(name) {
            return Some(AttrRef::Module(module.as_ref()));
        }
        self.values
            .get(name)
            .map(|value| AttrRef::Value(value.as_ref()))
    }

    pub fn child(&self, name: &str) -> Option<&dyn Module<V>> {
        self.modules.get(name).map(|m| m.as_ref())
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut (dyn Module<V> + 'static)> {
        self.modules.get_mut(name).map(|m| m.as_mut())
    }

    pub fn parameter(&self, name: &str) -> Option<ParamRef<V>> {
        self.parameters.get(name).cloned()
    }

    /// Typed access to a plain value.
    pub fn value_attr<T: Any>(&self, name: &str) -> Result<&T, MiniTorchError> {
        let type_error = || MiniTorchError::AttributeType {
            name: name.to_string(),
            expected: type_name::<T>().to_string(),
        };
        match self.get(name) {
            Some(AttrRef::Value(value)) => value.downcast_ref::<T>().ok_or_else(type_error),
            Some(_) => Err(type_error()),
            None => Err(MiniTorchError::UnknownAttribute {
                name: name.to_string(),
            }),
        }
    }
}

impl<V: ParameterValue> Default for ModuleState<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: ParameterValue> fmt::Debug for ModuleState<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleState")
            .field("modules", &self.modules)
            .field("parameters", &self.parameters.keys().collect::<Vec<_>>())
            .field("values", &self.values.keys().collect::<Vec<_>>())
            .field("training", &self.training)
            .finish()
    }
}

fn validate_name(name: &str) -> Result<(), MiniTorchError> {
    let reason = if name.is_empty() {
        "name must not be empty"
    } else if name.contains(PATH_SEPARATOR) {
        "name must not contain '.'"
    } else {
        return Ok(());
    };
    Err(MiniTorchError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    })
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;

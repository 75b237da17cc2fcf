use crate::nn::module::Module;
use crate::nn::parameter::{ParamRef, Parameter, ParameterValue};
use std::any::Any;
use std::fmt;

/// Which of the three mappings of a module an attribute lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Parameter,
    Module,
    Value,
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AttributeKind::Parameter => "parameter",
            AttributeKind::Module => "submodule",
            AttributeKind::Value => "plain value",
        };
        f.write_str(s)
    }
}

/// A value assigned to a module attribute.
///
/// The variant decides where [`ModuleState::insert`](crate::nn::ModuleState::insert)
/// files it: parameters and submodules go to their registries, anything else is
/// kept as a plain value.
pub enum Attribute<V: ParameterValue> {
    Parameter(ParamRef<V>),
    Module(Box<dyn Module<V>>),
    Value(Box<dyn Any + Send + Sync>),
}

impl<V: ParameterValue> Attribute<V> {
    pub fn parameter(param: Parameter<V>) -> Self {
        Attribute::Parameter(param.into_shared())
    }

    pub fn module<M: Module<V> + 'static>(module: M) -> Self {
        Attribute::Module(Box::new(module))
    }

    pub fn value<T: Any + Send + Sync>(value: T) -> Self {
        Attribute::Value(Box::new(value))
    }

    pub fn kind(&self) -> AttributeKind {
        match self {
            Attribute::Parameter(_) => AttributeKind::Parameter,
            Attribute::Module(_) => AttributeKind::Module,
            Attribute::Value(_) => AttributeKind::Value,
        }
    }
}

impl<V: ParameterValue> From<Parameter<V>> for Attribute<V> {
    fn from(param: Parameter<V>) -> Self {
        Attribute::parameter(param)
    }
}

impl<V: ParameterValue> From<ParamRef<V>> for Attribute<V> {
    fn from(param: ParamRef<V>) -> Self {
        Attribute::Parameter(param)
    }
}

impl<V: ParameterValue> From<Box<dyn Module<V>>> for Attribute<V> {
    fn from(module: Box<dyn Module<V>>) -> Self {
        Attribute::Module(module)
    }
}

impl<V: ParameterValue> fmt::Debug for Attribute<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Parameter(_) => f.write_str("Attribute::Parameter(..)"),
            Attribute::Module(m) => write!(f, "Attribute::Module({:?})", m),
            Attribute::Value(_) => f.write_str("Attribute::Value(..)"),
        }
    }
}

/// Result of an attribute lookup on a module.
pub enum AttrRef<'a, V: ParameterValue> {
    Parameter(ParamRef<V>),
    Module(&'a dyn Module<V>),
    Value(&'a (dyn Any + Send + Sync)),
}

impl<'a, V: ParameterValue> AttrRef<'a, V> {
    pub fn kind(&self) -> AttributeKind {
        match self {
            AttrRef::Parameter(_) => AttributeKind::Parameter,
            AttrRef::Module(_) => AttributeKind::Module,
            AttrRef::Value(_) => AttributeKind::Value,
        }
    }

    pub fn as_parameter(&self) -> Option<&ParamRef<V>> {
        match self {
            AttrRef::Parameter(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_module(&self) -> Option<&'a dyn Module<V>> {
        match self {
            AttrRef::Module(m) => Some(*m),
            _ => None,
        }
    }

    /// Downcasts a plain value. Parameters and submodules yield `None`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&'a T> {
        match self {
            AttrRef::Value(v) => {
                let value: &'a (dyn Any + Send + Sync) = *v;
                value.downcast_ref::<T>()
            }
            _ => None,
        }
    }
}

impl<V: ParameterValue> fmt::Debug for AttrRef<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrRef::Parameter(_) => f.write_str("AttrRef::Parameter(..)"),
            AttrRef::Module(m) => write!(f, "AttrRef::Module({:?})", m),
            AttrRef::Value(_) => f.write_str("AttrRef::Value(..)"),
        }
    }
}

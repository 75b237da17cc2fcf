// src/nn/mod.rs
// Modules, parameters and the registry that ties them into a tree.

pub mod attribute; // Attribute / AttrRef
pub mod module; // Trait Module
pub mod parameter; // struct Parameter
pub mod registry; // struct ModuleState

// Re-export common items
pub use attribute::{AttrRef, Attribute, AttributeKind};
pub use module::{Forward, Module};
pub use parameter::{read_param, write_param, ParamRef, Parameter, ParameterValue};
pub use registry::{ModuleState, PATH_SEPARATOR};

//! Module and parameter registry for the minitorch teaching framework.
//!
//! Modules form a tree that stores parameters and other submodules. The tree
//! can be walked to enumerate parameters by dotted path and to switch every
//! node between training and evaluation mode.

pub mod error;
pub mod nn;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::MiniTorchError;
pub use nn::{Attribute, AttrRef, Forward, Module, ModuleState, ParamRef, Parameter, ParameterValue};

use crate::nn::attribute::AttributeKind;
use thiserror::Error;

/// Custom error type for the minitorch module registry.
#[derive(Error, Debug, PartialEq, Clone)] // PartialEq for easier testing
pub enum MiniTorchError {
    #[error("Unknown attribute '{name}': no parameter, submodule or value is registered under this name")]
    UnknownAttribute { name: String },

    #[error("Unknown submodule at path '{path}'")]
    UnknownModule { path: String },

    #[error("Unknown parameter at path '{path}'")]
    UnknownParameter { path: String },

    #[error("Name conflict: '{name}' is already registered as a {existing}")]
    NameConflict { name: String, existing: AttributeKind },

    #[error("Invalid attribute name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Attribute '{name}' is not a value of type {expected}")]
    AttributeType { name: String, expected: String },

    #[error("Missing keys in state dict: {keys:?}")]
    MissingKeys { keys: Vec<String> },

    #[error("Unexpected keys in state dict: {keys:?}")]
    UnexpectedKeys { keys: Vec<String> },
}

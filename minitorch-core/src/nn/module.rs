use crate::error::MiniTorchError;
use crate::nn::attribute::{AttrRef, Attribute};
use crate::nn::parameter::{read_param, write_param, ParamRef, ParameterValue};
use crate::nn::registry::{ModuleState, PATH_SEPARATOR};
use indexmap::IndexMap;
use log::{debug, trace};
use std::any::Any;
use std::fmt;

/// The base trait for all neural network modules (layers, containers, etc.).
///
/// Modules form a tree that stores parameters and other submodules. An
/// implementor only exposes its [`ModuleState`]; traversal, mode switching,
/// registration and lookup are provided on top of it.
pub trait Module<V: ParameterValue>: fmt::Debug + Send + Sync {
    fn state(&self) -> &ModuleState<V>;

    fn state_mut(&mut self) -> &mut ModuleState<V>;

    /// Name used by [`repr`](Module::repr). Defaults to the short type name.
    fn module_name(&self) -> String {
        short_type_name(std::any::type_name::<Self>()).to_string()
    }

    /// Whether this module is in training mode.
    fn is_training(&self) -> bool {
        self.state().is_training()
    }

    /// Sets the local training flag only. Descendants are left untouched.
    fn set_training(&mut self, training: bool) {
        self.state_mut().set_training(training);
    }

    /// Sets this module and all descendant modules to training mode.
    fn train(&mut self) {
        trace!("{}: train()", self.module_name());
        self.set_training(true);
        for child in self.state_mut().children_mut() {
            child.train();
        }
    }

    /// Sets this module and all descendant modules to evaluation mode.
    fn eval(&mut self) {
        trace!("{}: eval()", self.module_name());
        self.set_training(false);
        for child in self.state_mut().children_mut() {
            child.eval();
        }
    }

    /// Returns the direct child modules, in insertion order.
    fn modules(&self) -> Vec<&dyn Module<V>> {
        self.state().children().values().map(|m| m.as_ref()).collect()
    }

    /// Returns the direct child modules along with their local names.
    fn named_children(&self) -> Vec<(String, &dyn Module<V>)> {
        self.state()
            .children()
            .iter()
            .map(|(name, m)| (name.clone(), m.as_ref()))
            .collect()
    }

    /// Returns every descendant module (not `self`), depth-first, keyed by dotted path.
    fn named_modules(&self) -> Vec<(String, &dyn Module<V>)> {
        let mut all_modules = Vec::new();
        for (name, child) in self.state().children() {
            all_modules.push((name.clone(), child.as_ref()));
            for (sub_name, sub_module) in child.named_modules() {
                all_modules.push((join_path(name, &sub_name), sub_module));
            }
        }
        all_modules
    }

    /// Collects the parameters of this module and its descendants.
    ///
    /// Local parameters come first, then each child's parameters prefixed with
    /// `childname.`, following insertion order (e.g. `"layer1.weight"`).
    fn named_parameters(&self) -> Vec<(String, ParamRef<V>)> {
        let state = self.state();
        let mut params: Vec<(String, ParamRef<V>)> = state
            .parameters()
            .iter()
            .map(|(name, param)| (name.clone(), param.clone()))
            .collect();
        for (child_name, child) in state.children() {
            for (param_name, param) in child.named_parameters() {
                params.push((join_path(child_name, &param_name), param));
            }
        }
        params
    }

    /// Same traversal as [`named_parameters`](Module::named_parameters), handles only.
    fn parameters(&self) -> Vec<ParamRef<V>> {
        let state = self.state();
        let mut params: Vec<ParamRef<V>> = state.parameters().values().cloned().collect();
        for child in state.children().values() {
            params.extend(child.parameters());
        }
        params
    }

    /// Manually adds a parameter. Useful helper for scalar parameters.
    ///
    /// # Returns
    /// The newly created parameter, shared with the module.
    fn add_parameter(&mut self, name: &str, value: V) -> Result<ParamRef<V>, MiniTorchError> {
        self.state_mut().add_parameter(name, value)
    }

    /// Assigns an attribute. Parameters and modules are filed into their
    /// registries, other values are kept as plain values.
    fn set_attr(&mut self, name: &str, attr: Attribute<V>) -> Result<(), MiniTorchError> {
        self.state_mut().insert(name, attr)
    }

    fn remove_attr(&mut self, name: &str) -> Option<Attribute<V>> {
        self.state_mut().remove(name)
    }

    /// Lenient attribute lookup: an unknown name yields `None`.
    fn get_attr(&self, name: &str) -> Option<AttrRef<'_, V>> {
        self.state().get(name)
    }

    /// Strict attribute lookup: an unknown name is an error.
    fn attr(&self, name: &str) -> Result<AttrRef<'_, V>, MiniTorchError> {
        self.state()
            .get(name)
            .ok_or_else(|| MiniTorchError::UnknownAttribute {
                name: name.to_string(),
            })
    }

    /// Typed access to a plain value attribute.
    fn value_attr<'a, T: Any>(&'a self, name: &str) -> Result<&'a T, MiniTorchError>
    where
        Self: Sized,
        V: 'a,
    {
        self.state().value_attr(name)
    }

    fn parameter(&self, name: &str) -> Option<ParamRef<V>> {
        self.state().parameter(name)
    }

    fn child(&self, name: &str) -> Option<&dyn Module<V>> {
        self.state().child(name)
    }

    fn child_mut(&mut self, name: &str) -> Option<&mut (dyn Module<V> + 'static)> {
        self.state_mut().child_mut(name)
    }

    /// Finds a descendant module by dotted path (`"encoder.layer1"`).
    fn get_submodule(&self, path: &str) -> Result<&dyn Module<V>, MiniTorchError> {
        let unknown = || MiniTorchError::UnknownModule {
            path: path.to_string(),
        };
        let mut segments = path.split(PATH_SEPARATOR);
        let first = segments.next().ok_or_else(unknown)?;
        let mut current = self.child(first).ok_or_else(unknown)?;
        for segment in segments {
            current = current.child(segment).ok_or_else(unknown)?;
        }
        Ok(current)
    }

    fn get_submodule_mut(
        &mut self,
        path: &str,
    ) -> Result<&mut (dyn Module<V> + 'static), MiniTorchError> {
        let unknown = || MiniTorchError::UnknownModule {
            path: path.to_string(),
        };
        let mut segments = path.split(PATH_SEPARATOR);
        let first = segments.next().ok_or_else(unknown)?;
        let mut current = self.child_mut(first).ok_or_else(unknown)?;
        for segment in segments {
            current = current.child_mut(segment).ok_or_else(unknown)?;
        }
        Ok(current)
    }

    /// Finds a parameter by the dotted path `named_parameters` reports for it.
    fn get_parameter(&self, path: &str) -> Result<ParamRef<V>, MiniTorchError> {
        let unknown = || MiniTorchError::UnknownParameter {
            path: path.to_string(),
        };
        let found = match path.rsplit_once(PATH_SEPARATOR) {
            Some((module_path, name)) => self
                .get_submodule(module_path)
                .ok()
                .and_then(|module| module.parameter(name)),
            None => self.parameter(path),
        };
        found.ok_or_else(unknown)
    }

    /// Copies every parameter value into an ordered map keyed by dotted path.
    fn state_dict(&self) -> IndexMap<String, V>
    where
        V: Clone,
    {
        self.named_parameters()
            .into_iter()
            .map(|(name, param)| {
                let value = read_param(&param).value().clone();
                (name, value)
            })
            .collect()
    }

    /// Writes values from `state` back into the matching parameters.
    ///
    /// With `strict`, a parameter missing from `state` or a key of `state` that
    /// names no parameter is an error, and no parameter is modified.
    fn load_state_dict(
        &mut self,
        state: &IndexMap<String, V>,
        strict: bool,
    ) -> Result<(), MiniTorchError>
    where
        V: Clone,
    {
        let named = self.named_parameters();
        if strict {
            let missing: Vec<String> = named
                .iter()
                .filter(|(name, _)| !state.contains_key(name))
                .map(|(name, _)| name.clone())
                .collect();
            if !missing.is_empty() {
                return Err(MiniTorchError::MissingKeys { keys: missing });
            }
            let unexpected: Vec<String> = state
                .keys()
                .filter(|key| !named.iter().any(|(name, _)| name == *key))
                .cloned()
                .collect();
            if !unexpected.is_empty() {
                return Err(MiniTorchError::UnexpectedKeys { keys: unexpected });
            }
        }

        let mut loaded = 0;
        for (name, param) in &named {
            if let Some(value) = state.get(name) {
                write_param(param).update(value.clone());
                loaded += 1;
            }
        }
        debug!(
            "{}: loaded {} of {} parameters from state dict",
            self.module_name(),
            loaded,
            named.len()
        );
        Ok(())
    }

    /// Renders the module tree:
    ///
    /// ```text
    /// Outer(
    ///   (a): Leaf()
    ///   (b): Inner(
    ///     (c): Leaf()
    ///   )
    /// )
    /// ```
    fn repr(&self) -> String {
        let child_lines: Vec<String> = self
            .state()
            .children()
            .iter()
            .map(|(key, module)| format!("({}): {}", key, add_indent(&module.repr(), 2)))
            .collect();

        let mut main_str = format!("{}(", self.module_name());
        if !child_lines.is_empty() {
            main_str.push_str("\n  ");
            main_str.push_str(&child_lines.join("\n  "));
            main_str.push('\n');
        }
        main_str.push(')');
        main_str
    }
}

/// The computation of a module.
///
/// Kept apart from [`Module`] so that containers with no computation of
/// their own need not provide one, and so the input type is free.
pub trait Forward<I> {
    type Output;

    fn forward(&self, input: I) -> Result<Self::Output, MiniTorchError>;

    /// Runs the forward pass.
    fn call(&self, input: I) -> Result<Self::Output, MiniTorchError> {
        trace!("call() -> forward()");
        self.forward(input)
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    format!("{}{}{}", prefix, PATH_SEPARATOR, name)
}

/// Strips the module path and generic arguments from a type name.
fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Indents every line but the first by `num_spaces`.
fn add_indent(s: &str, num_spaces: usize) -> String {
    let mut lines = s.split('\n');
    let first = lines.next().unwrap_or_default();
    let padding = " ".repeat(num_spaces);
    let mut out = first.to_string();
    for line in lines {
        out.push('\n');
        out.push_str(&padding);
        out.push_str(line);
    }
    out
}

#[cfg(test)]
#[path = "module_test.rs"]
mod tests;

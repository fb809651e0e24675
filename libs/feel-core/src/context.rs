//! Evaluation context for FEEL expressions.
//!
//! A context holds two parallel mappings: variables and function overload
//! sets. Contexts compose by right-biased overlay (`a.combine(&b)` resolves a
//! name first in `b`, then in `a`) and are never mutated after creation: every
//! update derives a new context. The representation is a chain of immutable
//! frames shared through `Arc`, so derived scopes for `for`, `some`, `every`,
//! `filter`, `in`, and function bodies are cheap and lookups never deep-copy.

use crate::value::{FunctionVal, Val};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Default name of the implicit input used by unary tests.
pub const DEFAULT_INPUT_VARIABLE: &str = "cellInput";

/// Variable that overrides the implicit-input name for a scope.
pub const INPUT_VARIABLE_NAME: &str = "inputVariableName";

#[derive(Debug)]
struct Frame {
    variables: HashMap<Arc<str>, Val>,
    functions: HashMap<Arc<str>, Vec<FunctionVal>>,
    parent: Option<Arc<Frame>>,
}

/// Lexical environment mapping names to values and to function overload sets.
#[derive(Clone, Default)]
pub struct Context {
    frame: Option<Arc<Frame>>,
}

impl Context {
    /// Empty context.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ContextBuilder {
        ContextBuilder::default()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.is_none()
    }

    /// Resolve a variable, newest frame first.
    pub fn variable(&self, name: &str) -> Option<Val> {
        let mut frame = self.frame.as_deref();
        while let Some(f) = frame {
            if let Some(value) = f.variables.get(name) {
                return Some(value.clone());
            }
            frame = f.parent.as_deref();
        }
        None
    }

    /// Resolve a positional call against the overload sets for `name`.
    ///
    /// Frames are searched newest first; within a frame the overload list is
    /// scanned in registration order. A variadic overload matches any call
    /// supplying at least its fixed parameters.
    pub fn resolve_positional(&self, name: &str, arg_count: usize) -> Option<FunctionVal> {
        self.resolve_function(name, |f| f.matches_arity(arg_count))
    }

    /// Resolve a named call by exact parameter-name set.
    pub fn resolve_named(&self, name: &str, param_names: &[Arc<str>]) -> Option<FunctionVal> {
        self.resolve_function(name, |f| f.matches_param_names(param_names))
    }

    fn resolve_function(
        &self,
        name: &str,
        matches: impl Fn(&FunctionVal) -> bool,
    ) -> Option<FunctionVal> {
        let mut frame = self.frame.as_deref();
        while let Some(f) = frame {
            if let Some(overloads) = f.functions.get(name) {
                if let Some(found) = overloads.iter().find(|f| matches(f)) {
                    return Some(found.clone());
                }
            }
            frame = f.parent.as_deref();
        }
        None
    }

    /// Name of the implicit input variable for this scope.
    pub fn input_variable_name(&self) -> Arc<str> {
        match self.variable(INPUT_VARIABLE_NAME) {
            Some(Val::String(name)) => Arc::from(name.as_str()),
            _ => Arc::from(DEFAULT_INPUT_VARIABLE),
        }
    }

    /// The implicit input value, if one is bound.
    pub fn input_value(&self) -> Option<Val> {
        self.variable(&self.input_variable_name())
    }

    /// Derive a context with one additional variable binding.
    pub fn with_variable(&self, name: impl Into<Arc<str>>, value: Val) -> Context {
        let mut variables = HashMap::with_capacity(1);
        variables.insert(name.into(), value);
        self.push_frame(variables, HashMap::new())
    }

    /// Derive a context with several additional variable bindings.
    pub fn with_variables(
        &self,
        bindings: impl IntoIterator<Item = (Arc<str>, Val)>,
    ) -> Context {
        let variables: HashMap<Arc<str>, Val> = bindings.into_iter().collect();
        if variables.is_empty() {
            return self.clone();
        }
        self.push_frame(variables, HashMap::new())
    }

    /// Derive a context with one additional function overload.
    pub fn with_function(&self, name: impl Into<Arc<str>>, function: FunctionVal) -> Context {
        let mut functions = HashMap::with_capacity(1);
        functions.insert(name.into(), vec![function]);
        self.push_frame(HashMap::new(), functions)
    }

    fn push_frame(
        &self,
        variables: HashMap<Arc<str>, Val>,
        functions: HashMap<Arc<str>, Vec<FunctionVal>>,
    ) -> Context {
        Context {
            frame: Some(Arc::new(Frame {
                variables,
                functions,
                parent: self.frame.clone(),
            })),
        }
    }

    /// Right-biased overlay: names resolve first in `other`, then in `self`.
    pub fn combine(&self, other: &Context) -> Context {
        let mut overlay_frames = Vec::new();
        let mut frame = other.frame.as_deref();
        while let Some(f) = frame {
            overlay_frames.push(f);
            frame = f.parent.as_deref();
        }

        let mut combined = self.clone();
        for f in overlay_frames.into_iter().rev() {
            combined = combined.push_frame(f.variables.clone(), f.functions.clone());
        }
        combined
    }

    /// All visible variables, overlay applied (newest frame wins).
    pub fn flat_variables(&self) -> HashMap<Arc<str>, Val> {
        let mut flat = HashMap::new();
        self.fold_frames(|frame| {
            for (name, value) in &frame.variables {
                flat.entry(name.clone()).or_insert_with(|| value.clone());
            }
        });
        flat
    }

    /// All visible function overloads per name, newest frame's overloads first.
    pub fn flat_functions(&self) -> HashMap<Arc<str>, Vec<FunctionVal>> {
        let mut flat: HashMap<Arc<str>, Vec<FunctionVal>> = HashMap::new();
        self.fold_frames(|frame| {
            for (name, overloads) in &frame.functions {
                flat.entry(name.clone())
                    .or_default()
                    .extend(overloads.iter().cloned());
            }
        });
        flat
    }

    fn fold_frames(&self, mut visit: impl FnMut(&Frame)) {
        let mut frame = self.frame.as_deref();
        while let Some(f) = frame {
            visit(f);
            frame = f.parent.as_deref();
        }
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        self.flat_variables() == other.flat_variables()
            && self.flat_functions() == other.flat_functions()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("variables", &self.flat_variables())
            .field("functions", &self.flat_functions().keys())
            .finish()
    }
}

/// Builder for a single-frame context (root contexts, context literals).
#[derive(Default)]
pub struct ContextBuilder {
    variables: HashMap<Arc<str>, Val>,
    functions: HashMap<Arc<str>, Vec<FunctionVal>>,
}

impl ContextBuilder {
    /// Bind a variable, replacing any previous binding of the same name.
    pub fn set_variable(&mut self, name: impl Into<Arc<str>>, value: Val) -> &mut Self {
        self.variables.insert(name.into(), value);
        self
    }

    /// Append a function to the overload list for `name`.
    pub fn add_function(&mut self, name: impl Into<Arc<str>>, function: FunctionVal) -> &mut Self {
        self.functions.entry(name.into()).or_default().push(function);
        self
    }

    pub fn build(self) -> Context {
        if self.variables.is_empty() && self.functions.is_empty() {
            return Context::new();
        }
        Context {
            frame: Some(Arc::new(Frame {
                variables: self.variables,
                functions: self.functions,
                parent: None,
            })),
        }
    }
}

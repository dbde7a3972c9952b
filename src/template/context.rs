//! Template rendering context
//!
//! A [`Context`] is an immutable set of named bindings. Page-specific
//! contexts are derived from a shared base with [`Context::with`] and
//! [`Context::extend`], which copy the binding table instead of mutating it,
//! so a context handed to one render call can never observe overrides made
//! for another.

use indexmap::IndexMap;
use std::rc::Rc;

use super::error::Result;
use super::value::{Function, Value};

#[derive(Clone, Default)]
pub struct Context {
    vars: Rc<IndexMap<String, Value>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// New context with `name` bound to `value`, leaving `self` untouched
    pub fn with(&self, name: &str, value: impl Into<Value>) -> Context {
        let mut vars = IndexMap::clone(&self.vars);
        vars.insert(name.to_string(), value.into());
        Context {
            vars: Rc::new(vars),
        }
    }

    /// New context with every pair in `overrides` applied on top of `self`
    pub fn extend<I, K>(&self, overrides: I) -> Context
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut vars = IndexMap::clone(&self.vars);
        for (k, v) in overrides {
            vars.insert(k.into(), v);
        }
        Context {
            vars: Rc::new(vars),
        }
    }

    /// New context with a native helper bound under `name`
    pub fn with_function<F>(&self, name: &str, func: F) -> Context
    where
        F: Fn(&[Value]) -> Result<Value> + 'static,
    {
        self.with(name, Function::native(name, func))
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Bindings in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Context::new().extend(iter)
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.vars.iter()).finish()
    }
}

// flowroute/src/core/invocation.rs

//! Defines the `InvocationContext` handed to evaluators for one call.

use std::borrow::Cow;

use super::method::MethodSignature;
use super::value::{Attributes, Value};

/// Everything an evaluator may look at while a call is being routed:
/// the invoked method, its arguments in declaration order, and ambient attributes.
#[derive(Clone, Debug)]
pub struct InvocationContext {
  method: MethodSignature,
  args: Vec<(Cow<'static, str>, Value)>,
  attributes: Attributes,
}

impl InvocationContext {
  pub fn new(method: MethodSignature) -> Self {
    Self {
      method,
      args: Vec::new(),
      attributes: Attributes::new(),
    }
  }

  pub(crate) fn with_attributes(method: MethodSignature, attributes: Attributes) -> Self {
    Self {
      method,
      args: Vec::new(),
      attributes,
    }
  }

  /// Appends a named argument. Arguments keep the order they are added in.
  pub fn arg(mut self, name: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
    self.args.push((name.into(), value.into()));
    self
  }

  /// Adds (or overwrites) an ambient attribute.
  pub fn attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.attributes.insert(key, value);
    self
  }

  pub fn method(&self) -> &MethodSignature {
    &self.method
  }

  /// Looks an argument up by parameter name.
  pub fn get(&self, name: &str) -> Option<&Value> {
    self.args.iter().find(|(n, _)| n == name).map(|(_, v)| v)
  }

  /// Positional access.
  pub fn arg_at(&self, index: usize) -> Option<&Value> {
    self.args.get(index).map(|(_, v)| v)
  }

  pub fn args(&self) -> impl Iterator<Item = (&str, &Value)> {
    self.args.iter().map(|(n, v)| (n.as_ref(), v))
  }

  pub fn arg_count(&self) -> usize {
    self.args.len()
  }

  pub fn attributes(&self) -> &Attributes {
    &self.attributes
  }
}

// flowroute/src/core/candidate.rs

//! Candidate implementations and the declarations that tell the builder how to route them.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::method::MethodSignature;

/// Pairs an evaluator key with the payload that evaluator interprets.
///
/// The payload is opaque to the router. Each evaluator documents the type it expects
/// and reads it back with [`ConditionBinding::payload`].
#[derive(Clone)]
pub struct ConditionBinding {
  evaluator_key: String,
  payload: Arc<dyn Any + Send + Sync>,
  payload_type: &'static str,
}

impl ConditionBinding {
  pub fn new<P>(evaluator_key: impl Into<String>, payload: P) -> Self
  where
    P: Any + Send + Sync,
  {
    Self {
      evaluator_key: evaluator_key.into(),
      payload: Arc::new(payload),
      payload_type: std::any::type_name::<P>(),
    }
  }

  /// A binding whose evaluator needs no payload.
  pub fn key_only(evaluator_key: impl Into<String>) -> Self {
    Self::new(evaluator_key, ())
  }

  pub fn evaluator_key(&self) -> &str {
    &self.evaluator_key
  }

  pub fn payload<P: Any>(&self) -> Option<&P> {
    self.payload.downcast_ref::<P>()
  }

  /// Type name of the payload, for diagnostics.
  pub fn payload_type(&self) -> &'static str {
    self.payload_type
  }
}

impl fmt::Debug for ConditionBinding {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ConditionBinding")
      .field("evaluator_key", &self.evaluator_key)
      .field("payload_type", &self.payload_type)
      .finish()
  }
}

/// Declarative routing metadata for one candidate.
///
/// A default candidate handles every method of the contract unconditionally.
/// A conditional candidate takes part only in the methods it binds a condition to.
#[derive(Clone, Debug, Default)]
pub struct CandidateDeclaration {
  pub is_default: bool,
  pub bindings: HashMap<MethodSignature, ConditionBinding>,
}

impl CandidateDeclaration {
  pub fn default_route() -> Self {
    Self {
      is_default: true,
      bindings: HashMap::new(),
    }
  }

  pub fn conditional() -> Self {
    Self::default()
  }

  /// Binds a condition to one method. Binding the same method again replaces the earlier binding.
  pub fn bind(mut self, method: MethodSignature, binding: ConditionBinding) -> Self {
    self.bindings.insert(method, binding);
    self
  }

  pub fn binding_for(&self, method: &MethodSignature) -> Option<&ConditionBinding> {
    self.bindings.get(method)
  }
}

/// A concrete implementation of contract `C` offered to the routing table.
pub struct Candidate<C: ?Sized> {
  id: String,
  instance: Arc<C>,
  declaration: CandidateDeclaration,
}

impl<C: ?Sized> Candidate<C> {
  pub fn new(id: impl Into<String>, instance: Arc<C>, declaration: CandidateDeclaration) -> Self {
    Self {
      id: id.into(),
      instance,
      declaration,
    }
  }

  /// Shorthand for a candidate declared with [`CandidateDeclaration::default_route`].
  pub fn default_route(id: impl Into<String>, instance: Arc<C>) -> Self {
    Self::new(id, instance, CandidateDeclaration::default_route())
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn instance(&self) -> &Arc<C> {
    &self.instance
  }

  pub fn is_default(&self) -> bool {
    self.declaration.is_default
  }

  pub fn declaration(&self) -> &CandidateDeclaration {
    &self.declaration
  }
}

impl<C: ?Sized> Clone for Candidate<C> {
  fn clone(&self) -> Self {
    Self {
      id: self.id.clone(),
      instance: Arc::clone(&self.instance),
      declaration: self.declaration.clone(),
    }
  }
}

impl<C: ?Sized> fmt::Debug for Candidate<C> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Candidate")
      .field("id", &self.id)
      .field("is_default", &self.declaration.is_default)
      .field("bound_methods", &self.declaration.bindings.len())
      .finish()
  }
}

// flowroute/src/table/definition.rs

//! Contains the published, read-only `RoutingTable<C>` and its per-method entries.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::core::{ConditionBinding, InterfaceDescriptor, MethodSignature};
use crate::evaluator::Evaluator;

/// A condition binding together with the evaluator its key resolved to at build time.
#[derive(Clone)]
pub(crate) struct BoundCondition {
  pub(crate) binding: ConditionBinding,
  pub(crate) evaluator: Arc<dyn Evaluator>,
}

/// One slot of a routed method: a candidate and, unless it is the default, its condition.
pub struct RouteEntry<C: ?Sized> {
  pub(crate) candidate: String,
  pub(crate) instance: Arc<C>,
  pub(crate) condition: Option<BoundCondition>,
}

impl<C: ?Sized> RouteEntry<C> {
  pub fn candidate(&self) -> &str {
    &self.candidate
  }

  pub fn instance(&self) -> &Arc<C> {
    &self.instance
  }

  pub fn is_default(&self) -> bool {
    self.condition.is_none()
  }

  pub fn binding(&self) -> Option<&ConditionBinding> {
    self.condition.as_ref().map(|c| &c.binding)
  }
}

impl<C: ?Sized> Clone for RouteEntry<C> {
  fn clone(&self) -> Self {
    Self {
      candidate: self.candidate.clone(),
      instance: Arc::clone(&self.instance),
      condition: self.condition.clone(),
    }
  }
}

impl<C: ?Sized> fmt::Debug for RouteEntry<C> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RouteEntry")
      .field("candidate", &self.candidate)
      .field("binding", &self.binding())
      .finish()
  }
}

/// The resolution order for one method: conditional entries in registration order,
/// then exactly one default.
pub struct RoutedMethod<C: ?Sized> {
  pub(crate) method: MethodSignature,
  pub(crate) entries: Vec<RouteEntry<C>>,
}

impl<C: ?Sized> RoutedMethod<C> {
  pub fn method(&self) -> &MethodSignature {
    &self.method
  }

  pub fn entries(&self) -> &[RouteEntry<C>] {
    &self.entries
  }

  /// Candidate ids in the order they are tried.
  pub fn candidate_ids(&self) -> Vec<&str> {
    self.entries.iter().map(RouteEntry::candidate).collect()
  }

  pub fn default_entry(&self) -> Option<&RouteEntry<C>> {
    self.entries.last().filter(|e| e.is_default())
  }
}

impl<C: ?Sized> Clone for RoutedMethod<C> {
  fn clone(&self) -> Self {
    Self {
      method: self.method.clone(),
      entries: self.entries.clone(),
    }
  }
}

impl<C: ?Sized> fmt::Debug for RoutedMethod<C> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RoutedMethod")
      .field("method", &self.method)
      .field("order", &self.candidate_ids())
      .finish()
  }
}

/// The validated dispatch order of every method of one routed contract.
///
/// Only produced by [`RoutingTableBuilder::build`](super::RoutingTableBuilder::build),
/// never mutated afterwards.
pub struct RoutingTable<C: ?Sized> {
  pub(crate) descriptor: InterfaceDescriptor,
  pub(crate) methods: HashMap<MethodSignature, RoutedMethod<C>>,
}

impl<C: ?Sized> RoutingTable<C> {
  pub fn descriptor(&self) -> &InterfaceDescriptor {
    &self.descriptor
  }

  pub fn method(&self, method: &MethodSignature) -> Option<&RoutedMethod<C>> {
    self.methods.get(method)
  }

  /// Candidate ids for `method` in resolution order; `None` for unknown methods.
  pub fn candidates_for(&self, method: &MethodSignature) -> Option<Vec<&str>> {
    self.method(method).map(RoutedMethod::candidate_ids)
  }
}

impl<C: ?Sized> fmt::Debug for RoutingTable<C> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let routed: Vec<&RoutedMethod<C>> = self
      .descriptor
      .methods()
      .iter()
      .filter_map(|m| self.methods.get(m))
      .collect();
    f.debug_struct("RoutingTable")
      .field("interface", &self.descriptor.name())
      .field("methods", &routed)
      .finish()
  }
}

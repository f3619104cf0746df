// flowroute/src/router.rs

//! Defines `Router<C>`, the dispatch engine behind a routed contract.
//!
//! A contract proxy is a small hand-written struct that owns a `Router<dyn Contract>`
//! and implements the contract trait. Each method builds an [`InvocationContext`]
//! with [`Router::context`], adds its arguments, and forwards through
//! [`Router::invoke`]:
//!
//! ```
//! use std::sync::Arc;
//! use flowroute::{
//!   Candidate, CandidateDeclaration, ConditionBinding, DispatchError, EvaluatorRegistry,
//!   InterfaceDescriptor, MethodSignature, PredicateEvaluator, Router, RoutingTableBuilder, Value,
//! };
//!
//! trait Greeting: Send + Sync {
//!   fn greet(&self, user: &str) -> Result<String, DispatchError>;
//! }
//! const GREET: MethodSignature = MethodSignature::new("greet(&str)");
//!
//! struct Plain;
//! impl Greeting for Plain {
//!   fn greet(&self, user: &str) -> Result<String, DispatchError> { Ok(format!("Hello {user}")) }
//! }
//! struct Amazing;
//! impl Greeting for Amazing {
//!   fn greet(&self, user: &str) -> Result<String, DispatchError> { Ok(format!("You are amazing {user}")) }
//! }
//!
//! struct GreetingProxy(Router<dyn Greeting>);
//! impl Greeting for GreetingProxy {
//!   fn greet(&self, user: &str) -> Result<String, DispatchError> {
//!     let ctx = self.0.context(GREET).arg("user", user);
//!     self.0.invoke(&ctx, |target| target.greet(user))
//!   }
//! }
//!
//! let mut evaluators = EvaluatorRegistry::new();
//! evaluators.register(PredicateEvaluator::KEY, PredicateEvaluator).unwrap();
//! let mut builder = RoutingTableBuilder::<dyn Greeting>::new(
//!   InterfaceDescriptor::new("Greeting", [GREET]),
//!   Arc::new(evaluators),
//! );
//! builder
//!   .add_candidates([
//!     Candidate::default_route("plain", Arc::new(Plain) as Arc<dyn Greeting>),
//!     Candidate::new(
//!       "amazing",
//!       Arc::new(Amazing) as Arc<dyn Greeting>,
//!       CandidateDeclaration::conditional().bind(
//!         GREET,
//!         ConditionBinding::when(|ctx| ctx.get("user").and_then(Value::as_str).map_or(false, |u| u.starts_with('A'))),
//!       ),
//!     ),
//!   ])
//!   .unwrap();
//! let proxy = GreetingProxy(Router::new(builder.build().unwrap()));
//!
//! assert_eq!(proxy.greet("Alice").unwrap(), "You are amazing Alice");
//! assert_eq!(proxy.greet("Bob").unwrap(), "Hello Bob");
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::{event, Level};

use crate::core::{Attributes, InvocationContext, MethodSignature};
use crate::error::DispatchError;
use crate::table::{RouteEntry, RoutingTable};

/// Supplies ambient attributes (tenant, request id, ...) for every call made through a router.
///
/// Sources are consulted on the calling thread when [`Router::context`] builds a context,
/// so thread- or task-local request state is visible to them.
pub trait AttributeSource: Send + Sync {
  fn collect(&self, attributes: &mut Attributes);
}

/// Attribute source backed by a closure. Built with [`attributes_from_fn`].
pub struct FnAttributeSource<F>(F);

pub fn attributes_from_fn<F>(f: F) -> FnAttributeSource<F>
where
  F: Fn(&mut Attributes) + Send + Sync + 'static,
{
  FnAttributeSource(f)
}

impl<F> AttributeSource for FnAttributeSource<F>
where
  F: Fn(&mut Attributes) + Send + Sync + 'static,
{
  fn collect(&self, attributes: &mut Attributes) {
    (self.0)(attributes)
  }
}

/// Routes calls of contract `C` through a published [`RoutingTable`].
///
/// Cheap to clone; clones share the table. Holds no mutable state, so one router can
/// serve any number of concurrent callers.
pub struct Router<C: ?Sized> {
  table: Arc<RoutingTable<C>>,
  ambient: Arc<Vec<Arc<dyn AttributeSource>>>,
}

impl<C: ?Sized> Router<C> {
  pub fn new(table: RoutingTable<C>) -> Self {
    Self::from_shared(Arc::new(table))
  }

  pub fn from_shared(table: Arc<RoutingTable<C>>) -> Self {
    Self {
      table,
      ambient: Arc::new(Vec::new()),
    }
  }

  /// Adds an ambient attribute source. Sources run in the order they were added;
  /// later sources overwrite attributes set by earlier ones.
  pub fn with_attribute_source(self, source: impl AttributeSource + 'static) -> Self {
    self.with_shared_attribute_source(Arc::new(source))
  }

  pub fn with_shared_attribute_source(mut self, source: Arc<dyn AttributeSource>) -> Self {
    Arc::make_mut(&mut self.ambient).push(source);
    self
  }

  pub fn table(&self) -> &RoutingTable<C> {
    &self.table
  }

  /// A fresh invocation context for `method`, pre-filled with ambient attributes.
  pub fn context(&self, method: MethodSignature) -> InvocationContext {
    let mut attributes = Attributes::new();
    for source in self.ambient.iter() {
      source.collect(&mut attributes);
    }
    InvocationContext::with_attributes(method, attributes)
  }

  /// Selects the candidate that handles `invocation`.
  pub fn resolve(&self, invocation: &InvocationContext) -> Result<&Arc<C>, DispatchError> {
    self.table.resolve(invocation).map(RouteEntry::instance)
  }

  /// Like [`Router::resolve`], also returning the selected candidate's id.
  pub fn resolve_entry(&self, invocation: &InvocationContext) -> Result<&RouteEntry<C>, DispatchError> {
    self.table.resolve(invocation)
  }

  /// Resolves the candidate for `invocation` and forwards the call to it.
  ///
  /// Routing failures are converted into `E`; whatever `call` returns, error or not,
  /// is handed back untouched. Nothing is retried and there is no fallback on error.
  pub fn invoke<T, E, F>(&self, invocation: &InvocationContext, call: F) -> Result<T, E>
  where
    E: From<DispatchError>,
    F: FnOnce(&C) -> Result<T, E>,
  {
    let entry = self.table.resolve(invocation)?;
    event!(Level::TRACE, candidate = %entry.candidate(), method = %invocation.method(), "Forwarding call.");
    call(entry.instance().as_ref())
  }
}

impl<C: ?Sized> Clone for Router<C> {
  fn clone(&self) -> Self {
    Self {
      table: Arc::clone(&self.table),
      ambient: Arc::clone(&self.ambient),
    }
  }
}

impl<C: ?Sized> fmt::Debug for Router<C> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Router")
      .field("table", &self.table)
      .field("attribute_sources", &self.ambient.len())
      .finish()
  }
}

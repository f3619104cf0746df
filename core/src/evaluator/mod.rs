// flowroute/src/evaluator/mod.rs

//! The `Evaluator` plugin contract and the evaluators bundled with flowroute.
//!
//! An evaluator decides, for one conditional routing entry and one call, whether
//! that entry's candidate should handle the call. Evaluators are registered under a
//! string key in the [`EvaluatorRegistry`](crate::registry::EvaluatorRegistry);
//! candidates refer to them through the key in their [`ConditionBinding`].

pub mod flag;
pub mod predicate;

use crate::core::{ConditionBinding, InvocationContext, MethodSignature};

pub use flag::{FlagEvaluator, FlagSource, InMemoryFlags};
pub use predicate::{Predicate, PredicateEvaluator};

/// What an evaluator sees of the routing entry it is asked about.
#[derive(Clone, Copy, Debug)]
pub struct RouteTarget<'a> {
  pub interface: &'a str,
  pub method: &'a MethodSignature,
  pub candidate: &'a str,
  pub binding: &'a ConditionBinding,
}

impl<'a> RouteTarget<'a> {
  /// Typed access to the binding payload.
  ///
  /// Fails with a descriptive error when the payload is of another type, so a
  /// misconfigured binding surfaces at the first call that reaches it.
  pub fn payload<P: std::any::Any>(&self) -> anyhow::Result<&'a P> {
    self.binding.payload::<P>().ok_or_else(|| {
      anyhow::anyhow!(
        "Candidate '{}' binds '{}' with a payload of type {}, expected {}",
        self.candidate,
        self.binding.evaluator_key(),
        self.binding.payload_type(),
        std::any::type_name::<P>()
      )
    })
  }
}

/// A pluggable routing condition.
///
/// Returning `Ok(false)` lets the router move on to the next candidate. Returning an
/// error aborts the whole dispatch; the router never falls back to the default on error.
///
/// Evaluators are shared by every caller of every router they are registered with and
/// are never serialized by flowroute: stateful evaluators must synchronize themselves.
pub trait Evaluator: Send + Sync {
  fn evaluate(&self, target: &RouteTarget<'_>, invocation: &InvocationContext) -> anyhow::Result<bool>;
}

/// Evaluator backed by a closure. Built with [`from_fn`].
pub struct FnEvaluator<F>(F);

/// Wraps a closure as an [`Evaluator`].
pub fn from_fn<F>(f: F) -> FnEvaluator<F>
where
  F: Fn(&RouteTarget<'_>, &InvocationContext) -> anyhow::Result<bool> + Send + Sync + 'static,
{
  FnEvaluator(f)
}

impl<F> Evaluator for FnEvaluator<F>
where
  F: Fn(&RouteTarget<'_>, &InvocationContext) -> anyhow::Result<bool> + Send + Sync + 'static,
{
  fn evaluate(&self, target: &RouteTarget<'_>, invocation: &InvocationContext) -> anyhow::Result<bool> {
    (self.0)(target, invocation)
  }
}

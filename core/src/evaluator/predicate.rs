// flowroute/src/evaluator/predicate.rs

//! Closure-based conditions.
//!
//! The payload of a `"predicate"` binding is a [`Predicate`]: a closure over the
//! invocation context. Anything the condition needs beyond the call itself (a flag
//! client, a tenant lookup, a clock) is captured by the closure.

use std::fmt;
use std::sync::Arc;

use tracing::{event, Level};

use super::{Evaluator, RouteTarget};
use crate::core::{ConditionBinding, InvocationContext};

/// A routing condition evaluated against the invocation context.
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&InvocationContext) -> anyhow::Result<bool> + Send + Sync + 'static>);

impl Predicate {
  pub fn new(f: impl Fn(&InvocationContext) -> anyhow::Result<bool> + Send + Sync + 'static) -> Self {
    Predicate(Arc::new(f))
  }

  /// A predicate that cannot fail.
  pub fn infallible(f: impl Fn(&InvocationContext) -> bool + Send + Sync + 'static) -> Self {
    Predicate::new(move |ctx| Ok(f(ctx)))
  }

  pub fn test(&self, ctx: &InvocationContext) -> anyhow::Result<bool> {
    (self.0)(ctx)
  }
}

impl fmt::Debug for Predicate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("Predicate(..)")
  }
}

impl ConditionBinding {
  /// Binding for the [`PredicateEvaluator`].
  pub fn predicate(f: impl Fn(&InvocationContext) -> anyhow::Result<bool> + Send + Sync + 'static) -> Self {
    ConditionBinding::new(PredicateEvaluator::KEY, Predicate::new(f))
  }

  /// Binding for the [`PredicateEvaluator`] with a condition that cannot fail.
  pub fn when(f: impl Fn(&InvocationContext) -> bool + Send + Sync + 'static) -> Self {
    ConditionBinding::new(PredicateEvaluator::KEY, Predicate::infallible(f))
  }
}

/// Runs the [`Predicate`] carried by the binding.
#[derive(Clone, Copy, Debug, Default)]
pub struct PredicateEvaluator;

impl PredicateEvaluator {
  pub const KEY: &'static str = "predicate";
}

impl Evaluator for PredicateEvaluator {
  fn evaluate(&self, target: &RouteTarget<'_>, invocation: &InvocationContext) -> anyhow::Result<bool> {
    let predicate = target.payload::<Predicate>()?;
    let accepted = predicate.test(invocation)?;
    event!(Level::TRACE, candidate = %target.candidate, method = %target.method, accepted, "Predicate evaluated.");
    Ok(accepted)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::core::{MethodSignature, Value};

  static GREETING: MethodSignature = MethodSignature::new("greeting(&str)");

  fn target<'a>(binding: &'a ConditionBinding) -> RouteTarget<'a> {
    RouteTarget {
      interface: "GreetingService",
      method: &GREETING,
      candidate: "a_users",
      binding,
    }
  }

  #[test]
  fn predicate_sees_arguments() {
    let binding = ConditionBinding::when(|ctx| {
      ctx.get("user_name")
        .and_then(Value::as_str)
        .map_or(false, |name| name.starts_with('A'))
    });
    let alice = InvocationContext::new(GREETING.clone()).arg("user_name", "Alice");
    let bob = InvocationContext::new(GREETING.clone()).arg("user_name", "Bob");

    assert!(PredicateEvaluator.evaluate(&target(&binding), &alice).unwrap());
    assert!(!PredicateEvaluator.evaluate(&target(&binding), &bob).unwrap());
  }

  #[test]
  fn predicate_errors_are_returned() {
    let binding = ConditionBinding::predicate(|_| Err(anyhow::anyhow!("flag service unreachable")));
    let ctx = InvocationContext::new(GREETING.clone());
    let err = PredicateEvaluator.evaluate(&target(&binding), &ctx).unwrap_err();
    assert_eq!(err.to_string(), "flag service unreachable");
  }

  #[test]
  fn wrong_payload_type_is_an_error() {
    let binding = ConditionBinding::new(PredicateEvaluator::KEY, "not a closure".to_string());
    let ctx = InvocationContext::new(GREETING.clone());
    let err = PredicateEvaluator.evaluate(&target(&binding), &ctx).unwrap_err();
    assert!(err.to_string().contains("a_users"));
    assert!(err.to_string().contains("Predicate"));
  }
}

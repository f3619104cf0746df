// flowroute/src/evaluator/flag.rs

//! Feature-flag conditions backed by an external flag store.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{event, Level};

use super::{Evaluator, RouteTarget};
use crate::core::{ConditionBinding, InvocationContext};

/// A store that can answer "is this flag on for this call?".
///
/// Implementations may consult a database or a remote flag service; the calling
/// thread blocks for as long as the lookup takes.
pub trait FlagSource: Send + Sync {
  fn is_enabled(&self, flag: &str, invocation: &InvocationContext) -> anyhow::Result<bool>;
}

impl<S: FlagSource + ?Sized> FlagSource for Arc<S> {
  fn is_enabled(&self, flag: &str, invocation: &InvocationContext) -> anyhow::Result<bool> {
    (**self).is_enabled(flag, invocation)
  }
}

/// Process-local flag store. Flags can be toggled while routers are serving.
#[derive(Debug, Default)]
pub struct InMemoryFlags {
  enabled: RwLock<HashSet<String>>,
}

impl InMemoryFlags {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_enabled<I, S>(flags: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      enabled: RwLock::new(flags.into_iter().map(Into::into).collect()),
    }
  }

  pub fn enable(&self, flag: impl Into<String>) {
    self.enabled.write().insert(flag.into());
  }

  pub fn disable(&self, flag: &str) {
    self.enabled.write().remove(flag);
  }

  pub fn contains(&self, flag: &str) -> bool {
    self.enabled.read().contains(flag)
  }
}

impl FlagSource for InMemoryFlags {
  fn is_enabled(&self, flag: &str, _invocation: &InvocationContext) -> anyhow::Result<bool> {
    Ok(self.contains(flag))
  }
}

impl ConditionBinding {
  /// Binding for the [`FlagEvaluator`]: the candidate is chosen while `flag` is enabled.
  pub fn flag(flag: impl Into<String>) -> Self {
    ConditionBinding::new(FLAG_KEY, flag.into())
  }
}

const FLAG_KEY: &str = "flag";

/// Accepts a candidate when the flag named by its binding is enabled in the source.
pub struct FlagEvaluator<S: FlagSource> {
  source: S,
}

impl<S: FlagSource> FlagEvaluator<S> {
  pub const KEY: &'static str = FLAG_KEY;

  pub fn new(source: S) -> Self {
    Self { source }
  }

  pub fn source(&self) -> &S {
    &self.source
  }
}

impl<S: FlagSource> Evaluator for FlagEvaluator<S> {
  fn evaluate(&self, target: &RouteTarget<'_>, invocation: &InvocationContext) -> anyhow::Result<bool> {
    let flag = target.payload::<String>()?;
    let enabled = self.source.is_enabled(flag, invocation)?;
    event!(Level::TRACE, candidate = %target.candidate, %flag, enabled, "Flag evaluated.");
    Ok(enabled)
  }
}

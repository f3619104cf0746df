// flowroute/src/registry.rs

//! Defines the `EvaluatorRegistry`, the string-keyed store of routing condition evaluators.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{event, Level};

use crate::config::DuplicateEvaluatorPolicy;
use crate::error::ConfigurationError;
use crate::evaluator::Evaluator;

/// Evaluators keyed by the id candidates reference in their condition bindings.
///
/// Filled during startup, then frozen by moving it into an `Arc` that routing table
/// builders share. There is no way back to `&mut` once it is shared.
pub struct EvaluatorRegistry {
  evaluators: HashMap<String, Arc<dyn Evaluator>>,
  duplicates: DuplicateEvaluatorPolicy,
}

impl EvaluatorRegistry {
  /// Creates an empty registry that rejects duplicate keys.
  pub fn new() -> Self {
    Self::with_policy(DuplicateEvaluatorPolicy::Reject)
  }

  pub fn with_policy(duplicates: DuplicateEvaluatorPolicy) -> Self {
    Self {
      evaluators: HashMap::new(),
      duplicates,
    }
  }

  pub fn register<E>(&mut self, key: impl Into<String>, evaluator: E) -> Result<(), ConfigurationError>
  where
    E: Evaluator + 'static,
  {
    self.register_shared(key, Arc::new(evaluator))
  }

  /// Registers an evaluator that is also held elsewhere (e.g. shared by several registries).
  pub fn register_shared(
    &mut self,
    key: impl Into<String>,
    evaluator: Arc<dyn Evaluator>,
  ) -> Result<(), ConfigurationError> {
    let key = key.into();
    if self.evaluators.contains_key(&key) {
      match self.duplicates {
        DuplicateEvaluatorPolicy::Reject => {
          event!(Level::ERROR, evaluator_key = %key, "Evaluator key registered twice.");
          return Err(ConfigurationError::DuplicateEvaluator { key });
        }
        DuplicateEvaluatorPolicy::Replace => {
          event!(Level::WARN, evaluator_key = %key, "Replacing previously registered evaluator.");
        }
      }
    }
    event!(Level::DEBUG, evaluator_key = %key, "Registering evaluator.");
    self.evaluators.insert(key, evaluator);
    Ok(())
  }

  pub fn lookup(&self, key: &str) -> Option<Arc<dyn Evaluator>> {
    self.evaluators.get(key).cloned()
  }

  pub fn contains(&self, key: &str) -> bool {
    self.evaluators.contains_key(key)
  }

  /// Registered keys, sorted.
  pub fn keys(&self) -> Vec<&str> {
    let mut keys: Vec<&str> = self.evaluators.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys
  }

  pub fn len(&self) -> usize {
    self.evaluators.len()
  }

  pub fn is_empty(&self) -> bool {
    self.evaluators.is_empty()
  }
}

impl Default for EvaluatorRegistry {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Debug for EvaluatorRegistry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("EvaluatorRegistry")
      .field("keys", &self.keys())
      .field("duplicates", &self.duplicates)
      .finish()
  }
}

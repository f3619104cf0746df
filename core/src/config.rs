// flowroute/src/config.rs

//! Startup options, threaded explicitly through [`Bootstrap`](crate::bootstrap::Bootstrap).

use std::fmt;
use std::str::FromStr;

/// What to do when two evaluators are registered under the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateEvaluatorPolicy {
  /// Fail registration with `ConfigurationError::DuplicateEvaluator`.
  #[default]
  Reject,
  /// Last registration wins; the earlier evaluator is dropped with a warning.
  Replace,
}

impl FromStr for DuplicateEvaluatorPolicy {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "reject" => Ok(DuplicateEvaluatorPolicy::Reject),
      "replace" => Ok(DuplicateEvaluatorPolicy::Replace),
      other => Err(format!(
        "unknown duplicate evaluator policy '{}' (expected 'reject' or 'replace')",
        other
      )),
    }
  }
}

impl fmt::Display for DuplicateEvaluatorPolicy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DuplicateEvaluatorPolicy::Reject => f.write_str("reject"),
      DuplicateEvaluatorPolicy::Replace => f.write_str("replace"),
    }
  }
}

#[derive(Debug, Clone, Default)]
pub struct RoutingConfig {
  pub duplicate_evaluators: DuplicateEvaluatorPolicy,
}

impl RoutingConfig {
  pub fn with_duplicate_evaluators(mut self, policy: DuplicateEvaluatorPolicy) -> Self {
    self.duplicate_evaluators = policy;
    self
  }
}

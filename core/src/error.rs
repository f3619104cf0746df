// flowroute/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Build-time failures. Any of these prevents a routing table from being published.
#[derive(Debug, Error)]
pub enum ConfigurationError {
  #[error("No default candidate registered for method '{method}' of routed interface '{interface}'")]
  MissingDefault { interface: String, method: String },

  #[error(
    "Exactly one default candidate must be provided for method '{method}' of routed interface '{interface}', found {}: {candidates:?}",
    .candidates.len()
  )]
  MultipleDefaults {
    interface: String,
    method: String,
    candidates: Vec<String>,
  },

  #[error("Candidate '{candidate}' declares evaluator '{evaluator_key}' for method '{method}', but no evaluator is registered under that key")]
  UnknownEvaluator {
    candidate: String,
    method: String,
    evaluator_key: String,
  },

  #[error("No candidates supplied for routed interface '{interface}'")]
  NoCandidates { interface: String },

  #[error("An evaluator is already registered under key '{key}'")]
  DuplicateEvaluator { key: String },

  #[error("Candidate '{candidate}' was supplied more than once for routed interface '{interface}'")]
  DuplicateCandidate { interface: String, candidate: String },

  #[error("Method '{method}' is declared more than once on routed interface '{interface}'")]
  DuplicateMethod { interface: String, method: String },

  #[error("Candidate '{candidate}' binds a condition to '{method}', which is not a method of routed interface '{interface}'")]
  UnknownMethod {
    interface: String,
    candidate: String,
    method: String,
  },

  #[error("Routed interface '{interface}' is registered more than once (contract type {contract_type})")]
  DuplicateContract { interface: String, contract_type: String },
}

/// Call-time failures raised by the router itself.
///
/// Errors returned by the selected candidate are not wrapped here; they reach the
/// caller in the contract's own error type.
#[derive(Debug, Error)]
pub enum DispatchError {
  #[error("No routing entry for method '{method}' of routed interface '{interface}'")]
  UnroutedMethod { interface: String, method: String },

  #[error("Evaluator '{evaluator_key}' failed for candidate '{candidate}' on method '{method}' of '{interface}'. Source: {source}")]
  EvaluatorFailed {
    interface: String,
    method: String,
    candidate: String,
    evaluator_key: String,
    #[source]
    source: AnyhowError,
  },

  #[error("No router published for contract type {contract_type}")]
  UnroutedContract { contract_type: String },
}

#[derive(Debug, Error)]
pub enum RoutingError {
  #[error(transparent)]
  Configuration(#[from] ConfigurationError),

  #[error(transparent)]
  Dispatch(#[from] DispatchError),
}

impl DispatchError {
  /// The evaluator's original error, when this is an evaluation failure.
  pub fn evaluator_source(&self) -> Option<&AnyhowError> {
    match self {
      DispatchError::EvaluatorFailed { source, .. } => Some(source),
      _ => None,
    }
  }
}

pub type RoutingResult<T, E = RoutingError> = std::result::Result<T, E>;

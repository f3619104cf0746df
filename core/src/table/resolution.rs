// flowroute/src/table/resolution.rs

//! Contains `RoutingTable::resolve()`, the per-call walk that selects exactly one candidate.

use tracing::{event, instrument, Level};

use super::definition::{RouteEntry, RoutingTable};
use crate::core::InvocationContext;
use crate::error::DispatchError;
use crate::evaluator::RouteTarget;

impl<C: ?Sized> RoutingTable<C> {
  /// Selects the entry that handles `invocation`.
  ///
  /// Conditional entries are tried in order and the first whose evaluator accepts wins.
  /// The default is never evaluated: reaching it selects it. An evaluator error aborts
  /// resolution immediately; later entries, the default included, are not tried.
  #[instrument(
        name = "RoutingTable::resolve",
        level = "debug",
        skip_all,
        fields(
            interface = %self.descriptor.name(),
            method = %invocation.method(),
        ),
        err(Display)
    )]
  pub fn resolve(&self, invocation: &InvocationContext) -> Result<&RouteEntry<C>, DispatchError> {
    let routed = self
      .methods
      .get(invocation.method())
      .ok_or_else(|| DispatchError::UnroutedMethod {
        interface: self.descriptor.name().to_string(),
        method: invocation.method().to_string(),
      })?;

    for (entry_idx, entry) in routed.entries.iter().enumerate() {
      let condition = match &entry.condition {
        None => {
          event!(Level::DEBUG, candidate = %entry.candidate, "No condition matched. Selecting default candidate.");
          return Ok(entry);
        }
        Some(condition) => condition,
      };

      let target = RouteTarget {
        interface: self.descriptor.name(),
        method: &routed.method,
        candidate: &entry.candidate,
        binding: &condition.binding,
      };
      match condition.evaluator.evaluate(&target, invocation) {
        Ok(true) => {
          event!(Level::DEBUG, candidate = %entry.candidate, entry_index = entry_idx, "Condition matched. Selecting candidate.");
          return Ok(entry);
        }
        Ok(false) => {
          event!(Level::TRACE, candidate = %entry.candidate, entry_index = entry_idx, "Condition rejected candidate.");
        }
        Err(source) => {
          return Err(DispatchError::EvaluatorFailed {
            interface: self.descriptor.name().to_string(),
            method: routed.method.to_string(),
            candidate: entry.candidate.clone(),
            evaluator_key: condition.binding.evaluator_key().to_string(),
            source,
          });
        }
      }
    }

    // Validation guarantees a trailing default; a table without one was not built by the builder.
    Err(DispatchError::UnroutedMethod {
      interface: self.descriptor.name().to_string(),
      method: invocation.method().to_string(),
    })
  }
}

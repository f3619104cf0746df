// flowroute/src/table/builder.rs

//! Implements `RoutingTableBuilder`, which accumulates candidates for one routed
//! contract, validates them against the evaluator registry and publishes an
//! immutable `RoutingTable<C>`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{event, instrument, Level};

use super::definition::{BoundCondition, RouteEntry, RoutedMethod, RoutingTable};
use crate::core::{Candidate, ConditionBinding, InterfaceDescriptor, MethodSignature};
use crate::error::ConfigurationError;
use crate::registry::EvaluatorRegistry;

/// Builder for the routing table of the contract described by `descriptor`.
///
/// `C` is the contract object type, usually `dyn SomeTrait`.
pub struct RoutingTableBuilder<C: ?Sized> {
  descriptor: InterfaceDescriptor,
  evaluators: Arc<EvaluatorRegistry>,
  candidates: Vec<Candidate<C>>,
  // Result of the last successful validate(), always in sync with `candidates`.
  validated: Option<HashMap<MethodSignature, RoutedMethod<C>>>,
}

/// A candidate's slot in one method before it is checked and ordered.
struct Slot<'a, C: ?Sized> {
  candidate: &'a Candidate<C>,
  binding: Option<&'a ConditionBinding>,
}

impl<C: ?Sized> RoutingTableBuilder<C> {
  pub fn new(descriptor: InterfaceDescriptor, evaluators: Arc<EvaluatorRegistry>) -> Self {
    Self {
      descriptor,
      evaluators,
      candidates: Vec::new(),
      validated: None,
    }
  }

  pub fn descriptor(&self) -> &InterfaceDescriptor {
    &self.descriptor
  }

  /// Ids of the accumulated candidates in registration order.
  pub fn candidate_ids(&self) -> Vec<&str> {
    self.candidates.iter().map(Candidate::id).collect()
  }

  /// Adds candidates and revalidates the whole accumulated set.
  ///
  /// When validation fails the new candidates are discarded again, so the builder
  /// keeps describing the last set that validated.
  #[instrument(
        name = "RoutingTableBuilder::add_candidates",
        skip_all,
        fields(interface = %self.descriptor.name()),
        err(Display)
    )]
  pub fn add_candidates<I>(&mut self, candidates: I) -> Result<(), ConfigurationError>
  where
    I: IntoIterator<Item = Candidate<C>>,
  {
    let previous_len = self.candidates.len();
    let mut known: HashSet<String> = self.candidates.iter().map(|c| c.id().to_string()).collect();

    for candidate in candidates {
      if !known.insert(candidate.id().to_string()) {
        self.candidates.truncate(previous_len);
        return Err(ConfigurationError::DuplicateCandidate {
          interface: self.descriptor.name().to_string(),
          candidate: candidate.id().to_string(),
        });
      }
      event!(Level::DEBUG, candidate = %candidate.id(), is_default = candidate.is_default(), "Candidate added.");
      self.candidates.push(candidate);
    }

    match self.assemble() {
      Ok(methods) => {
        event!(Level::DEBUG, num_methods = methods.len(), "Routing table validated.");
        self.validated = Some(methods);
        Ok(())
      }
      Err(e) => {
        self.candidates.truncate(previous_len);
        Err(e)
      }
    }
  }

  /// Rebuilds the per-method resolution order from every accumulated candidate.
  ///
  /// 1. every method has exactly one default;
  /// 2. every conditional entry's evaluator key is registered;
  /// 3. conditional entries keep registration order and the default goes last.
  #[instrument(
        name = "RoutingTableBuilder::validate",
        skip_all,
        fields(interface = %self.descriptor.name(), num_candidates = self.candidates.len()),
        err(Display)
    )]
  pub fn validate(&mut self) -> Result<(), ConfigurationError> {
    let methods = self.assemble()?;
    event!(Level::DEBUG, num_methods = methods.len(), "Routing table validated.");
    self.validated = Some(methods);
    Ok(())
  }

  /// Publishes the validated table. Fails if no candidate was ever supplied.
  #[instrument(
        name = "RoutingTableBuilder::build",
        skip_all,
        fields(interface = %self.descriptor.name()),
        err(Display)
    )]
  pub fn build(mut self) -> Result<RoutingTable<C>, ConfigurationError> {
    if self.candidates.is_empty() {
      return Err(self.no_candidates());
    }
    let methods = match self.validated.take() {
      Some(methods) => methods,
      None => self.assemble()?,
    };
    event!(
      Level::INFO,
      interface = %self.descriptor.name(),
      num_methods = methods.len(),
      num_candidates = self.candidates.len(),
      "Routing table published."
    );
    Ok(RoutingTable {
      descriptor: self.descriptor,
      methods,
    })
  }

  fn no_candidates(&self) -> ConfigurationError {
    ConfigurationError::NoCandidates {
      interface: self.descriptor.name().to_string(),
    }
  }

  fn assemble(&self) -> Result<HashMap<MethodSignature, RoutedMethod<C>>, ConfigurationError> {
    if self.candidates.is_empty() {
      return Err(self.no_candidates());
    }
    self.descriptor.check_unique_methods()?;
    self.check_bound_methods()?;

    let interface = self.descriptor.name();
    let per_method: Vec<(&MethodSignature, Vec<Slot<'_, C>>)> = self
      .descriptor
      .methods()
      .iter()
      .map(|method| (method, self.slots_for(method)))
      .collect();

    // 1. exactly one default per method
    for (method, slots) in &per_method {
      let defaults: Vec<String> = slots
        .iter()
        .filter(|s| s.binding.is_none())
        .map(|s| s.candidate.id().to_string())
        .collect();
      match defaults.len() {
        1 => {}
        0 => {
          return Err(ConfigurationError::MissingDefault {
            interface: interface.to_string(),
            method: method.to_string(),
          });
        }
        _ => {
          return Err(ConfigurationError::MultipleDefaults {
            interface: interface.to_string(),
            method: method.to_string(),
            candidates: defaults,
          });
        }
      }
    }

    // 2. evaluator keys resolve; 3. stable partition with the default last
    let mut methods = HashMap::with_capacity(per_method.len());
    for (method, slots) in per_method {
      let mut conditional = Vec::with_capacity(slots.len());
      let mut default = None;
      for slot in slots {
        let entry = self.entry_for(method, slot)?;
        if entry.is_default() {
          default = Some(entry);
        } else {
          conditional.push(entry);
        }
      }
      conditional.extend(default);
      methods.insert(
        method.clone(),
        RoutedMethod {
          method: method.clone(),
          entries: conditional,
        },
      );
    }
    Ok(methods)
  }

  /// Conditional candidates must only bind methods the contract declares.
  fn check_bound_methods(&self) -> Result<(), ConfigurationError> {
    for candidate in &self.candidates {
      let bindings = &candidate.declaration().bindings;
      if candidate.is_default() {
        if !bindings.is_empty() {
          event!(
            Level::WARN,
            candidate = %candidate.id(),
            num_bindings = bindings.len(),
            "Default candidate declares condition bindings; they are ignored."
          );
        }
        continue;
      }
      // Sorted so the reported method does not depend on hash order.
      let mut bound: Vec<&MethodSignature> = bindings.keys().collect();
      bound.sort();
      if let Some(unknown) = bound.into_iter().find(|m| !self.descriptor.declares(m)) {
        return Err(ConfigurationError::UnknownMethod {
          interface: self.descriptor.name().to_string(),
          candidate: candidate.id().to_string(),
          method: unknown.to_string(),
        });
      }
    }
    Ok(())
  }

  /// Default candidates take part in every method, conditional ones only where they bind a condition.
  fn slots_for(&self, method: &MethodSignature) -> Vec<Slot<'_, C>> {
    self
      .candidates
      .iter()
      .filter_map(|candidate| {
        if candidate.is_default() {
          Some(Slot { candidate, binding: None })
        } else {
          candidate
            .declaration()
            .binding_for(method)
            .map(|binding| Slot {
              candidate,
              binding: Some(binding),
            })
        }
      })
      .collect()
  }

  fn entry_for(&self, method: &MethodSignature, slot: Slot<'_, C>) -> Result<RouteEntry<C>, ConfigurationError> {
    let condition = match slot.binding {
      None => None,
      Some(binding) => {
        let evaluator = self
          .evaluators
          .lookup(binding.evaluator_key())
          .ok_or_else(|| ConfigurationError::UnknownEvaluator {
            candidate: slot.candidate.id().to_string(),
            method: method.to_string(),
            evaluator_key: binding.evaluator_key().to_string(),
          })?;
        Some(BoundCondition {
          binding: binding.clone(),
          evaluator,
        })
      }
    };
    Ok(RouteEntry {
      candidate: slot.candidate.id().to_string(),
      instance: Arc::clone(slot.candidate.instance()),
      condition,
    })
  }
}

// flowroute/src/bootstrap.rs

//! Defines `Bootstrap`, the startup driver, and `Routes`, a type-keyed registry of
//! published routers.
//!
//! Startup runs in a fixed order: every evaluator is registered, then every contract's
//! candidates are validated against the now frozen evaluator registry, and only if all
//! of them validate are the routers published. Any configuration error aborts startup
//! and nothing is published.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{event, instrument, Level};

use crate::config::RoutingConfig;
use crate::core::{Candidate, InterfaceDescriptor};
use crate::error::{ConfigurationError, DispatchError};
use crate::evaluator::Evaluator;
use crate::registry::EvaluatorRegistry;
use crate::router::{AttributeSource, Router};
use crate::table::RoutingTableBuilder;

/// A router ready to be stored in [`Routes`], type-erased.
struct PublishedRouter {
  interface: String,
  router: Box<dyn Any + Send + Sync>,
}

/// Type-erased contract registration, built once the evaluator registry is frozen.
trait AnyPendingContract: Send {
  fn interface(&self) -> &str;

  fn publish(
    self: Box<Self>,
    evaluators: &Arc<EvaluatorRegistry>,
    ambient: &[Arc<dyn AttributeSource>],
  ) -> Result<PublishedRouter, ConfigurationError>;
}

struct PendingContract<C: ?Sized> {
  descriptor: InterfaceDescriptor,
  candidates: Vec<Candidate<C>>,
}

impl<C> AnyPendingContract for PendingContract<C>
where
  C: ?Sized + Send + Sync + 'static,
{
  fn interface(&self) -> &str {
    self.descriptor.name()
  }

  #[instrument(
        name = "PendingContract::publish",
        skip_all,
        fields(
            interface = %self.descriptor.name(),
            contract_type = %type_name::<C>(),
        )
    )]
  fn publish(
    self: Box<Self>,
    evaluators: &Arc<EvaluatorRegistry>,
    ambient: &[Arc<dyn AttributeSource>],
  ) -> Result<PublishedRouter, ConfigurationError> {
    let PendingContract { descriptor, candidates } = *self;
    let interface = descriptor.name().to_string();

    let mut builder = RoutingTableBuilder::<C>::new(descriptor, Arc::clone(evaluators));
    builder.add_candidates(candidates)?;
    let table = builder.build()?;

    let router = ambient
      .iter()
      .fold(Router::new(table), |router, source| router.with_shared_attribute_source(Arc::clone(source)));
    Ok(PublishedRouter {
      interface,
      router: Box::new(router),
    })
  }
}

/// Collects evaluators and contracts, then publishes every router at once.
pub struct Bootstrap {
  config: RoutingConfig,
  evaluators: EvaluatorRegistry,
  ambient: Vec<Arc<dyn AttributeSource>>,
  contracts: Vec<(TypeId, Box<dyn AnyPendingContract>)>,
}

impl Bootstrap {
  pub fn new(config: RoutingConfig) -> Self {
    event!(Level::DEBUG, duplicate_evaluators = %config.duplicate_evaluators, "Creating routing bootstrap.");
    Self {
      evaluators: EvaluatorRegistry::with_policy(config.duplicate_evaluators),
      config,
      ambient: Vec::new(),
      contracts: Vec::new(),
    }
  }

  pub fn config(&self) -> &RoutingConfig {
    &self.config
  }

  pub fn evaluator<E>(&mut self, key: impl Into<String>, evaluator: E) -> Result<&mut Self, ConfigurationError>
  where
    E: Evaluator + 'static,
  {
    self.evaluators.register(key, evaluator)?;
    Ok(self)
  }

  pub fn shared_evaluator(
    &mut self,
    key: impl Into<String>,
    evaluator: Arc<dyn Evaluator>,
  ) -> Result<&mut Self, ConfigurationError> {
    self.evaluators.register_shared(key, evaluator)?;
    Ok(self)
  }

  /// Adds an ambient attribute source to every router this bootstrap publishes.
  pub fn attribute_source(&mut self, source: impl AttributeSource + 'static) -> &mut Self {
    self.ambient.push(Arc::new(source));
    self
  }

  /// Registers the candidates of contract `C`. They are validated by [`Bootstrap::start`].
  pub fn contract<C, I>(&mut self, descriptor: InterfaceDescriptor, candidates: I) -> Result<&mut Self, ConfigurationError>
  where
    C: ?Sized + Send + Sync + 'static,
    I: IntoIterator<Item = Candidate<C>>,
  {
    let type_id = TypeId::of::<C>();
    if self.contracts.iter().any(|(id, _)| *id == type_id) {
      event!(Level::ERROR, interface = %descriptor.name(), contract_type = %type_name::<C>(), "Contract registered twice.");
      return Err(ConfigurationError::DuplicateContract {
        interface: descriptor.name().to_string(),
        contract_type: type_name::<C>().to_string(),
      });
    }
    event!(Level::DEBUG, interface = %descriptor.name(), contract_type = %type_name::<C>(), "Registering routed contract.");
    let pending = PendingContract::<C> {
      descriptor,
      candidates: candidates.into_iter().collect(),
    };
    self.contracts.push((type_id, Box::new(pending)));
    Ok(self)
  }

  /// Validates every registered contract and publishes their routers.
  #[instrument(
        name = "Bootstrap::start",
        skip_all,
        fields(num_evaluators = self.evaluators.len(), num_contracts = self.contracts.len())
    )]
  pub fn start(self) -> Result<Routes, ConfigurationError> {
    let evaluators = Arc::new(self.evaluators);
    let mut routers = HashMap::with_capacity(self.contracts.len());

    // First invalid contract aborts startup; nothing is published.
    for (type_id, pending) in self.contracts {
      let published = pending.publish(&evaluators, &self.ambient)?;
      routers.insert(type_id, published);
    }

    event!(Level::INFO, num_routers = routers.len(), "All routed contracts published.");
    Ok(Routes {
      routers,
      evaluators,
    })
  }
}

impl Default for Bootstrap {
  fn default() -> Self {
    Self::new(RoutingConfig::default())
  }
}

impl fmt::Debug for Bootstrap {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Bootstrap")
      .field("config", &self.config)
      .field("evaluators", &self.evaluators)
      .field(
        "contracts",
        &self.contracts.iter().map(|(_, c)| c.interface()).collect::<Vec<_>>(),
      )
      .finish()
  }
}

/// Published routers, keyed by contract type.
pub struct Routes {
  routers: HashMap<TypeId, PublishedRouter>,
  evaluators: Arc<EvaluatorRegistry>,
}

impl Routes {
  /// The router for contract `C`, if one was published.
  pub fn router<C>(&self) -> Option<Router<C>>
  where
    C: ?Sized + Send + Sync + 'static,
  {
    self
      .routers
      .get(&TypeId::of::<C>())
      .and_then(|published| published.router.downcast_ref::<Router<C>>())
      .cloned()
  }

  /// Like [`Routes::router`], failing with `DispatchError::UnroutedContract`.
  pub fn require<C>(&self) -> Result<Router<C>, DispatchError>
  where
    C: ?Sized + Send + Sync + 'static,
  {
    self.router::<C>().ok_or_else(|| {
      event!(Level::ERROR, contract_type = %type_name::<C>(), "No router published for contract.");
      DispatchError::UnroutedContract {
        contract_type: type_name::<C>().to_string(),
      }
    })
  }

  /// Names of the routed interfaces, sorted.
  pub fn interfaces(&self) -> Vec<&str> {
    let mut names: Vec<&str> = self.routers.values().map(|p| p.interface.as_str()).collect();
    names.sort_unstable();
    names
  }

  /// The frozen evaluator registry shared by every published table.
  pub fn evaluators(&self) -> &EvaluatorRegistry {
    &self.evaluators
  }

  pub fn len(&self) -> usize {
    self.routers.len()
  }

  pub fn is_empty(&self) -> bool {
    self.routers.is_empty()
  }
}

impl fmt::Debug for Routes {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Routes")
      .field("interfaces", &self.interfaces())
      .field("evaluators", &self.evaluators)
      .finish()
  }
}

// src/lib.rs

//! Flowroute: conditional runtime dispatch for trait-object contracts.
//!
//! Several implementations ("candidates") of one contract are registered together.
//! Exactly one of them is the default; the others attach, per method, a condition
//! binding that names an evaluator. On every call the router asks each conditional
//! candidate's evaluator in registration order and forwards the call to the first
//! candidate it accepts, or to the default when none does.
//!
//! Features:
//!  - Startup validation: one default per method, every evaluator key resolvable.
//!  - Stable resolution order with the default last.
//!  - Pluggable evaluators behind a keyed registry, plus bundled predicate and flag evaluators.
//!  - Ambient invocation attributes (tenant, request id) through attribute sources.
//!  - A type-keyed `Routes` registry published all at once by `Bootstrap`.
//!  - Evaluator failures abort dispatch; there is no fallback to the default.

pub mod bootstrap;
pub mod config;
pub mod core;
pub mod error;
pub mod evaluator;
pub mod registry;
pub mod router;
pub mod table;

// --- Re-exports for the Public API ---

// Contract and candidate declarations
pub use crate::core::{
  Attributes, Candidate, CandidateDeclaration, ConditionBinding, InterfaceDescriptor, InvocationContext,
  MethodSignature, Value,
};

// Evaluators and the keyed registry holding them
pub use crate::evaluator::{
  from_fn, Evaluator, FlagEvaluator, FlagSource, FnEvaluator, InMemoryFlags, Predicate, PredicateEvaluator,
  RouteTarget,
};
pub use crate::registry::EvaluatorRegistry;

// Routing tables and the dispatch engine
pub use crate::router::{attributes_from_fn, AttributeSource, FnAttributeSource, Router};
pub use crate::table::{RouteEntry, RoutedMethod, RoutingTable, RoutingTableBuilder};

// Startup
pub use crate::bootstrap::{Bootstrap, Routes};
pub use crate::config::{DuplicateEvaluatorPolicy, RoutingConfig};

pub use crate::error::{ConfigurationError, DispatchError, RoutingError, RoutingResult};

/*
    Core Workflow:
    1. Declare a contract trait `Greeting: Send + Sync` and one `MethodSignature` const per method.
    2. Implement it on each candidate type; wrap them in `Candidate`s, exactly one of them
       created with `Candidate::default_route`, the others with a `CandidateDeclaration`
       binding each routed method to an evaluator key.
    3. Create a `Bootstrap`, register evaluators with `.evaluator(key, ..)` and contracts with
       `.contract::<dyn Greeting>(descriptor, candidates)`.
    4. Call `.start()`; any configuration error aborts startup.
    5. Wrap `routes.require::<dyn Greeting>()` in a proxy struct implementing `Greeting`;
       each method builds a context with `router.context(METHOD).arg(..)` and forwards
       through `router.invoke(&ctx, |target| target.method(..))`.
*/

// demos/greeting_app/src/routing.rs

use crate::config::AppConfig;
use crate::errors::Result;
use crate::evaluators::{KlingonEvaluator, WeatherEvaluator};
use crate::services::{self, candidates, GreetingProxy, GreetingService};
use flowroute::{Bootstrap, FlagEvaluator, InMemoryFlags, PredicateEvaluator, Routes};
use std::sync::Arc;

/// Registers every evaluator and routed contract, then publishes the routes.
pub fn start_routes(config: &AppConfig, flags: Arc<InMemoryFlags>) -> Result<Routes> {
  let mut bootstrap = Bootstrap::new(config.routing());

  bootstrap
    .evaluator(PredicateEvaluator::KEY, PredicateEvaluator)?
    .evaluator(FlagEvaluator::<Arc<InMemoryFlags>>::KEY, FlagEvaluator::new(flags))?
    .evaluator(WeatherEvaluator::KEY, WeatherEvaluator::new(config.weather_seed))?
    .evaluator(KlingonEvaluator::KEY, KlingonEvaluator)?;

  bootstrap
    .attribute_source(services::tenant_attributes())
    .contract::<dyn GreetingService, _>(services::greeting_descriptor(), candidates::catalogue())?;

  let routes = bootstrap.start()?;
  tracing::info!(interfaces = ?routes.interfaces(), "Routes published.");
  Ok(routes)
}

pub fn greeting_service(routes: &Routes) -> Result<GreetingProxy> {
  Ok(GreetingProxy::new(routes.require::<dyn GreetingService>()?))
}

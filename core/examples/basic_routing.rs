// flowroute/examples/basic_routing.rs

use std::sync::Arc;

use flowroute::{
  Bootstrap, Candidate, CandidateDeclaration, ConditionBinding, DispatchError, InterfaceDescriptor, MethodSignature,
  PredicateEvaluator, Router, RoutingConfig, Value,
};
use tracing::{error, info};

// 1. Define the contract and one signature per method
trait GreetingService: Send + Sync {
  fn greeting(&self, user_name: &str) -> Result<String, GreetingError>;
}

const GREETING: MethodSignature = MethodSignature::new("greeting(&str)");

// 2. Define an Error type for the contract.
//    It must be From<DispatchError> so routing failures can be returned through it.
#[derive(Debug, thiserror::Error)]
enum GreetingError {
  #[error("Routing failed: {0}")]
  Routing(#[from] DispatchError),
  #[error("Greeting refused: {0}")]
  Refused(String),
}

// 3. The candidates
struct HelloGreeting;
impl GreetingService for HelloGreeting {
  fn greeting(&self, user_name: &str) -> Result<String, GreetingError> {
    Ok(format!("Hello {}", user_name))
  }
}

struct AmazingGreeting;
impl GreetingService for AmazingGreeting {
  fn greeting(&self, user_name: &str) -> Result<String, GreetingError> {
    if user_name.len() > 20 {
      return Err(GreetingError::Refused("name too long to be amazing".to_string()));
    }
    Ok(format!("You are amazing {}", user_name))
  }
}

// 4. The proxy callers use instead of a concrete candidate
struct GreetingProxy(Router<dyn GreetingService>);
impl GreetingService for GreetingProxy {
  fn greeting(&self, user_name: &str) -> Result<String, GreetingError> {
    let ctx = self.0.context(GREETING).arg("user_name", user_name);
    self.0.invoke(&ctx, |target| target.greeting(user_name))
  }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
  info!("--- Basic Routing Example ---");

  // 5. Register evaluators and candidates, then publish
  let mut bootstrap = Bootstrap::new(RoutingConfig::default());
  bootstrap.evaluator(PredicateEvaluator::KEY, PredicateEvaluator)?;
  bootstrap.contract::<dyn GreetingService, _>(
    InterfaceDescriptor::new("GreetingService", [GREETING]),
    [
      Candidate::default_route("hello", Arc::new(HelloGreeting) as Arc<dyn GreetingService>),
      Candidate::new(
        "a_users",
        Arc::new(AmazingGreeting) as Arc<dyn GreetingService>,
        CandidateDeclaration::conditional().bind(
          GREETING,
          ConditionBinding::when(|ctx| {
            ctx
              .get("user_name")
              .and_then(Value::as_str)
              .map_or(false, |name| name.starts_with('A'))
          }),
        ),
      ),
    ],
  )?;
  let routes = bootstrap.start()?;
  let greetings = GreetingProxy(routes.require::<dyn GreetingService>()?);

  // 6. Call through the proxy
  for user in ["Alice", "Bob", "Archibald Montgomery Fitzwilliam"] {
    match greetings.greeting(user) {
      Ok(message) => info!("{}", message),
      Err(e) => error!("Greeting for {} failed: {}", user, e),
    }
  }

  Ok(())
}

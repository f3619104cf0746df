// demos/greeting_app/src/services/candidates.rs

use super::{GreetingService, FAREWELL, GREETING};
use crate::errors::{AppError, Result};
use crate::evaluators::{KlingonEvaluator, Weather, WeatherEvaluator};
use async_trait::async_trait;
use flowroute::{Candidate, CandidateDeclaration, ConditionBinding, Value};
use std::sync::Arc;
use std::time::Duration;

pub const NEW_SERVICE_FLAG: &str = "greeting_new_service";

pub struct DefaultGreeting;

#[async_trait]
impl GreetingService for DefaultGreeting {
  async fn greeting(&self, user_name: &str) -> Result<String> {
    Ok(format!("Hello {}", user_name))
  }

  async fn farewell(&self, user_name: &str) -> Result<String> {
    Ok(format!("Goodbye {}", user_name))
  }
}

pub struct AUsersGreeting;

#[async_trait]
impl GreetingService for AUsersGreeting {
  async fn greeting(&self, user_name: &str) -> Result<String> {
    Ok(format!("You are amazing {}", user_name))
  }

  async fn farewell(&self, user_name: &str) -> Result<String> {
    Ok(format!("See you soon, amazing {}", user_name))
  }
}

pub struct SpanishGreeting;

#[async_trait]
impl GreetingService for SpanishGreeting {
  async fn greeting(&self, user_name: &str) -> Result<String> {
    Ok(format!("Hola {}, it is raining", user_name))
  }

  async fn farewell(&self, user_name: &str) -> Result<String> {
    Ok(format!("Adios {}", user_name))
  }
}

pub struct NewFeatureGreeting;

#[async_trait]
impl GreetingService for NewFeatureGreeting {
  async fn greeting(&self, user_name: &str) -> Result<String> {
    // Pretend the new service calls out to somewhere slower.
    tokio::time::sleep(Duration::from_millis(10)).await;
    Ok(format!("New Greeting Service is enabled for you {}", user_name))
  }

  async fn farewell(&self, user_name: &str) -> Result<String> {
    Ok(format!("New Farewell Service says bye to {}", user_name))
  }
}

/// Initech's own wording. Initech does not greet Milton.
pub struct InitechGreeting;

#[async_trait]
impl GreetingService for InitechGreeting {
  async fn greeting(&self, user_name: &str) -> Result<String> {
    if user_name == "Milton" {
      return Err(AppError::Refused(format!("{} was moved to the basement", user_name)));
    }
    Ok(format!("Welcome to Initech, {}", user_name))
  }

  async fn farewell(&self, user_name: &str) -> Result<String> {
    Ok(format!("Have a great weekend, {}", user_name))
  }
}

pub struct KlingonGreeting;

#[async_trait]
impl GreetingService for KlingonGreeting {
  async fn greeting(&self, user_name: &str) -> Result<String> {
    Ok(format!("nuqneH {}", user_name))
  }

  async fn farewell(&self, user_name: &str) -> Result<String> {
    Ok(format!("Qapla' {}", user_name))
  }
}

fn user_starts_with_a(ctx: &flowroute::InvocationContext) -> bool {
  ctx
    .get("user_name")
    .and_then(Value::as_str)
    .map_or(false, |name| name.starts_with('A'))
}

fn tenant_is(ctx: &flowroute::InvocationContext, tenant: &str) -> bool {
  ctx.attributes().get("tenant").and_then(Value::as_str) == Some(tenant)
}

/// Every `GreetingService` implementation, in resolution order for the conditional ones.
pub fn catalogue() -> Vec<Candidate<dyn GreetingService>> {
  vec![
    Candidate::default_route("default", Arc::new(DefaultGreeting) as Arc<dyn GreetingService>),
    Candidate::new(
      "initech",
      Arc::new(InitechGreeting) as Arc<dyn GreetingService>,
      CandidateDeclaration::conditional()
        .bind(GREETING, ConditionBinding::when(|ctx| tenant_is(ctx, "initech")))
        .bind(FAREWELL, ConditionBinding::when(|ctx| tenant_is(ctx, "initech"))),
    ),
    Candidate::new(
      "new_feature",
      Arc::new(NewFeatureGreeting) as Arc<dyn GreetingService>,
      CandidateDeclaration::conditional()
        .bind(GREETING, ConditionBinding::flag(NEW_SERVICE_FLAG))
        .bind(FAREWELL, ConditionBinding::flag(NEW_SERVICE_FLAG)),
    ),
    Candidate::new(
      "a_users",
      Arc::new(AUsersGreeting) as Arc<dyn GreetingService>,
      CandidateDeclaration::conditional().bind(GREETING, ConditionBinding::when(user_starts_with_a)),
    ),
    Candidate::new(
      "spanish",
      Arc::new(SpanishGreeting) as Arc<dyn GreetingService>,
      CandidateDeclaration::conditional().bind(GREETING, WeatherEvaluator::binding(Weather::Raining)),
    ),
    Candidate::new(
      "klingon",
      Arc::new(KlingonGreeting) as Arc<dyn GreetingService>,
      CandidateDeclaration::conditional().bind(FAREWELL, KlingonEvaluator::binding(KlingonEvaluator::PASS_PHRASE)),
    ),
  ]
}

// demos/greeting_app/src/evaluators.rs

//! Custom evaluators registered next to the bundled ones.

use flowroute::{ConditionBinding, Evaluator, InvocationContext, RouteTarget};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use tracing::{event, Level};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Weather {
  Sunny,
  Raining,
}

impl fmt::Display for Weather {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Weather::Sunny => f.write_str("sunny"),
      Weather::Raining => f.write_str("raining"),
    }
  }
}

/// Accepts a candidate when the current (simulated) weather matches its binding.
pub struct WeatherEvaluator {
  rng: Mutex<StdRng>,
}

impl WeatherEvaluator {
  pub const KEY: &'static str = "weather";

  pub fn new(seed: Option<u64>) -> Self {
    let rng = match seed {
      Some(seed) => StdRng::seed_from_u64(seed),
      None => StdRng::from_entropy(),
    };
    Self { rng: Mutex::new(rng) }
  }

  pub fn binding(weather: Weather) -> ConditionBinding {
    ConditionBinding::new(Self::KEY, weather)
  }

  fn current_weather(&self) -> Weather {
    if self.rng.lock().gen_bool(0.5) {
      Weather::Sunny
    } else {
      Weather::Raining
    }
  }
}

impl Evaluator for WeatherEvaluator {
  fn evaluate(&self, target: &RouteTarget<'_>, _invocation: &InvocationContext) -> anyhow::Result<bool> {
    let wanted = *target.payload::<Weather>()?;
    let current = self.current_weather();
    event!(Level::INFO, candidate = %target.candidate, %wanted, %current, "Weather evaluated.");
    Ok(current == wanted)
  }
}

/// Accepts a candidate whose binding carries the agreed Klingon pass phrase.
#[derive(Debug, Default)]
pub struct KlingonEvaluator;

impl KlingonEvaluator {
  pub const KEY: &'static str = "klingon";
  pub const PASS_PHRASE: &'static str = "Qapchu' functionality";

  pub fn binding(expression: impl Into<String>) -> ConditionBinding {
    ConditionBinding::new(Self::KEY, expression.into())
  }
}

impl Evaluator for KlingonEvaluator {
  fn evaluate(&self, target: &RouteTarget<'_>, _invocation: &InvocationContext) -> anyhow::Result<bool> {
    let expression = target.payload::<String>()?;
    event!(Level::INFO, candidate = %target.candidate, %expression, "Klingon evaluated.");
    Ok(expression == Self::PASS_PHRASE)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use flowroute::MethodSignature;

  static GREETING: MethodSignature = MethodSignature::new("greeting(&str)");

  fn target<'a>(binding: &'a ConditionBinding) -> RouteTarget<'a> {
    RouteTarget {
      interface: "GreetingService",
      method: &GREETING,
      candidate: "test",
      binding,
    }
  }

  #[test]
  fn seeded_weather_is_reproducible() {
    let a = WeatherEvaluator::new(Some(7));
    let b = WeatherEvaluator::new(Some(7));
    let sequence_a: Vec<Weather> = (0..16).map(|_| a.current_weather()).collect();
    let sequence_b: Vec<Weather> = (0..16).map(|_| b.current_weather()).collect();
    assert_eq!(sequence_a, sequence_b);
  }

  #[test]
  fn weather_matches_binding() {
    let evaluator = WeatherEvaluator::new(Some(11));
    let expected = WeatherEvaluator::new(Some(11)).current_weather();
    let binding = WeatherEvaluator::binding(expected);
    assert!(evaluator
      .evaluate(&target(&binding), &InvocationContext::new(GREETING.clone()))
      .unwrap());
  }

  #[test]
  fn klingon_needs_pass_phrase() {
    let ctx = InvocationContext::new(GREETING.clone());
    let accepted = KlingonEvaluator::binding(KlingonEvaluator::PASS_PHRASE);
    let rejected = KlingonEvaluator::binding("nuqneH");
    assert!(KlingonEvaluator.evaluate(&target(&accepted), &ctx).unwrap());
    assert!(!KlingonEvaluator.evaluate(&target(&rejected), &ctx).unwrap());
  }
}

// demos/greeting_app/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use flowroute::{DuplicateEvaluatorPolicy, RoutingConfig};
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
  /// Tenant the demo requests run as.
  pub tenant: String,
  pub users: Vec<String>,
  /// Flags enabled in the in-memory flag store at startup.
  pub enabled_flags: Vec<String>,
  /// Fixes the weather sequence; random when unset.
  pub weather_seed: Option<u64>,
  pub duplicate_evaluators: DuplicateEvaluatorPolicy,
}

fn list(raw: &str) -> Vec<String> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_string)
    .collect()
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| env::var(var_name).ok();

    let tenant = get_env("GREETING_TENANT").unwrap_or_else(|| "acme".to_string());
    let users = list(&get_env("GREETING_USERS").unwrap_or_else(|| "Alice,Bob,Worf".to_string()));
    if users.is_empty() {
      return Err(AppError::Config("GREETING_USERS must name at least one user".to_string()));
    }
    let enabled_flags = list(&get_env("GREETING_FLAGS").unwrap_or_default());

    let weather_seed = get_env("GREETING_WEATHER_SEED")
      .map(|raw| raw.trim().parse::<u64>())
      .transpose()
      .map_err(|e| AppError::Config(format!("Invalid GREETING_WEATHER_SEED: {}", e)))?;

    let duplicate_evaluators = get_env("FLOWROUTE_DUPLICATE_EVALUATORS")
      .map(|raw| raw.parse::<DuplicateEvaluatorPolicy>())
      .transpose()
      .map_err(|e| AppError::Config(format!("Invalid FLOWROUTE_DUPLICATE_EVALUATORS: {}", e)))?
      .unwrap_or_default();

    tracing::info!("Application configuration loaded successfully.");
    Ok(Self {
      tenant,
      users,
      enabled_flags,
      weather_seed,
      duplicate_evaluators,
    })
  }

  pub fn routing(&self) -> RoutingConfig {
    RoutingConfig::default().with_duplicate_evaluators(self.duplicate_evaluators)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  const VARS: [&str; 5] = [
    "GREETING_TENANT",
    "GREETING_USERS",
    "GREETING_FLAGS",
    "GREETING_WEATHER_SEED",
    "FLOWROUTE_DUPLICATE_EVALUATORS",
  ];

  fn clear() {
    for var in VARS {
      env::remove_var(var);
    }
  }

  #[test]
  fn list_splits_and_trims() {
    assert_eq!(list(" a, b,,c "), vec!["a", "b", "c"]);
    assert!(list("").is_empty());
  }

  #[test]
  #[serial]
  fn reads_overrides_from_env() {
    clear();
    env::set_var("GREETING_TENANT", "initech");
    env::set_var("GREETING_USERS", "Ann, Bob");
    env::set_var("GREETING_FLAGS", "greeting_new_service");
    env::set_var("GREETING_WEATHER_SEED", "42");
    env::set_var("FLOWROUTE_DUPLICATE_EVALUATORS", "Replace");

    let config = AppConfig::from_env().unwrap();
    assert_eq!(config.tenant, "initech");
    assert_eq!(config.users, vec!["Ann", "Bob"]);
    assert_eq!(config.enabled_flags, vec!["greeting_new_service"]);
    assert_eq!(config.weather_seed, Some(42));
    assert_eq!(config.duplicate_evaluators, DuplicateEvaluatorPolicy::Replace);
    clear();
  }

  #[test]
  #[serial]
  fn rejects_invalid_policy() {
    clear();
    env::set_var("FLOWROUTE_DUPLICATE_EVALUATORS", "sometimes");
    match AppConfig::from_env() {
      Err(AppError::Config(message)) => assert!(message.contains("FLOWROUTE_DUPLICATE_EVALUATORS")),
      other => panic!("Expected a config error, got {:?}", other),
    }
    clear();
  }

  #[test]
  #[serial]
  fn rejects_invalid_seed() {
    clear();
    env::set_var("GREETING_WEATHER_SEED", "tomorrow");
    assert!(matches!(AppConfig::from_env(), Err(AppError::Config(_))));
    clear();
  }

  #[test]
  #[serial]
  fn falls_back_to_defaults() {
    clear();
    let config = AppConfig::from_env().unwrap();
    assert_eq!(config.tenant, "acme");
    assert_eq!(config.users, vec!["Alice", "Bob", "Worf"]);
    assert!(config.enabled_flags.is_empty());
    assert_eq!(config.weather_seed, None);
    assert_eq!(config.duplicate_evaluators, DuplicateEvaluatorPolicy::Reject);
  }

  #[test]
  #[serial]
  fn rejects_empty_user_list() {
    clear();
    env::set_var("GREETING_USERS", " , ,");
    match AppConfig::from_env() {
      Err(AppError::Config(message)) => assert!(message.contains("GREETING_USERS")),
      other => panic!("Expected a config error, got {:?}", other),
    }
    clear();
  }
}

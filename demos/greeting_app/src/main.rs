// demos/greeting_app/src/main.rs

// Declare modules for the application
mod config;
mod errors;
mod evaluators;
mod routing;
mod services;

use crate::config::AppConfig;
use crate::errors::{AppError, Result as AppResult};
use crate::services::{GreetingService, CURRENT_TENANT};

use flowroute::InMemoryFlags;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` when set, `info` otherwise.
fn log_filter() -> EnvFilter {
  EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

#[tokio::main]
async fn main() -> AppResult<()> {
  // Load .env first; it may set RUST_LOG.
  dotenvy::dotenv().ok();
  tracing_subscriber::fmt().with_env_filter(log_filter()).init();

  tracing::info!("Starting greeting application...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => cfg,
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(e);
    }
  };

  let flags = Arc::new(InMemoryFlags::with_enabled(app_config.enabled_flags.iter().cloned()));
  let routes = routing::start_routes(&app_config, Arc::clone(&flags))?;
  let greetings = Arc::new(routing::greeting_service(&routes)?);

  // One task per user, all in the configured tenant, all sharing the proxy.
  let mut handles = Vec::with_capacity(app_config.users.len());
  for user in app_config.users.iter().cloned() {
    let greetings = Arc::clone(&greetings);
    let tenant = app_config.tenant.clone();
    handles.push(tokio::spawn(CURRENT_TENANT.scope(tenant, async move {
      let hello = greetings.greeting(&user).await;
      let bye = greetings.farewell(&user).await;
      (user, hello, bye)
    })));
  }

  for handle in handles {
    let (user, hello, bye) = handle.await.map_err(|e| AppError::Internal(e.to_string()))?;
    match hello {
      Ok(message) => tracing::info!(%user, "{}", message),
      Err(e) => tracing::error!(%user, error = %e, "Greeting failed."),
    }
    match bye {
      Ok(message) => tracing::info!(%user, "{}", message),
      Err(e) => tracing::error!(%user, error = %e, "Farewell failed."),
    }
  }

  tracing::info!("Greeting application finished.");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;
  use std::env;

  #[test]
  #[serial]
  fn log_filter_defaults_to_info() {
    env::remove_var("RUST_LOG");
    assert_eq!(log_filter().to_string(), "info");
  }

  #[test]
  #[serial]
  fn log_filter_follows_rust_log() {
    env::set_var("RUST_LOG", "warn");
    assert_eq!(log_filter().to_string(), "warn");
    env::remove_var("RUST_LOG");
  }
}

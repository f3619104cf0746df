// demos/greeting_app/src/errors.rs

use flowroute::{ConfigurationError, DispatchError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Routing Setup Error: {source}")]
  Startup {
    #[from] // Any failed validation aborts startup
    source: ConfigurationError,
  },

  #[error("Routing Error: {source}")]
  Routing {
    #[from] // Lets GreetingService methods return routing failures through AppError
    source: DispatchError,
  },

  #[error("Greeting Refused: {0}")]
  Refused(String),

  #[error("Internal Error: {0}")]
  Internal(String),
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;

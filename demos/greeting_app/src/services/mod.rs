// demos/greeting_app/src/services/mod.rs

pub mod candidates;
pub mod proxy;

use crate::errors::Result;
use async_trait::async_trait;
use flowroute::{InterfaceDescriptor, MethodSignature};

pub use proxy::{tenant_attributes, GreetingProxy, CURRENT_TENANT};

/// The routed contract. Callers only ever see the proxy.
#[async_trait]
pub trait GreetingService: Send + Sync {
  async fn greeting(&self, user_name: &str) -> Result<String>;
  async fn farewell(&self, user_name: &str) -> Result<String>;
}

pub const GREETING: MethodSignature = MethodSignature::new("greeting(&str)");
pub const FAREWELL: MethodSignature = MethodSignature::new("farewell(&str)");

pub fn greeting_descriptor() -> InterfaceDescriptor {
  InterfaceDescriptor::new("GreetingService", [GREETING, FAREWELL])
}

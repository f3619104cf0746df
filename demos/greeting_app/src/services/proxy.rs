// demos/greeting_app/src/services/proxy.rs

use super::{GreetingService, FAREWELL, GREETING};
use crate::errors::Result;
use async_trait::async_trait;
use flowroute::{attributes_from_fn, AttributeSource, MethodSignature, Router};
use std::sync::Arc;

tokio::task_local! {
  /// Tenant of the request the current task is serving.
  pub static CURRENT_TENANT: String;
}

/// Copies `CURRENT_TENANT` into the "tenant" attribute, when the task has one.
pub fn tenant_attributes() -> impl AttributeSource {
  attributes_from_fn(|attributes| {
    if let Ok(tenant) = CURRENT_TENANT.try_with(Clone::clone) {
      attributes.insert("tenant", tenant);
    }
  })
}

pub struct GreetingProxy {
  router: Router<dyn GreetingService>,
}

impl GreetingProxy {
  pub fn new(router: Router<dyn GreetingService>) -> Self {
    Self { router }
  }

  fn select(&self, method: MethodSignature, user_name: &str) -> Result<Arc<dyn GreetingService>> {
    let ctx = self.router.context(method).arg("user_name", user_name);
    let entry = self.router.resolve_entry(&ctx)?;
    tracing::debug!(candidate = %entry.candidate(), method = %ctx.method(), "Greeting routed.");
    Ok(Arc::clone(entry.instance()))
  }
}

#[async_trait]
impl GreetingService for GreetingProxy {
  async fn greeting(&self, user_name: &str) -> Result<String> {
    let target = self.select(GREETING, user_name)?;
    target.greeting(user_name).await
  }

  async fn farewell(&self, user_name: &str) -> Result<String> {
    let target = self.select(FAREWELL, user_name)?;
    target.farewell(user_name).await
  }
}

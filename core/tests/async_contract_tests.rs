// tests/async_contract_tests.rs
mod common;

use async_trait::async_trait;
use common::*;
use flowroute::{
  Bootstrap, Candidate, CandidateDeclaration, ConditionBinding, DispatchError, InterfaceDescriptor, MethodSignature,
  PredicateEvaluator, Router, Value,
};
use std::sync::Arc;
use std::time::Duration;

#[async_trait]
trait Inventory: Send + Sync {
  async fn stock_level(&self, sku: &str) -> Result<u32, TestError>;
}

const STOCK_LEVEL: MethodSignature = MethodSignature::new("stock_level(&str)");

struct Warehouse;

#[async_trait]
impl Inventory for Warehouse {
  async fn stock_level(&self, _sku: &str) -> Result<u32, TestError> {
    tokio::time::sleep(Duration::from_millis(5)).await;
    Ok(12)
  }
}

struct PreorderCatalog;

#[async_trait]
impl Inventory for PreorderCatalog {
  async fn stock_level(&self, sku: &str) -> Result<u32, TestError> {
    if sku.ends_with("-missing") {
      return Err(TestError::Candidate(format!("unknown sku {}", sku)));
    }
    Ok(0)
  }
}

struct InventoryProxy(Router<dyn Inventory>);

#[async_trait]
impl Inventory for InventoryProxy {
  async fn stock_level(&self, sku: &str) -> Result<u32, TestError> {
    // Resolution is synchronous; only the selected candidate is awaited.
    let target = {
      let ctx = self.0.context(STOCK_LEVEL).arg("sku", sku);
      Arc::clone(self.0.resolve(&ctx)?)
    };
    target.stock_level(sku).await
  }
}

fn inventory_routes() -> InventoryProxy {
  let mut bootstrap = Bootstrap::default();
  bootstrap
    .evaluator(PredicateEvaluator::KEY, PredicateEvaluator)
    .unwrap()
    .contract::<dyn Inventory, _>(
      InterfaceDescriptor::new("Inventory", [STOCK_LEVEL]),
      [
        Candidate::default_route("warehouse", Arc::new(Warehouse) as Arc<dyn Inventory>),
        Candidate::new(
          "preorder",
          Arc::new(PreorderCatalog) as Arc<dyn Inventory>,
          CandidateDeclaration::conditional().bind(
            STOCK_LEVEL,
            ConditionBinding::predicate(|ctx| {
              let sku = ctx
                .get("sku")
                .and_then(Value::as_str)
                .ok_or_else(|| anyhow::anyhow!("sku argument missing"))?;
              Ok(sku.starts_with("pre-"))
            }),
          ),
        ),
      ],
    )
    .unwrap();
  let routes = bootstrap.start().unwrap();
  InventoryProxy(routes.require::<dyn Inventory>().unwrap())
}

#[tokio::test]
async fn test_async_contract_routes_to_selected_candidate() {
  setup_tracing();
  let inventory = inventory_routes();
  assert_eq!(inventory.stock_level("sku-1").await.unwrap(), 12);
  assert_eq!(inventory.stock_level("pre-2").await.unwrap(), 0);
}

#[tokio::test]
async fn test_async_candidate_error_reaches_caller() {
  setup_tracing();
  let inventory = inventory_routes();
  match inventory.stock_level("pre-3-missing").await {
    Err(TestError::Candidate(message)) => assert_eq!(message, "unknown sku pre-3-missing"),
    other => panic!("Expected candidate error, got {:?}", other),
  }
}

#[tokio::test]
async fn test_concurrent_async_calls_share_one_router() {
  setup_tracing();
  let inventory = Arc::new(inventory_routes());
  let mut handles = Vec::new();
  for i in 0..16 {
    let inventory = Arc::clone(&inventory);
    handles.push(tokio::spawn(async move {
      let sku = if i % 2 == 0 { format!("pre-{}", i) } else { format!("sku-{}", i) };
      let expected = if i % 2 == 0 { 0 } else { 12 };
      assert_eq!(inventory.stock_level(&sku).await.unwrap(), expected);
    }));
  }
  for handle in handles {
    handle.await.unwrap();
  }
}

#[tokio::test]
async fn test_routing_failure_surfaces_before_any_candidate_runs() {
  setup_tracing();
  let mut bootstrap = Bootstrap::default();
  bootstrap
    .evaluator("stock_service", flowroute::from_fn(|_, _| anyhow::bail!("stock service down")))
    .unwrap()
    .contract::<dyn Inventory, _>(
      InterfaceDescriptor::new("Inventory", [STOCK_LEVEL]),
      [
        Candidate::default_route("warehouse", Arc::new(Warehouse) as Arc<dyn Inventory>),
        Candidate::new(
          "remote",
          Arc::new(PreorderCatalog) as Arc<dyn Inventory>,
          CandidateDeclaration::conditional().bind(STOCK_LEVEL, ConditionBinding::key_only("stock_service")),
        ),
      ],
    )
    .unwrap();
  let routes = bootstrap.start().unwrap();
  let inventory = InventoryProxy(routes.require::<dyn Inventory>().unwrap());

  match inventory.stock_level("sku-1").await {
    Err(TestError::Routing(DispatchError::EvaluatorFailed { candidate, .. })) => assert_eq!(candidate, "remote"),
    other => panic!("Expected EvaluatorFailed, got {:?}", other),
  }
}

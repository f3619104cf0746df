// flowroute/examples/flag_rollout.rs

use std::sync::Arc;

use flowroute::{
  attributes_from_fn, Bootstrap, Candidate, CandidateDeclaration, ConditionBinding, DispatchError, FlagEvaluator,
  InMemoryFlags, InterfaceDescriptor, MethodSignature, Router,
};
use tracing::info;

trait Checkout: Send + Sync {
  fn total_cents(&self, items: u32) -> Result<u64, DispatchError>;
}

const TOTAL_CENTS: MethodSignature = MethodSignature::new("total_cents(u32)");

struct FlatPricing;
impl Checkout for FlatPricing {
  fn total_cents(&self, items: u32) -> Result<u64, DispatchError> {
    Ok(u64::from(items) * 1_000)
  }
}

struct BulkDiscountPricing;
impl Checkout for BulkDiscountPricing {
  fn total_cents(&self, items: u32) -> Result<u64, DispatchError> {
    let gross = u64::from(items) * 1_000;
    Ok(if items >= 10 { gross * 9 / 10 } else { gross })
  }
}

struct CheckoutProxy(Router<dyn Checkout>);
impl Checkout for CheckoutProxy {
  fn total_cents(&self, items: u32) -> Result<u64, DispatchError> {
    let ctx = self.0.context(TOTAL_CENTS).arg("items", items);
    self.0.invoke(&ctx, |target| target.total_cents(items))
  }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();
  info!("--- Flag Rollout Example ---");

  // Flags can be flipped while the router is serving.
  let flags = Arc::new(InMemoryFlags::new());

  let mut bootstrap = Bootstrap::default();
  bootstrap
    .evaluator(FlagEvaluator::<Arc<InMemoryFlags>>::KEY, FlagEvaluator::new(Arc::clone(&flags)))?
    .attribute_source(attributes_from_fn(|attributes| attributes.insert("region", "eu-west")))
    .contract::<dyn Checkout, _>(
      InterfaceDescriptor::new("Checkout", [TOTAL_CENTS]),
      [
        Candidate::default_route("flat", Arc::new(FlatPricing) as Arc<dyn Checkout>),
        Candidate::new(
          "bulk_discount",
          Arc::new(BulkDiscountPricing) as Arc<dyn Checkout>,
          CandidateDeclaration::conditional().bind(TOTAL_CENTS, ConditionBinding::flag("bulk_discount")),
        ),
      ],
    )?;
  let routes = bootstrap.start()?;
  let checkout = CheckoutProxy(routes.require::<dyn Checkout>()?);

  info!("Flag off: 12 items cost {} cents", checkout.total_cents(12)?);
  flags.enable("bulk_discount");
  info!("Flag on: 12 items cost {} cents", checkout.total_cents(12)?);

  // Calls from other tasks share the same router.
  let shared = Arc::new(checkout);
  let handle = {
    let shared = Arc::clone(&shared);
    tokio::task::spawn_blocking(move || shared.total_cents(3))
  };
  info!("From a blocking task: 3 items cost {} cents", handle.await??);

  flags.disable("bulk_discount");
  info!("Flag off again: 12 items cost {} cents", shared.total_cents(12)?);

  Ok(())
}

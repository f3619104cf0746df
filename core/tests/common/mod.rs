// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use flowroute::{
  Candidate, CandidateDeclaration, ConditionBinding, DispatchError, Evaluator, EvaluatorRegistry,
  InterfaceDescriptor, InvocationContext, MethodSignature, PredicateEvaluator, RouteTarget, Router,
};
use parking_lot::Mutex;
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use tracing::Level;
use tracing_subscriber::layer::{Context as LayerContext, Layer, SubscriberExt};

// --- The routed contract used throughout the tests ---
pub trait GreetingService: Send + Sync {
  fn greeting(&self, user_name: &str) -> Result<String, TestError>;
  fn farewell(&self, user_name: &str) -> Result<String, TestError>;
}

pub const GREETING: MethodSignature = MethodSignature::new("greeting(&str)");
pub const FAREWELL: MethodSignature = MethodSignature::new("farewell(&str)");

pub fn greeting_descriptor() -> InterfaceDescriptor {
  InterfaceDescriptor::new("GreetingService", [GREETING, FAREWELL])
}

// --- Common Error Type for Tests ---
#[derive(Debug, thiserror::Error)]
pub enum TestError {
  #[error(transparent)]
  Routing(#[from] DispatchError),

  #[error("Test candidate failed: {0}")]
  Candidate(String),
}

// --- Candidates ---

/// Answers with "<tag> <user>" and counts its calls.
pub struct TaggedGreeting {
  pub tag: &'static str,
  pub calls: AtomicUsize,
}

impl TaggedGreeting {
  pub fn new(tag: &'static str) -> Arc<Self> {
    Arc::new(Self {
      tag,
      calls: AtomicUsize::new(0),
    })
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

impl GreetingService for TaggedGreeting {
  fn greeting(&self, user_name: &str) -> Result<String, TestError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    Ok(format!("{} {}", self.tag, user_name))
  }

  fn farewell(&self, user_name: &str) -> Result<String, TestError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    Ok(format!("{} bye {}", self.tag, user_name))
  }
}

pub struct FailingGreeting;

impl GreetingService for FailingGreeting {
  fn greeting(&self, user_name: &str) -> Result<String, TestError> {
    Err(TestError::Candidate(format!("cannot greet {}", user_name)))
  }

  fn farewell(&self, user_name: &str) -> Result<String, TestError> {
    Err(TestError::Candidate(format!("cannot say goodbye to {}", user_name)))
  }
}

/// Hand-written proxy, the way applications route a contract.
pub struct GreetingProxy(pub Router<dyn GreetingService>);

impl GreetingService for GreetingProxy {
  fn greeting(&self, user_name: &str) -> Result<String, TestError> {
    let ctx = self.0.context(GREETING).arg("user_name", user_name);
    self.0.invoke(&ctx, |target| target.greeting(user_name))
  }

  fn farewell(&self, user_name: &str) -> Result<String, TestError> {
    let ctx = self.0.context(FAREWELL).arg("user_name", user_name);
    self.0.invoke(&ctx, |target| target.farewell(user_name))
  }
}

pub fn default_candidate(id: &str, service: Arc<TaggedGreeting>) -> Candidate<dyn GreetingService> {
  Candidate::default_route(id, service as Arc<dyn GreetingService>)
}

/// A candidate routed on `GREETING` only, through the "verdict" evaluator.
pub fn verdict_candidate(
  id: &str,
  service: Arc<dyn GreetingService>,
  verdict: Verdict,
) -> Candidate<dyn GreetingService> {
  Candidate::new(
    id,
    service,
    CandidateDeclaration::conditional().bind(GREETING, ConditionBinding::new(VerdictEvaluator::KEY, verdict)),
  )
}

// --- Evaluators ---

/// Payload of a "verdict" binding: what the evaluator answers for that candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
  Accept,
  Reject,
  Fail,
}

/// Answers with the binding's `Verdict` and records every candidate it was asked about.
#[derive(Default)]
pub struct VerdictEvaluator {
  pub asked: Arc<Mutex<Vec<String>>>,
}

impl VerdictEvaluator {
  pub const KEY: &'static str = "verdict";

  pub fn new(asked: Arc<Mutex<Vec<String>>>) -> Self {
    Self { asked }
  }
}

impl Evaluator for VerdictEvaluator {
  fn evaluate(&self, target: &RouteTarget<'_>, _invocation: &InvocationContext) -> anyhow::Result<bool> {
    self.asked.lock().push(target.candidate.to_string());
    match target.payload::<Verdict>()? {
      Verdict::Accept => Ok(true),
      Verdict::Reject => Ok(false),
      Verdict::Fail => anyhow::bail!("verdict unavailable for {}", target.candidate),
    }
  }
}

/// Registry with the "verdict" and "predicate" evaluators, plus the log of candidates asked.
pub fn test_registry() -> (Arc<EvaluatorRegistry>, Arc<Mutex<Vec<String>>>) {
  let asked = Arc::new(Mutex::new(Vec::new()));
  let mut registry = EvaluatorRegistry::new();
  registry
    .register(VerdictEvaluator::KEY, VerdictEvaluator::new(Arc::clone(&asked)))
    .unwrap();
  registry.register(PredicateEvaluator::KEY, PredicateEvaluator).unwrap();
  (Arc::new(registry), asked)
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

/// Counts ERROR events seen on the current thread while the layer is the default subscriber.
struct ErrorEvents(Arc<AtomicUsize>);

impl<S: tracing::Subscriber> Layer<S> for ErrorEvents {
  fn on_event(&self, event: &tracing::Event<'_>, _ctx: LayerContext<'_, S>) {
    if *event.metadata().level() == Level::ERROR {
      self.0.fetch_add(1, Ordering::SeqCst);
    }
  }
}

/// Runs `f` under a scoped subscriber and returns its result with the number of ERROR events it emitted.
pub fn count_error_events<R>(f: impl FnOnce() -> R) -> (R, usize) {
  let count = Arc::new(AtomicUsize::new(0));
  let subscriber = tracing_subscriber::registry().with(ErrorEvents(Arc::clone(&count)));
  let result = tracing::subscriber::with_default(subscriber, f);
  (result, count.load(Ordering::SeqCst))
}

// --- Atomic counter for evaluators shared through statics ---
pub static EVALUATIONS: Lazy<Arc<AtomicUsize>> = Lazy::new(|| Arc::new(AtomicUsize::new(0)));

pub fn reset_counters() {
  EVALUATIONS.store(0, Ordering::SeqCst);
}

/// Accepts every call and counts the evaluations in `EVALUATIONS`.
pub struct CountingEvaluator;

impl Evaluator for CountingEvaluator {
  fn evaluate(&self, _target: &RouteTarget<'_>, _invocation: &InvocationContext) -> anyhow::Result<bool> {
    EVALUATIONS.fetch_add(1, Ordering::SeqCst);
    Ok(true)
  }
}

pub mod candidate;
pub mod invocation;
pub mod method;
pub mod value;

// Re-export key types for easier access from other flowroute modules (and lib.rs)
pub use candidate::{Candidate, CandidateDeclaration, ConditionBinding};
pub use invocation::InvocationContext;
pub use method::{InterfaceDescriptor, MethodSignature};
pub use value::{Attributes, Value};

// flowroute/src/core/method.rs

//! Identities of routed contracts and their methods.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;

use crate::error::ConfigurationError;

/// Identity of one method of a routed contract, e.g. `"greeting(&str)"`.
///
/// Usually declared once per method as a `const` next to the contract trait.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MethodSignature(Cow<'static, str>);

impl MethodSignature {
  pub const fn new(signature: &'static str) -> Self {
    MethodSignature(Cow::Borrowed(signature))
  }

  pub fn owned(signature: impl Into<String>) -> Self {
    MethodSignature(Cow::Owned(signature.into()))
  }

  pub fn as_str(&self) -> &str {
    self.0.as_ref()
  }
}

impl fmt::Display for MethodSignature {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl From<&'static str> for MethodSignature {
  fn from(signature: &'static str) -> Self {
    MethodSignature::new(signature)
  }
}

/// The routed contract: its name and the ordered set of its method signatures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterfaceDescriptor {
  name: Cow<'static, str>,
  methods: Vec<MethodSignature>,
}

impl InterfaceDescriptor {
  pub fn new<N, I>(name: N, methods: I) -> Self
  where
    N: Into<Cow<'static, str>>,
    I: IntoIterator<Item = MethodSignature>,
  {
    Self {
      name: name.into(),
      methods: methods.into_iter().collect(),
    }
  }

  pub fn name(&self) -> &str {
    self.name.as_ref()
  }

  /// Method signatures in declaration order.
  pub fn methods(&self) -> &[MethodSignature] {
    &self.methods
  }

  pub fn declares(&self, method: &MethodSignature) -> bool {
    self.methods.contains(method)
  }

  /// Rejects descriptors that declare the same signature twice.
  pub(crate) fn check_unique_methods(&self) -> Result<(), ConfigurationError> {
    let mut seen = HashSet::with_capacity(self.methods.len());
    for method in &self.methods {
      if !seen.insert(method) {
        return Err(ConfigurationError::DuplicateMethod {
          interface: self.name().to_string(),
          method: method.to_string(),
        });
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const GREETING: MethodSignature = MethodSignature::new("greeting(&str)");

  #[test]
  fn const_and_owned_signatures_compare_equal() {
    assert_eq!(GREETING, MethodSignature::owned("greeting(&str)"));
    assert_eq!(GREETING.to_string(), "greeting(&str)");
  }

  #[test]
  fn duplicate_methods_are_rejected() {
    let descriptor = InterfaceDescriptor::new("GreetingService", [GREETING, GREETING]);
    match descriptor.check_unique_methods() {
      Err(ConfigurationError::DuplicateMethod { interface, method }) => {
        assert_eq!(interface, "GreetingService");
        assert_eq!(method, "greeting(&str)");
      }
      other => panic!("Expected DuplicateMethod, got {:?}", other),
    }
  }
}

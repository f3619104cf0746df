// flowroute/src/core/value.rs

//! Values visible to evaluators: call arguments and ambient attributes.

use std::any::Any;
use std::collections::{btree_map, BTreeMap};
use std::fmt;
use std::sync::Arc;

/// An argument or attribute value.
///
/// Scalars cover what conditions usually look at (tenant ids, user names,
/// counters, switches). Anything else travels as `Opaque` and is read back
/// with [`Value::downcast_ref`].
#[derive(Clone)]
pub enum Value {
  Null,
  Bool(bool),
  Int(i64),
  Float(f64),
  Text(String),
  Opaque(Arc<dyn Any + Send + Sync>),
}

impl Value {
  pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
    Value::Opaque(Arc::new(value))
  }

  pub fn is_null(&self) -> bool {
    matches!(self, Value::Null)
  }

  pub fn as_bool(&self) -> Option<bool> {
    match self {
      Value::Bool(b) => Some(*b),
      _ => None,
    }
  }

  pub fn as_i64(&self) -> Option<i64> {
    match self {
      Value::Int(i) => Some(*i),
      _ => None,
    }
  }

  pub fn as_f64(&self) -> Option<f64> {
    match self {
      Value::Float(f) => Some(*f),
      Value::Int(i) => Some(*i as f64),
      _ => None,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Value::Text(s) => Some(s.as_str()),
      _ => None,
    }
  }

  pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
    match self {
      Value::Opaque(inner) => inner.downcast_ref::<T>(),
      _ => None,
    }
  }
}

impl fmt::Debug for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::Null => f.write_str("Null"),
      Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
      Value::Int(i) => f.debug_tuple("Int").field(i).finish(),
      Value::Float(x) => f.debug_tuple("Float").field(x).finish(),
      Value::Text(s) => f.debug_tuple("Text").field(s).finish(),
      Value::Opaque(_) => f.write_str("Opaque(..)"),
    }
  }
}

impl PartialEq for Value {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Value::Null, Value::Null) => true,
      (Value::Bool(a), Value::Bool(b)) => a == b,
      (Value::Int(a), Value::Int(b)) => a == b,
      (Value::Float(a), Value::Float(b)) => a == b,
      (Value::Text(a), Value::Text(b)) => a == b,
      (Value::Opaque(a), Value::Opaque(b)) => Arc::ptr_eq(a, b),
      _ => false,
    }
  }
}

impl From<bool> for Value {
  fn from(b: bool) -> Self {
    Value::Bool(b)
  }
}

impl From<i64> for Value {
  fn from(i: i64) -> Self {
    Value::Int(i)
  }
}

impl From<i32> for Value {
  fn from(i: i32) -> Self {
    Value::Int(i64::from(i))
  }
}

impl From<u32> for Value {
  fn from(i: u32) -> Self {
    Value::Int(i64::from(i))
  }
}

impl From<f64> for Value {
  fn from(f: f64) -> Self {
    Value::Float(f)
  }
}

impl From<&str> for Value {
  fn from(s: &str) -> Self {
    Value::Text(s.to_string())
  }
}

impl From<String> for Value {
  fn from(s: String) -> Self {
    Value::Text(s)
  }
}

impl<T: Into<Value>> From<Option<T>> for Value {
  fn from(opt: Option<T>) -> Self {
    opt.map_or(Value::Null, Into::into)
  }
}

/// Ambient, caller-supplied data (tenant, request id, ...), ordered by key.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attributes(BTreeMap<String, Value>);

impl Attributes {
  pub fn new() -> Self {
    Self(BTreeMap::new())
  }

  /// Inserts or overwrites an attribute.
  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
    self.0.insert(key.into(), value.into());
  }

  pub fn get(&self, key: &str) -> Option<&Value> {
    self.0.get(key)
  }

  pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
    self.0.iter()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

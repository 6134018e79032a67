use std::fmt;

use serde_derive::Deserialize;

/// A dynamically typed metadata value.
///
/// Integers and floats compare numerically with each other, so `2` and `2.0` are the same value.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum MetaValue {
  Bool(bool),
  Integer(i64),
  Float(f64),
  Text(String),
  List(Vec<MetaValue>),
}

impl MetaValue {
  pub fn type_name(&self) -> &'static str {
    match self {
      MetaValue::Bool(_) => "bool",
      MetaValue::Integer(_) => "integer",
      MetaValue::Float(_) => "float",
      MetaValue::Text(_) => "text",
      MetaValue::List(_) => "list",
    }
  }

  pub fn as_integer(&self) -> Option<i64> {
    match self {
      MetaValue::Integer(value) => Some(*value),
      _ => None,
    }
  }

  pub fn as_float(&self) -> Option<f64> {
    match self {
      MetaValue::Integer(value) => Some(*value as f64),
      MetaValue::Float(value) => Some(*value),
      _ => None,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      MetaValue::Text(value) => Some(value.as_str()),
      _ => None,
    }
  }

  pub fn as_list(&self) -> Option<&[MetaValue]> {
    match self {
      MetaValue::List(values) => Some(values.as_slice()),
      _ => None,
    }
  }
}

impl PartialEq for MetaValue {
  fn eq(&self, other: &MetaValue) -> bool {
    use MetaValue::*;
    match (self, other) {
      (Bool(a), Bool(b)) => a == b,
      (Integer(a), Integer(b)) => a == b,
      (Float(a), Float(b)) => a == b,
      (Integer(a), Float(b)) | (Float(b), Integer(a)) => *a as f64 == *b,
      (Text(a), Text(b)) => a == b,
      (List(a), List(b)) => a == b,
      _ => false,
    }
  }
}

impl fmt::Display for MetaValue {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      MetaValue::Bool(value) => write!(f, "{}", value),
      MetaValue::Integer(value) => write!(f, "{}", value),
      MetaValue::Float(value) => write!(f, "{:?}", value),
      MetaValue::Text(value) => write!(f, "{:?}", value),
      MetaValue::List(values) => {
        write!(f, "[")?;
        for (index, value) in values.iter().enumerate() {
          if index > 0 {
            write!(f, ", ")?;
          }
          write!(f, "{}", value)?;
        }
        write!(f, "]")
      }
    }
  }
}

impl From<bool> for MetaValue {
  fn from(item: bool) -> Self {
    MetaValue::Bool(item)
  }
}

impl From<i64> for MetaValue {
  fn from(item: i64) -> Self {
    MetaValue::Integer(item)
  }
}

impl From<i32> for MetaValue {
  fn from(item: i32) -> Self {
    MetaValue::Integer(i64::from(item))
  }
}

impl From<u32> for MetaValue {
  fn from(item: u32) -> Self {
    MetaValue::Integer(i64::from(item))
  }
}

impl From<f64> for MetaValue {
  fn from(item: f64) -> Self {
    MetaValue::Float(item)
  }
}

impl From<&str> for MetaValue {
  fn from(item: &str) -> Self {
    MetaValue::Text(item.to_string())
  }
}

impl From<String> for MetaValue {
  fn from(item: String) -> Self {
    MetaValue::Text(item)
  }
}

impl<T> From<Vec<T>> for MetaValue
where
  T: Into<MetaValue>,
{
  fn from(items: Vec<T>) -> Self {
    MetaValue::List(items.into_iter().map(Into::into).collect())
  }
}

#[cfg(test)]
mod test {

  use super::MetaValue;

  #[test]
  pub fn numeric_equality() {
    assert_eq!(MetaValue::Integer(2), MetaValue::Float(2.0));
    assert_eq!(MetaValue::Float(4.0), MetaValue::Integer(4));
    assert_ne!(MetaValue::Integer(2), MetaValue::Float(2.5));
    assert_ne!(MetaValue::Integer(1), MetaValue::Bool(true));
    assert_eq!(MetaValue::from(vec![4, 3]), MetaValue::from(vec![4.0, 3.0]));
  }

  #[test]
  pub fn display() {
    assert_eq!(MetaValue::from(vec![4, 3]).to_string(), "[4, 3]");
    assert_eq!(MetaValue::from("funk").to_string(), "\"funk\"");
    assert_eq!(MetaValue::Float(120.0).to_string(), "120.0");
  }

  #[test]
  pub fn deserialize_untagged() {
    #[derive(serde_derive::Deserialize)]
    struct Doc {
      integer: MetaValue,
      float: MetaValue,
      text: MetaValue,
      flag: MetaValue,
      list: MetaValue,
    }

    let doc: Doc = toml::from_str(
      r#"
        integer = 1
        float = 2.5
        text = "rock"
        flag = true
        list = [4, 8]
      "#,
    )
    .unwrap();
    assert_eq!(doc.integer, MetaValue::Integer(1));
    assert_eq!(doc.float.type_name(), "float");
    assert_eq!(doc.text.as_str(), Some("rock"));
    assert_eq!(doc.flag, MetaValue::Bool(true));
    assert_eq!(doc.list, MetaValue::from(vec![4, 8]));
  }
}

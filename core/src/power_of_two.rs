use failure::Fail;

use crate::metadata::MetaValue;

const F64_MANTISSA_MASK: u64 = (1 << 52) - 1;

#[derive(Debug, Fail, PartialEq)]
pub enum NumberError {
  #[fail(display = "Expected an integer or a float but received {}", found)]
  InvalidArgument { found: String },
}

pub type NumberResult<T> = Result<T, NumberError>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
  Integer(i64),
  Float(f64),
}

impl Number {
  pub fn is_power_of_two(self) -> bool {
    match self {
      Number::Integer(n) => n > 0 && n & (n - 1) == 0,
      // an integral float >= 1 is a power of two when its mantissa is empty
      Number::Float(n) => {
        n.is_finite() && n >= 1.0 && n.fract() == 0.0 && n.to_bits() & F64_MANTISSA_MASK == 0
      }
    }
  }
}

macro_rules! number_from_integer {
  ($($t:ty),*) => {
    $(impl From<$t> for Number {
      fn from(item: $t) -> Self {
        Number::Integer(i64::from(item))
      }
    })*
  };
}

number_from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Number {
  fn from(item: f32) -> Self {
    Number::Float(f64::from(item))
  }
}

impl From<f64> for Number {
  fn from(item: f64) -> Self {
    Number::Float(item)
  }
}

impl<'a> std::convert::TryFrom<&'a MetaValue> for Number {
  type Error = NumberError;

  fn try_from(value: &'a MetaValue) -> NumberResult<Number> {
    match value {
      MetaValue::Integer(n) => Ok(Number::Integer(*n)),
      MetaValue::Float(n) => Ok(Number::Float(*n)),
      other => Err(NumberError::InvalidArgument {
        found: other.type_name().to_string(),
      }),
    }
  }
}

/// True when `n` holds a power of two. Floats with a fractional part are never powers of two.
pub fn is_power_of_two<N: Into<Number>>(n: N) -> bool {
  n.into().is_power_of_two()
}

/// Dynamically typed variant of [`is_power_of_two`].
///
/// A missing value is not a power of two; a value that is not a number is an error.
pub fn check_power_of_two(value: Option<&MetaValue>) -> NumberResult<bool> {
  use std::convert::TryFrom;

  match value {
    None => Ok(false),
    Some(value) => Number::try_from(value).map(Number::is_power_of_two),
  }
}

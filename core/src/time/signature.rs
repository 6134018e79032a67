use std::any::{self, Any};
use std::convert::TryFrom;
use std::fmt;

use crate::metadata::{MetaValue, Metadata};
use crate::power_of_two::is_power_of_two;
use crate::time::{validate_time_step, ParameterError, ParameterResult, TimeStep};

pub const NUMERATOR: &str = "numerator";
pub const DENOMINATOR: &str = "denominator";
pub const BEAT_DIVISION_FACTORS: &str = "beat_division_factors";

/// Time signature that becomes active at a time step.
///
/// Every field is optional until set, see [`TimeSignature::is_ready_to_use`].
#[derive(Debug, Clone, Default)]
pub struct TimeSignature {
  time_step: Option<TimeStep>,
  numerator: Option<u32>,   // beats per bar
  denominator: Option<u32>, // note value, always a power of two
  beat_division_factors: Option<Vec<i64>>,
}

impl TimeSignature {
  pub fn new(
    time_step: i64,
    numerator: i64,
    denominator: i64,
    beat_division_factors: Vec<i64>,
  ) -> ParameterResult<TimeSignature> {
    TimeSignature::default()
      .with_time_step(Some(time_step))?
      .with_numerator(Some(numerator))?
      .with_denominator(Some(denominator))?
      .with_beat_division_factors(Some(beat_division_factors))
  }

  pub fn get_time_step(&self) -> Option<TimeStep> {
    self.time_step
  }

  pub fn get_numerator(&self) -> Option<u32> {
    self.numerator
  }

  pub fn get_denominator(&self) -> Option<u32> {
    self.denominator
  }

  pub fn get_beat_division_factors(&self) -> Option<&[i64]> {
    self.beat_division_factors.as_ref().map(Vec::as_slice)
  }

  pub fn with_time_step(mut self, time_step: Option<i64>) -> ParameterResult<TimeSignature> {
    self.time_step = time_step.map(validate_time_step).transpose()?;
    Ok(self)
  }

  pub fn with_numerator(mut self, numerator: Option<i64>) -> ParameterResult<TimeSignature> {
    self.numerator = numerator.map(validate_numerator).transpose()?;
    Ok(self)
  }

  pub fn with_denominator(mut self, denominator: Option<i64>) -> ParameterResult<TimeSignature> {
    self.denominator = denominator.map(validate_denominator).transpose()?;
    Ok(self)
  }

  pub fn with_beat_division_factors(
    mut self,
    factors: Option<Vec<i64>>,
  ) -> ParameterResult<TimeSignature> {
    if let Some(factors) = factors.as_ref() {
      validate_beat_division_factors(factors)?;
    }
    self.beat_division_factors = factors;
    Ok(self)
  }

  /// True once all the fields have been set.
  pub fn is_ready_to_use(&self) -> bool {
    self.time_step.is_some()
      && self.numerator.is_some()
      && self.denominator.is_some()
      && self.beat_division_factors.is_some()
  }

  /// Compares with a value of any type, failing unless it is another time signature.
  pub fn try_eq<T: Any>(&self, other: &T) -> ParameterResult<bool> {
    (other as &dyn Any)
      .downcast_ref::<TimeSignature>()
      .map(|other| self == other)
      .ok_or(ParameterError::TypeMismatch {
        expected: "TimeSignature",
        found: any::type_name::<T>(),
      })
  }

  /// The fields other than the time step, as a metadata snapshot.
  pub fn to_metadata(&self) -> Metadata<String, MetaValue> {
    let mut snapshot = Vec::new();
    if let Some(numerator) = self.numerator {
      snapshot.push((NUMERATOR.to_string(), MetaValue::from(numerator)));
    }
    if let Some(denominator) = self.denominator {
      snapshot.push((DENOMINATOR.to_string(), MetaValue::from(denominator)));
    }
    if let Some(factors) = self.beat_division_factors.as_ref() {
      snapshot.push((BEAT_DIVISION_FACTORS.to_string(), MetaValue::from(factors.clone())));
    }
    snapshot.into_iter().collect()
  }

  /// Reads the fields back from a metadata snapshot. Missing keys leave the fields unset.
  pub fn from_metadata(
    time_step: TimeStep,
    snapshot: &Metadata<String, MetaValue>,
  ) -> ParameterResult<TimeSignature> {
    let numerator = snapshot
      .value_at(&NUMERATOR.to_string(), 0)
      .map(|value| integer(NUMERATOR, value))
      .transpose()?;

    let denominator = snapshot
      .value_at(&DENOMINATOR.to_string(), 0)
      .map(|value| integer(DENOMINATOR, value))
      .transpose()?;

    let factors = snapshot
      .value_at(&BEAT_DIVISION_FACTORS.to_string(), 0)
      .map(integer_list)
      .transpose()?;

    TimeSignature::default()
      .with_time_step(Some(i64::from(time_step)))?
      .with_numerator(numerator)?
      .with_denominator(denominator)?
      .with_beat_division_factors(factors)
  }
}

/// The time step is not part of the comparison.
impl PartialEq for TimeSignature {
  fn eq(&self, other: &TimeSignature) -> bool {
    self.numerator == other.numerator
      && self.denominator == other.denominator
      && self.beat_division_factors == other.beat_division_factors
  }
}

impl fmt::Display for TimeSignature {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(
      f,
      "TimeSignature {{ time_step: {:?}, numerator: {:?}, denominator: {:?}, beat_division_factors: {:?} }}",
      self.time_step, self.numerator, self.denominator, self.beat_division_factors
    )
  }
}

fn validate_numerator(value: i64) -> ParameterResult<u32> {
  if value <= 0 {
    return Err(ParameterError::validation(
      NUMERATOR,
      format!("it should be greater than zero, received {}", value),
    ));
  }
  u32::try_from(value)
    .map_err(|_| ParameterError::validation(NUMERATOR, format!("{} is out of range", value)))
}

fn validate_denominator(value: i64) -> ParameterResult<u32> {
  if !is_power_of_two(value) {
    return Err(ParameterError::validation(
      DENOMINATOR,
      format!("it should be a power of 2, received {}", value),
    ));
  }
  u32::try_from(value)
    .map_err(|_| ParameterError::validation(DENOMINATOR, format!("{} is out of range", value)))
}

// Only a factor that is both a power of 2 and a multiple of 3 is refused.
// No integer is both, so any list of integers passes.
fn validate_beat_division_factors(factors: &[i64]) -> ParameterResult<()> {
  match factors
    .iter()
    .find(|factor| is_power_of_two(**factor) && **factor % 3 == 0)
  {
    Some(factor) => Err(ParameterError::validation(
      BEAT_DIVISION_FACTORS,
      format!("factors must be either power of 2 or multiple of 3, received {}", factor),
    )),
    None => Ok(()),
  }
}

fn integer(field: &'static str, value: &MetaValue) -> ParameterResult<i64> {
  value.as_integer().ok_or_else(|| {
    ParameterError::validation(
      field,
      format!("expected an integer but received a {}", value.type_name()),
    )
  })
}

fn integer_list(value: &MetaValue) -> ParameterResult<Vec<i64>> {
  let values = value.as_list().ok_or_else(|| {
    ParameterError::validation(
      BEAT_DIVISION_FACTORS,
      format!("expected a list but received a {}", value.type_name()),
    )
  })?;

  values
    .iter()
    .map(|value| integer(BEAT_DIVISION_FACTORS, value))
    .collect()
}

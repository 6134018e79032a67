use std::any::{self, Any};
use std::fmt;

use crate::metadata::{MetaValue, Metadata};
use crate::time::{validate_time_step, ParameterError, ParameterResult, TimeStep};

pub const QPM: &str = "qpm";

/// Tempo in quarter notes per minute, active from a time step on.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tempo {
  time_step: Option<TimeStep>,
  qpm: Option<f64>,
}

impl Tempo {
  pub fn new(time_step: i64, qpm: f64) -> ParameterResult<Tempo> {
    Tempo::default()
      .with_time_step(Some(time_step))?
      .with_qpm(Some(qpm))
  }

  pub fn get_time_step(&self) -> Option<TimeStep> {
    self.time_step
  }

  pub fn get_qpm(&self) -> Option<f64> {
    self.qpm
  }

  pub fn with_time_step(mut self, time_step: Option<i64>) -> ParameterResult<Tempo> {
    self.time_step = time_step.map(validate_time_step).transpose()?;
    Ok(self)
  }

  pub fn with_qpm(mut self, qpm: Option<f64>) -> ParameterResult<Tempo> {
    self.qpm = qpm.map(validate_qpm).transpose()?;
    Ok(self)
  }

  pub fn is_ready_to_use(&self) -> bool {
    self.time_step.is_some() && self.qpm.is_some()
  }

  pub fn try_eq<T: Any>(&self, other: &T) -> ParameterResult<bool> {
    (other as &dyn Any)
      .downcast_ref::<Tempo>()
      .map(|other| self == other)
      .ok_or(ParameterError::TypeMismatch {
        expected: "Tempo",
        found: any::type_name::<T>(),
      })
  }

  pub fn to_metadata(&self) -> Metadata<String, MetaValue> {
    self
      .qpm
      .map(|qpm| (QPM.to_string(), MetaValue::Float(qpm)))
      .into_iter()
      .collect()
  }

  pub fn from_metadata(time_step: TimeStep, snapshot: &Metadata<String, MetaValue>) -> ParameterResult<Tempo> {
    let qpm = snapshot
      .value_at(&QPM.to_string(), 0)
      .map(|value| {
        value.as_float().ok_or_else(|| {
          ParameterError::validation(
            QPM,
            format!("expected a number but received a {}", value.type_name()),
          )
        })
      })
      .transpose()?;

    Tempo::default()
      .with_time_step(Some(i64::from(time_step)))?
      .with_qpm(qpm)
  }
}

impl PartialEq for Tempo {
  fn eq(&self, other: &Tempo) -> bool {
    self.qpm == other.qpm
  }
}

impl fmt::Display for Tempo {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(
      f,
      "Tempo {{ time_step: {:?}, qpm: {:?} }}",
      self.time_step, self.qpm
    )
  }
}

fn validate_qpm(value: f64) -> ParameterResult<f64> {
  if value.is_finite() && value > 0.0 {
    Ok(value)
  } else {
    Err(ParameterError::validation(
      QPM,
      format!("tempo should be positive, received {}", value),
    ))
  }
}

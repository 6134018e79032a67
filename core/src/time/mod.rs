pub mod signature;
pub mod tempo;
pub mod timeline;

pub use self::signature::TimeSignature;
pub use self::tempo::Tempo;
pub use self::timeline::TimedParameter;

use std::convert::TryFrom;

use failure::Fail;

use crate::metadata::MetadataError;

/// Index of a position in the grid of a performance (e.g. a 16th note).
pub type TimeStep = u32;

#[derive(Debug, Fail, PartialEq)]
pub enum ParameterError {
  #[fail(display = "Invalid {}: {}", field, reason)]
  Validation { field: &'static str, reason: String },

  #[fail(display = "Expected a {} instance but received {}", expected, found)]
  TypeMismatch {
    expected: &'static str,
    found: &'static str,
  },

  #[fail(display = "The {} at time step {:?} is not ready to use", kind, time_step)]
  NotReady {
    kind: &'static str,
    time_step: Option<TimeStep>,
  },

  #[fail(display = "Failed to build the timeline: {}", cause)]
  Metadata {
    #[cause]
    cause: MetadataError,
  },
}

impl ParameterError {
  pub(crate) fn validation<T: Into<String>>(field: &'static str, reason: T) -> ParameterError {
    ParameterError::Validation {
      field,
      reason: reason.into(),
    }
  }
}

impl From<MetadataError> for ParameterError {
  fn from(cause: MetadataError) -> Self {
    ParameterError::Metadata { cause }
  }
}

pub type ParameterResult<T> = Result<T, ParameterError>;

pub(crate) fn validate_time_step(value: i64) -> ParameterResult<TimeStep> {
  if value < 0 {
    return Err(ParameterError::validation(
      "time_step",
      format!("it should be greater than or equal to zero, received {}", value),
    ));
  }
  TimeStep::try_from(value).map_err(|_| {
    ParameterError::validation("time_step", format!("{} is out of range", value))
  })
}

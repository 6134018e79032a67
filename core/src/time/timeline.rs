use log::debug;

use crate::metadata::{MetaValue, Metadata};
use crate::time::{ParameterError, ParameterResult, Tempo, TimeSignature, TimeStep};

/// A musical parameter that takes effect at a time step and can live in a metadata timeline.
pub trait TimedParameter: Sized {
  const KIND: &'static str;

  fn get_time_step(&self) -> Option<TimeStep>;

  fn is_ready_to_use(&self) -> bool;

  fn to_metadata(&self) -> Metadata<String, MetaValue>;

  fn from_metadata(time_step: TimeStep, snapshot: &Metadata<String, MetaValue>) -> ParameterResult<Self>;
}

impl TimedParameter for TimeSignature {
  const KIND: &'static str = "time signature";

  fn get_time_step(&self) -> Option<TimeStep> {
    TimeSignature::get_time_step(self)
  }

  fn is_ready_to_use(&self) -> bool {
    TimeSignature::is_ready_to_use(self)
  }

  fn to_metadata(&self) -> Metadata<String, MetaValue> {
    TimeSignature::to_metadata(self)
  }

  fn from_metadata(time_step: TimeStep, snapshot: &Metadata<String, MetaValue>) -> ParameterResult<Self> {
    TimeSignature::from_metadata(time_step, snapshot)
  }
}

impl TimedParameter for Tempo {
  const KIND: &'static str = "tempo";

  fn get_time_step(&self) -> Option<TimeStep> {
    Tempo::get_time_step(self)
  }

  fn is_ready_to_use(&self) -> bool {
    Tempo::is_ready_to_use(self)
  }

  fn to_metadata(&self) -> Metadata<String, MetaValue> {
    Tempo::to_metadata(self)
  }

  fn from_metadata(time_step: TimeStep, snapshot: &Metadata<String, MetaValue>) -> ParameterResult<Self> {
    Tempo::from_metadata(time_step, snapshot)
  }
}

/// Builds a metadata timeline where every parameter takes effect at its own time step.
///
/// Parameters repeating the previous values do not open a new segment. If no parameter starts
/// at time step `0` the timeline starts with an empty segment.
pub fn timeline<P: TimedParameter>(parameters: &[P]) -> ParameterResult<Metadata<String, MetaValue>> {
  let mut ordered = Vec::with_capacity(parameters.len());
  for parameter in parameters {
    match parameter.get_time_step() {
      Some(time_step) if parameter.is_ready_to_use() => ordered.push((time_step, parameter)),
      time_step => {
        return Err(ParameterError::NotReady {
          kind: P::KIND,
          time_step,
        })
      }
    }
  }
  ordered.sort_by_key(|(time_step, _)| *time_step);

  let mut metadata = Metadata::new();
  for (index, (time_step, parameter)) in ordered.into_iter().enumerate() {
    if index == 0 && time_step == 0 {
      metadata = parameter.to_metadata();
    } else {
      metadata.append(&parameter.to_metadata(), time_step)?;
    }
  }

  debug!(
    "Built a {} timeline with {} segments from {} parameters",
    P::KIND,
    metadata.num_time_steps(),
    parameters.len()
  );

  Ok(metadata)
}

/// Reads one parameter per segment of a timeline.
pub fn parameters<P: TimedParameter>(metadata: &Metadata<String, MetaValue>) -> ParameterResult<Vec<P>> {
  metadata
    .split()
    .map(|segment| P::from_metadata(segment.start(), segment.snapshot()))
    .collect()
}

/// The parameter in force at `time_step`: the latest one starting at or before it.
pub fn effective_at<P: TimedParameter>(parameters: &[P], time_step: TimeStep) -> Option<&P> {
  parameters
    .iter()
    .filter(|parameter| {
      parameter
        .get_time_step()
        .map(|start| start <= time_step)
        .unwrap_or(false)
    })
    .max_by_key(|parameter| parameter.get_time_step())
}

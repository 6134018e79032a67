//! Metadata that stays constant over stretches of time and changes at given time steps.
//!
//! A [`Metadata`] starts as a plain key/value mapping at time step `0`. Appending another
//! metadata at a later step records the values of the other one from that step on, joining
//! the key sets of both sides and filling the gaps with `None`. [`Metadata::split`] walks the
//! recorded steps back as [`Segment`]s.

pub mod split;
pub mod value;

pub use self::split::{Segment, SegmentEnd, Split};
pub use self::value::MetaValue;

use std::collections::BTreeMap;
use std::fmt;
use std::iter::FromIterator;

use failure::Fail;
use log::{debug, trace};

use crate::time::TimeStep;

#[derive(Debug, Fail, PartialEq)]
pub enum MetadataError {
  #[fail(
    display = "The start time step must be greater than the last time step of the current metadata ({} > {})",
    start, last
  )]
  PreconditionViolation { start: TimeStep, last: TimeStep },

  #[fail(display = "Time step {} can not be shifted by {}", time_step, offset)]
  TimeStepOverflow { time_step: TimeStep, offset: TimeStep },
}

pub type MetadataResult<T> = Result<T, MetadataError>;

/// A sequence of key/value snapshots indexed by time step.
///
/// Every key holds one optional value per recorded time step, so all the value sequences
/// are as long as [`Metadata::time_steps`].
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata<K, V> {
  time_steps: Vec<TimeStep>,
  entries: BTreeMap<K, Vec<Option<V>>>,
}

impl<K, V> Metadata<K, V>
where
  K: Ord + Clone,
  V: Clone + PartialEq,
{
  pub fn new() -> Metadata<K, V> {
    Metadata {
      time_steps: vec![0],
      entries: BTreeMap::new(),
    }
  }

  pub(crate) fn from_snapshot(snapshot: BTreeMap<K, Option<V>>) -> Metadata<K, V> {
    Metadata {
      time_steps: vec![0],
      entries: snapshot
        .into_iter()
        .map(|(key, value)| (key, vec![value]))
        .collect(),
    }
  }

  /// Rebuilds a timeline by appending every segment snapshot at its start step.
  ///
  /// Boundaries where nothing changes collapse, so the result may hold fewer steps than
  /// there were segments, but it assigns the same values at every step.
  pub fn concat<I>(segments: I) -> MetadataResult<Metadata<K, V>>
  where
    I: IntoIterator<Item = Segment<K, V>>,
  {
    let mut metadata = Metadata::new();
    for (index, segment) in segments.into_iter().enumerate() {
      let (start, _, snapshot) = segment.into_parts();
      if index == 0 && start == 0 {
        metadata = snapshot;
      } else {
        metadata.append(&snapshot, start)?;
      }
    }
    Ok(metadata)
  }

  pub fn time_steps(&self) -> &[TimeStep] {
    self.time_steps.as_slice()
  }

  pub fn last_time_step(&self) -> TimeStep {
    self.time_steps.last().cloned().unwrap_or(0)
  }

  pub fn num_time_steps(&self) -> usize {
    self.time_steps.len()
  }

  /// True until something has been appended with a change in the values.
  pub fn is_single_step(&self) -> bool {
    self.time_steps.len() == 1
  }

  /// Number of keys.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn contains_key(&self, key: &K) -> bool {
    self.entries.contains_key(key)
  }

  pub fn keys(&self) -> impl Iterator<Item = &K> {
    self.entries.keys()
  }

  /// The values of a key, one per recorded time step.
  pub fn values(&self, key: &K) -> Option<&[Option<V>]> {
    self.entries.get(key).map(Vec::as_slice)
  }

  /// The value of a key in force at `time_step`.
  pub fn value_at(&self, key: &K, time_step: TimeStep) -> Option<&V> {
    let index = self.index_at(time_step);
    self
      .entries
      .get(key)
      .and_then(|values| values.get(index))
      .and_then(Option::as_ref)
  }

  /// All the values in force at `time_step`, as a single step metadata.
  pub fn snapshot_at(&self, time_step: TimeStep) -> Metadata<K, V> {
    self.snapshot(self.index_at(time_step))
  }

  /// Appends `other` so that its first step lands on `start_at_time_step`.
  ///
  /// Nothing is recorded when `other` is a single step, introduces no new key and holds the
  /// same values this metadata ends with. A multi-step `other` is always appended in full.
  pub fn append(&mut self, other: &Metadata<K, V>, start_at_time_step: TimeStep) -> MetadataResult<()> {
    let last = self.last_time_step();
    if start_at_time_step <= last {
      return Err(MetadataError::PreconditionViolation {
        start: start_at_time_step,
        last,
      });
    }

    let shifted_steps = other
      .time_steps
      .iter()
      .map(|time_step| {
        time_step
          .checked_add(start_at_time_step)
          .ok_or(MetadataError::TimeStepOverflow {
            time_step: *time_step,
            offset: start_at_time_step,
          })
      })
      .collect::<MetadataResult<Vec<TimeStep>>>()?;

    if other.is_single_step() && self.continues_with(other) {
      debug!(
        "Metadata unchanged at time step {}, nothing to append",
        start_at_time_step
      );
      return Ok(());
    }

    let own_steps = self.time_steps.len();
    for key in other.entries.keys() {
      if !self.entries.contains_key(key) {
        trace!("Backfilling a new key for {} time steps", own_steps);
        self.entries.insert(key.clone(), vec![None; own_steps]);
      }
    }

    let other_steps = other.time_steps.len();
    for (key, values) in self.entries.iter_mut() {
      match other.entries.get(key) {
        Some(other_values) => values.extend(other_values.iter().cloned()),
        None => values.resize(own_steps + other_steps, None),
      }
    }

    self.time_steps.extend(shifted_steps);

    debug!(
      "Appended {} time steps at {}, now {} time steps and {} keys",
      other_steps,
      start_at_time_step,
      self.time_steps.len(),
      self.entries.len()
    );

    Ok(())
  }

  /// Splits the metadata into one [`Segment`] per recorded time step.
  pub fn split(&self) -> Split<'_, K, V> {
    Split::new(self)
  }

  fn continues_with(&self, other: &Metadata<K, V>) -> bool {
    other.entries.iter().all(|(key, other_values)| {
      self
        .entries
        .get(key)
        .map(|own_values| own_values.last() == other_values.first())
        .unwrap_or(false)
    })
  }

  fn index_at(&self, time_step: TimeStep) -> usize {
    match self.time_steps.binary_search(&time_step) {
      Ok(index) => index,
      Err(index) => index.saturating_sub(1),
    }
  }

  pub(crate) fn snapshot(&self, index: usize) -> Metadata<K, V> {
    let snapshot = self
      .entries
      .iter()
      .map(|(key, values)| (key.clone(), values.get(index).cloned().unwrap_or(None)))
      .collect();

    Metadata::from_snapshot(snapshot)
  }
}

impl<K, V> Default for Metadata<K, V>
where
  K: Ord + Clone,
  V: Clone + PartialEq,
{
  fn default() -> Metadata<K, V> {
    Metadata::new()
  }
}

impl<K, V> FromIterator<(K, V)> for Metadata<K, V>
where
  K: Ord + Clone,
  V: Clone + PartialEq,
{
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Metadata::from_snapshot(iter.into_iter().map(|(key, value)| (key, Some(value))).collect())
  }
}

impl<K, V> From<BTreeMap<K, V>> for Metadata<K, V>
where
  K: Ord + Clone,
  V: Clone + PartialEq,
{
  fn from(item: BTreeMap<K, V>) -> Self {
    item.into_iter().collect()
  }
}

impl<K, V> fmt::Display for Metadata<K, V>
where
  K: fmt::Display,
  V: fmt::Display,
{
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    let single_step = self.time_steps.len() == 1;
    if !single_step {
      write!(f, "@{:?} ", self.time_steps)?;
    }

    write!(f, "{{")?;
    for (index, (key, values)) in self.entries.iter().enumerate() {
      if index > 0 {
        write!(f, ", ")?;
      }
      write!(f, "{}: ", key)?;
      if single_step {
        write_value(f, values.first().and_then(Option::as_ref))?;
      } else {
        write!(f, "[")?;
        for (step, value) in values.iter().enumerate() {
          if step > 0 {
            write!(f, ", ")?;
          }
          write_value(f, value.as_ref())?;
        }
        write!(f, "]")?;
      }
    }
    write!(f, "}}")
  }
}

fn write_value<V: fmt::Display>(f: &mut fmt::Formatter, value: Option<&V>) -> fmt::Result {
  match value {
    Some(value) => write!(f, "{}", value),
    None => write!(f, "None"),
  }
}

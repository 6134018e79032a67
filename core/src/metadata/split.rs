use std::fmt;
use std::iter::FusedIterator;

use crate::metadata::Metadata;
use crate::time::TimeStep;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentEnd {
  /// Last time step covered by the segment (inclusive).
  Closed(TimeStep),
  Open,
}

impl SegmentEnd {
  pub fn is_open(&self) -> bool {
    *self == SegmentEnd::Open
  }

  pub fn time_step(&self) -> Option<TimeStep> {
    match self {
      SegmentEnd::Closed(time_step) => Some(*time_step),
      SegmentEnd::Open => None,
    }
  }
}

impl fmt::Display for SegmentEnd {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      SegmentEnd::Closed(time_step) => write!(f, "{}", time_step),
      SegmentEnd::Open => write!(f, "inf"),
    }
  }
}

/// A stretch of time where the metadata does not change.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment<K, V> {
  start: TimeStep,
  end: SegmentEnd,
  snapshot: Metadata<K, V>,
}

impl<K, V> Segment<K, V> {
  pub fn start(&self) -> TimeStep {
    self.start
  }

  pub fn end(&self) -> SegmentEnd {
    self.end
  }

  pub fn snapshot(&self) -> &Metadata<K, V> {
    &self.snapshot
  }

  pub fn contains(&self, time_step: TimeStep) -> bool {
    time_step >= self.start
      && match self.end {
        SegmentEnd::Closed(end) => time_step <= end,
        SegmentEnd::Open => true,
      }
  }

  pub fn into_parts(self) -> (TimeStep, SegmentEnd, Metadata<K, V>) {
    (self.start, self.end, self.snapshot)
  }
}

impl<K, V> fmt::Display for Segment<K, V>
where
  K: fmt::Display,
  V: fmt::Display,
{
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "[{:06}, {}] {}", self.start, self.end, self.snapshot)
  }
}

/// Iterator over the segments of a [`Metadata`], see [`Metadata::split`].
pub struct Split<'a, K, V> {
  metadata: &'a Metadata<K, V>,
  index: usize,
}

impl<'a, K, V> Split<'a, K, V> {
  pub(crate) fn new(metadata: &'a Metadata<K, V>) -> Split<'a, K, V> {
    Split { metadata, index: 0 }
  }
}

impl<'a, K, V> Iterator for Split<'a, K, V>
where
  K: Ord + Clone,
  V: Clone + PartialEq,
{
  type Item = Segment<K, V>;

  fn next(&mut self) -> Option<Segment<K, V>> {
    let time_steps = self.metadata.time_steps();
    let start = *time_steps.get(self.index)?;
    let end = time_steps
      .get(self.index + 1)
      .map(|next| SegmentEnd::Closed(next - 1))
      .unwrap_or(SegmentEnd::Open);

    let snapshot = self.metadata.snapshot(self.index);
    self.index += 1;

    Some(Segment {
      start,
      end,
      snapshot,
    })
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    let remaining = self.metadata.num_time_steps().saturating_sub(self.index);
    (remaining, Some(remaining))
  }
}

impl<'a, K, V> ExactSizeIterator for Split<'a, K, V>
where
  K: Ord + Clone,
  V: Clone + PartialEq,
{
}

impl<'a, K, V> FusedIterator for Split<'a, K, V>
where
  K: Ord + Clone,
  V: Clone + PartialEq,
{
}

#[cfg(test)]
mod test {

  use pretty_assertions::assert_eq;

  use super::SegmentEnd;
  use crate::metadata::Metadata;

  fn metadata(entries: &[(u32, u32)]) -> Metadata<u32, u32> {
    entries.iter().cloned().collect()
  }

  #[test]
  pub fn split_single_step() {
    let a = metadata(&[(1, 2), (3, 4)]);
    let segments = a.split().collect::<Vec<_>>();

    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].start(), 0);
    assert_eq!(segments[0].end(), SegmentEnd::Open);
    assert_eq!(segments[0].snapshot(), &a);
  }

  #[test]
  pub fn split_segments() {
    let mut a = metadata(&[(1, 2)]);
    a.append(&metadata(&[(1, 3)]), 4).unwrap();
    a.append(&metadata(&[(6, 6)]), 10).unwrap();

    let mut split = a.split();
    assert_eq!(split.len(), 3);

    let first = split.next().unwrap();
    assert_eq!((first.start(), first.end()), (0, SegmentEnd::Closed(3)));
    assert_eq!(first.snapshot().values(&1), Some(&[Some(2)][..]));
    assert_eq!(first.snapshot().values(&6), Some(&[None][..]));

    let second = split.next().unwrap();
    assert_eq!((second.start(), second.end()), (4, SegmentEnd::Closed(9)));
    assert_eq!(second.snapshot().values(&1), Some(&[Some(3)][..]));

    let third = split.next().unwrap();
    assert_eq!((third.start(), third.end()), (10, SegmentEnd::Open));
    assert_eq!(third.snapshot().values(&1), Some(&[None][..]));
    assert_eq!(third.snapshot().values(&6), Some(&[Some(6)][..]));

    assert_eq!(split.len(), 0);
    assert!(split.next().is_none());
    assert!(split.next().is_none());
  }

  #[test]
  pub fn segment_contains() {
    let mut a = metadata(&[(1, 2)]);
    a.append(&metadata(&[(1, 3)]), 4).unwrap();
    let segments = a.split().collect::<Vec<_>>();

    assert!(segments[0].contains(0));
    assert!(segments[0].contains(3));
    assert!(!segments[0].contains(4));
    assert!(segments[1].contains(4));
    assert!(segments[1].contains(std::u32::MAX));
  }

  #[test]
  pub fn segment_end() {
    assert!(SegmentEnd::Open.is_open());
    assert_eq!(SegmentEnd::Open.time_step(), None);
    assert_eq!(SegmentEnd::Closed(7).time_step(), Some(7));
    assert_eq!(SegmentEnd::Closed(7).to_string(), "7");
    assert_eq!(SegmentEnd::Open.to_string(), "inf");
  }

  #[test]
  pub fn concat_segments() {
    let mut a = metadata(&[(1, 2)]);
    a.append(&metadata(&[(1, 3), (5, 5)]), 4).unwrap();
    a.append(&metadata(&[(1, 4)]), 8).unwrap();

    let rebuilt = Metadata::concat(a.split()).unwrap();
    assert_eq!(rebuilt, a);
  }

  #[test]
  pub fn display() {
    let mut a = metadata(&[(1, 2)]);
    a.append(&metadata(&[(1, 3)]), 4).unwrap();
    let segments = a.split().map(|segment| segment.to_string()).collect::<Vec<_>>();

    assert_eq!(segments, vec!["[000000, 3] {1: 2}", "[000004, inf] {1: 3}"]);
  }
}

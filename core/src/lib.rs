pub mod config;
pub mod metadata;
pub mod power_of_two;
pub mod time;

pub use crate::metadata::{MetaValue, Metadata, MetadataError, Segment, SegmentEnd};
pub use crate::power_of_two::is_power_of_two;
pub use crate::time::{Tempo, TimeSignature, TimeStep};

use failure::Error;

use serde_derive::Deserialize;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;

use crate::metadata::{MetaValue, Metadata};
use crate::time::{validate_time_step, ParameterResult, Tempo, TimeSignature, TimeStep};

const DEFAULT_QPM: f64 = 120.0;
const DEFAULT_SIGNATURE_NUMERATOR: i64 = 4;
const DEFAULT_SIGNATURE_DENOMINATOR: i64 = 4;
const DEFAULT_BEAT_DIVISION_FACTOR: i64 = 4;

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct TimeSignatureConfig {
  #[serde(default)]
  pub time_step: i64,
  pub numerator: i64,
  pub denominator: i64,
  pub beat_division_factors: Vec<i64>,
}

impl TimeSignatureConfig {
  pub fn to_time_signature(&self) -> ParameterResult<TimeSignature> {
    TimeSignature::new(
      self.time_step,
      self.numerator,
      self.denominator,
      self.beat_division_factors.clone(),
    )
  }
}

impl Default for TimeSignatureConfig {
  fn default() -> TimeSignatureConfig {
    TimeSignatureConfig {
      time_step: 0,
      numerator: DEFAULT_SIGNATURE_NUMERATOR,
      denominator: DEFAULT_SIGNATURE_DENOMINATOR,
      beat_division_factors: vec![DEFAULT_BEAT_DIVISION_FACTOR],
    }
  }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct TempoConfig {
  #[serde(default)]
  pub time_step: i64,
  pub qpm: f64,
}

impl TempoConfig {
  pub fn to_tempo(&self) -> ParameterResult<Tempo> {
    Tempo::new(self.time_step, self.qpm)
  }
}

impl Default for TempoConfig {
  fn default() -> TempoConfig {
    TempoConfig {
      time_step: 0,
      qpm: DEFAULT_QPM,
    }
  }
}

/// Free-form metadata (style, performer, ...) holding from a time step on.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RegionConfig {
  #[serde(default)]
  pub time_step: i64,
  #[serde(default)]
  pub values: BTreeMap<String, MetaValue>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
  pub time_signatures: Vec<TimeSignatureConfig>,
  pub tempos: Vec<TempoConfig>,
  pub regions: Vec<RegionConfig>,
}

impl Default for Config {
  fn default() -> Config {
    Config {
      time_signatures: vec![TimeSignatureConfig::default()],
      tempos: vec![TempoConfig::default()],
      regions: Vec::new(),
    }
  }
}

impl Config {
  pub fn from_file<'a, T>(path: T) -> Result<Config, Error>
  where
    T: Into<&'a str>,
  {
    let mut content = String::new();
    let path_str = path.into();
    let mut file = File::open(path_str)?;
    file.read_to_string(&mut content)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
  }

  #[allow(clippy::should_implement_trait)]
  pub fn from_str<'a, T>(content: T) -> Result<Config, Error>
  where
    T: Into<&'a str>,
  {
    let config: Config = toml::from_str(content.into())?;
    Ok(config)
  }

  pub fn time_signatures(&self) -> ParameterResult<Vec<TimeSignature>> {
    self
      .time_signatures
      .iter()
      .map(TimeSignatureConfig::to_time_signature)
      .collect()
  }

  pub fn tempos(&self) -> ParameterResult<Vec<Tempo>> {
    self.tempos.iter().map(TempoConfig::to_tempo).collect()
  }

  /// Joins the regions, ordered by time step, into a single timeline.
  pub fn regions_timeline(&self) -> ParameterResult<Metadata<String, MetaValue>> {
    let mut regions = self
      .regions
      .iter()
      .map(|region| validate_time_step(region.time_step).map(|time_step| (time_step, region)))
      .collect::<ParameterResult<Vec<(TimeStep, &RegionConfig)>>>()?;
    regions.sort_by_key(|(time_step, _)| *time_step);

    let mut metadata = Metadata::new();
    for (index, (time_step, region)) in regions.into_iter().enumerate() {
      let snapshot: Metadata<String, MetaValue> = region.values.clone().into();
      if index == 0 && time_step == 0 {
        metadata = snapshot;
      } else {
        metadata.append(&snapshot, time_step)?;
      }
    }
    Ok(metadata)
  }
}

#[cfg(test)]
mod test {

  use pretty_assertions::assert_eq;

  use super::{Config, TempoConfig, TimeSignatureConfig};
  use crate::metadata::{MetaValue, MetadataError};
  use crate::time::ParameterError;

  #[test]
  pub fn default_config() {
    let config = Config::from_str("").unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.tempos, vec![TempoConfig::default()]);
    assert_eq!(config.time_signatures(), Ok(vec![super::TimeSignature::new(0, 4, 4, vec![4]).unwrap()]));
    assert!(config.regions.is_empty());
  }

  #[test]
  pub fn parse_config() {
    let config = Config::from_str(
      r#"
        [[time_signatures]]
        numerator = 4
        denominator = 4
        beat_division_factors = [4]

        [[time_signatures]]
        time_step = 32
        numerator = 6
        denominator = 8
        beat_division_factors = [3]

        [[tempos]]
        qpm = 50.0

        [[regions]]
        values = { style = "funk", bpm_class = 2 }

        [[regions]]
        time_step = 16
        values = { style = "rock" }
      "#,
    )
    .unwrap();

    assert_eq!(
      config.time_signatures[1],
      TimeSignatureConfig {
        time_step: 32,
        numerator: 6,
        denominator: 8,
        beat_division_factors: vec![3],
      }
    );
    assert_eq!(config.tempos().unwrap()[0].get_qpm(), Some(50.0));

    let regions = config.regions_timeline().unwrap();
    assert_eq!(regions.time_steps(), &[0, 16]);
    assert_eq!(regions.value_at(&"style".to_string(), 20), Some(&MetaValue::from("rock")));
    assert_eq!(regions.value_at(&"bpm_class".to_string(), 20), None);
  }

  #[test]
  pub fn invalid_parameters() {
    let config = Config::from_str(
      r#"
        [[time_signatures]]
        numerator = 4
        denominator = 3
        beat_division_factors = [4]
      "#,
    )
    .unwrap();
    assert!(config.time_signatures().is_err());
  }

  #[test]
  pub fn duplicated_regions() {
    let config = Config::from_str(
      r#"
        [[regions]]
        time_step = 4
        values = { style = "funk" }

        [[regions]]
        time_step = 4
        values = { style = "rock" }
      "#,
    )
    .unwrap();
    assert_eq!(
      config.regions_timeline(),
      Err(ParameterError::Metadata {
        cause: MetadataError::PreconditionViolation { start: 4, last: 4 }
      })
    );
  }

  #[test]
  pub fn negative_region_time_step() {
    let config = Config::from_str(
      r#"
        [[regions]]
        time_step = -8
        values = { style = "funk" }
      "#,
    )
    .unwrap();
    match config.regions_timeline() {
      Err(ParameterError::Validation { field, .. }) => assert_eq!(field, "time_step"),
      other => panic!("unexpected {:?}", other),
    }
  }

  #[test]
  pub fn invalid_toml() {
    assert!(Config::from_str("tempos = 3").is_err());
  }
}

use std::fmt::Display;

use log::{debug, info};

use failure::{Error, Fail};

use hvo_timeline_core::config::Config;
use hvo_timeline_core::metadata::{MetaValue, Metadata};
use hvo_timeline_core::time::timeline::{effective_at, timeline};
use hvo_timeline_core::time::{Tempo, TimeSignature};

const HVO_TIMELINE_CONFIG: &str = "HVO_TIMELINE_CONFIG";
const DEFAULT_HVO_TIMELINE_CONFIG: &str = "timeline.toml";

const HVO_TIMELINE_LOG_CONFIG: &str = "HVO_TIMELINE_LOG_CONFIG";
const DEFAULT_HVO_TIMELINE_LOG_CONFIG: &str = "log4rs.yaml";

#[derive(Debug, Fail)]
enum MainError {
  #[fail(display = "Failed to init logging: {}", cause)]
  LoggingInit { cause: String },
}

fn main() -> Result<(), Error> {
  init_logging()?;

  let config = init_config()?;

  let time_signatures = config.time_signatures()?;
  let tempos = config.tempos()?;

  print_segments("Time signatures", &timeline(&time_signatures)?);
  print_segments("Tempos", &timeline(&tempos)?);
  print_segments("Regions", &config.regions_timeline()?);

  print_start(&time_signatures, &tempos);

  Ok(())
}

fn init_logging() -> Result<(), Error> {
  let log_config_path = std::env::var(HVO_TIMELINE_LOG_CONFIG)
    .unwrap_or_else(|_| DEFAULT_HVO_TIMELINE_LOG_CONFIG.to_string());

  log4rs::init_file(log_config_path.as_str(), Default::default()).map_err(|err| {
    MainError::LoggingInit {
      cause: err.to_string(),
    }
  })?;

  Ok(())
}

fn init_config() -> Result<Config, Error> {
  let config_path =
    std::env::var(HVO_TIMELINE_CONFIG).unwrap_or_else(|_| DEFAULT_HVO_TIMELINE_CONFIG.to_string());

  info!("Loading timeline configuration from {} ...", config_path);
  let config = Config::from_file(config_path.as_str())?;
  debug!("{:#?}", config);

  Ok(config)
}

fn print_segments(title: &str, metadata: &Metadata<String, MetaValue>) {
  info!("{}: {} segments", title, metadata.num_time_steps());

  println!("{}", title);
  for segment in metadata.split() {
    println!("=> {}", segment);
  }
}

fn print_start(time_signatures: &[TimeSignature], tempos: &[Tempo]) {
  println!("At time step 0");
  print_parameter(effective_at(time_signatures, 0));
  print_parameter(effective_at(tempos, 0));
}

fn print_parameter<P: Display>(parameter: Option<&P>) {
  match parameter {
    Some(parameter) => println!("=> {}", parameter),
    None => println!("=> None"),
  }
}

//! Shared configuration, logging and runtime properties for the turbine
//! discovery service

pub mod config;
pub mod logging;
pub mod properties;

pub use config::{Config, LoggingConfig, MarathonConfig, PollConfig};
pub use properties::{DynamicProperties, INSTANCE_URL_SUFFIX_PREFIX, MARATHON_URL_PROPERTY};

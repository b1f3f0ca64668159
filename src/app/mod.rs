pub mod config;

pub use config::{Config, EventsConfig, NotifierConfig};

//! Layered configuration for the reactor workspace.
//!
//! Configuration is read from YAML or JSON files in a `configuration/` directory and then
//! overridden by `APP_`-prefixed environment variables. See [`load::load_config`].

pub mod environment;
pub mod load;
pub mod shared;

pub use environment::Environment;
pub use load::{LoadConfigError, load_config, load_config_from};

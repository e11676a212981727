//! Configuration for the AWS limit checker.
//!
//! The configuration is read from a YAML file with [`Config::from_path`]. All fields are optional
//! and fall back to their defaults. Individual values can be overridden from the environment with
//! [`OverridableConfig::from_env`] and [`Config::apply_override`].

#![warn(missing_docs)]

mod config;
mod overrides;

pub use self::config::*;
pub use self::overrides::*;

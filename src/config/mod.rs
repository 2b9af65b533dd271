//! Configuration for keyrotor (`.keyrotor.toml` + environment overrides).

pub mod settings;

pub use settings::{Environment, Settings};

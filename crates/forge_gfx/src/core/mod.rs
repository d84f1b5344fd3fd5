//! Core engine types

pub mod config;

pub use config::{ApplicationConfig, DeviceConfig, InstanceConfig, WindowConfig};

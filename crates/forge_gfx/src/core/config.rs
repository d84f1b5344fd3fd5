//! # Application Configuration
//!
//! Everything the bootstrap pipeline needs to know up front: the window it
//! opens, how the Vulkan instance is described, and which queues the logical
//! device provisions. All sections have defaults, so a configuration file only
//! needs the values it changes:
//!
//! ```toml
//! log_level = "debug"
//!
//! [window]
//! width = 1280
//! height = 720
//! title = "Forge"
//!
//! [instance]
//! enable_validation = true
//!
//! [device]
//! queue_priorities = [1.0]
//! ```

use serde::{Serialize, Deserialize};

use crate::config::Config;

/// Window creation parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in screen coordinates
    pub width: u32,
    /// Window height in screen coordinates
    pub height: u32,
    /// Window title
    pub title: String,
    /// Whether the user may resize the window
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "Forge".to_string(),
            resizable: false,
        }
    }
}

/// Vulkan instance parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceConfig {
    /// Application name reported to the driver
    pub application_name: String,
    /// Application version (major, minor, patch)
    pub application_version: (u32, u32, u32),
    /// Validation layers: `Some(true)` requires them, `Some(false)` disables
    /// them, `None` enables them in debug builds when available
    pub enable_validation: Option<bool>,
    /// Instance extensions requested on top of the window toolkit's
    pub extensions: Vec<String>,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            application_name: "Forge".to_string(),
            application_version: (0, 1, 0),
            enable_validation: None,
            extensions: Vec::new(),
        }
    }
}

/// Logical device parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// One priority per queue created in every selected queue family
    pub queue_priorities: Vec<f32>,
    /// Whether the selected device must be able to present to the window
    pub require_presentation: bool,
    /// Device extensions requested on top of the swapchain extension
    pub extensions: Vec<String>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            queue_priorities: vec![1.0],
            require_presentation: true,
            extensions: Vec::new(),
        }
    }
}

/// Top-level configuration for the bootstrap application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Default log filter, overridden by `RUST_LOG`
    pub log_level: String,
    /// Stop the event loop after this many iterations
    pub frame_limit: Option<u64>,
    /// Window section
    pub window: WindowConfig,
    /// Instance section
    pub instance: InstanceConfig,
    /// Device section
    pub device: DeviceConfig,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            frame_limit: None,
            window: WindowConfig::default(),
            instance: InstanceConfig::default(),
            device: DeviceConfig::default(),
        }
    }
}

impl ApplicationConfig {
    /// Set the window dimensions and title
    pub fn with_window(mut self, width: u32, height: u32, title: impl Into<String>) -> Self {
        self.window.width = width;
        self.window.height = height;
        self.window.title = title.into();
        self
    }

    /// Stop the event loop after `frames` iterations
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    /// Enable or disable validation layers explicitly
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.instance.enable_validation = Some(enabled);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(format!(
                "Window dimensions must be non-zero, got {}x{}",
                self.window.width, self.window.height
            ));
        }

        if self.instance.application_name.is_empty() {
            return Err("Application name cannot be empty".to_string());
        }

        if self.device.queue_priorities.is_empty() {
            return Err("At least one queue priority is required".to_string());
        }

        if let Some(priority) = self
            .device
            .queue_priorities
            .iter()
            .find(|priority| !(0.0..=1.0).contains(*priority))
        {
            return Err(format!("Queue priority {priority} is outside [0.0, 1.0]"));
        }

        Ok(())
    }
}

impl Config for ApplicationConfig {}

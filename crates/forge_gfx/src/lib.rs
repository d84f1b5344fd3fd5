//! # Forge GFX
//!
//! Vulkan bootstrap: opens a window, creates an instance and a presentation
//! surface, picks a physical device and queue families, and creates a logical
//! device with its queues before handing control to a render loop.
//!
//! Every resource is built by a builder from the one before it and keeps its
//! state inline in a fixed-layout [`foundation::OpaqueHandle`]. Native calls go
//! through two object-safe service traits, [`platform::WindowToolkit`] and
//! [`render::vulkan::GraphicsBackend`], with GLFW and `ash` implementations.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use forge_gfx::prelude::*;
//! use std::rc::Rc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = Rc::new(AshBackend::load()?);
//!     let toolkit = Rc::new(GlfwToolkit::new());
//!     let mut app = Application::new(ApplicationConfig::default(), backend, toolkit)?;
//!     app.run()?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

#[cfg(not(target_pointer_width = "64"))]
compile_error!("forge_gfx declares resource layouts for 64-bit targets only");

pub mod config;
pub mod core;
pub mod error;
pub mod foundation;
pub mod platform;
pub mod render;

mod application;

#[cfg(test)]
mod testing;
#[cfg(test)]
mod tests;

pub use application::{AppError, AppState, Application, RenderContext};
pub use error::{ConstructionError, ConstructionResult, ResourceKind};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::Config,
        core::ApplicationConfig,
        platform::{GlfwToolkit, System, SystemBuilder, Window, WindowBuilder},
        render::vulkan::{
            select_device, AshBackend, Device, DeviceBuilder, DeviceRequirements, Instance, InstanceBuilder,
            PhysicalDevice, Queue, QueueFamily, Surface, SurfaceBuilder,
        },
        AppError, AppState, Application, ConstructionError, ConstructionResult, RenderContext,
    };
}

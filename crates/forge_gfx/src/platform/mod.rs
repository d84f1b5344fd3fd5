//! Platform layer: window toolkit boundary, system token and windows

pub mod glfw_toolkit;
pub mod system;
pub mod toolkit;
pub mod window;

pub use glfw_toolkit::GlfwToolkit;
pub use system::{System, SystemBuilder};
pub use toolkit::{PlatformError, PlatformResult, Toolkit, WindowDescriptor, WindowKey, WindowToolkit};
pub use window::{Window, WindowBuilder};

//! Window toolkit boundary
//!
//! The engine never talks to a windowing library directly. Everything it
//! needs (window lifetime, event pumping, the instance extensions required for
//! presentation and surface creation) goes through [`WindowToolkit`].
//! Native windows are addressed by [`WindowKey`] so the [`Window`] wrapper
//! stays a small fixed-size value.
//!
//! [`Window`]: crate::platform::Window

use ash::vk;
use slotmap::new_key_type;
use std::rc::Rc;
use thiserror::Error;

new_key_type! {
    /// Key addressing one native window owned by a toolkit
    pub struct WindowKey;
}

/// Window toolkit errors
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Toolkit initialization failed
    #[error("Toolkit initialization failed: {0}")]
    InitializationFailed(String),

    /// A call that needs an initialized toolkit was made before `initialize`
    #[error("Toolkit is not initialized")]
    NotInitialized,

    /// The toolkit refused to create a window
    #[error("Window creation failed")]
    WindowCreationFailed,

    /// The window key does not name a live window
    #[error("Unknown window")]
    UnknownWindow,

    /// The toolkit cannot report the instance extensions it needs
    #[error("Required instance extensions are unavailable")]
    ExtensionsUnavailable,

    /// Surface creation was rejected
    #[error("Surface creation failed: {0:?}")]
    SurfaceCreationFailed(vk::Result),
}

/// Result type for toolkit operations
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Parameters for a native window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowDescriptor {
    /// Width in screen coordinates
    pub width: u32,
    /// Height in screen coordinates
    pub height: u32,
    /// Window title
    pub title: String,
    /// Whether the user may resize the window
    pub resizable: bool,
}

/// Windowing service consumed by the platform wrappers
///
/// Implementations are single-threaded and use interior mutability; every
/// method takes `&self` so one toolkit can be shared by the system token and
/// all of its windows.
pub trait WindowToolkit {
    /// Initialize the toolkit; balanced by one call to [`terminate`](Self::terminate)
    fn initialize(&self) -> PlatformResult<()>;

    /// Create a window without a client graphics API
    fn create_window(&self, descriptor: &WindowDescriptor) -> PlatformResult<WindowKey>;

    /// Whether the window was asked to close; unknown windows report `true`
    fn should_close(&self, window: WindowKey) -> bool;

    /// Flag the window as closing
    fn request_close(&self, window: WindowKey);

    /// Process pending events for all windows
    fn poll_events(&self);

    /// Framebuffer size in pixels
    fn framebuffer_size(&self, window: WindowKey) -> Option<(u32, u32)>;

    /// Instance extensions the toolkit needs for surface creation
    fn required_instance_extensions(&self) -> PlatformResult<Vec<String>>;

    /// Create a presentation surface for `window` on `instance`
    fn create_surface(&self, instance: vk::Instance, window: WindowKey) -> PlatformResult<vk::SurfaceKHR>;

    /// Destroy a window; unknown keys are ignored
    fn destroy_window(&self, window: WindowKey);

    /// Release one initialization
    fn terminate(&self);
}

/// Shared handle to the window toolkit
pub type Toolkit = Rc<dyn WindowToolkit>;

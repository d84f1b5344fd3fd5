//! GLFW window toolkit
//!
//! Provides cross-platform window creation and event handling for Vulkan.

use ash::vk;
use glfw::{Action, Key, WindowEvent};
use slotmap::SlotMap;
use std::cell::{Cell, RefCell};

use super::toolkit::{PlatformError, PlatformResult, WindowDescriptor, WindowKey, WindowToolkit};

struct GlfwWindow {
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, WindowEvent)>,
}

/// [`WindowToolkit`] backed by GLFW
///
/// GLFW is initialized on the first [`initialize`](WindowToolkit::initialize)
/// and shut down when the matching number of
/// [`terminate`](WindowToolkit::terminate) calls has been made. Pressing
/// Escape in any window requests that it close.
#[derive(Default)]
pub struct GlfwToolkit {
    glfw: RefCell<Option<glfw::Glfw>>,
    windows: RefCell<SlotMap<WindowKey, GlfwWindow>>,
    users: Cell<usize>,
}

impl GlfwToolkit {
    /// Create an uninitialized toolkit
    pub fn new() -> Self {
        Self::default()
    }
}

impl WindowToolkit for GlfwToolkit {
    fn initialize(&self) -> PlatformResult<()> {
        let mut slot = self.glfw.borrow_mut();
        if slot.is_none() {
            let mut glfw = glfw::init(glfw::fail_on_errors)
                .map_err(|e| PlatformError::InitializationFailed(format!("{:?}", e)))?;

            // Configure for Vulkan (no OpenGL context)
            glfw.window_hint(glfw::WindowHint::ClientApi(glfw::ClientApiHint::NoApi));
            log::debug!("GLFW initialized");
            *slot = Some(glfw);
        }

        self.users.set(self.users.get() + 1);
        Ok(())
    }

    fn create_window(&self, descriptor: &WindowDescriptor) -> PlatformResult<WindowKey> {
        let mut slot = self.glfw.borrow_mut();
        let glfw = slot.as_mut().ok_or(PlatformError::NotInitialized)?;

        glfw.window_hint(glfw::WindowHint::Resizable(descriptor.resizable));
        let (mut window, events) = glfw
            .create_window(descriptor.width, descriptor.height, &descriptor.title, glfw::WindowMode::Windowed)
            .ok_or(PlatformError::WindowCreationFailed)?;

        // Set up event polling
        window.set_key_polling(true);
        window.set_close_polling(true);
        window.set_framebuffer_size_polling(true);

        Ok(self.windows.borrow_mut().insert(GlfwWindow { window, events }))
    }

    fn should_close(&self, window: WindowKey) -> bool {
        self.windows
            .borrow()
            .get(window)
            .map_or(true, |entry| entry.window.should_close())
    }

    fn request_close(&self, window: WindowKey) {
        if let Some(entry) = self.windows.borrow_mut().get_mut(window) {
            entry.window.set_should_close(true);
        }
    }

    fn poll_events(&self) {
        match self.glfw.borrow_mut().as_mut() {
            Some(glfw) => glfw.poll_events(),
            None => return,
        }

        for (_, entry) in self.windows.borrow_mut().iter_mut() {
            for (_, event) in glfw::flush_messages(&entry.events) {
                log::trace!("{:?}", event);
                if let WindowEvent::Key(Key::Escape, _, Action::Press, _) = event {
                    entry.window.set_should_close(true);
                }
            }
        }
    }

    fn framebuffer_size(&self, window: WindowKey) -> Option<(u32, u32)> {
        self.windows.borrow().get(window).map(|entry| {
            let (width, height) = entry.window.get_framebuffer_size();
            (u32::try_from(width).unwrap_or(0), u32::try_from(height).unwrap_or(0))
        })
    }

    fn required_instance_extensions(&self) -> PlatformResult<Vec<String>> {
        self.glfw
            .borrow()
            .as_ref()
            .ok_or(PlatformError::NotInitialized)?
            .get_required_instance_extensions()
            .ok_or(PlatformError::ExtensionsUnavailable)
    }

    fn create_surface(&self, instance: vk::Instance, window: WindowKey) -> PlatformResult<vk::SurfaceKHR> {
        let windows = self.windows.borrow();
        let entry = windows.get(window).ok_or(PlatformError::UnknownWindow)?;

        let mut surface = vk::SurfaceKHR::null();
        let result = entry.window.create_window_surface(instance, std::ptr::null(), &mut surface);

        if result == vk::Result::SUCCESS {
            Ok(surface)
        } else {
            Err(PlatformError::SurfaceCreationFailed(result))
        }
    }

    fn destroy_window(&self, window: WindowKey) {
        // Dropping the GLFW window destroys it
        if self.windows.borrow_mut().remove(window).is_some() {
            log::debug!("Destroyed window {:?}", window);
        }
    }

    fn terminate(&self) {
        let users = self.users.get().saturating_sub(1);
        self.users.set(users);
        if users > 0 {
            return;
        }

        self.windows.borrow_mut().clear();
        if self.glfw.borrow_mut().take().is_some() {
            log::debug!("GLFW terminated");
        }
    }
}
